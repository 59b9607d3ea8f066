//! Slotbook demo
//!
//! Runs one booking through its payment lifecycle against an in-memory
//! store seeded with two venues and two clients:
//!
//! 1. Book the first slot of the cricket turf
//! 2. Capture 1200 in cash (PARTIAL), then 800 (PAID)
//! 3. Delete the second ledger row; the booking drops back to PARTIAL
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=info,slotbook=debug cargo run --bin slotbook-demo
//! ```

#![allow(missing_docs)]

use slotbook::types::{Money, PaymentMethod, Snapshot, TimeOfDay, VenueId};
use slotbook::{Capture, Config, DateRange, LedgerEnvironment, LedgerReducer, LedgerService, seed};
use slotbook_runtime::Engine;
use slotbook_runtime::memory::InMemorySnapshotStore;
use slotbook_runtime::metrics::MetricsExporter;
use std::error::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn Error>> {
    // 1. Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,slotbook=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Slotbook demo");

    // 2. Metrics recorder
    let mut exporter = MetricsExporter::new();
    exporter.install()?;

    // 3. Configuration and engine
    let config = Config::from_env();
    tracing::info!(?config, "Configuration loaded");

    let env = LedgerEnvironment::production(&config.ledger);
    let now = env.clock.now();
    let today = env.clock.today();
    let store = InMemorySnapshotStore::new(seed::default_snapshot(now));
    let service = LedgerService::new(
        Engine::new(LedgerReducer::new(), env, store).with_config(config.engine),
    );

    // 4. Slots
    let venue_id = VenueId::new("V1");
    let slots = service.slots(&venue_id, today)?;
    let last = slots.last().map(|s| format!("{}-{}", s.start, s.end));
    tracing::info!(count = slots.len(), last = ?last, "Slots generated");

    // 5. Book and pay in two installments
    let booking = service.create_booking(
        &"CL-000001".into(),
        &venue_id,
        today,
        TimeOfDay::on_the_hour(8),
        Money::ZERO,
    )?;
    tracing::info!(booking_id = %booking.id, total = %booking.total_amount, "Booked");

    let mut second_tx = None;
    for (amount, reference) in [(1200, "front desk"), (800, "")] {
        let (booking, payment, tx) = service.capture_payment(Capture {
            booking_id: booking.id.clone(),
            amount: Money::new(amount),
            method: PaymentMethod::Cash,
            reference: reference.to_string(),
            date: today,
            extra_discount: Money::ZERO,
        })?;
        tracing::info!(
            payment_id = %payment.id,
            paid = %booking.amount_paid,
            status = %booking.payment_status,
            "Payment captured"
        );
        second_tx = Some(tx.id);
    }

    // 6. Delete the second ledger row
    if let Some(tx_id) = second_tx {
        service.delete_transaction(&tx_id, "test")?;
    }
    let snapshot: Snapshot = service.snapshot()?;
    if let Some(b) = snapshot.booking(&booking.id) {
        tracing::info!(paid = %b.amount_paid, status = %b.payment_status, "After reversal");
    }

    // 7. Reports
    let range = DateRange::day(today);
    let summary = service.financial_summary(range)?;
    let utilization = service.venue_utilization(&venue_id, range)?;
    tracing::info!(
        income = %summary.income,
        expenses = %summary.expenses,
        profit = %summary.profit,
        utilization = utilization.utilization_percent,
        "Daily report"
    );
    for entry in service.recent_audit(10)? {
        tracing::info!(action = %entry.action, details = %entry.details, "Audit");
    }

    if let Some(text) = exporter.render() {
        tracing::debug!("Metrics:\n{text}");
    }

    println!("{}", snapshot.to_json()?);
    tracing::info!("Demo complete");
    Ok(())
}

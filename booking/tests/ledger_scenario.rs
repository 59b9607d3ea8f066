//! End-to-end ledger scenarios through the engine
//!
//! Drives `LedgerAction`s through `Engine` over an `InMemorySnapshotStore`
//! and checks both the committed snapshot and what reached the audit sink.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::NaiveDate;
use slotbook::types::{
    BookingStatus, Money, PaymentMethod, PaymentStatus, Snapshot, TimeOfDay, TransactionType,
};
use slotbook::{
    ConflictPolicy, DeleteOrigin, LedgerAction, LedgerConfig, LedgerEnvironment, LedgerError,
    LedgerReducer, seed,
};
use slotbook_core::environment::Clock;
use slotbook_runtime::memory::InMemorySnapshotStore;
use slotbook_runtime::{ConcurrencyMode, Engine, EngineConfig};
use slotbook_testing::{RecordingAuditRecorder, SequentialIdGenerator, test_clock};
use std::sync::Arc;

// ============================================================================
// Test Fixtures
// ============================================================================

type TestEngine = Engine<LedgerReducer, InMemorySnapshotStore<Snapshot>>;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

fn engine_with(config: &LedgerConfig) -> (TestEngine, Arc<RecordingAuditRecorder>) {
    let env = LedgerEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(SequentialIdGenerator::new()),
        config,
    );
    let audit = Arc::new(RecordingAuditRecorder::new());
    let store = InMemorySnapshotStore::new(seed::default_snapshot(test_clock().now()));
    let engine = Engine::new(LedgerReducer::new(), env, store)
        .with_audit(audit.clone())
        .with_config(EngineConfig::default().with_concurrency(ConcurrencyMode::CompareAndSwap));
    (engine, audit)
}

fn engine() -> (TestEngine, Arc<RecordingAuditRecorder>) {
    engine_with(&LedgerConfig::default())
}

fn book(start: &str) -> LedgerAction {
    LedgerAction::CreateBooking {
        client_id: "CL-000001".into(),
        venue_id: "V1".into(),
        date: date(),
        start_time: t(start),
        discount: Money::ZERO,
    }
}

fn pay(booking_id: &slotbook::types::BookingId, amount: i64) -> LedgerAction {
    LedgerAction::CapturePayment {
        booking_id: booking_id.clone(),
        amount: Money::new(amount),
        method: PaymentMethod::Cash,
        reference: String::new(),
        date: date(),
        extra_discount: Money::ZERO,
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn two_installments_then_ledger_deletion() {
    let (engine, audit) = engine();

    let slots = engine
        .state_with(|s| slotbook::slots::generate_slots(&s.venues[0], date(), &s.bookings))
        .unwrap();
    assert_eq!(slots.len(), 10);
    let last = slots.last().unwrap();
    assert_eq!((last.start, last.end), (t("21:30"), t("23:00")));

    let snapshot = engine.send(book("08:00")).unwrap();
    let booking_id = snapshot.bookings[0].id.clone();
    assert_eq!(snapshot.bookings[0].total_amount, Money::new(2000));

    let snapshot = engine.send(pay(&booking_id, 1200)).unwrap();
    assert_eq!(snapshot.bookings[0].payment_status, PaymentStatus::Partial);

    let snapshot = engine.send(pay(&booking_id, 800)).unwrap();
    assert_eq!(snapshot.bookings[0].amount_paid, Money::new(2000));
    assert_eq!(snapshot.bookings[0].payment_status, PaymentStatus::Paid);

    let second = snapshot.transactions[1].clone();
    let snapshot = engine
        .send(LedgerAction::DeleteTransaction {
            transaction_id: second.id.clone(),
            reason: "test".into(),
        })
        .unwrap();

    let booking = &snapshot.bookings[0];
    assert_eq!(booking.amount_paid, Money::new(1200));
    assert_eq!(booking.payment_status, PaymentStatus::Partial);
    assert!(!snapshot.payments[0].is_reversed);
    assert!(snapshot.payments[1].is_reversed);
    assert!(snapshot.transaction(&second.id).is_none());
    assert_eq!(snapshot.transactions.len(), 1);
    assert_eq!(snapshot.version, 4);

    let actions: Vec<_> = audit.records().into_iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        ["CREATE_BOOKING", "RECORD_PAYMENT", "RECORD_PAYMENT", "DELETE_TRANSACTION"]
    );
    assert_eq!(snapshot.audit_logs.len(), 4);
    assert!(audit.records().iter().all(|r| r.actor_id == "admin-1"));
}

#[test]
fn rejected_action_leaves_store_and_audit_untouched() {
    let (engine, audit) = engine();
    engine.send(book("08:00")).unwrap();
    let before = engine.state().unwrap();

    let err = engine.send(book("08:00")).unwrap_err();
    assert!(matches!(err.rejection(), Some(LedgerError::Conflict { .. })));

    assert_eq!(engine.state().unwrap(), before);
    assert_eq!(audit.records().len(), 1);
}

#[test]
fn delete_paid_booking_reverses_once() {
    let (engine, _audit) = engine();
    let booking_id = engine.send(book("09:30")).unwrap().bookings[0].id.clone();
    engine.send(pay(&booking_id, 700)).unwrap();
    engine.send(pay(&booking_id, 300)).unwrap();

    let snapshot = engine
        .send(LedgerAction::DeleteBooking {
            booking_id: booking_id.clone(),
            origin: DeleteOrigin::Calendar,
        })
        .unwrap();

    assert!(snapshot.booking(&booking_id).is_none());
    assert_eq!(snapshot.payments_for(&booking_id).count(), 0);

    let expenses: Vec<_> = snapshot
        .transactions
        .iter()
        .filter(|t| t.kind == TransactionType::Expense)
        .collect();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, Money::new(1000));
    assert_eq!(expenses[0].date, date());
    assert_eq!(
        snapshot.audit_logs.last().unwrap().action,
        "DELETE_BOOKING_CALENDAR"
    );
}

#[test]
fn cancelled_slot_can_be_rebooked() {
    let (engine, _audit) = engine();
    let booking_id = engine.send(book("11:00")).unwrap().bookings[0].id.clone();
    let snapshot = engine
        .send(LedgerAction::CancelBooking {
            booking_id,
            reason: "rain".into(),
        })
        .unwrap();
    assert_eq!(snapshot.bookings[0].status, BookingStatus::Cancelled);

    let snapshot = engine.send(book("11:00")).unwrap();
    assert_eq!(snapshot.bookings.len(), 2);
    assert!(snapshot.bookings[1].is_active());
}

#[test]
fn overlap_policy_refuses_straddling_edit() {
    let config = LedgerConfig {
        conflict_policy: ConflictPolicy::Overlap,
        ..LedgerConfig::default()
    };
    let (engine, _audit) = engine_with(&config);
    engine.send(book("08:00")).unwrap();
    let second = engine.send(book("09:30")).unwrap().bookings[1].id.clone();

    let err = engine
        .send(LedgerAction::EditBooking {
            booking_id: second,
            changes: slotbook::actions::BookingChanges {
                start_time: Some(t("09:00")),
                ..Default::default()
            },
        })
        .unwrap_err();
    assert!(matches!(err.rejection(), Some(LedgerError::Conflict { .. })));
}

#[test]
fn committed_snapshot_survives_json() {
    let (engine, _audit) = engine();
    let booking_id = engine.send(book("08:00")).unwrap().bookings[0].id.clone();
    let snapshot = engine.send(pay(&booking_id, 500)).unwrap();

    let json = snapshot.to_json().unwrap();
    assert!(json.contains("\"paymentStatus\": \"PARTIAL\""));
    assert_eq!(Snapshot::from_json(&json).unwrap(), snapshot);
}

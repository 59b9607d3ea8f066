//! Ledger reconciliation.
//!
//! Transactions can be created, edited and deleted directly. When a linked
//! row changes, the booking's cached `amount_paid` and status follow it, and
//! the payment the row was written with is adjusted or reversed.

use crate::actions::{NewTransaction, TransactionChanges};
use crate::audit;
use crate::environment::LedgerEnvironment;
use crate::error::LedgerError;
use crate::reducer::{Effects, locate, locate_optional};
use crate::types::{BookingId, Money, PaymentStatus, Snapshot, Transaction, TransactionId};
use slotbook_core::effect::Effect;
use slotbook_core::{SmallVec, smallvec};

/// Kind of the anomaly raised when several payments could match a row
pub const AMBIGUOUS_PAYMENT_MATCH: &str = "ambiguous_payment_match";

/// Field checks shared by create and edit
fn validate(category: &str, amount: Money, venue_id: &str) -> Result<(), LedgerError> {
    if category.trim().is_empty() {
        return Err(LedgerError::validation("category is required"));
    }
    if !amount.is_positive() {
        return Err(LedgerError::validation("amount must be greater than zero"));
    }
    if venue_id.trim().is_empty() {
        return Err(LedgerError::validation("venue is required"));
    }
    Ok(())
}

/// The payment a linked transaction stands for.
///
/// Rows written by a capture carry the payment id; it must still be
/// un-reversed and belong to `booking_id`. Rows without one fall back to the
/// first un-reversed payment of the booking with the same amount. When that
/// heuristic has several candidates an anomaly effect is returned alongside.
fn match_payment(
    state: &Snapshot,
    tx: &Transaction,
    booking_id: &BookingId,
) -> (Option<usize>, Option<Effect>) {
    if let Some(payment_id) = &tx.payment_id {
        let found = state
            .payments
            .iter()
            .position(|p| &p.id == payment_id && &p.booking_id == booking_id && !p.is_reversed);
        if found.is_none() {
            tracing::debug!(transaction_id = %tx.id, %payment_id, "Linked payment unavailable");
        }
        return (found, None);
    }

    let candidates: SmallVec<[usize; 2]> = state
        .payments
        .iter()
        .enumerate()
        .filter(|(_, p)| &p.booking_id == booking_id && p.amount == tx.amount && !p.is_reversed)
        .map(|(idx, _)| idx)
        .collect();

    let anomaly = (candidates.len() > 1).then(|| {
        Effect::anomaly(
            AMBIGUOUS_PAYMENT_MATCH,
            format!(
                "{} payments of {} on booking {booking_id} match transaction {}; using the first",
                candidates.len(),
                tx.amount,
                tx.id
            ),
        )
    });
    (candidates.first().copied(), anomaly)
}

/// Shifts a booking's paid amount by `delta`, floored at zero, and
/// re-derives its status.
fn adjust_booking(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    booking_idx: usize,
    delta: Money,
) {
    let booking = &mut state.bookings[booking_idx];
    booking.amount_paid = (booking.amount_paid + delta).max(Money::ZERO);
    booking.payment_status =
        PaymentStatus::after_ledger_adjustment(booking.amount_paid, booking.total_amount);
    booking.updated_at = env.clock.now();
    tracing::debug!(
        booking_id = %booking.id,
        %delta,
        paid = %booking.amount_paid,
        status = %booking.payment_status,
        "Booking reconciled with ledger"
    );
}

/// Enters a free-standing ledger row.
pub(crate) fn create_transaction(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    new: NewTransaction,
) -> Result<Effects, LedgerError> {
    validate(&new.category, new.amount, new.venue_id.as_str())?;

    let tx = Transaction {
        id: TransactionId::new(env.ids.new_id("TX")),
        date: new.date,
        kind: new.kind,
        category: new.category,
        amount: new.amount,
        payment_method: new.payment_method,
        venue_id: new.venue_id,
        notes: new.notes,
        booking_id: None,
        payment_id: None,
    };
    let details = format!("Created {} entry: {} of {}", tx.kind, tx.category, tx.amount);
    state.transactions.push(tx);

    Ok(smallvec![audit::record(state, env, "MANUAL_TRANSACTION", details)])
}

/// Edits a ledger row in place.
///
/// An amount change on a row linked to an existing booking moves the
/// booking's paid amount by the difference and overwrites the matched
/// payment's amount. No match leaves payments alone.
pub(crate) fn edit_transaction(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    transaction_id: &TransactionId,
    changes: TransactionChanges,
) -> Result<Effects, LedgerError> {
    let idx = locate(
        &state.transactions,
        "transaction",
        transaction_id.as_str(),
        |t| t.id.as_str(),
    )?;
    let old = state.transactions[idx].clone();

    let mut next = old.clone();
    if let Some(date) = changes.date {
        next.date = date;
    }
    if let Some(kind) = changes.kind {
        next.kind = kind;
    }
    if let Some(category) = changes.category {
        next.category = category;
    }
    if let Some(amount) = changes.amount {
        next.amount = amount;
    }
    if let Some(method) = changes.payment_method {
        next.payment_method = method;
    }
    if let Some(venue_id) = changes.venue_id {
        next.venue_id = venue_id;
    }
    if let Some(notes) = changes.notes {
        next.notes = notes;
    }
    validate(&next.category, next.amount, next.venue_id.as_str())?;

    let mut effects = Effects::new();

    if let Some(booking_id) = old.booking_id.as_ref().filter(|_| next.amount != old.amount) {
        let booking_idx = locate_optional(&state.bookings, "booking", booking_id.as_str(), |b| {
            b.id.as_str()
        })?;
        if let Some(booking_idx) = booking_idx {
            adjust_booking(state, env, booking_idx, next.amount - old.amount);

            let (payment_idx, anomaly) = match_payment(state, &old, booking_id);
            effects.extend(anomaly);
            if let Some(payment_idx) = payment_idx {
                let payment = &mut state.payments[payment_idx];
                tracing::debug!(payment_id = %payment.id, amount = %next.amount, "Payment amount rewritten");
                payment.amount = next.amount;
            }
        } else {
            tracing::debug!(%booking_id, "Linked booking no longer exists, skipping reconciliation");
        }
    }

    let details = format!("Updated transaction {transaction_id}: {}", next.category);
    state.transactions[idx] = next;

    effects.push(audit::record(state, env, "EDIT_TRANSACTION", details));
    Ok(effects)
}

/// Removes a ledger row, reversing its effect on the linked booking.
///
/// The matched payment is flagged as reversed, never removed.
pub(crate) fn delete_transaction(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    transaction_id: &TransactionId,
    reason: &str,
) -> Result<Effects, LedgerError> {
    if reason.trim().is_empty() {
        return Err(LedgerError::validation("a reason is required to delete a transaction"));
    }

    let idx = locate(
        &state.transactions,
        "transaction",
        transaction_id.as_str(),
        |t| t.id.as_str(),
    )?;
    let tx = state.transactions.remove(idx);

    let mut effects = Effects::new();

    if let Some(booking_id) = &tx.booking_id {
        let booking_idx = locate_optional(&state.bookings, "booking", booking_id.as_str(), |b| {
            b.id.as_str()
        })?;
        if let Some(booking_idx) = booking_idx {
            adjust_booking(state, env, booking_idx, -tx.amount);

            let (payment_idx, anomaly) = match_payment(state, &tx, booking_id);
            effects.extend(anomaly);
            if let Some(payment_idx) = payment_idx {
                let payment = &mut state.payments[payment_idx];
                tracing::debug!(payment_id = %payment.id, "Payment reversed");
                payment.is_reversed = true;
            }
        } else {
            tracing::debug!(%booking_id, "Linked booking no longer exists, skipping reconciliation");
        }
    }

    effects.push(audit::record(
        state,
        env,
        "DELETE_TRANSACTION",
        format!("Deleted transaction {transaction_id}. Reason: {reason}"),
    ));
    Ok(effects)
}

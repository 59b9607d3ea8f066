//! Booking lifecycle: create, edit, cancel, delete.
//!
//! A booking moves `ACTIVE -> CANCELLED` (terminal) or `ACTIVE -> deleted`.
//! Every write recomputes the cached `total_amount` and, on edit, the cached
//! payment status.

use crate::actions::{BookingChanges, DeleteOrigin};
use crate::audit;
use crate::config::ConflictPolicy;
use crate::environment::LedgerEnvironment;
use crate::error::LedgerError;
use crate::reducer::{Effects, locate};
use crate::slots::slot_at;
use crate::types::{
    Booking, BookingId, BookingStatus, ClientId, Money, PaymentMethod, PaymentStatus, Snapshot,
    TimeOfDay, Transaction, TransactionId, TransactionType, VenueId,
};
use chrono::NaiveDate;
use slotbook_core::smallvec;

/// Category of the ledger row written when a paid booking is deleted
pub const DELETION_REVERSAL_CATEGORY: &str = "Booking Deletion Reversal";

/// Id prefix of bookings on `date`: `BK-YYYYMMDD`
#[must_use]
pub fn booking_id_prefix(date: NaiveDate) -> String {
    format!("BK-{}", date.format("%Y%m%d"))
}

/// First ACTIVE booking, other than `exclude`, that collides with the window
/// `[start, end)` at `venue_id` on `date`.
#[must_use]
pub fn find_conflict<'a>(
    bookings: &'a [Booking],
    policy: ConflictPolicy,
    venue_id: &VenueId,
    date: NaiveDate,
    (start, end): (TimeOfDay, TimeOfDay),
    exclude: Option<&BookingId>,
) -> Option<&'a Booking> {
    bookings.iter().find(|b| {
        b.is_active()
            && &b.venue_id == venue_id
            && b.date == date
            && exclude != Some(&b.id)
            && match policy {
                ConflictPolicy::ExactStart => b.start_time == start,
                ConflictPolicy::Overlap => b.start_time < end && start < b.end_time,
            }
    })
}

fn ensure_free(
    state: &Snapshot,
    env: &LedgerEnvironment,
    venue_id: &VenueId,
    date: NaiveDate,
    window: (TimeOfDay, TimeOfDay),
    exclude: Option<&BookingId>,
) -> Result<(), LedgerError> {
    match find_conflict(
        &state.bookings,
        env.conflict_policy,
        venue_id,
        date,
        window,
        exclude,
    ) {
        Some(holder) => Err(LedgerError::Conflict {
            venue_id: venue_id.clone(),
            date,
            start_time: window.0,
            holder: holder.id.to_string(),
        }),
        None => Ok(()),
    }
}

/// Books the slot starting at `start_time`.
pub(crate) fn create(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    client_id: &ClientId,
    venue_id: &VenueId,
    date: NaiveDate,
    start_time: TimeOfDay,
    discount: Money,
) -> Result<Effects, LedgerError> {
    if client_id.is_blank() {
        return Err(LedgerError::validation("missing client"));
    }
    if state.client(client_id).is_none() {
        return Err(LedgerError::not_found("client", client_id));
    }
    let venue = state
        .venue(venue_id)
        .ok_or_else(|| LedgerError::not_found("venue", venue_id))?;

    let Some((_, end_time)) = slot_at(venue, start_time) else {
        return Err(LedgerError::validation(format!(
            "{start_time} is not the start of a slot at venue {venue_id}"
        )));
    };

    let venue_name = venue.name.clone();
    let duration = venue.slot_duration;
    let base_price = venue.base_price;

    ensure_free(state, env, venue_id, date, (start_time, end_time), None)?;

    let now = env.clock.now();
    let booking = Booking {
        id: BookingId::new(env.ids.new_id(&booking_id_prefix(date))),
        client_id: client_id.clone(),
        venue_id: venue_id.clone(),
        date,
        start_time,
        end_time,
        duration,
        base_price,
        discount,
        total_amount: base_price - discount,
        amount_paid: Money::ZERO,
        payment_status: PaymentStatus::Unpaid,
        status: BookingStatus::Active,
        cancellation_reason: None,
        created_at: now,
        updated_at: now,
    };

    tracing::debug!(booking_id = %booking.id, %venue_id, %date, %start_time, "Booking created");
    let details = format!("Created booking {} for venue {venue_name}", booking.id);
    state.bookings.push(booking);

    Ok(smallvec![audit::record(state, env, "CREATE_BOOKING", details)])
}

/// Applies `changes` to a booking, recomputing its total and status.
pub(crate) fn edit(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    booking_id: &BookingId,
    changes: BookingChanges,
) -> Result<Effects, LedgerError> {
    let idx = locate(&state.bookings, "booking", booking_id.as_str(), |b| {
        b.id.as_str()
    })?;
    let mut next = state.bookings[idx].clone();

    if let Some(client_id) = changes.client_id {
        if state.client(&client_id).is_none() {
            return Err(LedgerError::not_found("client", client_id));
        }
        next.client_id = client_id;
    }
    if let Some(venue_id) = changes.venue_id {
        if state.venue(&venue_id).is_none() {
            return Err(LedgerError::not_found("venue", venue_id));
        }
        next.venue_id = venue_id;
    }
    if let Some(date) = changes.date {
        next.date = date;
    }

    let start_moved = changes
        .start_time
        .is_some_and(|start| start != next.start_time);
    if let Some(start) = changes.start_time {
        next.start_time = start;
    }
    if let Some(duration) = changes.duration {
        next.duration = duration;
    }
    match changes.end_time {
        Some(end) => next.end_time = end,
        None if start_moved || changes.duration.is_some() => {
            next.end_time = next.start_time.plus_minutes(next.duration).ok_or_else(|| {
                LedgerError::validation(format!(
                    "booking starting at {} for {} minutes runs past midnight",
                    next.start_time, next.duration
                ))
            })?;
        }
        None => {}
    }
    if next.end_time <= next.start_time {
        return Err(LedgerError::validation(format!(
            "end time {} is not after start time {}",
            next.end_time, next.start_time
        )));
    }

    if let Some(base_price) = changes.base_price {
        next.base_price = base_price;
    }
    if let Some(discount) = changes.discount {
        next.discount = discount;
    }

    ensure_free(
        state,
        env,
        &next.venue_id,
        next.date,
        (next.start_time, next.end_time),
        Some(&next.id),
    )?;

    next.total_amount = next.base_price - next.discount;
    next.payment_status = PaymentStatus::after_booking_edit(next.amount_paid, next.total_amount);
    next.updated_at = env.clock.now();

    tracing::debug!(
        %booking_id,
        total = %next.total_amount,
        status = %next.payment_status,
        "Booking edited"
    );
    state.bookings[idx] = next;

    Ok(smallvec![audit::record(
        state,
        env,
        "EDIT_BOOKING",
        format!("Updated booking {booking_id}")
    )])
}

/// Moves an ACTIVE booking to CANCELLED. Money fields are left alone.
pub(crate) fn cancel(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    booking_id: &BookingId,
    reason: String,
) -> Result<Effects, LedgerError> {
    let idx = locate(&state.bookings, "booking", booking_id.as_str(), |b| {
        b.id.as_str()
    })?;
    let booking = &mut state.bookings[idx];
    if booking.status == BookingStatus::Cancelled {
        return Err(LedgerError::validation(format!(
            "booking {booking_id} is already cancelled"
        )));
    }

    booking.status = BookingStatus::Cancelled;
    booking.updated_at = env.clock.now();
    let details = if reason.trim().is_empty() {
        format!("Cancelled booking {booking_id}")
    } else {
        format!("Cancelled booking {booking_id}. Reason: {reason}")
    };
    booking.cancellation_reason = Some(reason);

    tracing::debug!(%booking_id, "Booking cancelled");
    Ok(smallvec![audit::record(state, env, "CANCEL_BOOKING", details)])
}

/// Removes a booking and all its payments.
///
/// Money already received is reversed with one EXPENSE row dated today.
/// Older ledger rows linked to the booking stay as they are.
pub(crate) fn delete(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    booking_id: &BookingId,
    origin: DeleteOrigin,
) -> Result<Effects, LedgerError> {
    let idx = locate(&state.bookings, "booking", booking_id.as_str(), |b| {
        b.id.as_str()
    })?;
    let booking = state.bookings.remove(idx);
    let reversed = booking.amount_paid;

    if reversed.is_positive() {
        tracing::debug!(%booking_id, amount = %reversed, "Reversing payments of deleted booking");
        state.transactions.push(Transaction {
            id: TransactionId::new(env.ids.new_id("TX")),
            date: env.clock.today(),
            kind: TransactionType::Expense,
            category: DELETION_REVERSAL_CATEGORY.to_string(),
            amount: reversed,
            payment_method: PaymentMethod::Cash,
            venue_id: booking.venue_id.clone(),
            notes: origin.reversal_notes(booking_id),
            booking_id: Some(booking_id.clone()),
            payment_id: None,
        });
    }

    let before = state.payments.len();
    state.payments.retain(|p| &p.booking_id != booking_id);
    tracing::debug!(
        %booking_id,
        payments_removed = before - state.payments.len(),
        "Booking deleted"
    );

    let details = if reversed.is_positive() {
        format!("Permanently removed booking {booking_id}. Reversed {reversed} BDT.")
    } else {
        format!("Permanently removed booking {booking_id}. No payments found.")
    };
    Ok(smallvec![audit::record(
        state,
        env,
        origin.audit_action(),
        details
    )])
}

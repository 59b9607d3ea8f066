//! Payment capture.
//!
//! A capture updates the booking's totals, records a [`Payment`] and writes a
//! linked INCOME [`Transaction`] in one reducer invocation.

use crate::audit;
use crate::environment::LedgerEnvironment;
use crate::error::LedgerError;
use crate::reducer::{Effects, locate};
use crate::types::{
    BookingId, BookingStatus, Money, Payment, PaymentId, PaymentMethod, PaymentStatus, Snapshot,
    Transaction, TransactionId, TransactionType,
};
use chrono::NaiveDate;
use slotbook_core::smallvec;

/// Category of the ledger row written by a capture
pub const BOOKING_PAYMENT_CATEGORY: &str = "Booking Payment";

/// Parameters of one capture.
///
/// Neither `amount` nor `extra_discount` is range-checked. A negative amount
/// is how staff take money back off a booking, and it lowers `amount_paid`
/// like any other capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    /// Booking paid for
    pub booking_id: BookingId,
    /// Amount received
    pub amount: Money,
    /// How it was paid
    pub method: PaymentMethod,
    /// Receipt or wallet reference
    pub reference: String,
    /// Payment date
    pub date: NaiveDate,
    /// Discount granted on top of the booking's discount
    pub extra_discount: Money,
}

impl Capture {
    /// Notes on the linked ledger row:
    /// `Payment for <id>[ - <ref>][ (Includes addtl discount: <n>)]`
    #[must_use]
    pub fn ledger_notes(&self) -> String {
        let mut notes = format!("Payment for {}", self.booking_id);
        if !self.reference.is_empty() {
            notes.push_str(" - ");
            notes.push_str(&self.reference);
        }
        if self.extra_discount.is_positive() {
            notes.push_str(&format!(
                " (Includes addtl discount: {})",
                self.extra_discount
            ));
        }
        notes
    }
}

/// Records a payment against a booking.
///
/// Overpayment, negative amounts and negative discounts all go through.
/// Paying for a CANCELLED booking is refused.
pub(crate) fn capture(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    capture: &Capture,
) -> Result<Effects, LedgerError> {
    let idx = locate(
        &state.bookings,
        "booking",
        capture.booking_id.as_str(),
        |b| b.id.as_str(),
    )?;
    let booking = &mut state.bookings[idx];
    if booking.status == BookingStatus::Cancelled {
        return Err(LedgerError::validation(format!(
            "booking {} is cancelled and cannot take payments",
            capture.booking_id
        )));
    }

    booking.discount += capture.extra_discount;
    booking.total_amount = booking.base_price - booking.discount;
    booking.amount_paid += capture.amount;
    booking.payment_status =
        PaymentStatus::after_payment_capture(booking.amount_paid, booking.total_amount);
    booking.updated_at = env.clock.now();
    let venue_id = booking.venue_id.clone();

    tracing::debug!(
        booking_id = %capture.booking_id,
        amount = %capture.amount,
        paid = %booking.amount_paid,
        status = %booking.payment_status,
        "Payment captured"
    );

    let payment_id = PaymentId::new(env.ids.new_id("PAY"));
    state.payments.push(Payment {
        id: payment_id.clone(),
        booking_id: capture.booking_id.clone(),
        date: capture.date,
        amount: capture.amount,
        method: capture.method,
        reference: capture.reference.clone(),
        created_by: env.actor_id.clone(),
        is_reversed: false,
    });

    state.transactions.push(Transaction {
        id: TransactionId::new(env.ids.new_id("TX")),
        date: capture.date,
        kind: TransactionType::Income,
        category: BOOKING_PAYMENT_CATEGORY.to_string(),
        amount: capture.amount,
        payment_method: capture.method,
        venue_id,
        notes: capture.ledger_notes(),
        booking_id: Some(capture.booking_id.clone()),
        payment_id: Some(payment_id),
    });

    let details = format!(
        "Recorded {} {} payment for booking {}",
        capture.amount, capture.method, capture.booking_id
    );
    Ok(smallvec![audit::record(state, env, "RECORD_PAYMENT", details)])
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::actions::LedgerAction;
    use crate::reducer::LedgerReducer;
    use crate::test_support::{booking_on, date, env, seeded};
    use slotbook_testing::{ReducerTest, assertions};

    fn pay(amount: i64, extra_discount: i64) -> LedgerAction {
        LedgerAction::CapturePayment {
            booking_id: "BK-A".into(),
            amount: Money::new(amount),
            method: PaymentMethod::Bkash,
            reference: "TRX123".into(),
            date: date(),
            extra_discount: Money::new(extra_discount),
        }
    }

    fn with_booking(paid: i64) -> Snapshot {
        let mut state = seeded();
        let mut booking = booking_on("BK-A", "08:00", BookingStatus::Active);
        booking.amount_paid = Money::new(paid);
        state.bookings.push(booking);
        state
    }

    #[test]
    fn partial_capture_writes_payment_and_linked_income() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(with_booking(0))
            .when_action(pay(1200, 0))
            .then_state(|s| {
                let b = &s.bookings[0];
                assert_eq!(b.amount_paid, Money::new(1200));
                assert_eq!(b.payment_status, PaymentStatus::Partial);

                let p = &s.payments[0];
                assert_eq!(p.amount, Money::new(1200));
                assert_eq!(p.method, PaymentMethod::Bkash);
                assert_eq!(p.created_by, "admin-1");
                assert!(!p.is_reversed);

                let tx = &s.transactions[0];
                assert_eq!(tx.kind, TransactionType::Income);
                assert_eq!(tx.category, BOOKING_PAYMENT_CATEGORY);
                assert_eq!(tx.amount, Money::new(1200));
                assert_eq!(tx.payment_method, PaymentMethod::Bkash);
                assert_eq!(tx.venue_id.as_str(), "V1");
                assert_eq!(tx.booking_id.as_ref().map(BookingId::as_str), Some("BK-A"));
                assert_eq!(tx.payment_id.as_ref(), Some(&p.id));
                assert_eq!(tx.notes, "Payment for BK-A - TRX123");
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_audit_effect(effects, "RECORD_PAYMENT");
            })
            .run();
    }

    #[test]
    fn completing_capture_is_paid() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(with_booking(1200))
            .when_action(pay(800, 0))
            .then_state(|s| {
                assert_eq!(s.bookings[0].amount_paid, Money::new(2000));
                assert_eq!(s.bookings[0].payment_status, PaymentStatus::Paid);
            })
            .run();
    }

    #[test]
    fn extra_discount_lowers_total() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(with_booking(0))
            .when_action(pay(1800, 200))
            .then_state(|s| {
                let b = &s.bookings[0];
                assert_eq!(b.discount, Money::new(200));
                assert_eq!(b.total_amount, Money::new(1800));
                assert_eq!(b.payment_status, PaymentStatus::Paid);
                assert_eq!(
                    s.transactions[0].notes,
                    "Payment for BK-A - TRX123 (Includes addtl discount: 200)"
                );
            })
            .run();
    }

    #[test]
    fn overpayment_is_accepted() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(with_booking(0))
            .when_action(pay(2500, 0))
            .then_state(|s| {
                assert_eq!(s.bookings[0].amount_paid, Money::new(2500));
                assert_eq!(s.bookings[0].payment_status, PaymentStatus::Paid);
                assert_eq!(s.bookings[0].outstanding(), Money::new(-500));
            })
            .run();
    }

    #[test]
    fn zero_payment_against_full_discount_is_paid() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(with_booking(0))
            .when_action(pay(0, 2000))
            .then_state(|s| {
                assert_eq!(s.bookings[0].total_amount, Money::ZERO);
                assert_eq!(s.bookings[0].payment_status, PaymentStatus::Paid);
            })
            .run();
    }

    #[test]
    fn cancelled_booking_refuses_payment() {
        let mut state = with_booking(0);
        state.bookings[0].status = BookingStatus::Cancelled;

        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(pay(100, 0))
            .then_error(|err| assert!(matches!(err, LedgerError::Validation(_))))
            .run();
    }

    #[test]
    fn unknown_booking_is_not_found() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(seeded())
            .when_action(pay(100, 0))
            .then_error(|err| assert!(matches!(err, LedgerError::NotFound { .. })))
            .run();
    }

    #[test]
    fn negative_capture_lowers_amount_paid() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(with_booking(0))
            .when_action(pay(-100, 0))
            .then_state(|s| {
                let b = &s.bookings[0];
                assert_eq!(b.amount_paid, Money::new(-100));
                assert_eq!(b.payment_status, PaymentStatus::Unpaid);
                assert_eq!(s.payments[0].amount, Money::new(-100));
                assert_eq!(s.transactions[0].amount, Money::new(-100));
            })
            .then_effects(|effects| assertions::assert_has_audit_effect(effects, "RECORD_PAYMENT"))
            .run();

        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(with_booking(1500))
            .when_action(pay(-500, 0))
            .then_state(|s| {
                assert_eq!(s.bookings[0].amount_paid, Money::new(1000));
                assert_eq!(s.bookings[0].payment_status, PaymentStatus::Partial);
            })
            .run();
    }

    #[test]
    fn negative_extra_discount_raises_total() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(env())
            .given_state(with_booking(2000))
            .when_action(pay(0, -300))
            .then_state(|s| {
                let b = &s.bookings[0];
                assert_eq!(b.discount, Money::new(-300));
                assert_eq!(b.total_amount, Money::new(2300));
                assert_eq!(b.payment_status, PaymentStatus::Partial);
            })
            .run();
    }

    #[test]
    fn notes_without_reference() {
        let capture = Capture {
            booking_id: "BK-A".into(),
            amount: Money::new(10),
            method: PaymentMethod::Cash,
            reference: String::new(),
            date: date(),
            extra_discount: Money::ZERO,
        };
        assert_eq!(capture.ledger_notes(), "Payment for BK-A");
    }
}

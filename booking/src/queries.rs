//! Read-only aggregates over a snapshot.
//!
//! Booking aggregates only count ACTIVE bookings. Ledger aggregates count
//! every transaction in range regardless of whether it is linked.

use crate::error::LedgerError;
use crate::slots::daily_capacity;
use crate::types::{
    Booking, ClientId, Money, PaymentMethod, Snapshot, TransactionType, VenueId,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// An inclusive range of calendar dates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Creates a range from `start` through `end`
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, LedgerError> {
        if end < start {
            return Err(LedgerError::validation(format!(
                "date range ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// A single day
    #[must_use]
    pub const fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// First day
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the range
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, counting both ends
    #[must_use]
    pub fn days(&self) -> u64 {
        u64::try_from((self.end - self.start).num_days()).unwrap_or(0) + 1
    }
}

/// What a client has booked and paid
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    /// ACTIVE bookings
    pub booking_count: usize,
    /// Sum of `amount_paid`
    pub total_spent: Money,
    /// Sum of `total_amount - amount_paid`
    pub total_due: Money,
}

/// How well a venue was used over a date range
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueUtilization {
    /// Venue
    pub venue_id: VenueId,
    /// ACTIVE bookings in range
    pub booked_slots: u64,
    /// Slots offered in range
    pub capacity: u64,
    /// `booked_slots / capacity * 100`, zero when nothing is offered
    pub utilization_percent: f64,
    /// Sum of `amount_paid`
    pub revenue: Money,
    /// Sum of `total_amount - amount_paid`
    pub outstanding: Money,
}

/// Income and expenses over a date range
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    /// Sum of INCOME rows
    pub income: Money,
    /// Sum of EXPENSE rows
    pub expenses: Money,
    /// `income - expenses`
    pub profit: Money,
    /// ACTIVE bookings dated in range
    pub booking_count: usize,
    /// INCOME rows per payment method
    pub income_by_method: BTreeMap<PaymentMethod, Money>,
}

fn active(bookings: &[Booking]) -> impl Iterator<Item = &Booking> {
    bookings.iter().filter(|b| b.is_active())
}

/// Booking count and money owed for one client.
///
/// An unknown client simply has no bookings.
#[must_use]
pub fn client_stats(snapshot: &Snapshot, client_id: &ClientId) -> ClientStats {
    active(&snapshot.bookings)
        .filter(|b| &b.client_id == client_id)
        .fold(ClientStats::default(), |mut stats, b| {
            stats.booking_count += 1;
            stats.total_spent += b.amount_paid;
            stats.total_due += b.outstanding();
            stats
        })
}

/// Utilization of one venue over `range`.
///
/// # Errors
///
/// Returns [`LedgerError::NotFound`] if the venue does not exist.
#[allow(clippy::cast_precision_loss)] // Slot counts are far below 2^52
pub fn venue_utilization(
    snapshot: &Snapshot,
    venue_id: &VenueId,
    range: DateRange,
) -> Result<VenueUtilization, LedgerError> {
    let venue = snapshot
        .venue(venue_id)
        .ok_or_else(|| LedgerError::not_found("venue", venue_id))?;

    let mut booked_slots = 0u64;
    let mut revenue = Money::ZERO;
    let mut outstanding = Money::ZERO;
    for b in active(&snapshot.bookings).filter(|b| &b.venue_id == venue_id && range.contains(b.date)) {
        booked_slots += 1;
        revenue += b.amount_paid;
        outstanding += b.outstanding();
    }

    let capacity = u64::from(daily_capacity(venue)) * range.days();
    let utilization_percent = if capacity == 0 {
        0.0
    } else {
        booked_slots as f64 / capacity as f64 * 100.0
    };

    Ok(VenueUtilization {
        venue_id: venue_id.clone(),
        booked_slots,
        capacity,
        utilization_percent,
        revenue,
        outstanding,
    })
}

/// Income, expenses and profit over `range`
#[must_use]
pub fn financial_summary(snapshot: &Snapshot, range: DateRange) -> FinancialSummary {
    let mut summary = FinancialSummary {
        booking_count: active(&snapshot.bookings)
            .filter(|b| range.contains(b.date))
            .count(),
        ..FinancialSummary::default()
    };

    for tx in snapshot.transactions.iter().filter(|t| range.contains(t.date)) {
        match tx.kind {
            TransactionType::Income => {
                summary.income += tx.amount;
                *summary
                    .income_by_method
                    .entry(tx.payment_method)
                    .or_default() += tx.amount;
            }
            TransactionType::Expense => summary.expenses += tx.amount,
        }
    }
    summary.profit = summary.income - summary.expenses;
    summary
}

/// Sum of non-reversed payments per method.
///
/// Every method is present, with zero when unused.
#[must_use]
pub fn payment_method_split(snapshot: &Snapshot) -> BTreeMap<PaymentMethod, Money> {
    let mut split: BTreeMap<PaymentMethod, Money> =
        PaymentMethod::ALL.into_iter().map(|m| (m, Money::ZERO)).collect();
    for p in snapshot.payments.iter().filter(|p| !p.is_reversed) {
        *split.entry(p.method).or_default() += p.amount;
    }
    split
}

//! Domain types for the booking ledger.
//!
//! Every record here is plain data. The only behaviour attached to the types
//! is arithmetic on [`Money`], parsing of [`TimeOfDay`], and the three
//! payment-status derivation rules on [`PaymentStatus`].
//!
//! Serialized shapes use camelCase field names and SCREAMING_CASE enum values,
//! with timestamps as epoch milliseconds and calendar dates as `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use slotbook_core::snapshot_store::{SnapshotStoreError, Versioned};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is empty (or whitespace only)
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a venue (`V1`, `V-7K2M...`)
    VenueId
);
string_id!(
    /// Unique identifier for a client (`CL-...`)
    ClientId
);
string_id!(
    /// Unique identifier for a booking (`BK-YYYYMMDD-...`)
    BookingId
);
string_id!(
    /// Unique identifier for a payment (`PAY-...`)
    PaymentId
);
string_id!(
    /// Unique identifier for a ledger transaction (`TX-...`)
    TransactionId
);
string_id!(
    /// Unique identifier for an audit row (`LOG-...`)
    AuditLogId
);

/// Money in the smallest currency unit.
///
/// Signed on purpose: nothing in the ledger rejects a discount larger than
/// the base price, so totals can go negative.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` amount
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Returns the raw amount
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Checks if this amount is zero
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checks if this amount is strictly positive
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

/// Minutes in a day
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Error parsing a [`TimeOfDay`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time of day {0:?}: expected HH:MM between 00:00 and 24:00")]
pub struct TimeOfDayError(pub String);

/// A wall-clock time with minute precision, stored as minutes since midnight.
///
/// Serialized as `"HH:MM"`. No timezone is attached. `24:00` is the end of
/// the day, so a venue can close at midnight and a slot can end there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight
    pub const MIDNIGHT: Self = Self(0);

    /// `24:00`
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    /// Creates a time from minutes since midnight
    ///
    /// Returns `None` past `24:00`.
    #[must_use]
    pub const fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes <= MINUTES_PER_DAY {
            Some(Self(minutes))
        } else {
            None
        }
    }

    /// Creates a time from hours and minutes
    #[must_use]
    pub const fn from_hm(hours: u16, minutes: u16) -> Option<Self> {
        if (hours < 24 && minutes < 60) || (hours == 24 && minutes == 0) {
            Some(Self(hours * 60 + minutes))
        } else {
            None
        }
    }

    /// The full hour `hours % 24`
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn on_the_hour(hours: u8) -> Self {
        Self((hours % 24) as u16 * 60)
    }

    /// Minutes since midnight
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    /// The time `minutes` later on the same day, if it is no later than `24:00`
    #[must_use]
    pub const fn plus_minutes(self, minutes: u16) -> Option<Self> {
        match self.0.checked_add(minutes) {
            Some(total) => Self::from_minutes(total),
            None => None,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = TimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimeOfDayError(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hours: u16 = h.parse().map_err(|_| invalid())?;
        let minutes: u16 = m.parse().map_err(|_| invalid())?;
        Self::from_hm(hours, minutes).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeOfDayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

/// Cached payment status of a booking.
///
/// There are three derivation rules, one per mutation path. They agree for
/// positive totals and diverge when `total <= 0`; each path keeps its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Nothing (or nothing positive) paid
    #[default]
    Unpaid,
    /// Paid part of the total
    Partial,
    /// Paid in full
    Paid,
}

impl PaymentStatus {
    /// Status after a booking edit.
    ///
    /// `PAID` requires a positive total; a zero-total booking stays `UNPAID`.
    #[must_use]
    pub fn after_booking_edit(paid: Money, total: Money) -> Self {
        if paid.is_positive() && paid < total {
            Self::Partial
        } else if paid >= total && total.is_positive() {
            Self::Paid
        } else {
            Self::Unpaid
        }
    }

    /// Status after a payment capture.
    ///
    /// Checks `PAID` first, so an overpaid or zero-total booking is `PAID`
    /// even when nothing positive was paid.
    #[must_use]
    pub fn after_payment_capture(paid: Money, total: Money) -> Self {
        if paid >= total {
            Self::Paid
        } else if !paid.is_positive() {
            Self::Unpaid
        } else {
            Self::Partial
        }
    }

    /// Status after a ledger transaction is edited or deleted.
    ///
    /// Like [`PaymentStatus::after_booking_edit`] without the positive-total
    /// guard: `paid == total == 0` is `PAID`.
    #[must_use]
    pub fn after_ledger_adjustment(paid: Money, total: Money) -> Self {
        if paid.is_positive() && paid < total {
            Self::Partial
        } else if paid >= total {
            Self::Paid
        } else {
            Self::Unpaid
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unpaid => "UNPAID",
            Self::Partial => "PARTIAL",
            Self::Paid => "PAID",
        })
    }
}

/// How money changed hands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash at the venue
    #[default]
    Cash,
    /// bKash mobile wallet
    Bkash,
    /// Bank transfer
    Bank,
}

impl PaymentMethod {
    /// All methods in display order
    pub const ALL: [Self; 3] = [Self::Cash, Self::Bkash, Self::Bank];
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cash => "CASH",
            Self::Bkash => "BKASH",
            Self::Bank => "BANK",
        })
    }
}

/// Lifecycle status of a booking
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Holds its slot
    #[default]
    Active,
    /// Terminal; frees the slot, money fields untouched
    Cancelled,
}

/// Direction of a ledger transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money in
    Income,
    /// Money out
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        })
    }
}

/// A rentable venue. Never hard-deleted; deactivated via `active`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// Venue identifier
    pub id: VenueId,
    /// Display name
    pub name: String,
    /// Street address
    pub address: String,
    /// Free-form notes
    pub notes: String,
    /// Whether the venue is offered
    pub active: bool,
    /// First slot starts here
    pub opening_time: TimeOfDay,
    /// No slot may end after this
    pub closing_time: TimeOfDay,
    /// Slot length in minutes
    pub slot_duration: u16,
    /// Price of one slot
    pub base_price: Money,
}

/// A customer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Client identifier
    pub id: ClientId,
    /// Full name
    pub name: String,
    /// Phone number
    pub phone: String,
    /// Email address
    pub email: String,
    /// Postal address
    pub address: String,
    /// Whether the client is active
    pub active: bool,
    /// When the client was registered
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// A reservation of one slot at one venue on one date.
///
/// `total_amount`, `amount_paid` and `payment_status` are cached values kept
/// in sync by every write path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Booking identifier
    pub id: BookingId,
    /// Who booked
    pub client_id: ClientId,
    /// Where
    pub venue_id: VenueId,
    /// Which day
    pub date: NaiveDate,
    /// Slot start
    pub start_time: TimeOfDay,
    /// Slot end
    pub end_time: TimeOfDay,
    /// Length in minutes
    pub duration: u16,
    /// Price before discount
    pub base_price: Money,
    /// Discount granted
    pub discount: Money,
    /// `base_price - discount`
    pub total_amount: Money,
    /// Running total of captured payments
    pub amount_paid: Money,
    /// Cached status derived from `amount_paid` and `total_amount`
    pub payment_status: PaymentStatus,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Why the booking was cancelled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    /// Creation time
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Last modification time
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Whether the booking holds its slot
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }

    /// What is still owed (negative when overpaid)
    #[must_use]
    pub fn outstanding(&self) -> Money {
        self.total_amount - self.amount_paid
    }
}

/// A captured payment against a booking.
///
/// Reversal only flips `is_reversed`; rows are removed only together with
/// their booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Payment identifier
    pub id: PaymentId,
    /// The booking paid for
    pub booking_id: BookingId,
    /// Payment date; also read from epoch milliseconds
    #[serde(deserialize_with = "date_or_epoch_millis")]
    pub date: NaiveDate,
    /// Amount received
    pub amount: Money,
    /// How it was paid
    pub method: PaymentMethod,
    /// Receipt or wallet reference
    pub reference: String,
    /// Who recorded it
    pub created_by: String,
    /// Whether the payment's ledger row was deleted
    pub is_reversed: bool,
}

/// Reads a calendar date given either as `"YYYY-MM-DD"` or as epoch
/// milliseconds, the UTC day of that instant.
fn date_or_epoch_millis<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Date(NaiveDate),
        Millis(i64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Date(date) => Ok(date),
        Raw::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .map(|at| at.date_naive())
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp {ms} out of range"))),
    }
}

/// A row of the financial ledger.
///
/// Rows carrying a `booking_id` are linked to a booking; `payment_id` is set
/// on rows written by a payment capture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction identifier
    pub id: TransactionId,
    /// Ledger date
    pub date: NaiveDate,
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Free-form category
    pub category: String,
    /// Amount (always positive for valid rows)
    pub amount: Money,
    /// How the money moved
    pub payment_method: PaymentMethod,
    /// Venue the money is attributed to
    pub venue_id: VenueId,
    /// Free-form notes
    pub notes: String,
    /// Linked booking, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<BookingId>,
    /// Payment this row was written with, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentId>,
}

/// An immutable audit row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// Row identifier
    pub id: AuditLogId,
    /// When the action was committed
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Acting user
    pub user_id: String,
    /// Machine-readable action label
    pub action: String,
    /// Human-readable details
    pub details: String,
}

/// One bookable window of a venue on a date. Computed, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Window start
    pub start: TimeOfDay,
    /// Window end
    pub end: TimeOfDay,
    /// Venue
    pub venue_id: VenueId,
    /// Date
    pub date: NaiveDate,
    /// The ACTIVE booking holding this window, if any
    pub booking: Option<Booking>,
}

impl Slot {
    /// Whether the slot can still be booked
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.booking.is_none()
    }
}

/// The whole persisted state, loaded and saved as one value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Number of committed actions
    #[serde(default)]
    pub version: u64,
    /// Venues
    #[serde(default)]
    pub venues: Vec<Venue>,
    /// Clients
    #[serde(default)]
    pub clients: Vec<Client>,
    /// Bookings
    #[serde(default)]
    pub bookings: Vec<Booking>,
    /// Payments
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// Ledger transactions
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// Audit trail, oldest first
    #[serde(default)]
    pub audit_logs: Vec<AuditLog>,
}

impl Snapshot {
    /// Finds a venue by id
    #[must_use]
    pub fn venue(&self, id: &VenueId) -> Option<&Venue> {
        self.venues.iter().find(|v| &v.id == id)
    }

    /// Finds a client by id
    #[must_use]
    pub fn client(&self, id: &ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| &c.id == id)
    }

    /// Finds a booking by id
    #[must_use]
    pub fn booking(&self, id: &BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|b| &b.id == id)
    }

    /// Finds a payment by id
    #[must_use]
    pub fn payment(&self, id: &PaymentId) -> Option<&Payment> {
        self.payments.iter().find(|p| &p.id == id)
    }

    /// Finds a transaction by id
    #[must_use]
    pub fn transaction(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| &t.id == id)
    }

    /// All payments recorded against a booking
    pub fn payments_for<'a>(&'a self, booking_id: &'a BookingId) -> impl Iterator<Item = &'a Payment> {
        self.payments.iter().filter(move |p| &p.booking_id == booking_id)
    }

    /// Serializes the snapshot as JSON
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String, SnapshotStoreError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotStoreError::Serialization(e.to_string()))
    }

    /// Parses a snapshot from JSON
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError::Serialization`] if the text is not a
    /// valid snapshot.
    pub fn from_json(json: &str) -> Result<Self, SnapshotStoreError> {
        serde_json::from_str(json).map_err(|e| SnapshotStoreError::Serialization(e.to_string()))
    }
}

impl Versioned for Snapshot {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn m(n: i64) -> Money {
        Money::new(n)
    }

    #[test]
    fn time_of_day_parses_and_formats() {
        let t: TimeOfDay = "08:30".parse().unwrap();
        assert_eq!(t.minutes(), 510);
        assert_eq!(t.to_string(), "08:30");
        assert_eq!("9:05".parse::<TimeOfDay>().unwrap().to_string(), "09:05");
    }

    #[test]
    fn time_of_day_rejects_garbage() {
        for bad in ["24:01", "25:00", "12:60", "1230", "12:5", "ab:cd", "", ":30"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn time_of_day_stays_within_the_day() {
        let late = TimeOfDay::from_hm(23, 0).unwrap();
        assert_eq!(late.plus_minutes(59).map(|t| t.to_string()), Some("23:59".into()));
        assert_eq!(late.plus_minutes(60), Some(TimeOfDay::END_OF_DAY));
        assert_eq!(late.plus_minutes(61), None);
    }

    #[test]
    fn midnight_closing_time() {
        let close: TimeOfDay = "24:00".parse().unwrap();
        assert_eq!(close, TimeOfDay::END_OF_DAY);
        assert_eq!(close.to_string(), "24:00");
        assert!(close > TimeOfDay::from_hm(23, 59).unwrap());
        assert_eq!(TimeOfDay::from_minutes(MINUTES_PER_DAY + 1), None);
        let json = serde_json::to_string(&close).unwrap();
        assert_eq!(json, "\"24:00\"");
        assert_eq!(serde_json::from_str::<TimeOfDay>(&json).unwrap(), close);
    }

    #[test]
    fn rule_a_booking_edit() {
        assert_eq!(PaymentStatus::after_booking_edit(m(0), m(2000)), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::after_booking_edit(m(500), m(2000)), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::after_booking_edit(m(2000), m(2000)), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::after_booking_edit(m(2500), m(2000)), PaymentStatus::Paid);
        // Zero and negative totals are never PAID under this rule
        assert_eq!(PaymentStatus::after_booking_edit(m(0), m(0)), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::after_booking_edit(m(100), m(0)), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::after_booking_edit(m(0), m(-50)), PaymentStatus::Unpaid);
    }

    #[test]
    fn rule_b_payment_capture() {
        assert_eq!(PaymentStatus::after_payment_capture(m(0), m(2000)), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::after_payment_capture(m(1200), m(2000)), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::after_payment_capture(m(2000), m(2000)), PaymentStatus::Paid);
        // PAID is checked first
        assert_eq!(PaymentStatus::after_payment_capture(m(0), m(0)), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::after_payment_capture(m(-10), m(-50)), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::after_payment_capture(m(-10), m(0)), PaymentStatus::Unpaid);
    }

    #[test]
    fn rule_c_ledger_adjustment() {
        assert_eq!(PaymentStatus::after_ledger_adjustment(m(0), m(2000)), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::after_ledger_adjustment(m(1200), m(2000)), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::after_ledger_adjustment(m(2000), m(2000)), PaymentStatus::Paid);
        // No positive-total guard: zero paid against zero total is PAID
        assert_eq!(PaymentStatus::after_ledger_adjustment(m(0), m(0)), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::after_ledger_adjustment(m(100), m(0)), PaymentStatus::Paid);
    }

    #[test]
    fn rules_diverge_only_at_non_positive_totals() {
        let cases = [(m(0), m(0)), (m(5), m(0)), (m(0), m(-1))];
        for (paid, total) in cases {
            assert_ne!(
                PaymentStatus::after_booking_edit(paid, total),
                PaymentStatus::after_ledger_adjustment(paid, total),
                "paid {paid} total {total}"
            );
        }
    }

    #[test]
    fn money_saturates() {
        assert_eq!(Money::new(i64::MAX) + Money::new(1), Money::new(i64::MAX));
        assert_eq!([m(1), m(2), m(3)].into_iter().sum::<Money>(), m(6));
    }

    #[test]
    fn booking_serializes_with_original_field_names() {
        let at = DateTime::from_timestamp_millis(1_735_689_600_000).unwrap();
        let booking = Booking {
            id: "BK-20250101-ABC".into(),
            client_id: "CL-000001".into(),
            venue_id: "V1".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            start_time: "08:00".parse().unwrap(),
            end_time: "09:30".parse().unwrap(),
            duration: 90,
            base_price: m(2000),
            discount: m(0),
            total_amount: m(2000),
            amount_paid: m(0),
            payment_status: PaymentStatus::Unpaid,
            status: BookingStatus::Active,
            cancellation_reason: None,
            created_at: at,
            updated_at: at,
        };

        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["startTime"], "08:00");
        assert_eq!(json["date"], "2025-01-01");
        assert_eq!(json["paymentStatus"], "UNPAID");
        assert_eq!(json["createdAt"], 1_735_689_600_000_i64);
        assert!(json.get("cancellationReason").is_none());
    }

    #[test]
    fn transaction_type_field_is_named_type() {
        let tx = Transaction {
            id: "TX-1".into(),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            kind: TransactionType::Expense,
            category: "Maintenance".into(),
            amount: m(300),
            payment_method: PaymentMethod::Bkash,
            venue_id: "V1".into(),
            notes: String::new(),
            booking_id: None,
            payment_id: None,
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "EXPENSE");
        assert_eq!(json["paymentMethod"], "BKASH");
    }

    #[test]
    fn payment_date_reads_string_or_epoch_millis() {
        let payment = |date: &str| {
            serde_json::from_str::<Payment>(&format!(
                r#"{{"id": "P1", "bookingId": "B1", "date": {date}, "amount": 500,
                    "method": "CASH", "reference": "", "createdBy": "admin-1",
                    "isReversed": false}}"#
            ))
        };
        let expected = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        assert_eq!(payment(r#""2025-01-15""#).unwrap().date, expected);
        // 2025-01-15T13:20:00Z
        let from_millis = payment("1736947200000").unwrap();
        assert_eq!(from_millis.date, expected);
        assert_eq!(serde_json::to_value(&from_millis).unwrap()["date"], "2025-01-15");

        assert!(payment(r#""15/01/2025""#).is_err());
        assert!(payment(&i64::MAX.to_string()).is_err());
    }

    #[test]
    fn snapshot_json_tolerates_missing_collections() {
        let snapshot = Snapshot::from_json(r#"{"venues": []}"#).unwrap();
        assert_eq!(snapshot, Snapshot::default());
        assert!(matches!(
            Snapshot::from_json("not json"),
            Err(SnapshotStoreError::Serialization(_))
        ));
    }
}

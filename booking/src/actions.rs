//! Commands accepted by the ledger reducer.

use crate::types::{
    BookingId, ClientId, Money, PaymentMethod, TimeOfDay, TransactionId, TransactionType, VenueId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fields of a booking that an edit may overwrite.
///
/// `None` leaves the field as it is.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingChanges {
    /// Move to another client
    pub client_id: Option<ClientId>,
    /// Move to another venue
    pub venue_id: Option<VenueId>,
    /// Move to another date
    pub date: Option<NaiveDate>,
    /// Move to another start time
    pub start_time: Option<TimeOfDay>,
    /// Explicit end time
    pub end_time: Option<TimeOfDay>,
    /// Explicit duration in minutes
    pub duration: Option<u16>,
    /// New base price
    pub base_price: Option<Money>,
    /// New discount
    pub discount: Option<Money>,
}

/// A free-standing ledger row entered by staff
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// Ledger date
    pub date: NaiveDate,
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Category (required)
    pub category: String,
    /// Amount (must be positive)
    pub amount: Money,
    /// How the money moved
    pub payment_method: PaymentMethod,
    /// Venue (required)
    pub venue_id: VenueId,
    /// Free-form notes
    pub notes: String,
}

/// Fields of a transaction that an edit may overwrite.
///
/// The booking and payment links cannot be edited.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionChanges {
    /// New date
    pub date: Option<NaiveDate>,
    /// New direction
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    /// New category
    pub category: Option<String>,
    /// New amount
    pub amount: Option<Money>,
    /// New payment method
    pub payment_method: Option<PaymentMethod>,
    /// New venue
    pub venue_id: Option<VenueId>,
    /// New notes
    pub notes: Option<String>,
}

/// A client to register
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    /// Full name (required)
    pub name: String,
    /// Phone number (required)
    pub phone: String,
    /// Email address
    pub email: String,
    /// Postal address
    pub address: String,
}

/// Fields of a client that an update may overwrite
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientChanges {
    /// New name
    pub name: Option<String>,
    /// New phone number
    pub phone: Option<String>,
    /// New email address
    pub email: Option<String>,
    /// New postal address
    pub address: Option<String>,
    /// Activate or deactivate
    pub active: Option<bool>,
}

/// A venue to register
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVenue {
    /// Display name (required)
    pub name: String,
    /// Street address
    pub address: String,
    /// Free-form notes
    pub notes: String,
    /// Opening time
    pub opening_time: TimeOfDay,
    /// Closing time
    pub closing_time: TimeOfDay,
    /// Slot length in minutes (must be positive)
    pub slot_duration: u16,
    /// Price of one slot
    pub base_price: Money,
}

/// Fields of a venue that an update may overwrite
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueChanges {
    /// New name
    pub name: Option<String>,
    /// New address
    pub address: Option<String>,
    /// New notes
    pub notes: Option<String>,
    /// New opening time
    pub opening_time: Option<TimeOfDay>,
    /// New closing time
    pub closing_time: Option<TimeOfDay>,
    /// New slot length
    pub slot_duration: Option<u16>,
    /// New base price
    pub base_price: Option<Money>,
    /// Activate or deactivate
    pub active: Option<bool>,
}

/// The view a booking was deleted from.
///
/// Both views run the same deletion; they differ in audit label and in the
/// notes written on the reversal row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeleteOrigin {
    /// Slot calendar
    #[default]
    Calendar,
    /// Booking list
    BookingList,
}

impl DeleteOrigin {
    /// Audit action label
    #[must_use]
    pub const fn audit_action(self) -> &'static str {
        match self {
            Self::Calendar => "DELETE_BOOKING_CALENDAR",
            Self::BookingList => "DELETE_BOOKING_STRICT",
        }
    }

    /// Notes written on the reversal transaction
    #[must_use]
    pub fn reversal_notes(self, booking_id: &BookingId) -> String {
        match self {
            Self::Calendar => format!("Auto-reversal for deleted booking {booking_id}."),
            Self::BookingList => {
                format!("System-generated reversal for deleted booking {booking_id}.")
            }
        }
    }
}

/// Every mutation of the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerAction {
    /// Book a free slot
    CreateBooking {
        /// Who books
        client_id: ClientId,
        /// Where
        venue_id: VenueId,
        /// Which day
        date: NaiveDate,
        /// Start of one of the venue's slots
        start_time: TimeOfDay,
        /// Discount on the venue's base price
        discount: Money,
    },

    /// Change an existing booking
    EditBooking {
        /// Booking to edit
        booking_id: BookingId,
        /// Fields to overwrite
        changes: BookingChanges,
    },

    /// Cancel an ACTIVE booking, freeing its slot
    CancelBooking {
        /// Booking to cancel
        booking_id: BookingId,
        /// Why
        reason: String,
    },

    /// Remove a booking and its payments, reversing any money received
    DeleteBooking {
        /// Booking to delete
        booking_id: BookingId,
        /// View the deletion came from
        origin: DeleteOrigin,
    },

    /// Record a payment against a booking
    CapturePayment {
        /// Booking paid for
        booking_id: BookingId,
        /// Amount received
        amount: Money,
        /// How it was paid
        method: PaymentMethod,
        /// Receipt or wallet reference
        reference: String,
        /// Payment date
        date: NaiveDate,
        /// Discount granted on top of the booking's discount
        extra_discount: Money,
    },

    /// Enter a free-standing ledger row
    CreateTransaction(NewTransaction),

    /// Change a ledger row, propagating amount changes to its booking
    EditTransaction {
        /// Row to edit
        transaction_id: TransactionId,
        /// Fields to overwrite
        changes: TransactionChanges,
    },

    /// Remove a ledger row, reversing its payment
    DeleteTransaction {
        /// Row to delete
        transaction_id: TransactionId,
        /// Why (required)
        reason: String,
    },

    /// Register a client
    RegisterClient(NewClient),

    /// Update a client's profile
    UpdateClient {
        /// Client to update
        client_id: ClientId,
        /// Fields to overwrite
        changes: ClientChanges,
    },

    /// Register a venue
    RegisterVenue(NewVenue),

    /// Update a venue's profile or hours
    UpdateVenue {
        /// Venue to update
        venue_id: VenueId,
        /// Fields to overwrite
        changes: VenueChanges,
    },

    /// Flip a venue between active and inactive
    ToggleVenueStatus {
        /// Venue to toggle
        venue_id: VenueId,
    },
}

impl LedgerAction {
    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateBooking { .. } => "create_booking",
            Self::EditBooking { .. } => "edit_booking",
            Self::CancelBooking { .. } => "cancel_booking",
            Self::DeleteBooking { .. } => "delete_booking",
            Self::CapturePayment { .. } => "capture_payment",
            Self::CreateTransaction(_) => "create_transaction",
            Self::EditTransaction { .. } => "edit_transaction",
            Self::DeleteTransaction { .. } => "delete_transaction",
            Self::RegisterClient(_) => "register_client",
            Self::UpdateClient { .. } => "update_client",
            Self::RegisterVenue(_) => "register_venue",
            Self::UpdateVenue { .. } => "update_venue",
            Self::ToggleVenueStatus { .. } => "toggle_venue_status",
        }
    }
}

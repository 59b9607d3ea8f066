//! Typed facade over the ledger engine.
//!
//! Each command sends one [`LedgerAction`] through the [`Engine`] and reads
//! the affected records back out of the committed snapshot.

use crate::actions::{
    BookingChanges, ClientChanges, DeleteOrigin, LedgerAction, NewClient, NewTransaction,
    NewVenue, TransactionChanges, VenueChanges,
};
use crate::bookings::DELETION_REVERSAL_CATEGORY;
use crate::error::LedgerError;
use crate::payments::Capture;
use crate::queries::{self, ClientStats, DateRange, FinancialSummary, VenueUtilization};
use crate::reducer::LedgerReducer;
use crate::slots::generate_slots;
use crate::types::{
    AuditLog, Booking, BookingId, Client, ClientId, Money, Payment, PaymentMethod, Slot,
    Snapshot, TimeOfDay, Transaction, TransactionId, Venue, VenueId,
};
use chrono::NaiveDate;
use slotbook_core::snapshot_store::SnapshotStore;
use slotbook_runtime::{Engine, EngineError};
use std::collections::BTreeMap;

/// Errors returned by [`LedgerService`]
pub type ServiceError = EngineError<LedgerError>;

/// Result alias for [`LedgerService`]
pub type ServiceResult<T> = Result<T, ServiceError>;

fn missing(what: &str) -> ServiceError {
    EngineError::Rejected(LedgerError::InvariantViolation(format!(
        "committed snapshot has no {what}"
    )))
}

fn last<T: Clone>(items: &[T], what: &str) -> ServiceResult<T> {
    items.last().cloned().ok_or_else(|| missing(what))
}

/// Booking ledger operations
pub struct LedgerService<St> {
    engine: Engine<LedgerReducer, St>,
}

impl<St> LedgerService<St>
where
    St: SnapshotStore<Snapshot>,
{
    /// Wraps an engine
    #[must_use]
    pub const fn new(engine: Engine<LedgerReducer, St>) -> Self {
        Self { engine }
    }

    /// The underlying engine
    pub const fn engine(&self) -> &Engine<LedgerReducer, St> {
        &self.engine
    }

    /// The current snapshot
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the snapshot cannot be loaded.
    pub fn snapshot(&self) -> ServiceResult<Snapshot> {
        self.engine.state()
    }

    /// Slots of a venue on a date with their ACTIVE bookings
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the venue does not exist.
    pub fn slots(&self, venue_id: &VenueId, date: NaiveDate) -> ServiceResult<Vec<Slot>> {
        self.engine
            .state_with(|s| {
                s.venue(venue_id)
                    .map(|venue| generate_slots(venue, date, &s.bookings))
                    .ok_or_else(|| LedgerError::not_found("venue", venue_id))
            })?
            .map_err(EngineError::Rejected)
    }

    /// Books a free slot
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn create_booking(
        &self,
        client_id: &ClientId,
        venue_id: &VenueId,
        date: NaiveDate,
        start_time: TimeOfDay,
        discount: Money,
    ) -> ServiceResult<Booking> {
        let snapshot = self.engine.send(LedgerAction::CreateBooking {
            client_id: client_id.clone(),
            venue_id: venue_id.clone(),
            date,
            start_time,
            discount,
        })?;
        last(&snapshot.bookings, "booking")
    }

    /// Edits a booking
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn edit_booking(
        &self,
        booking_id: &BookingId,
        changes: BookingChanges,
    ) -> ServiceResult<Booking> {
        let snapshot = self.engine.send(LedgerAction::EditBooking {
            booking_id: booking_id.clone(),
            changes,
        })?;
        snapshot.booking(booking_id).cloned().ok_or_else(|| missing("booking"))
    }

    /// Cancels a booking, freeing its slot
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn cancel_booking(&self, booking_id: &BookingId, reason: &str) -> ServiceResult<Booking> {
        let snapshot = self.engine.send(LedgerAction::CancelBooking {
            booking_id: booking_id.clone(),
            reason: reason.to_string(),
        })?;
        snapshot.booking(booking_id).cloned().ok_or_else(|| missing("booking"))
    }

    /// Deletes a booking and its payments.
    ///
    /// Returns the reversal row when money had been received.
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn delete_booking(
        &self,
        booking_id: &BookingId,
        origin: DeleteOrigin,
    ) -> ServiceResult<Option<Transaction>> {
        let snapshot = self.engine.send(LedgerAction::DeleteBooking {
            booking_id: booking_id.clone(),
            origin,
        })?;
        Ok(snapshot
            .transactions
            .iter()
            .rev()
            .find(|t| {
                t.category == DELETION_REVERSAL_CATEGORY && t.booking_id.as_ref() == Some(booking_id)
            })
            .cloned())
    }

    /// Records a payment.
    ///
    /// Returns the updated booking, the payment and its INCOME row.
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn capture_payment(&self, capture: Capture) -> ServiceResult<(Booking, Payment, Transaction)> {
        let booking_id = capture.booking_id.clone();
        let snapshot = self.engine.send(LedgerAction::CapturePayment {
            booking_id: capture.booking_id,
            amount: capture.amount,
            method: capture.method,
            reference: capture.reference,
            date: capture.date,
            extra_discount: capture.extra_discount,
        })?;
        let booking = snapshot
            .booking(&booking_id)
            .cloned()
            .ok_or_else(|| missing("booking"))?;
        let payment = last(&snapshot.payments, "payment")?;
        let transaction = last(&snapshot.transactions, "transaction")?;
        Ok((booking, payment, transaction))
    }

    /// Enters a free-standing ledger row
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn create_transaction(&self, new: NewTransaction) -> ServiceResult<Transaction> {
        let snapshot = self.engine.send(LedgerAction::CreateTransaction(new))?;
        last(&snapshot.transactions, "transaction")
    }

    /// Edits a ledger row, adjusting its booking when the amount changes
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn edit_transaction(
        &self,
        transaction_id: &TransactionId,
        changes: TransactionChanges,
    ) -> ServiceResult<Transaction> {
        let snapshot = self.engine.send(LedgerAction::EditTransaction {
            transaction_id: transaction_id.clone(),
            changes,
        })?;
        snapshot
            .transaction(transaction_id)
            .cloned()
            .ok_or_else(|| missing("transaction"))
    }

    /// Deletes a ledger row, reversing its payment
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn delete_transaction(&self, transaction_id: &TransactionId, reason: &str) -> ServiceResult<()> {
        self.engine.send(LedgerAction::DeleteTransaction {
            transaction_id: transaction_id.clone(),
            reason: reason.to_string(),
        })?;
        Ok(())
    }

    /// Registers a client
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn register_client(&self, new: NewClient) -> ServiceResult<Client> {
        let snapshot = self.engine.send(LedgerAction::RegisterClient(new))?;
        last(&snapshot.clients, "client")
    }

    /// Updates a client
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn update_client(&self, client_id: &ClientId, changes: ClientChanges) -> ServiceResult<Client> {
        let snapshot = self.engine.send(LedgerAction::UpdateClient {
            client_id: client_id.clone(),
            changes,
        })?;
        snapshot.client(client_id).cloned().ok_or_else(|| missing("client"))
    }

    /// Registers a venue
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn register_venue(&self, new: NewVenue) -> ServiceResult<Venue> {
        let snapshot = self.engine.send(LedgerAction::RegisterVenue(new))?;
        last(&snapshot.venues, "venue")
    }

    /// Updates a venue
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn update_venue(&self, venue_id: &VenueId, changes: VenueChanges) -> ServiceResult<Venue> {
        let snapshot = self.engine.send(LedgerAction::UpdateVenue {
            venue_id: venue_id.clone(),
            changes,
        })?;
        snapshot.venue(venue_id).cloned().ok_or_else(|| missing("venue"))
    }

    /// Activates an inactive venue or deactivates an active one
    ///
    /// # Errors
    ///
    /// Returns the reducer's refusal or a store failure.
    pub fn toggle_venue_status(&self, venue_id: &VenueId) -> ServiceResult<Venue> {
        let snapshot = self.engine.send(LedgerAction::ToggleVenueStatus {
            venue_id: venue_id.clone(),
        })?;
        snapshot.venue(venue_id).cloned().ok_or_else(|| missing("venue"))
    }

    /// See [`queries::client_stats`]
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the snapshot cannot be loaded.
    pub fn client_stats(&self, client_id: &ClientId) -> ServiceResult<ClientStats> {
        self.engine.state_with(|s| queries::client_stats(s, client_id))
    }

    /// See [`queries::venue_utilization`]
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown venue, or a store failure.
    pub fn venue_utilization(
        &self,
        venue_id: &VenueId,
        range: DateRange,
    ) -> ServiceResult<VenueUtilization> {
        self.engine
            .state_with(|s| queries::venue_utilization(s, venue_id, range))?
            .map_err(EngineError::Rejected)
    }

    /// See [`queries::financial_summary`]
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the snapshot cannot be loaded.
    pub fn financial_summary(&self, range: DateRange) -> ServiceResult<FinancialSummary> {
        self.engine.state_with(|s| queries::financial_summary(s, range))
    }

    /// See [`queries::payment_method_split`]
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the snapshot cannot be loaded.
    pub fn payment_method_split(&self) -> ServiceResult<BTreeMap<PaymentMethod, Money>> {
        self.engine.state_with(queries::payment_method_split)
    }

    /// The `limit` most recent audit rows, newest first
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the snapshot cannot be loaded.
    pub fn recent_audit(&self, limit: usize) -> ServiceResult<Vec<AuditLog>> {
        self.engine
            .state_with(|s| s.audit_logs.iter().rev().take(limit).cloned().collect())
    }
}

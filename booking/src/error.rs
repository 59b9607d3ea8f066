//! Errors returned by the ledger reducer.

use crate::types::{TimeOfDay, VenueId};
use chrono::NaiveDate;
use thiserror::Error;

/// Why a ledger action was refused.
///
/// Any error means the snapshot was left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A referenced record does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record (`booking`, `venue`, ...)
        entity: &'static str,
        /// The id that was looked up
        id: String,
    },

    /// The slot is already held by an ACTIVE booking
    #[error("Slot {start_time} on {date} at venue {venue_id} is already held by booking {holder}")]
    Conflict {
        /// Venue of the contested slot
        venue_id: VenueId,
        /// Date of the contested slot
        date: NaiveDate,
        /// Start of the contested slot
        start_time: TimeOfDay,
        /// Booking currently holding it
        holder: String,
    },

    /// The request itself is invalid
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The snapshot is in a state no operation should have produced
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl LedgerError {
    /// Shorthand for [`LedgerError::NotFound`]
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for [`LedgerError::Validation`]
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_record() {
        assert_eq!(
            LedgerError::not_found("booking", "BK-1").to_string(),
            "booking BK-1 not found"
        );
        assert_eq!(
            LedgerError::validation("missing client").to_string(),
            "Validation failed: missing client"
        );
    }
}

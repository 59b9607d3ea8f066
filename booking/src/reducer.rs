//! The ledger reducer.
//!
//! Dispatches each [`LedgerAction`] to the booking lifecycle, the payment
//! protocol, ledger reconciliation or the directory. All of them mutate the
//! snapshot in place and return effect descriptions; a refusal is returned as
//! [`LedgerError`] and the runtime discards the partially mutated snapshot.

use crate::actions::LedgerAction;
use crate::environment::LedgerEnvironment;
use crate::error::LedgerError;
use crate::types::Snapshot;
use crate::{bookings, directory, payments, reconciliation};
use slotbook_core::{SmallVec, effect::Effect, reducer::Reducer};

/// Effects returned by one reducer invocation
pub type Effects = SmallVec<[Effect; 4]>;

/// Reducer for the booking ledger
#[derive(Clone, Copy, Debug, Default)]
pub struct LedgerReducer;

impl LedgerReducer {
    /// Creates a new `LedgerReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for LedgerReducer {
    type State = Snapshot;
    type Action = LedgerAction;
    type Environment = LedgerEnvironment;
    type Error = LedgerError;

    #[tracing::instrument(skip_all, fields(action = action.name()))]
    fn reduce(
        &self,
        state: &mut Snapshot,
        action: LedgerAction,
        env: &LedgerEnvironment,
    ) -> Result<Effects, LedgerError> {
        match action {
            LedgerAction::CreateBooking {
                client_id,
                venue_id,
                date,
                start_time,
                discount,
            } => bookings::create(state, env, &client_id, &venue_id, date, start_time, discount),
            LedgerAction::EditBooking {
                booking_id,
                changes,
            } => bookings::edit(state, env, &booking_id, changes),
            LedgerAction::CancelBooking { booking_id, reason } => {
                bookings::cancel(state, env, &booking_id, reason)
            }
            LedgerAction::DeleteBooking { booking_id, origin } => {
                bookings::delete(state, env, &booking_id, origin)
            }
            LedgerAction::CapturePayment {
                booking_id,
                amount,
                method,
                reference,
                date,
                extra_discount,
            } => payments::capture(
                state,
                env,
                &payments::Capture {
                    booking_id,
                    amount,
                    method,
                    reference,
                    date,
                    extra_discount,
                },
            ),
            LedgerAction::CreateTransaction(new) => {
                reconciliation::create_transaction(state, env, new)
            }
            LedgerAction::EditTransaction {
                transaction_id,
                changes,
            } => reconciliation::edit_transaction(state, env, &transaction_id, changes),
            LedgerAction::DeleteTransaction {
                transaction_id,
                reason,
            } => reconciliation::delete_transaction(state, env, &transaction_id, &reason),
            LedgerAction::RegisterClient(new) => directory::register_client(state, env, new),
            LedgerAction::UpdateClient { client_id, changes } => {
                directory::update_client(state, env, &client_id, changes)
            }
            LedgerAction::RegisterVenue(new) => directory::register_venue(state, env, new),
            LedgerAction::UpdateVenue { venue_id, changes } => {
                directory::update_venue(state, env, &venue_id, changes)
            }
            LedgerAction::ToggleVenueStatus { venue_id } => {
                directory::toggle_venue_status(state, env, &venue_id)
            }
        }
    }
}

/// Position of the single record with the given id.
///
/// Ids must be unique per collection; a duplicate means "the" record is
/// ambiguous and mutating either copy would corrupt the other.
pub(crate) fn locate<T>(
    items: &[T],
    entity: &'static str,
    id: &str,
    id_of: impl Fn(&T) -> &str,
) -> Result<usize, LedgerError> {
    let mut matches = items
        .iter()
        .enumerate()
        .filter(|(_, item)| id_of(item) == id)
        .map(|(idx, _)| idx);

    let Some(first) = matches.next() else {
        return Err(LedgerError::not_found(entity, id));
    };
    if matches.next().is_some() {
        return Err(LedgerError::InvariantViolation(format!(
            "{entity} id {id} is not unique"
        )));
    }
    Ok(first)
}

/// Like [`locate`], but a missing record is `Ok(None)`
pub(crate) fn locate_optional<T>(
    items: &[T],
    entity: &'static str,
    id: &str,
    id_of: impl Fn(&T) -> &str,
) -> Result<Option<usize>, LedgerError> {
    match locate(items, entity, id, id_of) {
        Ok(idx) => Ok(Some(idx)),
        Err(LedgerError::NotFound { .. }) => Ok(None),
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_finds_unique_ids() {
        let ids = ["A", "B", "C"];
        assert_eq!(locate(&ids, "thing", "B", |s| *s), Ok(1));
    }

    #[test]
    fn locate_reports_missing_and_duplicates() {
        let ids = ["A", "B", "A"];
        assert_eq!(
            locate(&ids, "thing", "Z", |s| *s),
            Err(LedgerError::not_found("thing", "Z"))
        );
        assert!(matches!(
            locate(&ids, "thing", "A", |s| *s),
            Err(LedgerError::InvariantViolation(_))
        ));
        assert_eq!(locate_optional(&ids, "thing", "Z", |s| *s), Ok(None));
    }
}

//! Audit trail.
//!
//! Every committed mutation leaves one immutable row in the snapshot and one
//! [`Effect::Audit`] for the runtime's sink.

use crate::environment::LedgerEnvironment;
use crate::types::{AuditLog, AuditLogId, Snapshot};
use slotbook_core::effect::{AuditRecord, Effect};

/// Id prefix of audit rows
pub const AUDIT_ID_PREFIX: &str = "LOG";

/// Appends an audit row attributed to the current actor and returns the
/// matching sink effect.
pub fn record(
    state: &mut Snapshot,
    env: &LedgerEnvironment,
    action: &str,
    details: impl Into<String>,
) -> Effect {
    let details = details.into();
    state.audit_logs.push(AuditLog {
        id: AuditLogId::new(env.ids.new_id(AUDIT_ID_PREFIX)),
        timestamp: env.clock.now(),
        user_id: env.actor_id.clone(),
        action: action.to_string(),
        details: details.clone(),
    });
    Effect::Audit(AuditRecord::new(action, details, env.actor_id.clone()))
}

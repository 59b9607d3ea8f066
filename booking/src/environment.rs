//! Injected dependencies of the ledger reducer.

use crate::config::{ConflictPolicy, LedgerConfig};
use slotbook_core::environment::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
use std::sync::Arc;

/// Environment dependencies for the ledger reducer
#[derive(Clone)]
pub struct LedgerEnvironment {
    /// Clock for timestamps and "today"
    pub clock: Arc<dyn Clock>,
    /// Generator for record ids
    pub ids: Arc<dyn IdGenerator>,
    /// Current user attached to audit rows and payments
    pub actor_id: String,
    /// Scheduling conflict detection
    pub conflict_policy: ConflictPolicy,
}

impl LedgerEnvironment {
    /// Creates a new `LedgerEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, config: &LedgerConfig) -> Self {
        Self {
            clock,
            ids,
            actor_id: config.actor_id.clone(),
            conflict_policy: config.conflict_policy,
        }
    }

    /// Production environment: system clock and random ids
    #[must_use]
    pub fn production(config: &LedgerConfig) -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(RandomIdGenerator), config)
    }

    /// Same environment with a different conflict policy
    #[must_use]
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }
}

impl std::fmt::Debug for LedgerEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerEnvironment")
            .field("actor_id", &self.actor_id)
            .field("conflict_policy", &self.conflict_policy)
            .finish_non_exhaustive()
    }
}

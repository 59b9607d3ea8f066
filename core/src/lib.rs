//! # Slotbook Core
//!
//! Core traits and types shared by every Slotbook crate.
//!
//! The booking ledger is written as a functional core with an imperative
//! shell. Business rules live in reducers that mutate an in-memory snapshot
//! and *describe* their side effects; the runtime loads and persists the
//! snapshot and executes those descriptions.
//!
//! ## Core Concepts
//!
//! - **State**: the whole-snapshot value a reducer mutates
//! - **Action**: a command sent by a caller (create a booking, capture a payment, ...)
//! - **Reducer**: `(State, Action, Environment) → Result<Effects, Error>`
//! - **Effect**: side effect descriptions (audit sink calls, anomaly reports)
//! - **Environment**: injected dependencies (`Clock`, `IdGenerator`)
//! - **Snapshot store**: load/save of the whole state, optionally version-checked
//!
//! ## Example
//!
//! ```ignore
//! use slotbook_core::*;
//!
//! impl Reducer for LedgerReducer {
//!     type State = Snapshot;
//!     type Action = LedgerAction;
//!     type Environment = LedgerEnvironment;
//!     type Error = LedgerError;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Snapshot,
//!         action: LedgerAction,
//!         env: &LedgerEnvironment,
//!     ) -> Result<SmallVec<[Effect; 4]>, LedgerError> {
//!         // Business logic goes here
//!         Ok(SmallVec::new())
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Snapshot store trait and versioning support
pub mod snapshot_store;

/// Reducer module - The core trait for business logic
///
/// Reducers are deterministic functions: `(State, Action, Environment) → (State, Effects)`.
/// Unlike a fire-and-forget reducer, a ledger reducer can refuse an action;
/// the refusal is returned to the caller and the runtime discards the
/// partially mutated state instead of persisting it.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    /// - `Error`: Why an action was refused
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for LedgerReducer {
    ///     type State = Snapshot;
    ///     type Action = LedgerAction;
    ///     type Environment = LedgerEnvironment;
    ///     type Error = LedgerError;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut Snapshot,
    ///         action: LedgerAction,
    ///         env: &LedgerEnvironment,
    ///     ) -> Result<SmallVec<[Effect; 4]>, LedgerError> {
    ///         match action {
    ///             LedgerAction::CancelBooking { booking_id, reason } => {
    ///                 // Business logic here
    ///                 Ok(SmallVec::new())
    ///             }
    ///             _ => Ok(SmallVec::new()),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// The error returned when an action is refused
        type Error;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed after commit
        ///
        /// # Errors
        ///
        /// Returns `Self::Error` when the action is refused. The state may have
        /// been partially mutated and must be discarded by the caller.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Result<SmallVec<[Effect; 4]>, Self::Error>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime once the
/// new snapshot has been saved. They are values, not execution.
pub mod effect {
    use serde::{Deserialize, Serialize};

    /// An entry destined for the audit sink
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AuditRecord {
        /// Machine-readable action label (e.g. `CREATE_BOOKING`)
        pub action: String,
        /// Human-readable details
        pub details: String,
        /// Identity of the user performing the action
        pub actor_id: String,
    }

    impl AuditRecord {
        /// Creates a new audit record
        #[must_use]
        pub fn new(
            action: impl Into<String>,
            details: impl Into<String>,
            actor_id: impl Into<String>,
        ) -> Self {
            Self {
                action: action.into(),
                details: details.into(),
                actor_id: actor_id.into(),
            }
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed by reducers. They are descriptions of what
    /// should happen, returned from reducers and executed by the runtime.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Effect {
        /// Forward an entry to the audit sink
        Audit(AuditRecord),

        /// Something suspicious that did not stop the action
        ///
        /// The runtime logs these as warnings and counts them.
        Anomaly {
            /// Stable identifier of the anomaly class
            kind: String,
            /// Human-readable description
            details: String,
        },
    }

    impl Effect {
        /// Creates an anomaly effect
        #[must_use]
        pub fn anomaly(kind: impl Into<String>, details: impl Into<String>) -> Effect {
            Effect::Anomaly {
                kind: kind.into(),
                details: details.into(),
            }
        }

        /// Returns the audit record carried by this effect, if any
        #[must_use]
        pub const fn as_audit(&self) -> Option<&AuditRecord> {
            match self {
                Effect::Audit(record) => Some(record),
                _ => None,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter (or, for sinks, into the runtime).
pub mod environment {
    use chrono::{DateTime, NaiveDate, Utc};
    use rand::Rng;

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;

        /// Get the current calendar date
        fn today(&self) -> NaiveDate {
            self.now().date_naive()
        }
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Identifier generator
    ///
    /// Ids have the shape `PREFIX-<suffix>`. They must be unique within one
    /// collection; global uniqueness is not required.
    pub trait IdGenerator: Send + Sync {
        /// Generate a new identifier with the given prefix
        fn new_id(&self, prefix: &str) -> String;
    }

    const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

    /// Length of the random suffix produced by [`RandomIdGenerator`]
    pub const RANDOM_SUFFIX_LEN: usize = 9;

    /// Production id generator: nine random base-36 characters
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RandomIdGenerator;

    impl IdGenerator for RandomIdGenerator {
        fn new_id(&self, prefix: &str) -> String {
            let mut rng = rand::thread_rng();
            let suffix: String = (0..RANDOM_SUFFIX_LEN)
                .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
                .collect();
            format!("{prefix}-{suffix}")
        }
    }

    /// Audit sink consumed by the runtime
    ///
    /// Receives one call per committed mutating action.
    pub trait AuditRecorder: Send + Sync {
        /// Record an audit entry
        fn record(&self, action: &str, details: &str, actor_id: &str);
    }
}

#[cfg(test)]
mod tests {
    use super::effect::{AuditRecord, Effect};
    use super::environment::{IdGenerator, RANDOM_SUFFIX_LEN, RandomIdGenerator};

    #[test]
    fn random_ids_have_prefix_and_base36_suffix() {
        let id = RandomIdGenerator.new_id("TX");
        let (prefix, suffix) = id.split_once('-').unwrap_or_default();
        assert_eq!(prefix, "TX");
        assert_eq!(suffix.len(), RANDOM_SUFFIX_LEN);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    proptest::proptest! {
        #[test]
        fn random_ids_keep_any_prefix(prefix in "[A-Z]{1,4}(-[0-9]{8})?") {
            let id = RandomIdGenerator.new_id(&prefix);
            let suffix = id.strip_prefix(&format!("{prefix}-")).unwrap_or_default();
            proptest::prop_assert_eq!(suffix.len(), RANDOM_SUFFIX_LEN);
        }
    }

    #[test]
    fn audit_effect_exposes_record() {
        let effect = Effect::Audit(AuditRecord::new("CREATE_BOOKING", "details", "admin-1"));
        assert_eq!(
            effect.as_audit().map(|r| r.action.as_str()),
            Some("CREATE_BOOKING")
        );
        assert!(Effect::anomaly("odd", "details").as_audit().is_none());
    }
}

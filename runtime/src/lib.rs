//! # Slotbook Runtime
//!
//! Runtime implementation for the Slotbook booking ledger.
//!
//! This crate provides the [`Engine`] that coordinates reducer execution,
//! snapshot persistence and effect handling.
//!
//! ## Core Components
//!
//! - **Engine**: load snapshot → reduce → bump version → save → execute effects
//! - **Snapshot stores**: [`memory::InMemorySnapshotStore`] reference implementation
//! - **Audit sinks**: [`TracingAuditRecorder`] writes audit records to the log
//!
//! Every action is processed synchronously and runs to completion inside one
//! [`Engine::send`] call. A refused action persists nothing.
//!
//! ## Example
//!
//! ```ignore
//! use slotbook_runtime::{Engine, memory::InMemorySnapshotStore};
//!
//! let engine = Engine::new(
//!     LedgerReducer::new(),
//!     environment,
//!     InMemorySnapshotStore::new(Snapshot::default()),
//! );
//!
//! let snapshot = engine.send(LedgerAction::CancelBooking {
//!     booking_id,
//!     reason: "rain".into(),
//! })?;
//! ```

use slotbook_core::{
    effect::Effect,
    environment::AuditRecorder,
    reducer::Reducer,
    snapshot_store::{SnapshotStore, SnapshotStoreError, Versioned},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// In-memory snapshot store
pub mod memory;

/// Prometheus metrics for observability
pub mod metrics;

use metrics::EngineMetrics;

/// Error types for the engine runtime
pub mod error {
    use slotbook_core::snapshot_store::SnapshotStoreError;
    use thiserror::Error;

    /// Errors that can occur while sending an action through the engine
    #[derive(Error, Debug)]
    pub enum EngineError<E> {
        /// The reducer refused the action; nothing was persisted
        #[error("Action rejected: {0}")]
        Rejected(E),

        /// The snapshot could not be loaded or saved
        #[error(transparent)]
        Store(#[from] SnapshotStoreError),
    }

    impl<E> EngineError<E> {
        /// Returns the reducer error if the action was refused
        #[must_use]
        pub const fn rejection(&self) -> Option<&E> {
            match self {
                Self::Rejected(error) => Some(error),
                Self::Store(_) => None,
            }
        }
    }
}

pub use error::EngineError;

/// How the engine persists a new snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcurrencyMode {
    /// Whole-snapshot clobber: the later save silently wins
    #[default]
    LastWriteWins,
    /// Save only if the stored version is the one that was loaded
    CompareAndSwap,
}

impl std::str::FromStr for ConcurrencyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-write-wins" | "lww" => Ok(Self::LastWriteWins),
            "compare-and-swap" | "cas" => Ok(Self::CompareAndSwap),
            other => Err(format!("unknown concurrency mode: {other}")),
        }
    }
}

/// Configuration for the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Persistence mode
    pub concurrency: ConcurrencyMode,
}

impl EngineConfig {
    /// Set the persistence mode
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: ConcurrencyMode) -> Self {
        self.concurrency = concurrency;
        self
    }
}

/// Audit sink that writes every record as a structured log event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditRecorder;

impl AuditRecorder for TracingAuditRecorder {
    fn record(&self, action: &str, details: &str, actor_id: &str) {
        tracing::info!(target: "audit", action, actor_id, details, "audit");
    }
}

/// The engine runtime
///
/// Owns the reducer, its environment and the snapshot store. Each
/// [`Engine::send`] is one read-modify-write cycle over the whole snapshot.
///
/// # Type Parameters
///
/// - `R`: Reducer implementation
/// - `St`: Snapshot store implementation
pub struct Engine<R, St>
where
    R: Reducer,
{
    reducer: R,
    environment: R::Environment,
    store: St,
    audit: Arc<dyn AuditRecorder>,
    config: EngineConfig,
}

impl<R, St> Engine<R, St>
where
    R: Reducer,
    R::State: Versioned,
    R::Error: std::fmt::Display,
    St: SnapshotStore<R::State>,
{
    /// Create a new engine with the default configuration
    ///
    /// Audit records go to [`TracingAuditRecorder`] and saves are
    /// last-write-wins until configured otherwise.
    #[must_use]
    pub fn new(reducer: R, environment: R::Environment, store: St) -> Self {
        Self {
            reducer,
            environment,
            store,
            audit: Arc::new(TracingAuditRecorder),
            config: EngineConfig::default(),
        }
    }

    /// Replace the audit sink
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditRecorder>) -> Self {
        self.audit = audit;
        self
    }

    /// Replace the configuration
    #[must_use]
    pub const fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The injected environment
    pub const fn environment(&self) -> &R::Environment {
        &self.environment
    }

    /// The snapshot store
    pub const fn store(&self) -> &St {
        &self.store
    }

    /// The active configuration
    pub const fn config(&self) -> EngineConfig {
        self.config
    }

    /// Load the current snapshot
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the snapshot cannot be loaded.
    pub fn state(&self) -> Result<R::State, EngineError<R::Error>> {
        Ok(self.store.load()?)
    }

    /// Read the current snapshot via a closure
    ///
    /// ```ignore
    /// let booking_count = engine.state_with(|s| s.bookings.len())?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the snapshot cannot be loaded.
    pub fn state_with<F, T>(&self, f: F) -> Result<T, EngineError<R::Error>>
    where
        F: FnOnce(&R::State) -> T,
    {
        let snapshot = self.store.load()?;
        Ok(f(&snapshot))
    }

    /// Send an action through the engine
    ///
    /// 1. Load the current snapshot
    /// 2. Reduce the action into it
    /// 3. Bump the version and save the snapshot in one write
    /// 4. Execute the returned effects
    ///
    /// Returns the committed snapshot.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Rejected`]: the reducer refused the action; nothing was saved
    /// - [`EngineError::Store`]: load or save failed (including version conflicts
    ///   in compare-and-swap mode)
    #[tracing::instrument(skip(self, action), name = "engine_send")]
    pub fn send(&self, action: R::Action) -> Result<R::State, EngineError<R::Error>> {
        EngineMetrics::record_action();
        tracing::debug!("Processing action");

        let mut snapshot = self.store.load()?;
        let loaded_version = snapshot.version();

        let result = {
            let span = tracing::debug_span!("reducer_execution", loaded_version);
            let _enter = span.enter();

            let start = Instant::now();
            let result = self.reducer.reduce(&mut snapshot, action, &self.environment);
            EngineMetrics::record_reducer_duration(start.elapsed());
            result
        };

        let effects = match result {
            Ok(effects) => effects,
            Err(error) => {
                EngineMetrics::record_rejection();
                tracing::warn!(%error, "Action rejected, snapshot discarded");
                return Err(EngineError::Rejected(error));
            }
        };

        let committed_version = loaded_version + 1;
        snapshot.set_version(committed_version);

        let saved = match self.config.concurrency {
            ConcurrencyMode::LastWriteWins => self.store.save(&snapshot),
            ConcurrencyMode::CompareAndSwap => {
                self.store.save_if_version(&snapshot, loaded_version)
            }
        };
        if let Err(error) = saved {
            if matches!(error, SnapshotStoreError::VersionConflict { .. }) {
                EngineMetrics::record_conflict();
            }
            tracing::error!(%error, "Failed to persist snapshot");
            return Err(error.into());
        }

        EngineMetrics::record_commit();
        tracing::info!(version = committed_version, "Snapshot committed");

        tracing::trace!("Executing {} effects", effects.len());
        for effect in effects {
            self.execute_effect(effect);
        }

        Ok(snapshot)
    }

    fn execute_effect(&self, effect: Effect) {
        match effect {
            Effect::Audit(record) => {
                self.audit
                    .record(&record.action, &record.details, &record.actor_id);
            }
            Effect::Anomaly { kind, details } => {
                EngineMetrics::record_anomaly(&kind);
                tracing::warn!(kind = %kind, details = %details, "Anomaly reported by reducer");
            }
        }
    }
}

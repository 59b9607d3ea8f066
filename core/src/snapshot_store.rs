//! Snapshot store trait and related types.
//!
//! The ledger persists its whole state as one snapshot value. A store exposes
//! exactly two required operations, `load` and `save`; there are no partial
//! writes and no transactions.
//!
//! # Concurrency
//!
//! Plain `save` is last-write-wins: if two actors load the same snapshot,
//! mutate it and save, the later save silently discards the earlier actor's
//! changes. Stores that can compare versions additionally implement
//! [`SnapshotStore::save_if_version`], which the runtime uses when
//! compare-and-swap mode is enabled. Stores that cannot refuse versioned
//! saves with [`SnapshotStoreError::Unsupported`].
//!
//! # Example
//!
//! ```ignore
//! use slotbook_core::snapshot_store::{SnapshotStore, SnapshotStoreError, Versioned};
//!
//! fn bump<S: Versioned, St: SnapshotStore<S>>(store: &St) -> Result<(), SnapshotStoreError> {
//!     let mut snapshot = store.load()?;
//!     let expected = snapshot.version();
//!     snapshot.set_version(expected + 1);
//!     store.save_if_version(&snapshot, expected)
//! }
//! ```

use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during snapshot store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotStoreError {
    /// Optimistic concurrency conflict: the stored snapshot moved on.
    ///
    /// Another actor saved a newer snapshot between our load and our save.
    #[error("Concurrency conflict: expected stored version {expected}, found {actual}")]
    VersionConflict {
        /// The version we loaded and expected to replace.
        expected: u64,
        /// The version currently stored.
        actual: u64,
    },

    /// The backing storage could not be reached or is corrupted.
    #[error("Snapshot storage unavailable: {0}")]
    Unavailable(String),

    /// Serialization/deserialization error.
    #[error("Snapshot serialization error: {0}")]
    Serialization(String),

    /// The store cannot perform the requested operation.
    #[error("Snapshot store does not support {0}")]
    Unsupported(&'static str),
}

/// A state value that carries a monotonically increasing version.
pub trait Versioned {
    /// The version of this snapshot (number of committed actions)
    fn version(&self) -> u64;

    /// Overwrite the version
    fn set_version(&mut self, version: u64);
}

/// Whole-snapshot persistence.
pub trait SnapshotStore<S>: Send + Sync {
    /// Load the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError`] if the storage cannot be read.
    fn load(&self) -> Result<S, SnapshotStoreError>;

    /// Replace the stored snapshot unconditionally (last write wins).
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError`] if the storage cannot be written.
    fn save(&self, snapshot: &S) -> Result<(), SnapshotStoreError>;

    /// Replace the stored snapshot only if its version is still `expected`.
    ///
    /// The default implementation cannot compare versions and writes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotStoreError::VersionConflict`] when the stored
    /// version differs from `expected`, [`SnapshotStoreError::Unsupported`]
    /// from stores without a version check, or any error `save` can return.
    fn save_if_version(&self, snapshot: &S, expected: u64) -> Result<(), SnapshotStoreError> {
        let _ = (snapshot, expected);
        Err(SnapshotStoreError::Unsupported("versioned saves"))
    }
}

impl<S, T> SnapshotStore<S> for Arc<T>
where
    T: SnapshotStore<S> + ?Sized,
{
    fn load(&self) -> Result<S, SnapshotStoreError> {
        (**self).load()
    }

    fn save(&self, snapshot: &S) -> Result<(), SnapshotStoreError> {
        (**self).save(snapshot)
    }

    fn save_if_version(&self, snapshot: &S, expected: u64) -> Result<(), SnapshotStoreError> {
        (**self).save_if_version(snapshot, expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter {
        version: u64,
    }

    impl Versioned for Counter {
        fn version(&self) -> u64 {
            self.version
        }

        fn set_version(&mut self, version: u64) {
            self.version = version;
        }
    }

    struct PlainStore(Mutex<Counter>);

    impl SnapshotStore<Counter> for PlainStore {
        fn load(&self) -> Result<Counter, SnapshotStoreError> {
            self.0
                .lock()
                .map(|c| c.clone())
                .map_err(|e| SnapshotStoreError::Unavailable(e.to_string()))
        }

        fn save(&self, snapshot: &Counter) -> Result<(), SnapshotStoreError> {
            let mut guard = self
                .0
                .lock()
                .map_err(|e| SnapshotStoreError::Unavailable(e.to_string()))?;
            *guard = snapshot.clone();
            Ok(())
        }
    }

    #[test]
    fn plain_store_refuses_versioned_save() {
        let store = PlainStore(Mutex::new(Counter { version: 6 }));
        let mine = Counter { version: 6 };

        assert_eq!(
            store.save_if_version(&mine, 5),
            Err(SnapshotStoreError::Unsupported("versioned saves"))
        );
        assert_eq!(store.load(), Ok(Counter { version: 6 }));

        assert!(store.save(&Counter { version: 7 }).is_ok());
        assert_eq!(store.load(), Ok(Counter { version: 7 }));
    }

    #[test]
    fn arc_store_forwards_the_refusal() {
        let store = Arc::new(PlainStore(Mutex::new(Counter::default())));
        assert!(matches!(
            store.save_if_version(&Counter { version: 1 }, 0),
            Err(SnapshotStoreError::Unsupported(_))
        ));
    }

    #[test]
    fn version_conflict_message() {
        let err = SnapshotStoreError::VersionConflict {
            expected: 3,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "Concurrency conflict: expected stored version 3, found 4"
        );
    }
}

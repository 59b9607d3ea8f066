//! In-memory snapshot store.
//!
//! Holds the snapshot behind a mutex. Suitable for tests, the demo binary and
//! single-process embedding; nothing survives a restart.

use slotbook_core::snapshot_store::{SnapshotStore, SnapshotStoreError, Versioned};
use std::sync::{Mutex, MutexGuard};

/// Snapshot store backed by process memory
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore<S> {
    snapshot: Mutex<S>,
}

impl<S> InMemorySnapshotStore<S> {
    /// Create a store seeded with `initial`
    #[must_use]
    pub const fn new(initial: S) -> Self {
        Self {
            snapshot: Mutex::new(initial),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, S>, SnapshotStoreError> {
        self.snapshot
            .lock()
            .map_err(|e| SnapshotStoreError::Unavailable(format!("snapshot lock poisoned: {e}")))
    }
}

impl<S> SnapshotStore<S> for InMemorySnapshotStore<S>
where
    S: Clone + Versioned + Send,
{
    fn load(&self) -> Result<S, SnapshotStoreError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, snapshot: &S) -> Result<(), SnapshotStoreError> {
        *self.lock()? = snapshot.clone();
        Ok(())
    }

    fn save_if_version(&self, snapshot: &S, expected: u64) -> Result<(), SnapshotStoreError> {
        let mut guard = self.lock()?;
        let actual = guard.version();
        if actual != expected {
            tracing::debug!(expected, actual, "Rejecting stale snapshot save");
            return Err(SnapshotStoreError::VersionConflict { expected, actual });
        }
        *guard = snapshot.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Doc {
        version: u64,
        body: String,
    }

    impl Versioned for Doc {
        fn version(&self) -> u64 {
            self.version
        }

        fn set_version(&mut self, version: u64) {
            self.version = version;
        }
    }

    #[test]
    fn load_returns_a_copy() {
        let store = InMemorySnapshotStore::new(Doc::default());
        let mut copy = store.load().unwrap();
        copy.body.push_str("edited");
        assert_eq!(store.load().unwrap().body, "");
    }

    #[test]
    fn save_replaces_whole_snapshot() {
        let store = InMemorySnapshotStore::new(Doc::default());
        store
            .save(&Doc {
                version: 9,
                body: "new".into(),
            })
            .unwrap();
        assert_eq!(store.load().unwrap().version, 9);
    }

    #[test]
    fn save_if_version_checks_stored_version() {
        let store = InMemorySnapshotStore::new(Doc {
            version: 2,
            body: String::new(),
        });
        let next = Doc {
            version: 3,
            body: "x".into(),
        };

        assert_eq!(
            store.save_if_version(&next, 1),
            Err(SnapshotStoreError::VersionConflict {
                expected: 1,
                actual: 2
            })
        );
        assert!(store.save_if_version(&next, 2).is_ok());
        assert_eq!(store.load().unwrap(), next);
    }

    #[test]
    fn shared_through_arc() {
        let store = Arc::new(InMemorySnapshotStore::new(Doc::default()));
        let other = Arc::clone(&store);
        other
            .save(&Doc {
                version: 1,
                body: "shared".into(),
            })
            .unwrap();
        assert_eq!(store.load().unwrap().body, "shared");
    }
}

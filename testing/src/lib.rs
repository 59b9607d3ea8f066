//! # Slotbook Testing
//!
//! Testing utilities and helpers for the Slotbook booking ledger.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Property-based testing strategies
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use slotbook_testing::{ReducerTest, SequentialIdGenerator, test_clock};
//!
//! #[test]
//! fn cancel_keeps_payments() {
//!     ReducerTest::new(LedgerReducer::new())
//!         .with_env(test_environment())
//!         .given_state(seeded_snapshot())
//!         .when_action(LedgerAction::CancelBooking {
//!             booking_id: "BK-1".into(),
//!             reason: "rain".into(),
//!         })
//!         .then_state(|s| assert_eq!(s.payments.len(), 1))
//!         .run();
//! }
//! ```

use chrono::{DateTime, Utc};
use slotbook_core::effect::AuditRecord;
use slotbook_core::environment::{AuditRecorder, Clock, IdGenerator};


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations for testing.
pub mod mocks {
    use super::{AuditRecord, AuditRecorder, Clock, DateTime, IdGenerator, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use slotbook_testing::mocks::FixedClock;
    /// use slotbook_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable ids: `PREFIX-000001`, `PREFIX-000002`, ...
    ///
    /// The counter is shared across prefixes.
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator starting at 1
        #[must_use]
        pub const fn new() -> Self {
            Self {
                next: AtomicU64::new(0),
            }
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn new_id(&self, prefix: &str) -> String {
            let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
            format!("{prefix}-{n:06}")
        }
    }

    /// Audit sink that keeps every record in memory
    #[derive(Debug, Default)]
    pub struct RecordingAuditRecorder {
        records: Mutex<Vec<AuditRecord>>,
    }

    impl RecordingAuditRecorder {
        /// Create an empty recorder
        #[must_use]
        pub const fn new() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
            }
        }

        /// Everything recorded so far, oldest first
        #[must_use]
        pub fn records(&self) -> Vec<AuditRecord> {
            self.records
                .lock()
                .map(|records| records.clone())
                .unwrap_or_default()
        }
    }

    impl AuditRecorder for RecordingAuditRecorder {
        fn record(&self, action: &str, details: &str, actor_id: &str) {
            if let Ok(mut records) = self.records.lock() {
                records.push(AuditRecord::new(action, details, actor_id));
            }
        }
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Minutes since midnight, `00:00` through `23:59`
    pub fn minute_of_day() -> impl Strategy<Value = u16> {
        0u16..1440
    }

    /// A plausible slot length in minutes
    pub fn slot_duration() -> impl Strategy<Value = u16> {
        prop_oneof![Just(30u16), Just(45), Just(60), Just(90), Just(120), 1u16..=240]
    }

    /// Whole-currency amounts, including zero
    pub fn money() -> impl Strategy<Value = i64> {
        0i64..=100_000
    }

    /// An opening window `(open, close)` with `open < close`
    pub fn opening_window() -> impl Strategy<Value = (u16, u16)> {
        (0u16..1439).prop_flat_map(|open| (Just(open), (open + 1)..=1439))
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, RecordingAuditRecorder, SequentialIdGenerator, test_clock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(clock.today().to_string(), "2025-01-01");
    }

    #[test]
    fn sequential_ids_count_across_prefixes() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.new_id("TX"), "TX-000001");
        assert_eq!(ids.new_id("PAY"), "PAY-000002");
        assert_eq!(ids.new_id("BK-20250101"), "BK-20250101-000003");
    }

    #[test]
    fn recording_audit_keeps_order() {
        let audit = RecordingAuditRecorder::new();
        audit.record("A", "first", "u1");
        audit.record("B", "second", "u1");
        let actions: Vec<_> = audit.records().into_iter().map(|r| r.action).collect();
        assert_eq!(actions, vec!["A", "B"]);
    }
}

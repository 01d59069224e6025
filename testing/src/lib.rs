//! # Gatepass Testing
//!
//! Testing utilities and helpers for Gatepass crates.
//!
//! This crate provides:
//! - Deterministic implementations of the `gatepass-core` environment traits
//! - Property-based testing strategies for identifiers
//! - A one-line tracing initialiser for tests
//!
//! ## Example
//!
//! ```
//! use gatepass_testing::{test_clock, SequentialIdGenerator};
//! use gatepass_core::environment::{Clock, IdGenerator};
//!
//! let clock = test_clock();
//! let ids = SequentialIdGenerator::new();
//!
//! assert_eq!(clock.now(), clock.now());
//! assert_ne!(ids.next_id(), ids.next_id());
//! ```

use chrono::{DateTime, Duration, Utc};
use gatepass_core::environment::{Clock, IdGenerator};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Duration, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use gatepass_testing::mocks::FixedClock;
    /// use gatepass_core::environment::Clock;
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

    /// Clock that only moves when told to.
    ///
    /// Clones share the same underlying instant, so a test can hand one clone
    /// to the service under test and advance the other.
    ///
    /// ```
    /// use gatepass_testing::mocks::MockClock;
    /// use gatepass_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = MockClock::new(Utc::now());
    /// let start = clock.now();
    /// clock.advance(Duration::minutes(5));
    /// assert_eq!(clock.now() - start, Duration::minutes(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct MockClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl MockClock {
        /// Create a clock frozen at `time`.
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward (or backward, for a negative duration).
        pub fn advance(&self, by: Duration) {
            if let Ok(mut time) = self.time.lock() {
                *time += by;
            }
        }

        /// Jump to an absolute instant.
        pub fn set(&self, to: DateTime<Utc>) {
            if let Ok(mut time) = self.time.lock() {
                *time = to;
            }
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
                .lock()
                .map_or_else(|poisoned| *poisoned.into_inner(), |time| *time)
        }
    }

    /// Predictable identifier generator.
    ///
    /// Yields `00000000-0000-0000-0000-000000000001`, `...0002`, and so on.
    /// Clones share the counter.
    #[derive(Debug, Clone, Default)]
    pub struct SequentialIdGenerator {
        next: Arc<AtomicU64>,
    }

    impl SequentialIdGenerator {
        /// Start counting from 1.
        #[must_use]
        pub fn new() -> Self {
            Self::starting_at(1)
        }

        /// Start counting from `first`.
        #[must_use]
        pub fn starting_at(first: u64) -> Self {
            Self {
                next: Arc::new(AtomicU64::new(first)),
            }
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> Uuid {
            let n = self.next.fetch_add(1, Ordering::SeqCst);
            Uuid::from_u128(u128::from(n))
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_epoch())
    }

    /// 2025-01-01 00:00:00 UTC.
    #[must_use]
    pub fn test_epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default()
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;
    use uuid::Uuid;

    /// Strategy producing arbitrary non-nil UUIDs.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        (1..=u128::MAX).prop_map(Uuid::from_u128)
    }
}

/// Install a `fmt` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
/// Honours `RUST_LOG`, defaulting to `warn`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, MockClock, SequentialIdGenerator, test_clock, test_epoch};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_mock_clock_shared_between_clones() {
        let clock = MockClock::new(test_epoch());
        let handle = clock.clone();

        handle.advance(Duration::hours(2));
        assert_eq!(clock.now(), test_epoch() + Duration::hours(2));

        handle.set(test_epoch());
        assert_eq!(clock.now(), test_epoch());
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new();
        let other = ids.clone();

        assert_eq!(ids.next_id().as_u128(), 1);
        assert_eq!(other.next_id().as_u128(), 2);
        assert_eq!(SequentialIdGenerator::starting_at(40).next_id().as_u128(), 40);
    }
}

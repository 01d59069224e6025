//! Dependency injection traits for time and identity.
//!
//! All external sources of non-determinism are abstracted behind traits and
//! injected via the environment of the service that uses them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use gatepass_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let t1 = clock.now();
/// let t2 = clock.now();
/// assert!(t2 >= t1);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of globally unique 128-bit identifiers.
pub trait IdGenerator: Send + Sync {
    /// Produce an identifier that has not been handed out before.
    fn next_id(&self) -> Uuid;
}

/// Random (v4) UUID generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn test_random_ids_are_distinct() {
        let ids = RandomIdGenerator;
        let generated: HashSet<Uuid> = (0..256).map(|_| ids.next_id()).collect();
        assert_eq!(generated.len(), 256);
    }

    #[test]
    fn test_traits_are_object_safe() {
        let clock: Box<dyn Clock> = Box::new(SystemClock);
        let ids: Box<dyn IdGenerator> = Box::new(RandomIdGenerator);
        assert!(clock.now().timestamp() > 0);
        assert_eq!(ids.next_id().get_version_num(), 4);
    }
}

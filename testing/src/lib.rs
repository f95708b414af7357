//! # Fetchstate Testing
//!
//! Testing utilities and mock capabilities for the fetchstate crates.
//!
//! This crate provides:
//! - [`ScriptedTransport`]: a transport whose replies are scripted ahead of
//!   time, including replies held pending to exercise the in-flight guard
//! - [`RecordingHost`]: a host that records every dispatched event
//! - [`FixedClock`] / [`test_clock`]: deterministic time
//!
//! ## Example
//!
//! ```ignore
//! use fetchstate_testing::{test_clock, ScriptedTransport};
//! use serde_json::json;
//!
//! let transport = Arc::new(ScriptedTransport::new());
//! let held = transport.hold();
//!
//! let requests = RequestSet::with_clock(transport, definitions, vec![], Arc::new(test_clock()));
//! let store = FetchStore::new(requests);
//!
//! let first = store.fetch("users", vec![])?;   // admitted
//! let second = store.fetch("users", vec![])?;  // suppressed - still in flight
//! held.succeed(json!(["a", "b"]));
//! ```

use chrono::{DateTime, Utc};
use fetchstate_core::environment::Clock;

/// The scripted transport and its reply handles
pub mod transport;

/// The event-recording host
pub mod host;

/// Mock implementations of capability traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making `fetched_at` assertions
    /// reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use fetchstate_testing::mocks::FixedClock;
    /// use fetchstate_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
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
}

// Re-export commonly used items
pub use host::RecordingHost;
pub use mocks::{FixedClock, test_clock};
pub use transport::{HeldReply, RecordedCall, ScriptedTransport, TestDefaults, TestError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }
}

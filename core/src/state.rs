//! Per-resource lifecycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The tracked lifecycle of one resource key.
///
/// One instance exists per declared resource, owned exclusively by that
/// resource's [`ResourceReducer`](crate::reducer::ResourceReducer). The four
/// conceptual lifecycle states (idle, fetching, succeeded, failed) are
/// represented by `is_fetching` plus the presence of `data`/`error` rather
/// than as a distinct enumeration, so callers can inspect partial results
/// (e.g. stale data during a refetch) directly.
///
/// `D` is the stored payload type. Its [`Default`] value is the "nothing
/// fetched yet" representation - typically an empty `Vec`. `E` is the error
/// payload type, stored verbatim as the transport produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState<D, E> {
    /// True strictly between a start event and the next end/error event
    pub is_fetching: bool,

    /// Last successfully mapped payload; `D::default()` until the first success
    pub data: D,

    /// Last error payload; cleared only by a successful completion
    pub error: Option<E>,

    /// When the last successful completion landed; never set by failures
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<D, E> ResourceState<D, E> {
    /// Whether the last settled fetch for this resource failed
    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether this resource has ever completed successfully
    #[must_use]
    pub const fn has_fetched(&self) -> bool {
        self.fetched_at.is_some()
    }
}

impl<D: Default, E> Default for ResourceState<D, E> {
    fn default() -> Self {
        Self {
            is_fetching: false,
            data: D::default(),
            error: None,
            fetched_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle_and_empty() {
        let state: ResourceState<Vec<String>, String> = ResourceState::default();
        assert!(!state.is_fetching);
        assert!(state.data.is_empty());
        assert!(!state.has_error());
        assert!(!state.has_fetched());
    }
}

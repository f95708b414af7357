//! Lifecycle events - the immutable transition records reducers fold over.
//!
//! Every event is tagged with the [`ResourceKey`] it targets. Reducers for
//! other keys must treat the event as a no-op, so a single event stream can
//! be fanned out to every reducer without cross-talk.

use crate::key::ResourceKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A state transition request for one resource's fetch lifecycle.
///
/// Events are produced by [`FetchTrigger`](crate::trigger::FetchTrigger)s and
/// consumed by [`ResourceReducer`](crate::reducer::ResourceReducer)s; nothing
/// else in the system writes state.
///
/// # Example
///
/// ```
/// use fetchstate_core::FetchEvent;
///
/// let event: FetchEvent<Vec<String>, String> = FetchEvent::started("users");
/// assert_eq!(event.key().as_str(), "users");
/// assert!(event.is_started());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FetchEvent<D, E> {
    /// A fetch for this resource was admitted by the guard and is now in flight
    Started {
        /// Resource the event targets
        key: ResourceKey,
    },

    /// The in-flight fetch resolved successfully
    Completed {
        /// Resource the event targets
        key: ResourceKey,
        /// Mapped payload to store
        data: D,
        /// When the success was observed
        fetched_at: DateTime<Utc>,
    },

    /// The in-flight fetch resolved with a transport failure
    Failed {
        /// Resource the event targets
        key: ResourceKey,
        /// Error payload, stored verbatim
        error: E,
    },
}

impl<D, E> FetchEvent<D, E> {
    /// Build a start event for `key`
    pub fn started(key: impl Into<ResourceKey>) -> Self {
        Self::Started { key: key.into() }
    }

    /// Build a success event carrying the mapped payload and its timestamp
    pub fn completed(key: impl Into<ResourceKey>, data: D, fetched_at: DateTime<Utc>) -> Self {
        Self::Completed {
            key: key.into(),
            data,
            fetched_at,
        }
    }

    /// Build a failure event carrying the error payload
    pub fn failed(key: impl Into<ResourceKey>, error: E) -> Self {
        Self::Failed {
            key: key.into(),
            error,
        }
    }

    /// The resource this event targets
    #[must_use]
    pub const fn key(&self) -> &ResourceKey {
        match self {
            Self::Started { key }
            | Self::Completed { key, .. }
            | Self::Failed { key, .. } => key,
        }
    }

    /// Whether this is a start event
    #[must_use]
    pub const fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }

    /// Whether this is a success event
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    /// Whether this is a failure event
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

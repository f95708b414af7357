//! A recording host for observing what a trigger dispatches.

use fetchstate_core::{FetchEvent, FetchHost, ResourceKey, ResourceReducer, ResourceState};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

/// A [`FetchHost`] that records every dispatched event.
///
/// Events are also applied through the canonical lifecycle reducer, so a
/// trigger driven against this host observes realistic state (a second call
/// after `Started` sees the in-flight flag). Per-key states can be
/// pre-seeded to put the host in any starting position.
///
/// # Example
///
/// ```
/// use fetchstate_testing::RecordingHost;
/// use fetchstate_core::ResourceState;
///
/// let host: RecordingHost<Vec<String>, String> = RecordingHost::new()
///     .with_state("users", ResourceState { is_fetching: true, ..ResourceState::default() });
/// assert!(host.events().is_empty());
/// ```
#[derive(Debug)]
pub struct RecordingHost<D, E> {
    states: RwLock<HashMap<ResourceKey, ResourceState<D, E>>>,
    events: Mutex<Vec<FetchEvent<D, E>>>,
}

impl<D, E> RecordingHost<D, E> {
    /// Start with no states and no recorded events
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Seed the state slot for `key`
    #[must_use]
    pub fn with_state(self, key: impl Into<ResourceKey>, state: ResourceState<D, E>) -> Self {
        self.states
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), state);
        self
    }

    /// Every event dispatched so far, in dispatch order
    #[must_use]
    pub fn events(&self) -> Vec<FetchEvent<D, E>>
    where
        D: Clone,
        E: Clone,
    {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<D, E> Default for RecordingHost<D, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, E> FetchHost<D, E> for RecordingHost<D, E>
where
    D: Clone + Default + Send + Sync,
    E: Clone + Send + Sync,
{
    fn dispatch(&self, event: FetchEvent<D, E>) {
        {
            let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
            let reducer = ResourceReducer::new(event.key().clone());
            let next = reducer.reduce(states.get(event.key()), &event);
            states.insert(event.key().clone(), next);
        }
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    fn resource(&self, key: &ResourceKey) -> Option<ResourceState<D, E>> {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

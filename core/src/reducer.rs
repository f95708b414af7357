//! The lifecycle reducer - pure transitions over one resource's state.

use crate::event::FetchEvent;
use crate::key::ResourceKey;
use crate::state::ResourceState;

/// Pure state-transition function for one resource key.
///
/// The three transition handlers are fixed; a reducer is configured by
/// nothing but the key it owns. Events tagged with any other key leave the
/// state untouched, so every reducer in a registry can safely observe the
/// full event stream.
///
/// The transitions are deliberately asymmetric, reproducing the contract of
/// the state machine:
///
/// - `Started` merges: it sets the in-flight flag and preserves everything
///   else, including a stale `error` from the previous attempt.
/// - `Completed` replaces: the produced state carries only the new payload
///   and timestamp, dropping any prior `error`.
/// - `Failed` merges: it stores the error and keeps the previously fetched
///   `data` available to callers.
///
/// # Example
///
/// ```
/// use fetchstate_core::{FetchEvent, ResourceReducer, ResourceState};
///
/// let reducer = ResourceReducer::new("users");
/// let event: FetchEvent<Vec<String>, String> = FetchEvent::started("users");
///
/// let state = reducer.reduce(None, &event);
/// assert!(state.is_fetching);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReducer {
    key: ResourceKey,
}

impl ResourceReducer {
    /// Build the reducer owning `key`
    pub fn new(key: impl Into<ResourceKey>) -> Self {
        Self { key: key.into() }
    }

    /// The resource key this reducer owns
    #[must_use]
    pub const fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Fold one event into the next state.
    ///
    /// `state` is `None` when no event has ever targeted this resource; the
    /// default initial state is materialized in that case. Never fails and
    /// has no side effects.
    pub fn reduce<D, E>(
        &self,
        state: Option<&ResourceState<D, E>>,
        event: &FetchEvent<D, E>,
    ) -> ResourceState<D, E>
    where
        D: Clone + Default,
        E: Clone,
    {
        if event.key() != &self.key {
            return state.cloned().unwrap_or_default();
        }

        match event {
            FetchEvent::Started { .. } => {
                let mut next = state.cloned().unwrap_or_default();
                next.is_fetching = true;
                next
            },
            FetchEvent::Completed {
                data, fetched_at, ..
            } => ResourceState {
                is_fetching: false,
                data: data.clone(),
                error: None,
                fetched_at: Some(*fetched_at),
            },
            FetchEvent::Failed { error, .. } => {
                let mut next = state.cloned().unwrap_or_default();
                next.error = Some(error.clone());
                // The guard re-admits this key only once the flag drops, so a
                // failure must always clear it.
                next.is_fetching = false;
                next
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    type State = ResourceState<Vec<String>, String>;
    type Event = FetchEvent<Vec<String>, String>;

    #[allow(clippy::unwrap_used)]
    fn fetched_at() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn unset_state_materializes_the_default() {
        let reducer = ResourceReducer::new("users");
        let event: Event = FetchEvent::started("posts");

        let state = reducer.reduce(None, &event);

        assert_eq!(state, State::default());
    }

    #[test]
    fn mismatched_key_returns_state_unchanged() {
        let reducer = ResourceReducer::new("users");
        let state = State {
            is_fetching: true,
            data: vec!["kept".to_string()],
            error: Some("stale".to_string()),
            fetched_at: Some(fetched_at()),
        };

        let event: Event = FetchEvent::completed("posts", vec!["other".to_string()], fetched_at());
        assert_eq!(reducer.reduce(Some(&state), &event), state);
    }

    #[test]
    fn started_raises_the_flag_and_preserves_fields() {
        let reducer = ResourceReducer::new("users");
        let state = State {
            is_fetching: false,
            data: vec!["old".to_string()],
            error: None,
            fetched_at: Some(fetched_at()),
        };

        let next = reducer.reduce(Some(&state), &FetchEvent::started("users"));

        assert!(next.is_fetching);
        assert_eq!(next.data, state.data);
        assert_eq!(next.fetched_at, state.fetched_at);
    }

    #[test]
    fn started_preserves_prior_error() {
        // A refetch after a failure keeps the stale error visible until the
        // new attempt settles.
        let reducer = ResourceReducer::new("users");
        let state = State {
            error: Some("boom".to_string()),
            ..State::default()
        };

        let next = reducer.reduce(Some(&state), &FetchEvent::started("users"));

        assert!(next.is_fetching);
        assert_eq!(next.error, Some("boom".to_string()));
    }

    #[test]
    fn completed_replaces_state_and_drops_error() {
        let reducer = ResourceReducer::new("users");
        let state = State {
            is_fetching: true,
            data: vec!["old".to_string()],
            error: Some("boom".to_string()),
            fetched_at: None,
        };

        let event = FetchEvent::completed("users", vec!["new".to_string()], fetched_at());
        let next = reducer.reduce(Some(&state), &event);

        assert!(!next.is_fetching);
        assert_eq!(next.data, vec!["new".to_string()]);
        assert_eq!(next.error, None);
        assert_eq!(next.fetched_at, Some(fetched_at()));
    }

    #[test]
    fn failed_stores_error_and_keeps_data() {
        let reducer = ResourceReducer::new("users");
        let state = State {
            is_fetching: true,
            data: vec!["kept".to_string()],
            error: None,
            fetched_at: Some(fetched_at()),
        };

        let event: Event = FetchEvent::failed("users", "boom".to_string());
        let next = reducer.reduce(Some(&state), &event);

        assert_eq!(next.error, Some("boom".to_string()));
        assert_eq!(next.data, vec!["kept".to_string()]);
        assert_eq!(next.fetched_at, Some(fetched_at()));
    }

    #[test]
    fn failed_clears_in_flight_guard() {
        let reducer = ResourceReducer::new("users");
        let state = State {
            is_fetching: true,
            ..State::default()
        };

        let event: Event = FetchEvent::failed("users", "boom".to_string());
        let next = reducer.reduce(Some(&state), &event);

        assert!(!next.is_fetching, "a failed fetch must release the guard");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn foreign_events_never_change_state(
                own_key in "[a-z]{1,8}",
                event_key in "[a-z]{1,8}",
                is_fetching in any::<bool>(),
                data in proptest::collection::vec("[a-z]{0,6}", 0..4),
                error in proptest::option::of("[a-z]{0,6}"),
            ) {
                prop_assume!(own_key != event_key);

                let reducer = ResourceReducer::new(own_key.as_str());
                let state = State { is_fetching, data, error, fetched_at: None };

                let events: [Event; 3] = [
                    FetchEvent::started(event_key.as_str()),
                    FetchEvent::completed(event_key.as_str(), vec!["x".to_string()], super::fetched_at()),
                    FetchEvent::failed(event_key.as_str(), "boom".to_string()),
                ];

                for event in &events {
                    prop_assert_eq!(&reducer.reduce(Some(&state), event), &state);
                }
            }
        }
    }
}

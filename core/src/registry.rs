//! The definition registry - turns declarations into reducers and triggers.

use crate::declaration::ResourceDeclaration;
use crate::environment::{Clock, SystemClock};
use crate::event::FetchEvent;
use crate::key::ResourceKey;
use crate::reducer::ResourceReducer;
use crate::state::ResourceState;
use crate::transport::Transport;
use crate::trigger::FetchTrigger;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied mapping from resource key to declaration.
///
/// Keys are unique; declaring the same key twice replaces the earlier
/// declaration. Iteration order is irrelevant - resources are independent.
/// The map is consumed when the [`RequestSet`] is built and not retained
/// afterward.
///
/// # Example
///
/// ```
/// use fetchstate_core::{RequestDefinitions, ResourceDeclaration};
///
/// let definitions: RequestDefinitions<Vec<i64>, String, Vec<String>, Vec<String>> =
///     RequestDefinitions::new()
///         .resource("users", ResourceDeclaration::new(|_| "/users".to_string()))
///         .resource(
///             "post",
///             ResourceDeclaration::new(|args: &Vec<i64>| format!("/posts/{}", args[0])),
///         );
///
/// assert_eq!(definitions.len(), 2);
/// ```
pub struct RequestDefinitions<Args, Req, Body, Data> {
    resources: HashMap<ResourceKey, ResourceDeclaration<Args, Req, Body, Data>>,
}

impl<Args, Req, Body, Data> RequestDefinitions<Args, Req, Body, Data> {
    /// Start an empty definitions map
    #[must_use]
    pub fn new() -> Self {
        Self {
            resources: HashMap::new(),
        }
    }

    /// Declare one resource under `key`
    #[must_use]
    pub fn resource(
        mut self,
        key: impl Into<ResourceKey>,
        declaration: ResourceDeclaration<Args, Req, Body, Data>,
    ) -> Self {
        self.resources.insert(key.into(), declaration);
        self
    }

    /// Number of declared resources
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether no resources are declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl<Args, Req, Body, Data> Default for RequestDefinitions<Args, Req, Body, Data> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args, Req, Body, Data> fmt::Debug for RequestDefinitions<Args, Req, Body, Data> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDefinitions")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The complete set of reducers and triggers for one definitions map.
///
/// One [`ResourceReducer`] and one [`FetchTrigger`] exist per declared key.
/// Building is pure and idempotent: two sets built from the same inputs are
/// structurally equivalent but fully independent - the set itself retains no
/// shared mutable state, only the transport/defaults/clock handles captured
/// by its triggers.
pub struct RequestSet<T, Args, D>
where
    T: Transport,
{
    reducers: HashMap<ResourceKey, ResourceReducer>,
    triggers: HashMap<ResourceKey, FetchTrigger<T, Args, D>>,
}

impl<T, Args, D> RequestSet<T, Args, D>
where
    T: Transport,
{
    /// Build reducers and triggers for every declared resource, stamping
    /// completions with the system clock
    #[must_use]
    pub fn new(
        transport: Arc<T>,
        definitions: RequestDefinitions<Args, T::Request, T::Body, D>,
        defaults: T::Defaults,
    ) -> Self {
        Self::with_clock(transport, definitions, defaults, Arc::new(SystemClock))
    }

    /// Build with an injected clock (deterministic `fetched_at` under test)
    #[must_use]
    pub fn with_clock(
        transport: Arc<T>,
        definitions: RequestDefinitions<Args, T::Request, T::Body, D>,
        defaults: T::Defaults,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let defaults = Arc::new(defaults);
        let mut reducers = HashMap::with_capacity(definitions.resources.len());
        let mut triggers = HashMap::with_capacity(definitions.resources.len());

        for (key, declaration) in definitions.resources {
            reducers.insert(key.clone(), ResourceReducer::new(key.clone()));
            triggers.insert(
                key.clone(),
                FetchTrigger::new(
                    key,
                    declaration,
                    Arc::clone(&transport),
                    Arc::clone(&defaults),
                    Arc::clone(&clock),
                ),
            );
        }

        Self { reducers, triggers }
    }

    /// The reducer owning `key`, if declared
    #[must_use]
    pub fn reducer(&self, key: &ResourceKey) -> Option<&ResourceReducer> {
        self.reducers.get(key)
    }

    /// The trigger for `key`, if declared
    #[must_use]
    pub fn trigger(&self, key: &ResourceKey) -> Option<&FetchTrigger<T, Args, D>> {
        self.triggers.get(key)
    }

    /// All reducers, keyed by resource name
    #[must_use]
    pub const fn reducers(&self) -> &HashMap<ResourceKey, ResourceReducer> {
        &self.reducers
    }

    /// All triggers, keyed by resource name
    #[must_use]
    pub const fn triggers(&self) -> &HashMap<ResourceKey, FetchTrigger<T, Args, D>> {
        &self.triggers
    }

    /// Iterate the declared resource keys
    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.reducers.keys()
    }

    /// Number of declared resources
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether no resources are declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }

    /// Split into the two mappings, for hosts that own them separately
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        HashMap<ResourceKey, ResourceReducer>,
        HashMap<ResourceKey, FetchTrigger<T, Args, D>>,
    ) {
        (self.reducers, self.triggers)
    }

    /// Fold one event into a key-to-state map through the owning reducer.
    ///
    /// Events targeting undeclared keys leave the map untouched.
    pub fn apply(
        &self,
        states: &mut HashMap<ResourceKey, ResourceState<D, T::Error>>,
        event: &FetchEvent<D, T::Error>,
    ) where
        D: Clone + Default,
        T::Error: Clone,
    {
        if let Some(reducer) = self.reducers.get(event.key()) {
            let next = reducer.reduce(states.get(event.key()), event);
            states.insert(event.key().clone(), next);
        }
    }
}

impl<T, Args, D> fmt::Debug for RequestSet<T, Args, D>
where
    T: Transport,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSet")
            .field("resources", &self.reducers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;

    struct NullTransport;

    impl Transport for NullTransport {
        type Request = String;
        type Defaults = ();
        type Body = Vec<String>;
        type Error = String;

        fn perform<'a>(
            &'a self,
            _request: String,
            _defaults: &'a (),
        ) -> BoxFuture<'a, Result<Vec<String>, String>> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    fn definitions() -> RequestDefinitions<Vec<i64>, String, Vec<String>, Vec<String>> {
        RequestDefinitions::new()
            .resource("users", ResourceDeclaration::new(|_| "/users".to_string()))
            .resource(
                "post",
                ResourceDeclaration::new(|args: &Vec<i64>| format!("/posts/{}", args[0])),
            )
    }

    fn build() -> RequestSet<NullTransport, Vec<i64>, Vec<String>> {
        RequestSet::new(Arc::new(NullTransport), definitions(), ())
    }

    #[test]
    fn one_reducer_and_one_trigger_per_key() {
        let set = build();

        assert_eq!(set.len(), 2);
        for key in ["users", "post"] {
            let key = ResourceKey::from(key);
            assert!(set.reducer(&key).is_some());
            assert!(set.trigger(&key).is_some());
        }
        assert!(set.reducer(&ResourceKey::from("comments")).is_none());
    }

    #[test]
    fn builds_are_independent() {
        let a = build();
        let b = build();

        let keys = |set: &RequestSet<NullTransport, Vec<i64>, Vec<String>>| {
            let mut keys: Vec<_> = set.keys().cloned().collect();
            keys.sort();
            keys
        };
        assert_eq!(keys(&a), keys(&b));
    }

    #[test]
    fn redeclaring_a_key_replaces_the_declaration() {
        let definitions = definitions().resource(
            "users",
            ResourceDeclaration::new(|_| "/users/v2".to_string()),
        );
        assert_eq!(definitions.len(), 2);
    }

    #[test]
    fn apply_routes_events_to_their_slot() {
        let set = build();
        let mut states = HashMap::new();

        set.apply(&mut states, &FetchEvent::started("users"));

        assert_eq!(states.len(), 1);
        let users = &states[&ResourceKey::from("users")];
        assert!(users.is_fetching);

        // Undeclared keys are dropped on the floor
        set.apply(&mut states, &FetchEvent::started("comments"));
        assert_eq!(states.len(), 1);
    }
}

//! # Fetchstate Runtime
//!
//! Host runtime for the fetchstate core.
//!
//! This crate provides [`FetchStore`], a ready-made host state container
//! satisfying the core's [`FetchHost`] contract: it owns the per-resource
//! state map, applies dispatched events through the lifecycle reducers, and
//! submits admitted fetch tasks to the tokio executor. It also ships a
//! default HTTP transport over `reqwest` in the [`http`] module.
//!
//! ## Example
//!
//! ```ignore
//! use fetchstate_core::{RequestDefinitions, RequestSet, ResourceDeclaration};
//! use fetchstate_runtime::FetchStore;
//! use fetchstate_runtime::http::{HttpDefaults, HttpRequest, HttpTransport};
//! use std::sync::Arc;
//!
//! let definitions = RequestDefinitions::new()
//!     .resource("users", ResourceDeclaration::new(|_: &Vec<i64>| HttpRequest::get("/users")));
//!
//! let requests = RequestSet::new(
//!     Arc::new(HttpTransport::new()),
//!     definitions,
//!     HttpDefaults::new("https://api.example.com"),
//! );
//! let store = FetchStore::new(requests);
//!
//! let outcome = store.fetch("users", vec![])?;
//! outcome.settled().await;
//! let users = store.resource("users");
//! ```

use fetchstate_core::{
    FetchEvent, FetchHost, FetchTrigger, RequestSet, ResourceKey, ResourceReducer, ResourceState,
    Transport,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

/// HTTP transport adapter over reqwest
pub mod http;

/// Error types for the store runtime
pub mod error {
    use fetchstate_core::ResourceKey;
    use thiserror::Error;

    /// Errors that can occur during store operations
    ///
    /// The fetch lifecycle itself never errors - transport failures land in
    /// resource state. These cover host-level misuse only.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// The key was never declared, so no trigger exists for it
        #[error("no resource declared under key `{0}`")]
        UnknownResource(ResourceKey),

        /// `drain` gave up with fetches still in flight
        #[error("drain timed out with {0} fetches still in flight")]
        DrainTimeout(usize),
    }
}

pub use error::StoreError;

/// Guard that decrements the pending-fetch counter on drop, even if the
/// fetch task panics
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Internal: the state owner handed to triggers as their host capability.
///
/// All mutations funnel through `dispatch`, which applies the event through
/// the owning reducer while holding the write lock - the store's equivalent
/// of a host that processes events one at a time.
struct StoreHost<D, E> {
    states: RwLock<HashMap<ResourceKey, ResourceState<D, E>>>,
    reducers: HashMap<ResourceKey, ResourceReducer>,
}

impl<D, E> FetchHost<D, E> for StoreHost<D, E>
where
    D: Clone + Default + Send + Sync,
    E: Clone + Send + Sync,
{
    fn dispatch(&self, event: FetchEvent<D, E>) {
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);

        let Some(reducer) = self.reducers.get(event.key()) else {
            tracing::warn!(key = %event.key(), "dropping event for undeclared resource");
            return;
        };

        match &event {
            FetchEvent::Completed { .. } => {
                metrics::counter!("fetch.completed").increment(1);
                tracing::debug!(key = %event.key(), "fetch completed");
            },
            FetchEvent::Failed { .. } => {
                metrics::counter!("fetch.failed").increment(1);
                tracing::warn!(key = %event.key(), "fetch failed");
            },
            FetchEvent::Started { .. } => {},
        }

        let next = reducer.reduce(states.get(event.key()), &event);
        states.insert(event.key().clone(), next);
    }

    fn resource(&self, key: &ResourceKey) -> Option<ResourceState<D, E>> {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

/// Result of one trigger invocation through the store.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The guard admitted the call; a fetch task is now running
    Submitted(FetchHandle),

    /// A fetch for this key was already in flight; nothing happened
    Suppressed,
}

impl FetchOutcome {
    /// Whether the guard admitted the call
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    /// Whether the guard suppressed the call
    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }

    /// The handle for an admitted call
    #[must_use]
    pub fn handle(self) -> Option<FetchHandle> {
        match self {
            Self::Submitted(handle) => Some(handle),
            Self::Suppressed => None,
        }
    }

    /// Wait until the admitted fetch settles; returns immediately for a
    /// suppressed call
    pub async fn settled(self) {
        if let Self::Submitted(handle) = self {
            handle.settled().await;
        }
    }
}

/// Handle for one in-flight fetch, returned by [`FetchStore::fetch`].
///
/// The fetch keeps running whether or not the handle is held; the handle
/// only offers a way to await settlement. There is no cancellation.
#[derive(Debug)]
pub struct FetchHandle {
    key: ResourceKey,
    join: tokio::task::JoinHandle<()>,
}

impl FetchHandle {
    /// The resource this fetch targets
    #[must_use]
    pub const fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Wait for the fetch to settle (its completion event is applied before
    /// the underlying task finishes)
    pub async fn settled(self) {
        if let Err(error) = self.join.await {
            tracing::warn!(key = %self.key, %error, "fetch task aborted before settling");
        }
    }
}

/// The store - a host runtime coordinating reducers and triggers.
///
/// The store owns one state slot per declared resource (seeded with the
/// default initial state, so the guard always has something to read),
/// serializes all event application under a write lock, and spawns admitted
/// fetch tasks on tokio.
///
/// # Type Parameters
///
/// - `T`: the transport
/// - `Args`: call-time arguments shared by every declared resource
/// - `D`: the stored payload type
///
/// # Example
///
/// ```ignore
/// let store = FetchStore::new(requests);
/// match store.fetch("users", vec![])? {
///     FetchOutcome::Submitted(handle) => handle.settled().await,
///     FetchOutcome::Suppressed => {} // one was already in flight
/// }
/// ```
pub struct FetchStore<T, Args, D>
where
    T: Transport,
{
    host: Arc<StoreHost<D, T::Error>>,
    triggers: HashMap<ResourceKey, FetchTrigger<T, Args, D>>,
    pending: Arc<AtomicUsize>,
    submit: Mutex<()>,
}

impl<T, Args, D> FetchStore<T, Args, D>
where
    T: Transport,
    T::Error: Clone + Sync,
    Args: Send + 'static,
    D: Clone + Default + From<T::Body> + Send + Sync + 'static,
{
    /// Build a store from a request set, seeding every declared key with
    /// the default initial state
    #[must_use]
    pub fn new(requests: RequestSet<T, Args, D>) -> Self {
        let (reducers, triggers) = requests.into_parts();

        let mut states = HashMap::with_capacity(reducers.len());
        for key in reducers.keys() {
            states.insert(key.clone(), ResourceState::default());
        }

        Self {
            host: Arc::new(StoreHost {
                states: RwLock::new(states),
                reducers,
            }),
            triggers,
            pending: Arc::new(AtomicUsize::new(0)),
            submit: Mutex::new(()),
        }
    }

    /// Trigger a fetch for `key` with the given call-time arguments.
    ///
    /// The guard check and the `Started` dispatch happen synchronously
    /// before this returns; on admission the fetch task is spawned on the
    /// current tokio runtime and its completion event is applied whenever
    /// the transport resolves.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownResource`] if `key` was never declared.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since admitted fetches are
    /// spawned on it.
    #[tracing::instrument(skip_all, name = "store_fetch")]
    pub fn fetch(
        &self,
        key: impl Into<ResourceKey>,
        args: Args,
    ) -> Result<FetchOutcome, StoreError> {
        let key = key.into();
        let Some(trigger) = self.triggers.get(&key) else {
            return Err(StoreError::UnknownResource(key));
        };

        // Guard check plus Started dispatch must be one indivisible step
        // under a multithreaded executor, or two callers could both pass
        // the guard before either start lands.
        let task = {
            let _submit = self.submit.lock().unwrap_or_else(PoisonError::into_inner);
            trigger.call(args, &self.host)
        };

        match task {
            None => {
                metrics::counter!("fetch.suppressed").increment(1);
                tracing::debug!(key = %key, "fetch suppressed, one already in flight");
                Ok(FetchOutcome::Suppressed)
            },
            Some(task) => {
                metrics::counter!("fetch.submitted").increment(1);
                tracing::debug!(key = %key, "fetch submitted");

                self.pending.fetch_add(1, Ordering::SeqCst);
                let guard = PendingGuard(Arc::clone(&self.pending));
                let join = tokio::spawn(async move {
                    let _guard = guard;
                    task.await;
                });

                Ok(FetchOutcome::Submitted(FetchHandle { key, join }))
            },
        }
    }

    /// Snapshot the state of one resource, if declared
    #[must_use]
    pub fn resource(&self, key: impl Into<ResourceKey>) -> Option<ResourceState<D, T::Error>> {
        self.host.resource(&key.into())
    }

    /// Snapshot the full key-to-state map
    #[must_use]
    pub fn snapshot(&self) -> HashMap<ResourceKey, ResourceState<D, T::Error>> {
        self.host
            .states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Iterate the declared resource keys
    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.triggers.keys()
    }

    /// Number of fetches currently in flight across all keys
    #[must_use]
    pub fn pending_fetches(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Wait for every in-flight fetch to settle.
    ///
    /// This is a graceful-shutdown convenience: nothing is cancelled, the
    /// store simply waits. New fetches may still be admitted while waiting.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DrainTimeout`] if the timeout expires with
    /// fetches still in flight.
    pub async fn drain(&self, timeout: Duration) -> Result<(), StoreError> {
        let start = std::time::Instant::now();
        let poll_interval = Duration::from_millis(10);

        loop {
            let pending = self.pending_fetches();

            if pending == 0 {
                return Ok(());
            }

            if start.elapsed() >= timeout {
                tracing::error!(pending, "drain timed out with fetches still in flight");
                return Err(StoreError::DrainTimeout(pending));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }
}

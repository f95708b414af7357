//! The guarded trigger - the only entry point that starts a fetch.
//!
//! A trigger decides synchronously whether a fetch may start (the
//! single-flight guard), emits the `Started` event, and hands back a
//! [`FetchTask`] the host submits to its own executor. The completion events
//! are dispatched from inside that task, so the host's event discipline is
//! the only thing that ever mutates state.

use crate::declaration::ResourceDeclaration;
use crate::environment::Clock;
use crate::event::FetchEvent;
use crate::key::ResourceKey;
use crate::state::ResourceState;
use crate::transport::Transport;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// The capability a trigger requires from its host state container.
///
/// This is the entire contract between the core and whatever owns the state:
/// a way to submit events and a way to read one resource's current state.
/// The host is expected to apply dispatched events one at a time; the core
/// never mutates state directly.
pub trait FetchHost<D, E>: Send + Sync {
    /// Apply one lifecycle event to the state it targets
    fn dispatch(&self, event: FetchEvent<D, E>);

    /// Snapshot the current state of one resource, if any event or seeding
    /// has materialized it
    fn resource(&self, key: &ResourceKey) -> Option<ResourceState<D, E>>;
}

impl<D, E, H: FetchHost<D, E>> FetchHost<D, E> for Arc<H> {
    fn dispatch(&self, event: FetchEvent<D, E>) {
        (**self).dispatch(event);
    }

    fn resource(&self, key: &ResourceKey) -> Option<ResourceState<D, E>> {
        (**self).resource(key)
    }
}

/// A one-shot unit of work covering a single admitted fetch.
///
/// Returned by [`FetchTrigger::call`] once the guard has passed and the
/// `Started` event is already dispatched. The host submits the task to its
/// executor; when the transport resolves, the task dispatches exactly one of
/// `Completed`/`Failed` and finishes. Dropping the task without polling it
/// to completion leaves the resource in the fetching state forever.
pub struct FetchTask {
    inner: BoxFuture<'static, ()>,
}

impl FetchTask {
    pub(crate) fn new(inner: BoxFuture<'static, ()>) -> Self {
        Self { inner }
    }
}

impl Future for FetchTask {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for FetchTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FetchTask(<future>)")
    }
}

/// Guarded entry point for one resource's fetches.
///
/// Built by the registry from a key, its declaration, and the shared
/// transport/defaults/clock handles. Calling the trigger while a fetch for
/// the same key is in flight is a silent no-op: no events, no transport
/// call, no state change.
pub struct FetchTrigger<T, Args, D>
where
    T: Transport,
{
    key: ResourceKey,
    declaration: ResourceDeclaration<Args, T::Request, T::Body, D>,
    transport: Arc<T>,
    defaults: Arc<T::Defaults>,
    clock: Arc<dyn Clock>,
}

impl<T, Args, D> FetchTrigger<T, Args, D>
where
    T: Transport,
{
    pub(crate) fn new(
        key: ResourceKey,
        declaration: ResourceDeclaration<Args, T::Request, T::Body, D>,
        transport: Arc<T>,
        defaults: Arc<T::Defaults>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            key,
            declaration,
            transport,
            defaults,
            clock,
        }
    }

    /// The resource key this trigger starts fetches for
    #[must_use]
    pub const fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Attempt to start a fetch with the given call-time arguments.
    ///
    /// The guard check and the `Started` dispatch both happen synchronously
    /// before this returns, so a second call issued before the returned task
    /// settles deterministically observes the in-flight flag and is
    /// suppressed (`None`). On an admitted call the returned [`FetchTask`]
    /// must be driven to completion by the host.
    pub fn call<H>(&self, args: Args, host: &Arc<H>) -> Option<FetchTask>
    where
        H: FetchHost<D, T::Error> + 'static,
        Args: Send + 'static,
        D: From<T::Body> + Send + 'static,
    {
        let in_flight = host
            .resource(&self.key)
            .is_some_and(|slot| slot.is_fetching);
        if in_flight {
            tracing::debug!(key = %self.key, "fetch already in flight, suppressing trigger");
            return None;
        }

        let request = self.declaration.build_request(&args);
        host.dispatch(FetchEvent::started(self.key.clone()));

        let key = self.key.clone();
        let declaration = self.declaration.clone();
        let transport = Arc::clone(&self.transport);
        let defaults = Arc::clone(&self.defaults);
        let clock = Arc::clone(&self.clock);
        let host = Arc::clone(host);

        Some(FetchTask::new(Box::pin(async move {
            match transport.perform(request, &defaults).await {
                Ok(body) => {
                    let data = declaration.map(body, &args);
                    host.dispatch(FetchEvent::completed(key, data, clock.now()));
                },
                Err(error) => {
                    host.dispatch(FetchEvent::failed(key, error));
                },
            }
        })))
    }
}

impl<T, Args, D> Clone for FetchTrigger<T, Args, D>
where
    T: Transport,
{
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            declaration: self.declaration.clone(),
            transport: Arc::clone(&self.transport),
            defaults: Arc::clone(&self.defaults),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T, Args, D> fmt::Debug for FetchTrigger<T, Args, D>
where
    T: Transport,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchTrigger")
            .field("key", &self.key)
            .field("declaration", &self.declaration)
            .finish_non_exhaustive()
    }
}

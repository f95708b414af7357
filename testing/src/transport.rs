//! A scripted transport for exercising fetch lifecycles without a network.

use fetchstate_core::transport::Transport;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::oneshot;

/// Error payload produced by [`ScriptedTransport`] failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request failed with code {code}")]
pub struct TestError {
    /// Status-like failure code
    pub code: u16,
}

impl TestError {
    /// Sentinel for a call the script had no reply for
    pub const UNSCRIPTED: Self = Self::new(599);

    /// Sentinel for a held reply whose handle was dropped unresolved
    pub const ABANDONED: Self = Self::new(598);

    /// Build an error with the given code
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self { code }
    }
}

/// The defaults type a scripted transport receives on every call -
/// name/value pairs standing in for shared headers
pub type TestDefaults = Vec<(String, String)>;

/// One recorded call: the request string and the defaults it carried
pub type RecordedCall = (String, TestDefaults);

enum Reply<B> {
    Success(B),
    Failure(TestError),
    Held(oneshot::Receiver<Result<B, TestError>>),
}

/// Handle resolving a reply queued with [`ScriptedTransport::hold`].
///
/// The transport future for the matching call stays pending until one of
/// the two methods is invoked - the lever for exercising the in-flight
/// guard. Dropping the handle unresolved settles the call with
/// [`TestError::ABANDONED`].
#[derive(Debug)]
pub struct HeldReply<B> {
    tx: oneshot::Sender<Result<B, TestError>>,
}

impl<B> HeldReply<B> {
    /// Resolve the held call successfully with `body`
    pub fn succeed(self, body: B) {
        let _ = self.tx.send(Ok(body));
    }

    /// Resolve the held call with `error`
    pub fn fail(self, error: TestError) {
        let _ = self.tx.send(Err(error));
    }
}

/// A [`Transport`] whose replies are scripted ahead of time.
///
/// Replies are consumed FIFO, one per `perform` call; every call is
/// recorded together with the defaults it carried so tests can assert on
/// the request stream. A call with no scripted reply resolves to
/// [`TestError::UNSCRIPTED`] rather than panicking.
///
/// # Example
///
/// ```
/// use fetchstate_testing::ScriptedTransport;
/// use serde_json::json;
///
/// let transport: ScriptedTransport = ScriptedTransport::new();
/// transport.push_success(json!(["a", "b"]));
/// assert_eq!(transport.call_count(), 0);
/// ```
#[derive(Debug)]
pub struct ScriptedTransport<B = Value> {
    replies: Mutex<VecDeque<Reply<B>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl<B> std::fmt::Debug for Reply<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success(_) => write!(f, "Reply::Success(..)"),
            Self::Failure(error) => write!(f, "Reply::Failure({error:?})"),
            Self::Held(_) => write!(f, "Reply::Held(..)"),
        }
    }
}

impl<B> ScriptedTransport<B> {
    /// Start with an empty script
    #[must_use]
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn push_success(&self, body: B) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Reply::Success(body));
    }

    /// Queue a failure reply
    pub fn push_failure(&self, error: TestError) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Reply::Failure(error));
    }

    /// Queue a reply that stays pending until the returned handle resolves it
    pub fn hold(&self) -> HeldReply<B> {
        let (tx, rx) = oneshot::channel();
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Reply::Held(rx));
        HeldReply { tx }
    }

    /// Every `(request, defaults)` pair seen so far, in call order
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `perform` calls seen so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<B> Default for ScriptedTransport<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Transport for ScriptedTransport<B>
where
    B: Send + 'static,
{
    type Request = String;
    type Defaults = TestDefaults;
    type Body = B;
    type Error = TestError;

    fn perform<'a>(
        &'a self,
        request: String,
        defaults: &'a TestDefaults,
    ) -> BoxFuture<'a, Result<B, TestError>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((request, defaults.clone()));

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        Box::pin(async move {
            match reply {
                Some(Reply::Success(body)) => Ok(body),
                Some(Reply::Failure(error)) => Err(error),
                Some(Reply::Held(rx)) => rx.await.unwrap_or(Err(TestError::ABANDONED)),
                None => Err(TestError::UNSCRIPTED),
            }
        })
    }
}

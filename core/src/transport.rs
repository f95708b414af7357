//! The transport capability - the one seam through which network I/O happens.

use futures::future::BoxFuture;

/// A capability that performs one network request.
///
/// The core never talks to the network itself; it hands a fully built
/// request (plus the registry-wide defaults) to the injected transport and
/// folds whichever arm of the returned [`Result`] materializes into state.
/// A well-behaved transport resolves to exactly one `Result` per call; a
/// transport that never resolves leaves its resource in the fetching state
/// forever, since no timeout is imposed here.
///
/// # Associated types
///
/// - `Request`: transport-specific request parameters, produced by a
///   declaration's request builder
/// - `Defaults`: registry-wide configuration passed through unmodified on
///   every call (shared headers, a base URL, ...) - opaque to the core
/// - `Body`: the raw success payload handed to the mapper
/// - `Error`: the failure payload stored verbatim in resource state
pub trait Transport: Send + Sync + 'static {
    /// Request parameters consumed by one call
    type Request: Send + 'static;

    /// Registry-wide configuration forwarded on every call
    type Defaults: Send + Sync + 'static;

    /// Raw success payload
    type Body: Send + 'static;

    /// Failure payload
    type Error: Send + 'static;

    /// Perform one request, eventually resolving to its body or an error
    fn perform<'a>(
        &'a self,
        request: Self::Request,
        defaults: &'a Self::Defaults,
    ) -> BoxFuture<'a, Result<Self::Body, Self::Error>>;
}

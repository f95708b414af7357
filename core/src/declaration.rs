//! Resource declarations - the per-key configuration the registry consumes.

use std::fmt;
use std::sync::Arc;

/// Pure function producing transport-specific request parameters from
/// call-time arguments
pub type RequestBuilder<Args, Req> = Arc<dyn Fn(&Args) -> Req + Send + Sync>;

/// Pure transform applied to a successful response body before it is stored;
/// receives the original call arguments as its second input
pub type ResponseMapper<Args, Body, Data> = Arc<dyn Fn(Body, &Args) -> Data + Send + Sync>;

/// Declarative description of one fetch operation.
///
/// A declaration is two pure functions: a request builder that turns
/// call-time arguments into request parameters, and an optional mapper that
/// shapes the raw response body before it lands in state. When no mapper is
/// declared the body passes through unchanged (via `Data: From<Body>`, the
/// identity when the two types coincide).
///
/// # Example
///
/// ```
/// use fetchstate_core::ResourceDeclaration;
///
/// let posts = ResourceDeclaration::<Vec<i64>, String, Vec<String>, Vec<String>>::new(
///     |args| format!("/posts/{}", args[0]),
/// )
/// .with_mapper(|body, args| {
///     body.into_iter().map(|line| format!("{}: {line}", args[0])).collect()
/// });
///
/// assert_eq!(posts.build_request(&vec![42]), "/posts/42");
/// ```
pub struct ResourceDeclaration<Args, Req, Body, Data> {
    request: RequestBuilder<Args, Req>,
    mapper: Option<ResponseMapper<Args, Body, Data>>,
}

impl<Args, Req, Body, Data> ResourceDeclaration<Args, Req, Body, Data> {
    /// Declare a resource with the given request builder and no mapper
    pub fn new<F>(request: F) -> Self
    where
        F: Fn(&Args) -> Req + Send + Sync + 'static,
    {
        Self {
            request: Arc::new(request),
            mapper: None,
        }
    }

    /// Attach a response mapper, replacing any previously attached one
    #[must_use]
    pub fn with_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(Body, &Args) -> Data + Send + Sync + 'static,
    {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    /// Whether a mapper was declared
    #[must_use]
    pub const fn has_mapper(&self) -> bool {
        self.mapper.is_some()
    }

    /// Produce request parameters for one trigger invocation
    pub fn build_request(&self, args: &Args) -> Req {
        (self.request)(args)
    }

    /// Shape a successful response body for storage.
    ///
    /// Applies the declared mapper exactly once, or passes the body through
    /// via [`From`] when none was declared.
    pub fn map(&self, body: Body, args: &Args) -> Data
    where
        Data: From<Body>,
    {
        match &self.mapper {
            Some(mapper) => mapper(body, args),
            None => Data::from(body),
        }
    }
}

impl<Args, Req, Body, Data> Clone for ResourceDeclaration<Args, Req, Body, Data> {
    fn clone(&self) -> Self {
        Self {
            request: Arc::clone(&self.request),
            mapper: self.mapper.as_ref().map(Arc::clone),
        }
    }
}

// Manual Debug since the builder functions are opaque
impl<Args, Req, Body, Data> fmt::Debug for ResourceDeclaration<Args, Req, Body, Data> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDeclaration")
            .field("request", &"<fn>")
            .field("mapper", &self.has_mapper())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapper_receives_call_arguments() {
        let declaration =
            ResourceDeclaration::<Vec<i64>, String, Vec<String>, Vec<String>>::new(|args| {
                format!("/posts/{}", args[0])
            })
            .with_mapper(|body, args| {
                let mut tagged = vec![format!("post-{}", args[0])];
                tagged.extend(body);
                tagged
            });

        let args = vec![42];
        assert_eq!(declaration.build_request(&args), "/posts/42");
        let mapped = declaration.map(vec!["hello".to_string()], &args);
        assert_eq!(mapped, vec!["post-42".to_string(), "hello".to_string()]);
    }

    #[test]
    fn missing_mapper_passes_body_through() {
        let declaration = ResourceDeclaration::<Vec<i64>, String, Vec<String>, Vec<String>>::new(
            |_| "/users".to_string(),
        );

        assert!(!declaration.has_mapper());
        let body = vec!["a".to_string(), "b".to_string()];
        assert_eq!(declaration.map(body.clone(), &vec![]), body);
    }
}

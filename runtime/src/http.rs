//! Default HTTP transport over reqwest.
//!
//! Request builders produce [`HttpRequest`] values (a method, a path, an
//! optional JSON body); the registry-wide [`HttpDefaults`] carry the base
//! URL and shared headers that the distilled per-call requests are resolved
//! against.

use fetchstate_core::transport::Transport;
use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;

pub use reqwest::Method;

/// Transport-specific parameters for one HTTP call
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,

    /// Path appended to the defaults' base URL
    pub path: String,

    /// Optional JSON request body
    pub body: Option<Value>,
}

impl HttpRequest {
    /// A GET request for `path`
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    /// A POST request for `path` carrying a JSON body
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Registry-wide configuration applied to every outgoing call
#[derive(Debug, Clone, Default)]
pub struct HttpDefaults {
    /// Prefix every request path is resolved against
    pub base_url: String,

    /// Headers attached to every request
    pub headers: Vec<(String, String)>,
}

impl HttpDefaults {
    /// Defaults with the given base URL and no shared headers
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: Vec::new(),
        }
    }

    /// Attach a header sent on every request
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Failures an HTTP fetch can settle with.
///
/// Carried verbatim into `ResourceState.error`, so the variants own their
/// diagnostics as plain strings and stay cheaply cloneable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The request never produced a response
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body text, as far as it could be read
        body: String,
    },

    /// The response body was not valid JSON
    #[error("response decode failure: {0}")]
    Decode(String),
}

/// [`Transport`] implementation backed by a shared reqwest client
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with a fresh client
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Build a transport around an existing client (custom timeouts,
    /// proxies, ...)
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    type Request = HttpRequest;
    type Defaults = HttpDefaults;
    type Body = Value;
    type Error = HttpError;

    fn perform<'a>(
        &'a self,
        request: HttpRequest,
        defaults: &'a HttpDefaults,
    ) -> BoxFuture<'a, Result<Value, HttpError>> {
        Box::pin(async move {
            let HttpRequest { method, path, body } = request;
            let url = format!("{}{path}", defaults.base_url);

            let mut builder = self.client.request(method, &url);
            for (name, value) in &defaults.headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = &body {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|error| HttpError::Transport(error.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(HttpError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            response
                .json::<Value>()
                .await
                .map_err(|error| HttpError::Decode(error.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_constructors_set_method_and_path() {
        let get = HttpRequest::get("/users");
        assert_eq!(get.method, Method::GET);
        assert_eq!(get.path, "/users");
        assert!(get.body.is_none());

        let post = HttpRequest::post("/users", serde_json::json!({"name": "ada"}));
        assert_eq!(post.method, Method::POST);
        assert!(post.body.is_some());
    }

    #[test]
    fn defaults_accumulate_headers() {
        let defaults = HttpDefaults::new("https://api.example.com")
            .with_header("authorization", "Bearer token")
            .with_header("x-app", "newsfeed");

        assert_eq!(defaults.base_url, "https://api.example.com");
        assert_eq!(defaults.headers.len(), 2);
    }
}

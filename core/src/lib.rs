//! # Fetchstate Core
//!
//! Core types for declarative fetch lifecycle tracking and in-flight
//! deduplication.
//!
//! This crate turns a small configuration describing remote-data fetch
//! operations into two artifacts: pure state-transition functions
//! ("reducers") that track the lifecycle of each named fetch, and guarded
//! trigger functions that perform the network call only if one is not
//! already in flight for that name.
//!
//! ## Core Concepts
//!
//! - **Resource key**: the name identifying one trackable fetch and its
//!   state slot
//! - **Declaration**: per-key configuration - a request builder and an
//!   optional response mapper
//! - **Event**: immutable transition record (`Started` / `Completed` /
//!   `Failed`) tagged with the key it targets
//! - **Reducer**: pure function `(state, event) → state` for one key
//! - **Trigger**: the guarded entry point that starts a fetch and hands the
//!   host a one-shot task
//! - **Transport**: the injected capability performing the actual network
//!   call
//! - **Host**: whatever owns the state and supplies `dispatch`/`resource`
//!
//! ## Architecture Principles
//!
//! - Functional core, imperative shell: reducers are pure, I/O lives behind
//!   the [`Transport`] seam
//! - Single-flight per key: the guard suppresses a trigger while a fetch is
//!   outstanding, so at most one request per resource is ever in flight
//! - All state mutation flows through dispatched events; the core never
//!   writes state directly
//!
//! ## Example
//!
//! ```ignore
//! use fetchstate_core::{RequestDefinitions, RequestSet, ResourceDeclaration};
//! use std::sync::Arc;
//!
//! let definitions = RequestDefinitions::new()
//!     .resource("users", ResourceDeclaration::new(|_| "/users".to_string()))
//!     .resource(
//!         "post",
//!         ResourceDeclaration::new(|args: &Vec<i64>| format!("/posts/{}", args[0]))
//!             .with_mapper(|body, args| tag_with_id(body, args[0])),
//!     );
//!
//! let requests = RequestSet::new(Arc::new(my_transport), definitions, my_defaults);
//! // requests.reducers() fold events into state; requests.triggers() start
//! // guarded fetches. See fetchstate-runtime for a ready-made host.
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

/// Resource keys - the names fetch lifecycles are tracked under
pub mod key;

/// Per-resource lifecycle state
pub mod state;

/// Lifecycle events folded by reducers
pub mod event;

/// Injected capabilities (clock)
pub mod environment;

/// Per-key declarations: request builders and response mappers
pub mod declaration;

/// The transport capability performing network calls
pub mod transport;

/// Pure lifecycle reducers
pub mod reducer;

/// Guarded triggers and the host capability contract
pub mod trigger;

/// The definition registry producing reducers and triggers
pub mod registry;

pub use declaration::ResourceDeclaration;
pub use environment::{Clock, SystemClock};
pub use event::FetchEvent;
pub use key::ResourceKey;
pub use reducer::ResourceReducer;
pub use registry::{RequestDefinitions, RequestSet};
pub use state::ResourceState;
pub use transport::Transport;
pub use trigger::{FetchHost, FetchTask, FetchTrigger};

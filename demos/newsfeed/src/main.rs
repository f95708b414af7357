//! Newsfeed demo binary
//!
//! Walks through the fetch lifecycle end to end: declaring resources,
//! triggering guarded fetches, watching the single-flight guard suppress a
//! duplicate, and folding a failure into state.
//!
//! The transport is scripted so the demo runs without a network; swap in
//! `fetchstate_runtime::http::HttpTransport` to point the same declarations
//! at a real API.

use fetchstate_core::{RequestDefinitions, RequestSet, ResourceDeclaration};
use fetchstate_runtime::{FetchStore, StoreError};
use fetchstate_testing::{ScriptedTransport, TestError};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn definitions() -> RequestDefinitions<Vec<i64>, String, Value, Value> {
    RequestDefinitions::new()
        .resource(
            "headlines",
            ResourceDeclaration::new(|_| "/headlines".to_string()),
        )
        .resource(
            "story",
            ResourceDeclaration::new(|args: &Vec<i64>| format!("/stories/{}", args[0]))
                .with_mapper(|body, args| json!({ "id": args[0], "story": body })),
        )
}

fn show(store: &FetchStore<ScriptedTransport, Vec<i64>, Value>, key: &str) {
    if let Some(state) = store.resource(key) {
        println!(
            "  {key}: fetching={} data={} error={:?}",
            state.is_fetching, state.data, state.error,
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), StoreError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsfeed=debug,fetchstate_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Newsfeed: declarative fetch lifecycles ===\n");

    let transport = Arc::new(ScriptedTransport::new());
    let store = FetchStore::new(RequestSet::new(
        Arc::clone(&transport),
        definitions(),
        vec![("x-app".to_string(), "newsfeed".to_string())],
    ));

    println!("Initial state:");
    show(&store, "headlines");
    show(&store, "story");

    // A held reply keeps the first fetch in flight so the guard is visible
    let held = transport.hold();

    println!("\n>>> Fetching headlines");
    let first = store.fetch("headlines", vec![])?;
    show(&store, "headlines");

    println!(">>> Fetching headlines again while in flight");
    let second = store.fetch("headlines", vec![])?;
    println!(
        "  suppressed={} (transport calls so far: {})",
        second.is_suppressed(),
        transport.call_count(),
    );

    held.succeed(json!([
        "Guard suppresses duplicate fetches",
        "Reducers stay pure",
    ]));
    first.settled().await;
    println!("After the reply lands:");
    show(&store, "headlines");

    println!("\n>>> Fetching story 42 (mapper tags the id)");
    transport.push_success(json!("A story about reducers"));
    store.fetch("story", vec![42])?.settled().await;
    show(&store, "story");

    println!("\n>>> A failing fetch lands in state instead of panicking");
    transport.push_failure(TestError::new(500));
    store.fetch("headlines", vec![])?.settled().await;
    show(&store, "headlines");

    println!(">>> The next success clears the stale error");
    transport.push_success(json!(["Back online"]));
    store.fetch("headlines", vec![])?.settled().await;
    show(&store, "headlines");

    println!("\n=== Done ===");
    Ok(())
}

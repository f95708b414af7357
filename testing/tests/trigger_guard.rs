//! Trigger-level behavior: the single-flight guard, dispatch ordering, and
//! response mapping, observed through a recording host.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use fetchstate_core::{
    Clock, FetchEvent, FetchHost, RequestDefinitions, RequestSet, ResourceDeclaration,
    ResourceKey, ResourceState,
};
use fetchstate_testing::{RecordingHost, ScriptedTransport, TestError, test_clock};
use std::sync::Arc;

type Scripted = ScriptedTransport<Vec<String>>;
type Host = RecordingHost<Vec<String>, TestError>;
type Set = RequestSet<Scripted, Vec<i64>, Vec<String>>;

fn definitions() -> RequestDefinitions<Vec<i64>, String, Vec<String>, Vec<String>> {
    RequestDefinitions::new()
        .resource("users", ResourceDeclaration::new(|_| "/users".to_string()))
        .resource(
            "post",
            ResourceDeclaration::new(|args: &Vec<i64>| format!("/posts/{}", args[0])).with_mapper(
                |body, args| {
                    let mut tagged = vec![format!("post-{}", args[0])];
                    tagged.extend(body);
                    tagged
                },
            ),
        )
}

fn build(transport: &Arc<Scripted>) -> Set {
    RequestSet::with_clock(
        Arc::clone(transport),
        definitions(),
        vec![("x-app".to_string(), "newsfeed".to_string())],
        Arc::new(test_clock()),
    )
}

#[tokio::test]
async fn admitted_call_dispatches_started_then_completed() {
    let transport = Arc::new(Scripted::new());
    transport.push_success(vec!["a".to_string(), "b".to_string()]);
    let set = build(&transport);
    let host: Arc<Host> = Arc::new(RecordingHost::new());
    let users = ResourceKey::from("users");

    let task = set
        .trigger(&users)
        .unwrap()
        .call(vec![], &host)
        .expect("guard admits an idle resource");

    // Started lands synchronously, before the task ever runs
    let events = host.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].is_started());

    task.await;

    let events = host.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        FetchEvent::completed(
            "users",
            vec!["a".to_string(), "b".to_string()],
            test_clock().now(),
        ),
    );
}

#[tokio::test]
async fn guard_suppresses_while_in_flight() {
    let transport = Arc::new(Scripted::new());
    let set = build(&transport);
    let host: Arc<Host> = Arc::new(RecordingHost::new().with_state(
        "users",
        ResourceState {
            is_fetching: true,
            ..ResourceState::default()
        },
    ));
    let users = ResourceKey::from("users");

    let task = set.trigger(&users).unwrap().call(vec![], &host);

    assert!(task.is_none(), "suppressed call must be a no-op");
    assert!(host.events().is_empty(), "no events while suppressed");
    assert_eq!(transport.call_count(), 0, "transport must not be touched");
}

#[tokio::test]
async fn second_call_before_settling_is_suppressed() {
    let transport = Arc::new(Scripted::new());
    let held = transport.hold();
    let set = build(&transport);
    let host: Arc<Host> = Arc::new(RecordingHost::new());
    let users = ResourceKey::from("users");
    let trigger = set.trigger(&users).unwrap();

    let first = trigger.call(vec![], &host).expect("first call admitted");
    assert!(trigger.call(vec![], &host).is_none());
    assert_eq!(transport.call_count(), 1, "only one request in flight");

    held.succeed(vec![]);
    first.await;
    assert!(!host.resource(&users).unwrap().is_fetching);

    // The machine is perpetually re-triggerable once the fetch settles
    transport.push_success(vec![]);
    assert!(trigger.call(vec![], &host).is_some());
}

#[tokio::test]
async fn mapper_receives_the_call_arguments() {
    let transport = Arc::new(Scripted::new());
    transport.push_success(vec!["hello".to_string()]);
    let set = build(&transport);
    let host: Arc<Host> = Arc::new(RecordingHost::new());
    let post = ResourceKey::from("post");

    let task = set.trigger(&post).unwrap().call(vec![42], &host).unwrap();
    task.await;

    let calls = transport.calls();
    assert_eq!(calls[0].0, "/posts/42");

    let state = host.resource(&post).unwrap();
    assert_eq!(
        state.data,
        vec!["post-42".to_string(), "hello".to_string()],
        "mapper saw the body and the original id",
    );
}

#[tokio::test]
async fn missing_mapper_passes_the_body_through() {
    let transport = Arc::new(Scripted::new());
    transport.push_success(vec!["raw".to_string()]);
    let set = build(&transport);
    let host: Arc<Host> = Arc::new(RecordingHost::new());
    let users = ResourceKey::from("users");

    set.trigger(&users)
        .unwrap()
        .call(vec![], &host)
        .unwrap()
        .await;

    assert_eq!(host.resource(&users).unwrap().data, vec!["raw".to_string()]);
}

#[tokio::test]
async fn defaults_are_forwarded_on_every_call() {
    let transport = Arc::new(Scripted::new());
    transport.push_success(vec![]);
    let set = build(&transport);
    let host: Arc<Host> = Arc::new(RecordingHost::new());
    let users = ResourceKey::from("users");

    set.trigger(&users)
        .unwrap()
        .call(vec![], &host)
        .unwrap()
        .await;

    assert_eq!(
        transport.calls()[0].1,
        vec![("x-app".to_string(), "newsfeed".to_string())],
    );
}

#[tokio::test]
async fn failure_is_dispatched_and_releases_the_guard() {
    let transport = Arc::new(Scripted::new());
    transport.push_failure(TestError::new(500));
    let set = build(&transport);
    let host: Arc<Host> = Arc::new(RecordingHost::new());
    let users = ResourceKey::from("users");

    set.trigger(&users)
        .unwrap()
        .call(vec![], &host)
        .unwrap()
        .await;

    let events = host.events();
    assert!(events[1].is_failed());

    let state = host.resource(&users).unwrap();
    assert_eq!(state.error, Some(TestError::new(500)));
    assert!(!state.is_fetching);
    assert!(state.fetched_at.is_none(), "failures never stamp fetched_at");
}

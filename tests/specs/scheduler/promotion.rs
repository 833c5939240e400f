//! Dependency scheduler specs
//!
//! A waiting minion is started once the minion it depends on signals
//! COMPLETE. Each pass advances a chain by one hop.

use crate::prelude::*;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn example_scenario_promotes_dependent() {
    let world = World::new();
    world.create("a").await;
    world.waiting("b", "a");
    world.signal("a", TaskStatus::Complete);

    let report = world.promote().await;

    assert_eq!(names(&report.promoted), vec!["b"]);
    assert!(report.blocked.is_empty());
    assert!(report.errors.is_empty());
    assert_eq!(world.status("b"), LifecycleStatus::Running);
    assert!(world.lifecycle.get("b").unwrap().started_at_ms.is_some());
}

#[tokio::test]
async fn no_terminal_signal_never_promotes() {
    let world = World::new();
    world.create("a").await;
    world.waiting("b", "a");

    assert!(world.promote().await.is_empty());

    world.signal("a", TaskStatus::Working);
    assert!(world.promote().await.is_empty());
    assert_eq!(world.status("b"), LifecycleStatus::Waiting);
    assert!(world.sandbox.calls().is_empty());
}

#[tokio::test]
async fn completion_promotes_exactly_the_dependents() {
    let world = World::new();
    world.create("a").await;
    world.create("other").await;
    world.waiting("b1", "a");
    world.waiting("b2", "a");
    world.waiting("c", "other");
    world.create("idle").await;
    world.signal("a", TaskStatus::Complete);

    let report = world.promote().await;

    assert_eq!(names(&report.promoted), vec!["b1", "b2"]);
    assert_eq!(world.status("c"), LifecycleStatus::Waiting);
    assert_eq!(world.status("idle"), LifecycleStatus::Pending);
    assert_eq!(world.sandbox.sandbox_count(), 2);
}

#[tokio::test]
async fn chain_advances_one_hop_per_pass() {
    let world = World::new();
    world.create("a").await;
    world.waiting("b", "a");
    world.waiting("c", "b");
    world.signal("a", TaskStatus::Complete);

    let first = world.promote().await;
    assert_eq!(names(&first.promoted), vec!["b"]);
    assert_eq!(world.status("c"), LifecycleStatus::Waiting);

    // b is running but has not finished
    assert!(world.promote().await.is_empty());
    assert_eq!(world.status("c"), LifecycleStatus::Waiting);

    world.signal("b", TaskStatus::Complete);
    let third = world.promote().await;
    assert_eq!(names(&third.promoted), vec!["c"]);
    assert_eq!(world.status("c"), LifecycleStatus::Running);
}

#[tokio::test]
async fn failed_dependency_blocks() {
    let world = World::new();
    world.create("a").await;
    world.waiting("b", "a");
    world.signal("a", TaskStatus::Failed);

    let report = world.promote().await;

    assert!(report.promoted.is_empty());
    assert_eq!(names(&report.blocked), vec!["b"]);
    assert_eq!(world.status("b"), LifecycleStatus::Waiting);
}

#[tokio::test]
async fn removed_dependency_blocks() {
    let world = World::new();
    world.create("a").await;
    world.waiting("b", "a");
    world.lifecycle.cleanup("a").await.unwrap();

    let report = world.promote().await;

    assert_eq!(names(&report.blocked), vec!["b"]);
}

#[tokio::test]
async fn start_failure_is_isolated() {
    let world = World::new();
    world.create("a").await;
    world.waiting("b1", "a");
    world.waiting("b2", "a");
    world.signal("a", TaskStatus::Complete);
    world.sandbox.fail_start_for("b1");

    let report = world.promote().await;

    assert_eq!(names(&report.promoted), vec!["b2"]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].0.as_str(), "b1");
    assert_eq!(world.status("b1"), LifecycleStatus::Waiting);

    // Retried on the next pass once the runtime recovers
    world.sandbox.clear_failures();
    let next = world.promote().await;
    assert_eq!(names(&next.promoted), vec!["b1"]);
}

#[tokio::test]
async fn promotion_carries_start_options() {
    let world = World::new();
    world.create("a").await;
    world.waiting("b", "a");
    world.signal("a", TaskStatus::Complete);

    world
        .scheduler
        .check_and_promote(&StartOptions {
            credential: Some("secret".to_string()),
            keep_alive: true,
            ..StartOptions::default()
        })
        .await
        .unwrap();

    let calls = world.sandbox.calls();
    let Some(SandboxCall::Start { spec }) = calls.last() else {
        panic!("expected a start call, got {calls:?}");
    };
    let env: std::collections::HashMap<_, _> = spec.env.iter().cloned().collect();
    assert_eq!(env.get("MINION_NAME").map(String::as_str), Some("b"));
    assert_eq!(env.get("MINION_CREDENTIAL").map(String::as_str), Some("secret"));
    assert_eq!(env.get("MINION_KEEP_ALIVE").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn watch_promotes_then_stops_on_cancel() {
    let world = World::new();
    world.create("a").await;
    world.waiting("b", "a");
    world.signal("a", TaskStatus::Complete);

    let cancel = CancellationToken::new();
    let mut promoted = Vec::new();
    let stopper = cancel.clone();
    world
        .scheduler
        .watch(
            Duration::from_millis(5),
            &StartOptions::default(),
            |name| {
                promoted.push(name.to_string());
                stopper.cancel();
            },
            cancel,
        )
        .await;

    assert_eq!(promoted, vec!["b".to_string()]);
    assert_eq!(world.status("b"), LifecycleStatus::Running);
}

//! Lifecycle control specs
//!
//! Kill and cleanup converge regardless of the runtime; pause, resume and
//! restart surface runtime failures.

use crate::prelude::*;

#[tokio::test]
async fn kill_without_sandbox_still_marks_killed() {
    let world = World::new();
    world.create("a").await;
    world.clock.advance(Duration::from_secs(30));

    let killed = world.lifecycle.kill("a").await.unwrap();

    assert_eq!(killed.status, LifecycleStatus::Killed);
    assert_eq!(killed.killed_at_ms, Some(world.clock.epoch_ms()));
    assert!(world.sandbox.calls().is_empty());
}

#[tokio::test]
async fn kill_converges_when_runtime_fails() {
    let world = World::new();
    let running = world.running("a").await;
    let handle = running.sandbox.unwrap();
    world.sandbox.fail_op("stop");
    world.sandbox.fail_op("remove");

    let killed = world.lifecycle.kill("a").await.unwrap();

    assert_eq!(killed.status, LifecycleStatus::Killed);
    assert!(killed.sandbox.is_none());
    assert!(killed.killed_at_ms.is_some());
    // The runtime still has it; the record no longer does
    assert!(world.sandbox.get_sandbox(&handle).is_some());
    assert_eq!(world.status("a"), LifecycleStatus::Killed);
}

#[tokio::test]
async fn pause_and_resume_round_trip() {
    let world = World::new();
    world.running("a").await;

    let paused = world.lifecycle.pause("a").await.unwrap();
    assert_eq!(paused.status, LifecycleStatus::Paused);
    assert!(paused.paused_at_ms.is_some());

    let resumed = world.lifecycle.resume("a").await.unwrap();
    assert_eq!(resumed.status, LifecycleStatus::Running);
    assert!(resumed.resumed_at_ms.is_some());

    let ops: Vec<_> = world.sandbox.calls().iter().map(|c| c.op()).collect();
    assert_eq!(ops, vec!["start", "pause", "unpause"]);
}

#[tokio::test]
async fn pause_surfaces_runtime_failure() {
    let world = World::new();
    world.running("a").await;
    world.sandbox.fail_op("pause");

    let result = world.lifecycle.pause("a").await;

    assert!(matches!(result, Err(MinionError::Adapter { .. })), "{result:?}");
    assert_eq!(world.status("a"), LifecycleStatus::Running);
}

#[tokio::test]
async fn pause_without_sandbox_is_rejected() {
    let world = World::new();
    world.create("a").await;

    let result = world.lifecycle.pause("a").await;

    assert!(matches!(result, Err(MinionError::NoSandbox(_))), "{result:?}");
}

#[tokio::test]
async fn restart_surfaces_runtime_failure() {
    let world = World::new();
    world.running("a").await;
    world.sandbox.fail_op("restart");

    assert!(world.lifecycle.restart("a").await.is_err());
    assert!(world.lifecycle.get("a").unwrap().restarted_at_ms.is_none());
}

#[tokio::test]
async fn retry_clears_previous_attempt() {
    let world = World::new();
    let first = world.running("a").await;
    world.signal("a", TaskStatus::Failed);
    world.clock.advance(Duration::from_secs(60));

    let retried = world
        .lifecycle
        .retry("a", &StartOptions::default())
        .await
        .unwrap();

    assert_eq!(retried.status, LifecycleStatus::Running);
    assert_eq!(retried.previous_created_at_ms, Some(first.created_at_ms));
    assert_eq!(retried.created_at_ms, world.clock.epoch_ms());
    assert_ne!(retried.sandbox, first.sandbox);
    assert_eq!(world.lifecycle.store().read_signal("a").unwrap(), None);
    assert_eq!(world.sandbox.sandbox_count(), 1);
}

#[tokio::test]
async fn clone_task_only_starts_fresh() {
    let world = World::new();
    world.running("a").await;
    world.signal("a", TaskStatus::Complete);
    std::fs::write(world.workspace("a").join("notes.txt"), "scratch").unwrap();

    let cloned = world
        .lifecycle
        .clone_minion("a", "b", &CloneOptions::default())
        .unwrap();

    assert_eq!(cloned.status, LifecycleStatus::Pending);
    assert_eq!(cloned.cloned_from.as_ref().map(|n| n.as_str()), Some("a"));
    assert_eq!(world.lifecycle.task("b").unwrap(), "task for a");
    assert!(!world.workspace("b").join("notes.txt").exists());
    assert_eq!(world.lifecycle.store().read_signal("b").unwrap(), None);
}

#[tokio::test]
async fn clone_full_workspace_copies_files_and_mailbox() {
    let world = World::new();
    world.create("a").await;
    world.create("peer").await;
    std::fs::write(world.workspace("a").join("notes.txt"), "scratch").unwrap();
    world.signal("a", TaskStatus::Complete);
    world.mailbox.send("peer", "a", "hello").unwrap();

    world
        .lifecycle
        .clone_minion(
            "a",
            "b",
            &CloneOptions {
                mode: CloneMode::FullWorkspace,
                copy_mailbox: true,
            },
        )
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(world.workspace("b").join("notes.txt")).unwrap(),
        "scratch"
    );
    assert_eq!(world.lifecycle.store().read_signal("b").unwrap(), None);
    assert_eq!(world.mailbox.inbox("b").unwrap().len(), 1);
    assert_eq!(world.mailbox.inbox("a").unwrap().len(), 1);
}

#[tokio::test]
async fn cleanup_removes_everything() {
    let world = World::new();
    world.running("a").await;
    world.create("peer").await;
    world.mailbox.send("peer", "a", "bye").unwrap();

    world.lifecycle.cleanup("a").await.unwrap();

    assert!(!world.workspace("a").exists());
    assert!(!world.mailbox_dir("a").exists());
    assert_eq!(world.sandbox.sandbox_count(), 0);
    assert!(matches!(
        world.lifecycle.get("a"),
        Err(MinionError::NotFound { .. })
    ));
}

#[tokio::test]
async fn wait_returns_terminal_signal() {
    let world = World::new();
    world.running("a").await;
    world.signal("a", TaskStatus::Complete);

    let outcome = world
        .lifecycle
        .wait_for_completion("a", &WaitOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome, WaitOutcome::Complete);
}

//! Rename specs
//!
//! A minion can only be renamed once its sandbox has stopped; the workspace
//! and mailbox move with it.

use crate::prelude::*;

#[tokio::test]
async fn rename_conflicts_while_running() {
    let world = World::new();
    world.running("a").await;

    let result = world.lifecycle.rename("a", "b").await;

    assert!(
        matches!(result, Err(MinionError::RunningConflict { ref state, .. }) if state == "running"),
        "{result:?}"
    );
    assert!(world.workspace("a").is_dir());
    assert!(!world.workspace("b").exists());
}

#[tokio::test]
async fn rename_conflicts_while_paused() {
    let world = World::new();
    world.running("a").await;
    world.lifecycle.pause("a").await.unwrap();

    let result = world.lifecycle.rename("a", "b").await;

    assert!(
        matches!(result, Err(MinionError::RunningConflict { ref state, .. }) if state == "paused"),
        "{result:?}"
    );
}

#[tokio::test]
async fn rename_stopped_moves_workspace_and_mailbox() {
    let world = World::new();
    let running = world.running("a").await;
    let handle = running.sandbox.unwrap();
    world.create("peer").await;
    world.mailbox.send("peer", "a", "ping").unwrap();
    world.sandbox.set_status(&handle, "exited");

    let renamed = world.lifecycle.rename("a", "b").await.unwrap();

    assert_eq!(renamed.name.as_str(), "b");
    assert_eq!(renamed.renamed_from.as_ref().map(|n| n.as_str()), Some("a"));
    assert!(renamed.renamed_at_ms.is_some());
    assert!(renamed.sandbox.is_none());
    assert!(!world.workspace("a").exists());
    assert!(!world.mailbox_dir("a").exists());
    assert_eq!(world.lifecycle.task("b").unwrap(), "task for a");

    let inbox = world.mailbox.inbox("b").unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].body, "ping");
    // The stopped container carried the old name and is gone
    assert!(world.sandbox.get_sandbox(&handle).is_none());
}

#[tokio::test]
async fn rename_pending_minion() {
    let world = World::new();
    world.create("a").await;

    let renamed = world.lifecycle.rename("a", "b").await.unwrap();

    assert_eq!(renamed.status, LifecycleStatus::Pending);
    assert!(world.workspace("b").is_dir());
    assert!(world.sandbox.calls().is_empty());
}

#[tokio::test]
async fn rename_onto_existing_name_fails() {
    let world = World::new();
    world.create("a").await;
    world.create("b").await;

    let result = world.lifecycle.rename("a", "b").await;

    assert!(matches!(result, Err(MinionError::AlreadyExists(_))), "{result:?}");
    assert_eq!(world.lifecycle.task("a").unwrap(), "task for a");
}

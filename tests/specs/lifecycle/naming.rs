//! Minion name validation specs
//!
//! Names are the only identity a minion has; every operation that introduces
//! a name must reject invalid ones before touching state.

use crate::prelude::*;

const VALID: &[&str] = &["a", "A1", "scout-7", "build_v2.1", "0day", "x.y-z_w"];

const INVALID: &[&str] = &[
    "has space",
    ".hidden",
    "-flag",
    "user@host",
    "a/b",
    "cost$",
    "",
];

fn too_long() -> String {
    "n".repeat(129)
}

#[tokio::test]
async fn valid_names_create_exactly_once() {
    let world = World::new();
    for name in VALID {
        world.create(name).await;
        let second = world
            .lifecycle
            .create(name, "again", &CreateOptions::default())
            .await;
        assert!(
            matches!(second, Err(MinionError::AlreadyExists(ref n)) if n == name),
            "{name}: {second:?}"
        );
    }
}

#[tokio::test]
async fn longest_name_is_accepted() {
    let world = World::new();
    let name = "n".repeat(128);
    world.create(&name).await;
    assert!(world.workspace(&name).is_dir());
}

#[tokio::test]
async fn invalid_names_are_rejected_by_create() {
    let world = World::new();
    let long = too_long();
    for name in INVALID.iter().copied().chain([long.as_str()]) {
        let result = world
            .lifecycle
            .create(name, "task", &CreateOptions::default())
            .await;
        assert!(
            matches!(result, Err(MinionError::InvalidName(_))),
            "{name:?}: {result:?}"
        );
    }
    assert!(world.lifecycle.store().names().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_names_are_rejected_by_rename_and_clone() {
    let world = World::new();
    world.create("source").await;
    let long = too_long();

    for name in INVALID.iter().copied().chain([long.as_str()]) {
        let renamed = world.lifecycle.rename("source", name).await;
        assert!(
            matches!(renamed, Err(MinionError::InvalidName(_))),
            "rename to {name:?}: {renamed:?}"
        );

        let cloned = world
            .lifecycle
            .clone_minion("source", name, &CloneOptions::default());
        assert!(
            matches!(cloned, Err(MinionError::InvalidName(_))),
            "clone to {name:?}: {cloned:?}"
        );
    }
    assert_eq!(world.status("source"), LifecycleStatus::Pending);
}

#[tokio::test]
async fn waiting_minion_requires_existing_dependency() {
    let world = World::new();
    let result = world.lifecycle.create_waiting(
        "b",
        "task",
        "ghost",
        &CreateOptions::default(),
    );
    assert!(matches!(result, Err(MinionError::NotFound { .. })), "{result:?}");
    assert!(!world.workspace("b").exists());
}

//! Prune specs
//!
//! Only minions with a terminal signal are candidates; age is measured from
//! the current attempt's creation time.

use crate::prelude::*;

/// Two finished minions, eight days apart, plus one still working.
async fn aged_world() -> World {
    let world = World::new();
    world.running("old").await;
    world.signal("old", TaskStatus::Complete);
    world.create("old-working").await;
    world.signal("old-working", TaskStatus::Working);

    world.clock.advance(8 * DAY);

    world.running("fresh").await;
    world.signal("fresh", TaskStatus::Failed);
    world
}

#[tokio::test]
async fn prune_older_than_removes_only_old_terminal() {
    let world = aged_world().await;

    let pruned = world
        .lifecycle
        .prune(&PruneOptions::older_than("7d").unwrap())
        .await
        .unwrap();

    assert_eq!(names(&pruned), vec!["old"]);
    assert!(!world.workspace("old").exists());
    assert!(world.workspace("old-working").is_dir());
    assert!(world.workspace("fresh").is_dir());
}

#[tokio::test]
async fn prune_dry_run_reports_same_selection() {
    let world = aged_world().await;

    let preview = world
        .lifecycle
        .prune(&PruneOptions::older_than("7d").unwrap().dry_run())
        .await
        .unwrap();

    assert_eq!(names(&preview), vec!["old"]);
    assert!(world.workspace("old").is_dir());
    assert_eq!(world.sandbox.sandbox_count(), 2);

    let pruned = world
        .lifecycle
        .prune(&PruneOptions::older_than("7d").unwrap())
        .await
        .unwrap();
    assert_eq!(pruned, preview);
}

#[tokio::test]
async fn prune_all_ignores_age_but_not_signal() {
    let world = aged_world().await;

    let pruned = world.lifecycle.prune(&PruneOptions::all()).await.unwrap();

    assert_eq!(names(&pruned), vec!["fresh", "old"]);
    assert_eq!(world.sandbox.sandbox_count(), 0);
    assert_eq!(
        world.lifecycle.store().names().unwrap(),
        vec!["old-working".to_string()]
    );
}

#[test]
fn prune_rejects_bad_age() {
    for age in ["", "7", "d", "7w", "-1d"] {
        assert!(
            matches!(
                PruneOptions::older_than(age),
                Err(MinionError::InvalidAgeFormat(_))
            ),
            "{age:?}"
        );
    }
}

//! Registry query specs
//!
//! Views join the stored record, the worker's signal, the mailbox and what
//! the runtime reports.

use crate::prelude::*;

async fn busy_world() -> World {
    let world = World::new();
    world.running("alpha").await;
    world.create("beta").await;
    world.waiting("gamma", "alpha");
    world.signal("alpha", TaskStatus::Working);
    world.mailbox.send("beta", "alpha", "status?").unwrap();
    world.clock.advance(Duration::from_secs(2 * 60 * 60));
    world
}

#[tokio::test]
async fn list_serializes_for_display() {
    let world = busy_world().await;

    let views = world.registry.list().await.unwrap();
    let json = serde_json::to_value(&views).unwrap();

    similar_asserts::assert_eq!(
        json[0],
        serde_json::json!({
            "name": "alpha",
            "status": "running",
            "task_status": "WORKING",
            "runtime": "running",
            "depends_on": null,
            "task": "task for alpha",
            "age": "2h",
            "unread": 1,
        })
    );
    assert_eq!(json[2]["status"], "waiting");
    assert_eq!(json[2]["depends_on"], "alpha");
    assert_eq!(json[1]["runtime"], "none");
}

#[tokio::test]
async fn report_counts_by_status_signal_and_mail() {
    let world = busy_world().await;

    let report = world.registry.report().await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.by_status.get(&LifecycleStatus::Running), Some(&1));
    assert_eq!(report.by_status.get(&LifecycleStatus::Pending), Some(&1));
    assert_eq!(report.by_status.get(&LifecycleStatus::Waiting), Some(&1));
    assert_eq!(report.by_task_status.get("WORKING"), Some(&1));
    assert_eq!(report.by_task_status.get("NONE"), Some(&2));
    assert_eq!(report.unread_messages, 1);
}

#[tokio::test]
async fn search_matches_name_or_task() {
    let world = busy_world().await;

    let by_name: Vec<_> = world
        .registry
        .search("GAM")
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.name.to_string())
        .collect();
    assert_eq!(by_name, vec!["gamma"]);

    let by_task = world.registry.search("task for").await.unwrap();
    assert_eq!(by_task.len(), 2);
    assert!(world.registry.search("nothing").await.unwrap().is_empty());
}

#[tokio::test]
async fn status_of_running_minion_includes_runtime_detail() {
    let world = busy_world().await;
    let handle = world.lifecycle.get("alpha").unwrap().sandbox.unwrap();
    world.sandbox.set_logs(&handle, "boot\nworking\n");

    let status = world.registry.status("alpha").await.unwrap();

    assert_eq!(status.view.runtime, "running");
    assert!(status.stats.is_some());
    assert_eq!(status.log_tail, "boot\nworking");
}

#[tokio::test]
async fn status_after_external_removal() {
    let world = busy_world().await;
    let handle = world.lifecycle.get("alpha").unwrap().sandbox.unwrap();
    world.sandbox.remove_externally(&handle);

    let status = world.registry.status("alpha").await.unwrap();

    assert_eq!(status.view.runtime, "removed");
    assert_eq!(status.view.status, LifecycleStatus::Running);
    assert!(status.stats.is_none());
}

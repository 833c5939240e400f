//! Mailbox specs
//!
//! Messages are durable per-recipient records, returned in send order.

use crate::prelude::*;

async fn world_with(names: &[&str]) -> World {
    let world = World::new();
    for name in names {
        world.create(name).await;
    }
    world
}

#[tokio::test]
async fn send_then_inbox_returns_the_message() {
    let world = world_with(&["a", "b"]).await;

    let sent = world.mailbox.send("a", "b", "hello").unwrap();
    let inbox = world.mailbox.inbox("b").unwrap();

    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].from.as_str(), "a");
    assert_eq!(inbox[0].to.as_str(), "b");
    assert_eq!(inbox[0].body, "hello");
    assert_eq!(inbox[0].id, sent.id);
    assert!(world.mailbox.inbox("a").unwrap().is_empty());
}

#[tokio::test]
async fn inbox_preserves_send_order_across_senders() {
    let world = world_with(&["a", "b", "c", "inbox"]).await;
    let senders = ["a", "b", "c"];

    let expected: Vec<String> = (0..12).map(|i| format!("msg {i}")).collect();
    for (i, body) in expected.iter().enumerate() {
        world
            .mailbox
            .send(senders[i % senders.len()], "inbox", body)
            .unwrap();
    }

    let bodies: Vec<String> = world
        .mailbox
        .inbox("inbox")
        .unwrap()
        .into_iter()
        .map(|m| m.body)
        .collect();
    similar_asserts::assert_eq!(bodies, expected);
}

#[tokio::test]
async fn clear_reports_count_and_is_idempotent() {
    let world = world_with(&["a", "b"]).await;
    for i in 0..5 {
        world.mailbox.send("a", "b", &format!("{i}")).unwrap();
    }

    assert_eq!(world.mailbox.count("b").unwrap(), 5);
    assert_eq!(world.mailbox.clear("b").unwrap(), 5);
    assert!(world.mailbox.inbox("b").unwrap().is_empty());
    assert_eq!(world.mailbox.clear("b").unwrap(), 0);
}

#[tokio::test]
async fn broadcast_reaches_everyone_but_the_sender() {
    let names = ["a", "b", "c", "d"];
    let world = world_with(&names).await;

    let sent = world.mailbox.broadcast("a", "all hands").unwrap();

    assert_eq!(sent.len(), names.len() - 1);
    assert!(world.mailbox.inbox("a").unwrap().is_empty());
    for name in &names[1..] {
        let inbox = world.mailbox.inbox(name).unwrap();
        assert_eq!(inbox.len(), 1, "{name}");
        assert_eq!(inbox[0].body, "all hands");
    }
}

#[tokio::test]
async fn unknown_parties_are_rejected() {
    let world = world_with(&["a"]).await;

    assert!(matches!(
        world.mailbox.send("ghost", "a", "x"),
        Err(MinionError::NotFound { .. })
    ));
    assert!(matches!(
        world.mailbox.send("a", "ghost", "x"),
        Err(MinionError::NotFound { .. })
    ));
    assert!(!world.mailbox_dir("ghost").exists());
}

#[tokio::test]
async fn messages_survive_a_new_mailbox_instance() {
    let world = world_with(&["a", "b"]).await;
    world.mailbox.send("a", "b", "persisted").unwrap();

    let reopened = Mailbox::new(FsStore::new(world.root()), FakeClock::new());
    let inbox = reopened.inbox("b").unwrap();

    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].body, "persisted");
    let files = std::fs::read_dir(world.mailbox_dir("b")).unwrap().count();
    assert_eq!(files, 1);
}

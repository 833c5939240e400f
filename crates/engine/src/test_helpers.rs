// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use crate::{CreateOptions, LifecycleConfig, LifecycleManager, Mailbox, StartOptions};
use mn_adapters::FakeSandboxAdapter;
use mn_core::{FakeClock, Minion, TaskStatus};
use mn_storage::{MemStore, MinionStore};

/// Convenience alias for the fully-typed test lifecycle manager.
pub(crate) type TestLifecycle = LifecycleManager<MemStore, FakeSandboxAdapter, FakeClock>;

/// Test context holding the manager, its fakes, and a mailbox over the same store.
pub(crate) struct TestContext {
    pub lifecycle: TestLifecycle,
    pub mailbox: Mailbox<MemStore, FakeClock>,
    pub sandbox: FakeSandboxAdapter,
    pub clock: FakeClock,
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemStore::new();
        let sandbox = FakeSandboxAdapter::new();
        let clock = FakeClock::new();
        Self {
            lifecycle: LifecycleManager::new(
                store.clone(),
                sandbox.clone(),
                clock.clone(),
                LifecycleConfig::default(),
            ),
            mailbox: Mailbox::new(store, clock.clone()),
            sandbox,
            clock,
        }
    }

    pub fn minions(&self) -> &MinionStore<MemStore> {
        self.lifecycle.store()
    }

    /// Create a pending minion with the task `"do {name}"`.
    pub async fn pending(&self, name: &str) -> Minion {
        self.lifecycle
            .create(name, &format!("do {name}"), &CreateOptions::default())
            .await
            .unwrap()
    }

    /// Create and start a minion.
    pub async fn running(&self, name: &str) -> Minion {
        self.pending(name).await;
        self.lifecycle
            .start(name, &StartOptions::default())
            .await
            .unwrap()
    }

    pub fn waiting(&self, name: &str, depends_on: &str) -> Minion {
        self.lifecycle
            .create_waiting(
                name,
                &format!("do {name}"),
                depends_on,
                &CreateOptions::default(),
            )
            .unwrap()
    }

    /// Stand in for the worker process reporting its status.
    pub fn signal(&self, name: &str, status: TaskStatus) {
        self.minions().write_signal(name, status).unwrap();
    }

    pub fn status(&self, name: &str) -> mn_core::LifecycleStatus {
        self.lifecycle.get(name).unwrap().status
    }
}

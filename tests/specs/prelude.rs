//! Test helpers for behavioral specifications.
//!
//! A [`World`] is one isolated state directory with every engine component
//! wired over it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
pub use std::time::Duration;

pub use mn_adapters::{FakeSandboxAdapter, SandboxCall};
pub use mn_core::{Clock, FakeClock, LifecycleStatus, Minion, TaskStatus};
pub use mn_engine::{
    CloneMode, CloneOptions, CreateOptions, DependencyScheduler, LifecycleConfig,
    LifecycleManager, Mailbox, MinionError, PassReport, PruneOptions, Registry, StartOptions,
    WaitOptions, WaitOutcome,
};
pub use mn_storage::FsStore;

pub type SpecLifecycle = LifecycleManager<FsStore, FakeSandboxAdapter, FakeClock>;

pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

pub struct World {
    dir: tempfile::TempDir,
    pub sandbox: FakeSandboxAdapter,
    pub clock: FakeClock,
    pub lifecycle: SpecLifecycle,
    pub mailbox: Mailbox<FsStore, FakeClock>,
    pub scheduler: DependencyScheduler<FsStore, FakeSandboxAdapter, FakeClock>,
    pub registry: Registry<FsStore, FakeSandboxAdapter, FakeClock>,
}

impl World {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = FakeSandboxAdapter::new();
        let clock = FakeClock::new();
        let store = FsStore::new(dir.path());
        let lifecycle = LifecycleManager::new(
            store.clone(),
            sandbox.clone(),
            clock.clone(),
            LifecycleConfig::default(),
        );
        Self {
            mailbox: Mailbox::new(store, clock.clone()),
            scheduler: DependencyScheduler::new(lifecycle.clone()),
            registry: Registry::new(lifecycle.clone()),
            lifecycle,
            sandbox,
            clock,
            dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn workspace(&self, name: &str) -> PathBuf {
        self.root().join("minions").join(name)
    }

    pub fn mailbox_dir(&self, name: &str) -> PathBuf {
        self.root().join("mailbox").join(name)
    }

    /// Create a pending minion.
    pub async fn create(&self, name: &str) -> Minion {
        self.lifecycle
            .create(name, &format!("task for {name}"), &CreateOptions::default())
            .await
            .unwrap()
    }

    /// Create and start a minion.
    pub async fn running(&self, name: &str) -> Minion {
        self.create(name).await;
        self.lifecycle
            .start(name, &StartOptions::default())
            .await
            .unwrap()
    }

    pub fn waiting(&self, name: &str, dep: &str) -> Minion {
        self.lifecycle
            .create_waiting(name, "task", dep, &CreateOptions::default())
            .unwrap()
    }

    /// Stand in for the worker process writing its terminal signal.
    pub fn signal(&self, name: &str, status: TaskStatus) {
        self.lifecycle
            .store()
            .write_signal(name, status)
            .unwrap();
    }

    pub fn status(&self, name: &str) -> LifecycleStatus {
        self.lifecycle.get(name).unwrap().status
    }

    pub async fn promote(&self) -> PassReport {
        self.scheduler
            .check_and_promote(&StartOptions::default())
            .await
            .unwrap()
    }
}

/// Names in a pass report, as plain strings.
pub fn names(list: &[mn_core::MinionName]) -> Vec<&str> {
    list.iter().map(|n| n.as_str()).collect()
}

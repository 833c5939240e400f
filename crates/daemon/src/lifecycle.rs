// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: configuration, single-instance lock, wiring.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use fs2::FileExt;
use mn_adapters::{DockerAdapter, DockerConfig, SandboxAdapter, TracedSandbox};
use mn_core::SystemClock;
use mn_engine::{DependencyScheduler, LifecycleConfig, LifecycleManager, StartOptions};
use mn_storage::FsStore;
use thiserror::Error;
use tracing::{info, warn};

use crate::env;

/// Sandbox adapter used by the daemon (wrapped with tracing)
pub type DaemonSandbox = TracedSandbox<DockerAdapter>;

pub type DaemonScheduler = DependencyScheduler<FsStore, DaemonSandbox, SystemClock>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/minions)
    pub state_dir: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    pub watch_interval: Duration,
    pub docker: DockerConfig,
    /// Applied to every minion the scheduler promotes
    pub start: StartOptions,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self, DaemonError> {
        let state_dir = env::state_dir()?;
        let mut docker = DockerConfig::default();
        if let Some(image) = env::image() {
            docker.image = image;
        }
        if let Some(binary) = env::docker_binary() {
            docker.binary = binary;
        }

        Ok(Self {
            lock_path: state_dir.join("mnd.pid"),
            log_path: state_dir.join("logs").join("mnd.log"),
            watch_interval: env::watch_interval(),
            docker,
            start: StartOptions {
                credential: env::credential(),
                keep_alive: env::keep_alive(),
                ..StartOptions::default()
            },
            state_dir,
        })
    }
}

/// Daemon errors
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Running daemon state.
pub struct Daemon {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub scheduler: DaemonScheduler,
}

/// Take the lock and write our PID into it.
pub fn acquire_lock(config: &Config) -> Result<File, DaemonError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Open without truncating so a running daemon's PID survives a failed attempt
    let mut lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(DaemonError::LockFailed)?;

    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    Ok(lock_file)
}

/// Build the scheduler over the given sandbox adapter.
pub fn build_scheduler<A: SandboxAdapter>(
    config: &Config,
    adapter: A,
) -> DependencyScheduler<FsStore, A, SystemClock> {
    let lifecycle = LifecycleManager::new(
        FsStore::new(&config.state_dir),
        adapter,
        SystemClock,
        LifecycleConfig::default(),
    );
    DependencyScheduler::new(lifecycle)
}

/// Start the daemon
pub async fn startup(config: Config) -> Result<Daemon, DaemonError> {
    let lock_file = acquire_lock(&config)?;

    let adapter = TracedSandbox::new(DockerAdapter::new(config.docker.clone()));
    if !adapter.image_exists().await {
        warn!(
            image = %config.docker.image,
            "sandbox image not found; promotions will fail until it is built"
        );
    }

    let scheduler = build_scheduler(&config, adapter);
    let minions = scheduler.lifecycle().store().names().map(|n| n.len());
    match minions {
        Ok(count) => info!(count, state_dir = %config.state_dir.display(), "registry loaded"),
        Err(e) => warn!(error = %e, "failed to list registry"),
    }

    Ok(Daemon {
        config,
        lock_file,
        scheduler,
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

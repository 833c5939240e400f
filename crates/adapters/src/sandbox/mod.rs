// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox runtime adapters

mod docker;

pub use docker::{DockerAdapter, DockerConfig};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSandbox, FakeSandboxAdapter, SandboxCall};

use async_trait::async_trait;
use mn_core::{ResourceLimits, SandboxHandle};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from sandbox operations
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("sandbox not found: {0}")]
    NotFound(String),
    #[error("image not found: {0}")]
    ImageMissing(String),
    #[error("start failed: {0}")]
    StartFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Everything the runtime needs to launch one minion's sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxSpec {
    /// Minion name; the runtime derives the sandbox name from it
    pub name: String,
    /// Host directory mounted as the minion's private workspace
    pub workspace: PathBuf,
    pub env: Vec<(String, String)>,
    pub limits: ResourceLimits,
}

/// Point-in-time resource usage, as reported by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxStats {
    pub cpu_percent: String,
    pub mem_usage: String,
    pub mem_percent: String,
    pub net_io: String,
    pub block_io: String,
    pub pids: String,
}

/// Adapter for the external sandbox runtime (docker, etc.)
///
/// The orchestrator never touches sandboxes directly; every start, stop and
/// query goes through this contract.
#[async_trait]
pub trait SandboxAdapter: Clone + Send + Sync + 'static {
    /// Whether the configured image is available locally
    async fn image_exists(&self) -> bool;

    /// Launch a sandbox bound to `spec.workspace`
    async fn start(&self, spec: &SandboxSpec) -> Result<SandboxHandle, SandboxError>;

    async fn stop(&self, handle: &SandboxHandle) -> Result<(), SandboxError>;

    async fn remove(&self, handle: &SandboxHandle) -> Result<(), SandboxError>;

    async fn pause(&self, handle: &SandboxHandle) -> Result<(), SandboxError>;

    async fn unpause(&self, handle: &SandboxHandle) -> Result<(), SandboxError>;

    async fn restart(&self, handle: &SandboxHandle) -> Result<(), SandboxError>;

    /// Runtime-reported state (`running`, `paused`, `exited`, ...).
    ///
    /// Fails with `NotFound` if the sandbox no longer exists.
    async fn inspect_status(&self, handle: &SandboxHandle) -> Result<String, SandboxError>;

    /// Last `tail` lines of the sandbox's output
    async fn logs(&self, handle: &SandboxHandle, tail: u32) -> Result<String, SandboxError>;

    /// Current resource usage. Fails if the sandbox is not running.
    async fn stats(&self, handle: &SandboxHandle) -> Result<SandboxStats, SandboxError>;
}

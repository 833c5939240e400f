// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake sandbox adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{SandboxAdapter, SandboxError, SandboxSpec, SandboxStats};
use async_trait::async_trait;
use mn_core::SandboxHandle;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Recorded sandbox call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SandboxCall {
    ImageExists,
    Start { spec: SandboxSpec },
    Stop { handle: SandboxHandle },
    Remove { handle: SandboxHandle },
    Pause { handle: SandboxHandle },
    Unpause { handle: SandboxHandle },
    Restart { handle: SandboxHandle },
    InspectStatus { handle: SandboxHandle },
    Logs { handle: SandboxHandle, tail: u32 },
    Stats { handle: SandboxHandle },
}

impl SandboxCall {
    /// Operation name, as accepted by [`FakeSandboxAdapter::fail_op`]
    pub fn op(&self) -> &'static str {
        match self {
            SandboxCall::ImageExists => "image_exists",
            SandboxCall::Start { .. } => "start",
            SandboxCall::Stop { .. } => "stop",
            SandboxCall::Remove { .. } => "remove",
            SandboxCall::Pause { .. } => "pause",
            SandboxCall::Unpause { .. } => "unpause",
            SandboxCall::Restart { .. } => "restart",
            SandboxCall::InspectStatus { .. } => "inspect_status",
            SandboxCall::Logs { .. } => "logs",
            SandboxCall::Stats { .. } => "stats",
        }
    }
}

/// Fake sandbox state
#[derive(Debug, Clone)]
pub struct FakeSandbox {
    pub spec: SandboxSpec,
    /// Runtime status string (`running`, `paused`, `exited`)
    pub status: String,
    pub logs: String,
    pub stats: SandboxStats,
}

struct FakeSandboxState {
    sandboxes: HashMap<String, FakeSandbox>,
    calls: Vec<SandboxCall>,
    next_id: u64,
    image_exists: bool,
    failing_ops: HashSet<&'static str>,
    failing_starts: HashSet<String>,
}

/// Fake sandbox adapter for testing
#[derive(Clone)]
pub struct FakeSandboxAdapter {
    inner: Arc<Mutex<FakeSandboxState>>,
}

impl Default for FakeSandboxAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeSandboxState {
                sandboxes: HashMap::new(),
                calls: Vec::new(),
                next_id: 0,
                image_exists: true,
                failing_ops: HashSet::new(),
                failing_starts: HashSet::new(),
            })),
        }
    }
}

impl FakeSandboxAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SandboxCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Get a sandbox by handle
    pub fn get_sandbox(&self, handle: &SandboxHandle) -> Option<FakeSandbox> {
        self.inner.lock().sandboxes.get(handle.as_str()).cloned()
    }

    /// Number of sandboxes that exist (in any status)
    pub fn sandbox_count(&self) -> usize {
        self.inner.lock().sandboxes.len()
    }

    /// Handle of the sandbox started for `minion`, if it still exists
    pub fn handle_for(&self, minion: &str) -> Option<SandboxHandle> {
        self.inner
            .lock()
            .sandboxes
            .iter()
            .find(|(_, sb)| sb.spec.name == minion)
            .map(|(id, _)| SandboxHandle::new(id.clone()))
    }

    pub fn set_image_exists(&self, exists: bool) {
        self.inner.lock().image_exists = exists;
    }

    /// Make every call of `op` fail with `CommandFailed` until cleared
    pub fn fail_op(&self, op: &'static str) {
        self.inner.lock().failing_ops.insert(op);
    }

    /// Make `start` fail for one minion only
    pub fn fail_start_for(&self, minion: &str) {
        self.inner.lock().failing_starts.insert(minion.to_string());
    }

    pub fn clear_failures(&self) {
        let mut inner = self.inner.lock();
        inner.failing_ops.clear();
        inner.failing_starts.clear();
    }

    /// Simulate the runtime losing a sandbox behind the orchestrator's back
    pub fn remove_externally(&self, handle: &SandboxHandle) {
        self.inner.lock().sandboxes.remove(handle.as_str());
    }

    pub fn set_status(&self, handle: &SandboxHandle, status: &str) {
        if let Some(sb) = self.inner.lock().sandboxes.get_mut(handle.as_str()) {
            sb.status = status.to_string();
        }
    }

    pub fn set_logs(&self, handle: &SandboxHandle, logs: &str) {
        if let Some(sb) = self.inner.lock().sandboxes.get_mut(handle.as_str()) {
            sb.logs = logs.to_string();
        }
    }

    pub fn set_stats(&self, handle: &SandboxHandle, stats: SandboxStats) {
        if let Some(sb) = self.inner.lock().sandboxes.get_mut(handle.as_str()) {
            sb.stats = stats;
        }
    }

    /// Record `call`, then apply `f` to the state unless the op is set to fail
    fn record<T>(
        &self,
        call: SandboxCall,
        f: impl FnOnce(&mut FakeSandboxState) -> Result<T, SandboxError>,
    ) -> Result<T, SandboxError> {
        let mut inner = self.inner.lock();
        let op = call.op();
        inner.calls.push(call);
        if inner.failing_ops.contains(op) {
            return Err(SandboxError::CommandFailed(format!("injected {} failure", op)));
        }
        f(&mut inner)
    }
}

fn lookup<'a>(
    state: &'a mut FakeSandboxState,
    handle: &SandboxHandle,
) -> Result<&'a mut FakeSandbox, SandboxError> {
    state
        .sandboxes
        .get_mut(handle.as_str())
        .ok_or_else(|| SandboxError::NotFound(handle.to_string()))
}

/// Move a sandbox from `from` to `to`, failing like the runtime would otherwise
fn transition(
    state: &mut FakeSandboxState,
    handle: &SandboxHandle,
    from: &str,
    to: &str,
) -> Result<(), SandboxError> {
    let sb = lookup(state, handle)?;
    if sb.status != from {
        return Err(SandboxError::CommandFailed(format!(
            "container {} is {}, not {}",
            handle, sb.status, from
        )));
    }
    sb.status = to.to_string();
    Ok(())
}

#[async_trait]
impl SandboxAdapter for FakeSandboxAdapter {
    async fn image_exists(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.calls.push(SandboxCall::ImageExists);
        inner.image_exists && !inner.failing_ops.contains("image_exists")
    }

    async fn start(&self, spec: &SandboxSpec) -> Result<SandboxHandle, SandboxError> {
        self.record(SandboxCall::Start { spec: spec.clone() }, |state| {
            if !state.image_exists {
                return Err(SandboxError::ImageMissing("fake:latest".to_string()));
            }
            if state.failing_starts.contains(&spec.name) {
                return Err(SandboxError::StartFailed(format!(
                    "injected start failure for {}",
                    spec.name
                )));
            }
            state.next_id += 1;
            let id = format!("fake-{}", state.next_id);
            state.sandboxes.insert(
                id.clone(),
                FakeSandbox {
                    spec: spec.clone(),
                    status: "running".to_string(),
                    logs: String::new(),
                    stats: SandboxStats::default(),
                },
            );
            Ok(SandboxHandle::new(id))
        })
    }

    async fn stop(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        self.record(
            SandboxCall::Stop {
                handle: handle.clone(),
            },
            |state| {
                lookup(state, handle)?.status = "exited".to_string();
                Ok(())
            },
        )
    }

    async fn remove(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        self.record(
            SandboxCall::Remove {
                handle: handle.clone(),
            },
            |state| match state.sandboxes.remove(handle.as_str()) {
                Some(_) => Ok(()),
                None => Err(SandboxError::NotFound(handle.to_string())),
            },
        )
    }

    async fn pause(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        self.record(
            SandboxCall::Pause {
                handle: handle.clone(),
            },
            |state| transition(state, handle, "running", "paused"),
        )
    }

    async fn unpause(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        self.record(
            SandboxCall::Unpause {
                handle: handle.clone(),
            },
            |state| transition(state, handle, "paused", "running"),
        )
    }

    async fn restart(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        self.record(
            SandboxCall::Restart {
                handle: handle.clone(),
            },
            |state| {
                lookup(state, handle)?.status = "running".to_string();
                Ok(())
            },
        )
    }

    async fn inspect_status(&self, handle: &SandboxHandle) -> Result<String, SandboxError> {
        self.record(
            SandboxCall::InspectStatus {
                handle: handle.clone(),
            },
            |state| Ok(lookup(state, handle)?.status.clone()),
        )
    }

    async fn logs(&self, handle: &SandboxHandle, tail: u32) -> Result<String, SandboxError> {
        self.record(
            SandboxCall::Logs {
                handle: handle.clone(),
                tail,
            },
            |state| {
                let sb = lookup(state, handle)?;
                let lines: Vec<&str> = sb.logs.lines().collect();
                let start = lines.len().saturating_sub(tail as usize);
                Ok(lines[start..].join("\n"))
            },
        )
    }

    async fn stats(&self, handle: &SandboxHandle) -> Result<SandboxStats, SandboxError> {
        self.record(
            SandboxCall::Stats {
                handle: handle.clone(),
            },
            |state| {
                let sb = lookup(state, handle)?;
                if sb.status != "running" {
                    return Err(SandboxError::CommandFailed(format!(
                        "container {} is not running",
                        handle
                    )));
                }
                Ok(sb.stats.clone())
            },
        )
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

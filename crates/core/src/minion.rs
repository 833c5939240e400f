// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The minion metadata record and its state invariants.
//!
//! `LifecycleStatus` is owned by the lifecycle manager. `TaskStatus` is the
//! terminal signal written by the worker process itself; it is never stored in
//! the metadata record, only read from the signal file.

use crate::id::SandboxHandle;
use crate::name::MinionName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Characters of task text kept in the metadata preview.
pub const TASK_PREVIEW_CHARS: usize = 200;

/// Lifecycle state of a minion, as seen by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    /// Created, not yet started
    Pending,
    /// Created with a dependency; started by the scheduler once it completes
    Waiting,
    /// Sandbox started
    Running,
    /// Sandbox paused
    Paused,
    /// Sandbox torn down by an explicit kill
    Killed,
}

impl LifecycleStatus {
    /// Whether `start` may be called from this state.
    pub fn is_startable(self) -> bool {
        matches!(self, LifecycleStatus::Pending | LifecycleStatus::Waiting)
    }

    /// Whether the status requires a live sandbox handle.
    pub fn is_live(self) -> bool {
        matches!(self, LifecycleStatus::Running | LifecycleStatus::Paused)
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifecycleStatus::Pending => "pending",
            LifecycleStatus::Waiting => "waiting",
            LifecycleStatus::Running => "running",
            LifecycleStatus::Paused => "paused",
            LifecycleStatus::Killed => "killed",
        };
        f.write_str(s)
    }
}

/// Task outcome reported by the worker process through its signal file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Starting,
    Working,
    Complete,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Complete | TaskStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Starting => "STARTING",
            TaskStatus::Working => "WORKING",
            TaskStatus::Complete => "COMPLETE",
            TaskStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Parses signal file content. Surrounding whitespace is ignored; matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "STARTING" => Ok(TaskStatus::Starting),
            "WORKING" => Ok(TaskStatus::Working),
            "COMPLETE" => Ok(TaskStatus::Complete),
            "FAILED" => Ok(TaskStatus::Failed),
            other => Err(format!("unknown task status: {other:?}")),
        }
    }
}

/// Memory and CPU constraints handed to the sandbox runtime.
///
/// Values are passed through verbatim (e.g. `"2g"`, `"1.5"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpus: Option<String>,
}

impl ResourceLimits {
    pub fn is_empty(&self) -> bool {
        self.memory.is_none() && self.cpus.is_none()
    }

    /// Field-wise override: values set in `self` win, unset fields fall back to `stored`.
    pub fn or(self, stored: &ResourceLimits) -> ResourceLimits {
        ResourceLimits {
            memory: self.memory.or_else(|| stored.memory.clone()),
            cpus: self.cpus.or_else(|| stored.cpus.clone()),
        }
    }
}

/// A broken state invariant, caught before the record is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("minion {0} is {1} but has no sandbox handle")]
    LiveWithoutSandbox(String, LifecycleStatus),
    #[error("minion {0} is waiting but has no dependency")]
    WaitingWithoutDependency(String),
    #[error("minion {0} is waiting but already has a sandbox")]
    WaitingWithSandbox(String),
    #[error("minion {0} depends on itself")]
    SelfDependency(String),
    #[error("task preview of {0} exceeds {TASK_PREVIEW_CHARS} characters")]
    PreviewTooLong(String),
}

/// Persisted metadata for one minion.
///
/// Timestamps are epoch milliseconds. Audit stamps are set by the matching
/// transition and never cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Minion {
    pub name: MinionName,
    pub created_at_ms: u64,
    /// First [`TASK_PREVIEW_CHARS`] characters of the task; the full text lives in its own file
    pub task: String,
    pub status: LifecycleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<MinionName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<SandboxHandle>,
    #[serde(default, skip_serializing_if = "ResourceLimits::is_empty")]
    pub limits: ResourceLimits,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub killed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restarted_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retried_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloned_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_at_ms: Option<u64>,

    /// `created_at_ms` of the attempt the latest retry replaced. Earlier
    /// attempts are not kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_created_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloned_from: Option<MinionName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_from: Option<MinionName>,
}

impl Minion {
    /// New `pending` record.
    pub fn new(name: MinionName, task: &str, limits: ResourceLimits, created_at_ms: u64) -> Self {
        Self {
            name,
            created_at_ms,
            task: task_preview(task),
            status: LifecycleStatus::Pending,
            depends_on: None,
            sandbox: None,
            limits,
            started_at_ms: None,
            killed_at_ms: None,
            paused_at_ms: None,
            resumed_at_ms: None,
            restarted_at_ms: None,
            retried_at_ms: None,
            renamed_at_ms: None,
            cloned_at_ms: None,
            imported_at_ms: None,
            previous_created_at_ms: None,
            cloned_from: None,
            renamed_from: None,
        }
    }

    /// New `waiting` record chained behind `depends_on`.
    pub fn waiting(
        name: MinionName,
        task: &str,
        depends_on: MinionName,
        limits: ResourceLimits,
        created_at_ms: u64,
    ) -> Self {
        Self {
            status: LifecycleStatus::Waiting,
            depends_on: Some(depends_on),
            ..Self::new(name, task, limits, created_at_ms)
        }
    }

    /// Replace the task preview from the full task text.
    pub fn set_task(&mut self, task: &str) {
        self.task = task_preview(task);
    }

    /// Milliseconds since creation, saturating at zero for clock skew.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }

    /// Check the status/handle/dependency invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let name = self.name.to_string();
        if self.status.is_live() && self.sandbox.is_none() {
            return Err(InvariantViolation::LiveWithoutSandbox(name, self.status));
        }
        if self.status == LifecycleStatus::Waiting {
            if self.depends_on.is_none() {
                return Err(InvariantViolation::WaitingWithoutDependency(name));
            }
            if self.sandbox.is_some() {
                return Err(InvariantViolation::WaitingWithSandbox(name));
            }
        }
        if self.depends_on.as_ref() == Some(&self.name) {
            return Err(InvariantViolation::SelfDependency(name));
        }
        if self.task.chars().count() > TASK_PREVIEW_CHARS {
            return Err(InvariantViolation::PreviewTooLong(name));
        }
        Ok(())
    }
}

fn task_preview(task: &str) -> String {
    task.chars().take(TASK_PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[path = "minion_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-operation option structs

use crate::error::MinionError;
use mn_core::{parse_age, ResourceLimits};
use std::time::Duration;

/// Options for starting a sandbox (`start`, `retry`, scheduler promotion).
///
/// Unset limit fields fall back to the minion's stored limits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Credential handed to the worker process
    pub credential: Option<String>,
    /// Keep the sandbox alive after the worker finishes
    pub keep_alive: bool,
    pub limits: ResourceLimits,
}

/// Options for `create` and `create_waiting`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Limits stored with the new minion
    pub limits: ResourceLimits,
    /// Start immediately after creation. Ignored for waiting minions, which
    /// are started by the scheduler.
    pub start: Option<StartOptions>,
}

/// What `clone` copies from the source minion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CloneMode {
    /// Fresh workspace holding only the task text
    #[default]
    TaskOnly,
    /// Deep copy of the whole workspace, minus signal and output
    FullWorkspace,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneOptions {
    pub mode: CloneMode,
    /// Also copy the source's mailbox. Only honoured for `FullWorkspace`.
    pub copy_mailbox: bool,
}

/// Which terminal minions `prune` selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneSelection {
    /// Strictly older than the threshold
    OlderThan(Duration),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PruneOptions {
    pub selection: PruneSelection,
    /// Report the selection without deleting anything
    pub dry_run: bool,
}

impl PruneOptions {
    /// Select terminal minions older than an age such as `"7d"`.
    pub fn older_than(age: &str) -> Result<Self, MinionError> {
        Ok(Self {
            selection: PruneSelection::OlderThan(parse_age(age)?),
            dry_run: false,
        })
    }

    pub fn all() -> Self {
        Self {
            selection: PruneSelection::All,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Bounds for `wait_for_completion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            interval: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only views over every minion: metadata, worker signal, mailbox size
//! and live runtime state.
//!
//! Runtime failures for one minion never fail a listing; the runtime state is
//! reported as [`RUNTIME_REMOVED`] instead.

use crate::adapter_call::try_adapter_call;
use crate::error::MinionError;
use crate::lifecycle::LifecycleManager;
use crate::mailbox::Mailbox;
use mn_adapters::{SandboxAdapter, SandboxStats};
use mn_core::{
    format_elapsed_ms, Clock, LifecycleStatus, Minion, MinionName, ResourceLimits, TaskStatus,
};
use mn_storage::Store;
use serde::Serialize;
use std::collections::BTreeMap;

/// Runtime state shown when the runtime no longer knows the sandbox.
pub const RUNTIME_REMOVED: &str = "removed";
/// Runtime state shown for minions that never had a sandbox.
pub const RUNTIME_NONE: &str = "none";

/// One row of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinionView {
    pub name: MinionName,
    pub status: LifecycleStatus,
    pub task_status: Option<TaskStatus>,
    /// What the runtime reports for the sandbox
    pub runtime: String,
    pub depends_on: Option<MinionName>,
    /// Task preview
    pub task: String,
    /// Human-readable age, e.g. `"3h20m"`
    pub age: String,
    pub unread: usize,
}

/// Detailed view of a single minion.
#[derive(Debug, Clone, Serialize)]
pub struct MinionStatus {
    pub view: MinionView,
    pub limits: ResourceLimits,
    /// Only while the sandbox is running
    pub stats: Option<SandboxStats>,
    pub log_tail: String,
    pub minion: Minion,
}

/// Aggregate counts over the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryReport {
    pub total: usize,
    pub by_status: BTreeMap<LifecycleStatus, usize>,
    /// Keyed by signal value, `"NONE"` for minions that have not reported
    pub by_task_status: BTreeMap<String, usize>,
    pub unread_messages: usize,
}

/// Lines of log shown by [`Registry::status`].
const STATUS_LOG_LINES: u32 = 20;

pub struct Registry<S, A, C> {
    lifecycle: LifecycleManager<S, A, C>,
    mailbox: Mailbox<S, C>,
}

impl<S, A, C> Registry<S, A, C>
where
    S: Store,
    A: SandboxAdapter,
    C: Clock,
{
    pub fn new(lifecycle: LifecycleManager<S, A, C>) -> Self {
        let mailbox = Mailbox::new(
            lifecycle.store().raw().clone(),
            lifecycle.clock().clone(),
        );
        Self { lifecycle, mailbox }
    }

    /// Every readable minion, sorted by name.
    pub async fn list(&self) -> Result<Vec<MinionView>, MinionError> {
        let mut views = Vec::new();
        for minion in self.minions()? {
            views.push(self.view(&minion).await?);
        }
        Ok(views)
    }

    pub async fn status(&self, name: &str) -> Result<MinionStatus, MinionError> {
        let minion = self.lifecycle.get(name)?;
        let view = self.view(&minion).await?;
        let stats = match (&minion.sandbox, view.runtime.as_str()) {
            (Some(handle), "running") => {
                try_adapter_call(name, "stats", self.lifecycle.adapter().stats(handle)).await
            }
            _ => None,
        };
        let log_tail = self.logs(name, STATUS_LOG_LINES).await?;
        Ok(MinionStatus {
            view,
            limits: minion.limits.clone(),
            stats,
            log_tail,
            minion,
        })
    }

    /// Case-insensitive substring match over name and task preview.
    pub async fn search(&self, query: &str) -> Result<Vec<MinionView>, MinionError> {
        let needle = query.to_lowercase();
        let mut views = Vec::new();
        for minion in self.minions()? {
            if minion.name.as_str().to_lowercase().contains(&needle)
                || minion.task.to_lowercase().contains(&needle)
            {
                views.push(self.view(&minion).await?);
            }
        }
        Ok(views)
    }

    /// Last `lines` lines of output.
    ///
    /// Reads the sandbox's logs while the runtime has them, and falls back
    /// to the output artifacts the worker left in its workspace.
    pub async fn logs(&self, name: &str, lines: u32) -> Result<String, MinionError> {
        let minion = self.lifecycle.get(name)?;
        if let Some(handle) = &minion.sandbox {
            if let Some(logs) =
                try_adapter_call(name, "logs", self.lifecycle.adapter().logs(handle, lines)).await
            {
                return Ok(logs);
            }
        }
        let output = self.lifecycle.store().read_output(name)?.unwrap_or_default();
        Ok(tail(&output, lines as usize))
    }

    pub async fn report(&self) -> Result<RegistryReport, MinionError> {
        let mut report = RegistryReport::default();
        for minion in self.minions()? {
            let name = minion.name.as_str();
            report.total += 1;
            *report.by_status.entry(minion.status).or_default() += 1;
            let signal = self.lifecycle.store().read_signal(name)?;
            let key = signal.map_or("NONE", |s| s.as_str()).to_string();
            *report.by_task_status.entry(key).or_default() += 1;
            report.unread_messages += self.mailbox.count(name)?;
        }
        Ok(report)
    }

    /// Metadata of every minion, skipping records that cannot be read.
    fn minions(&self) -> Result<Vec<Minion>, MinionError> {
        let store = self.lifecycle.store();
        let mut minions = Vec::new();
        for name in store.names()? {
            match store.load(&name) {
                Ok(Some(minion)) => minions.push(minion),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(minion = %name, error = %e, "skipping unreadable minion")
                }
            }
        }
        Ok(minions)
    }

    async fn view(&self, minion: &Minion) -> Result<MinionView, MinionError> {
        let name = minion.name.as_str();
        let runtime = match &minion.sandbox {
            Some(handle) => match self.lifecycle.adapter().inspect_status(handle).await {
                Ok(state) => state,
                Err(e) => {
                    tracing::debug!(minion = name, error = %e, "sandbox not inspectable");
                    RUNTIME_REMOVED.to_string()
                }
            },
            None => RUNTIME_NONE.to_string(),
        };
        let now = self.lifecycle.clock().epoch_ms();
        Ok(MinionView {
            name: minion.name.clone(),
            status: minion.status,
            task_status: self.lifecycle.store().read_signal(name)?,
            runtime,
            depends_on: minion.depends_on.clone(),
            task: minion.task.clone(),
            age: format_elapsed_ms(minion.age_ms(now)),
            unread: self.mailbox.count(name)?,
        })
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

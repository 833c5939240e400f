// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency scheduler: promotes waiting minions once their dependency
//! signals `COMPLETE`.
//!
//! A pass advances at most one hop of any chain. For A → B → C with only A
//! complete, a pass starts B; C waits for B's own signal on a later pass.

use crate::error::MinionError;
use crate::lifecycle::LifecycleManager;
use crate::options::StartOptions;
use crate::poll::{Poller, Tick};
use crate::signal::SignalSource;
use mn_adapters::SandboxAdapter;
use mn_core::{Clock, LifecycleStatus, Minion, MinionName, TaskStatus};
use mn_storage::Store;
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Outcome of one scheduler pass.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Started in this pass
    pub promoted: Vec<MinionName>,
    /// Waiting on a dependency that failed or no longer exists
    pub blocked: Vec<MinionName>,
    /// Eligible but failed to start; the pass carried on without them
    pub errors: Vec<(MinionName, MinionError)>,
}

impl PassReport {
    pub fn is_empty(&self) -> bool {
        self.promoted.is_empty() && self.blocked.is_empty() && self.errors.is_empty()
    }
}

/// Polls waiting minions' dependencies and starts the ones that are ready.
pub struct DependencyScheduler<S, A, C> {
    lifecycle: LifecycleManager<S, A, C>,
}

impl<S, A, C> DependencyScheduler<S, A, C>
where
    S: Store,
    A: SandboxAdapter,
    C: Clock,
{
    pub fn new(lifecycle: LifecycleManager<S, A, C>) -> Self {
        Self { lifecycle }
    }

    pub fn lifecycle(&self) -> &LifecycleManager<S, A, C> {
        &self.lifecycle
    }

    /// Run a single pass over every waiting minion.
    ///
    /// Only listing the registry can fail the pass; per-minion failures are
    /// collected in the report.
    pub async fn check_and_promote(
        &self,
        opts: &StartOptions,
    ) -> Result<PassReport, MinionError> {
        let store = self.lifecycle.store();
        let mut report = PassReport::default();
        let mut promoted_now: HashSet<String> = HashSet::new();

        for name in store.names()? {
            let minion = match store.load(&name) {
                Ok(Some(minion)) => minion,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(minion = %name, error = %e, "skipping unreadable minion");
                    continue;
                }
            };
            let Some(dependency) = waiting_on(&minion) else {
                continue;
            };
            // One hop per pass
            if promoted_now.contains(dependency.as_str()) {
                continue;
            }

            match store.poll_signal(dependency.as_str()) {
                Ok(Some(TaskStatus::Complete)) => {}
                Ok(Some(TaskStatus::Failed)) | Err(MinionError::NotFound { .. }) => {
                    tracing::debug!(minion = %name, dependency = %dependency, "blocked");
                    report.blocked.push(minion.name);
                    continue;
                }
                Ok(_) => continue,
                Err(e) => {
                    report.errors.push((minion.name, e));
                    continue;
                }
            }

            match self.lifecycle.start(&name, opts).await {
                Ok(_) => {
                    tracing::info!(minion = %name, dependency = %dependency, "promoted");
                    promoted_now.insert(name);
                    report.promoted.push(minion.name);
                }
                Err(e) => {
                    tracing::warn!(minion = %name, error = %e, "promotion failed");
                    report.errors.push((minion.name, e));
                }
            }
        }
        Ok(report)
    }

    /// Run passes every `interval` until `cancel` fires.
    ///
    /// The first pass runs immediately. `on_promote` is called once per
    /// promoted minion before the next pass begins. A pass that cannot list
    /// the registry is logged and retried on the next tick.
    pub async fn watch<F>(
        &self,
        interval: Duration,
        opts: &StartOptions,
        mut on_promote: F,
        cancel: CancellationToken,
    ) where
        F: FnMut(&MinionName),
    {
        let mut poller = Poller::new(interval, None).with_cancel(cancel);
        let mut passes: u64 = 0;
        loop {
            passes += 1;
            match self.check_and_promote(opts).await {
                Ok(report) => {
                    for name in &report.promoted {
                        on_promote(name);
                    }
                    if !report.errors.is_empty() {
                        tracing::warn!(
                            pass = passes,
                            errors = report.errors.len(),
                            "pass had failures"
                        );
                    }
                }
                Err(e) => tracing::error!(pass = passes, error = %e, "scheduler pass failed"),
            }
            if poller.tick().await != Tick::Ready {
                break;
            }
        }
        tracing::info!(passes, "scheduler stopped");
    }
}

/// Dependency of a minion that is waiting on one.
fn waiting_on(minion: &Minion) -> Option<&MinionName> {
    if minion.status != LifecycleStatus::Waiting {
        return None;
    }
    minion.depends_on.as_ref()
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;

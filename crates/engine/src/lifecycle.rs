// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle manager: the only writer of a minion's lifecycle status.
//!
//! ```text
//! create ──► pending ──start──► running ◄──resume── paused
//!    │                    ▲        │ ──pause──────────►
//!    └──► waiting ─start──┘        └──kill──► killed
//! ```
//!
//! `retry` and `clone` start a fresh attempt from any status. Every mutation
//! is a whole-record rewrite of the metadata; no lock is held across the
//! read-modify-write, so concurrent operations on one name may interleave.

use crate::adapter_call::{must_adapter_call, try_adapter_call};
use crate::config::LifecycleConfig;
use crate::error::{Entity, MinionError};
use crate::options::{
    CloneMode, CloneOptions, CreateOptions, PruneOptions, PruneSelection, StartOptions,
    WaitOptions,
};
use crate::wait::{wait_for_completion, WaitOutcome};
use mn_adapters::{SandboxAdapter, SandboxSpec};
use mn_core::{Clock, LifecycleStatus, Minion, MinionName, SandboxHandle};
use mn_storage::{MinionStore, Scope, Store, StoreError};

/// Runtime status strings that mean the sandbox is still live.
const LIVE_RUNTIME_STATES: [&str; 2] = ["running", "paused"];

/// Owns state transitions for minions.
#[derive(Clone)]
pub struct LifecycleManager<S, A, C> {
    store: MinionStore<S>,
    adapter: A,
    clock: C,
    config: LifecycleConfig,
}

impl<S, A, C> LifecycleManager<S, A, C>
where
    S: Store,
    A: SandboxAdapter,
    C: Clock,
{
    pub fn new(store: S, adapter: A, clock: C, config: LifecycleConfig) -> Self {
        Self {
            store: MinionStore::new(store),
            adapter,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &MinionStore<S> {
        &self.store
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Load a minion's metadata.
    pub fn get(&self, name: &str) -> Result<Minion, MinionError> {
        self.store
            .load(name)?
            .ok_or_else(|| MinionError::not_found(Entity::Minion, name))
    }

    /// Full task text.
    pub fn task(&self, name: &str) -> Result<String, MinionError> {
        self.get(name)?;
        self.store
            .read_task(name)?
            .ok_or_else(|| MinionError::MissingTask(name.to_string()))
    }

    /// Create a `pending` minion, optionally starting it straight away.
    pub async fn create(
        &self,
        name: &str,
        task: &str,
        opts: &CreateOptions,
    ) -> Result<Minion, MinionError> {
        let name = MinionName::parse(name)?;
        let minion = Minion::new(name, task, opts.limits.clone(), self.clock.epoch_ms());
        self.claim(&minion, task)?;
        tracing::info!(minion = %minion.name, "created");

        match &opts.start {
            Some(start) => self.start(minion.name.as_str(), start).await,
            None => Ok(minion),
        }
    }

    /// Create a `waiting` minion chained behind `depends_on`.
    ///
    /// The scheduler starts it once `depends_on` signals `COMPLETE`.
    pub fn create_waiting(
        &self,
        name: &str,
        task: &str,
        depends_on: &str,
        opts: &CreateOptions,
    ) -> Result<Minion, MinionError> {
        let name = MinionName::parse(name)?;
        if self.store.exists(name.as_str())? {
            return Err(MinionError::AlreadyExists(name.to_string()));
        }
        let dependency = MinionName::parse(depends_on)
            .map_err(|_| MinionError::not_found(Entity::Dependency, depends_on))?;
        if !self.store.exists(dependency.as_str())? {
            return Err(MinionError::not_found(Entity::Dependency, depends_on));
        }

        let minion = Minion::waiting(
            name,
            task,
            dependency,
            opts.limits.clone(),
            self.clock.epoch_ms(),
        );
        self.claim(&minion, task)?;
        tracing::info!(minion = %minion.name, depends_on, "created waiting");
        Ok(minion)
    }

    /// Start a `pending` or `waiting` minion's sandbox.
    pub async fn start(&self, name: &str, opts: &StartOptions) -> Result<Minion, MinionError> {
        let minion = self.get(name)?;
        if !minion.status.is_startable() {
            return Err(MinionError::InvalidTransition {
                name: name.to_string(),
                op: "start",
                status: minion.status,
            });
        }
        if self.store.read_task(name)?.is_none() {
            return Err(MinionError::MissingTask(name.to_string()));
        }
        self.launch(minion, opts, "start").await
    }

    /// Stop and remove the sandbox if any, then mark the minion killed.
    ///
    /// Runtime failures are ignored: the minion is killed regardless.
    pub async fn kill(&self, name: &str) -> Result<Minion, MinionError> {
        let mut minion = self.get(name)?;
        self.teardown(&mut minion).await;
        minion.status = LifecycleStatus::Killed;
        minion.killed_at_ms = Some(self.clock.epoch_ms());
        self.store.save(&minion)?;
        tracing::info!(minion = name, "killed");
        Ok(minion)
    }

    pub async fn pause(&self, name: &str) -> Result<Minion, MinionError> {
        let mut minion = self.get(name)?;
        let handle = self.live_handle(&minion, "pause", LifecycleStatus::Running)?;
        must_adapter_call(name, "pause", self.adapter.pause(&handle)).await?;
        minion.status = LifecycleStatus::Paused;
        minion.paused_at_ms = Some(self.clock.epoch_ms());
        self.store.save(&minion)?;
        tracing::info!(minion = name, "paused");
        Ok(minion)
    }

    pub async fn resume(&self, name: &str) -> Result<Minion, MinionError> {
        let mut minion = self.get(name)?;
        let handle = self.live_handle(&minion, "resume", LifecycleStatus::Paused)?;
        must_adapter_call(name, "resume", self.adapter.unpause(&handle)).await?;
        minion.status = LifecycleStatus::Running;
        minion.resumed_at_ms = Some(self.clock.epoch_ms());
        self.store.save(&minion)?;
        tracing::info!(minion = name, "resumed");
        Ok(minion)
    }

    /// Restart the existing sandbox in place.
    pub async fn restart(&self, name: &str) -> Result<Minion, MinionError> {
        let mut minion = self.get(name)?;
        let handle = minion
            .sandbox
            .clone()
            .ok_or_else(|| MinionError::NoSandbox(name.to_string()))?;
        must_adapter_call(name, "restart", self.adapter.restart(&handle)).await?;
        minion.status = LifecycleStatus::Running;
        minion.restarted_at_ms = Some(self.clock.epoch_ms());
        self.store.save(&minion)?;
        tracing::info!(minion = name, "restarted");
        Ok(minion)
    }

    /// Run the task again in a fresh sandbox, from any status.
    ///
    /// Tears down the old sandbox, clears the signal and output, and records
    /// the previous attempt's creation time.
    pub async fn retry(&self, name: &str, opts: &StartOptions) -> Result<Minion, MinionError> {
        let mut minion = self.get(name)?;
        if self.store.read_task(name)?.is_none() {
            return Err(MinionError::MissingTask(name.to_string()));
        }
        self.teardown(&mut minion).await;
        self.store.clear_signal(name)?;
        let cleared = self.store.clear_output(name)?;

        let now = self.clock.epoch_ms();
        minion.previous_created_at_ms = Some(minion.created_at_ms);
        minion.created_at_ms = now;
        minion.retried_at_ms = Some(now);
        minion.status = LifecycleStatus::Pending;
        // The old sandbox is gone; a failed start must leave a handle-free record
        self.store.save(&minion)?;
        tracing::info!(minion = name, cleared_output = cleared, "retrying");
        self.launch(minion, opts, "retry").await
    }

    /// Create `new_name` from `source`. The clone is always `pending`.
    pub fn clone_minion(
        &self,
        source: &str,
        new_name: &str,
        opts: &CloneOptions,
    ) -> Result<Minion, MinionError> {
        let new_name = MinionName::parse(new_name)?;
        let src = self.get(source)?;
        let task = self
            .store
            .read_task(source)?
            .ok_or_else(|| MinionError::MissingTask(source.to_string()))?;

        let mut minion = Minion::new(
            new_name.clone(),
            &task,
            src.limits.clone(),
            self.clock.epoch_ms(),
        );
        minion.cloned_from = Some(src.name.clone());
        minion.cloned_at_ms = Some(minion.created_at_ms);

        match opts.mode {
            CloneMode::TaskOnly => self.claim(&minion, &task)?,
            CloneMode::FullWorkspace => {
                self.store
                    .copy_workspace(source, new_name.as_str())
                    .map_err(|e| already_exists(e, &new_name))?;
                self.store.clear_signal(new_name.as_str())?;
                self.store.clear_output(new_name.as_str())?;
                self.store.save(&minion)?;
                if opts.copy_mailbox {
                    self.copy_mailbox(source, new_name.as_str())?;
                }
            }
        }
        tracing::info!(minion = %new_name, source, mode = ?opts.mode, "cloned");
        Ok(minion)
    }

    /// Rename a stopped minion, moving its workspace and mailbox.
    ///
    /// Fails with `RunningConflict` while the runtime reports the sandbox as
    /// running or paused. Dependents keep pointing at the old name.
    pub async fn rename(&self, old: &str, new_name: &str) -> Result<Minion, MinionError> {
        let new_name = MinionName::parse(new_name)?;
        let mut minion = self.get(old)?;
        if self.store.exists(new_name.as_str())? {
            return Err(MinionError::AlreadyExists(new_name.to_string()));
        }

        if let Some(handle) = minion.sandbox.clone() {
            match self.adapter.inspect_status(&handle).await {
                Ok(state) if LIVE_RUNTIME_STATES.contains(&state.as_str()) => {
                    return Err(MinionError::RunningConflict {
                        name: old.to_string(),
                        state,
                    });
                }
                // The stopped container still carries the old name
                Ok(_) => {
                    try_adapter_call(old, "remove", self.adapter.remove(&handle)).await;
                }
                Err(e) => {
                    tracing::debug!(minion = old, error = %e, "sandbox already gone");
                }
            }
        }

        minion.renamed_from = Some(minion.name.clone());
        minion.name = new_name.clone();
        minion.renamed_at_ms = Some(self.clock.epoch_ms());
        minion.sandbox = None;
        if minion.status.is_live() {
            minion.status = LifecycleStatus::Killed;
        }
        // Nothing moves unless the renamed record can be saved
        minion.check_invariants().map_err(StoreError::from)?;

        self.store
            .move_workspace(old, new_name.as_str())
            .map_err(|e| already_exists(e, &new_name))?;
        self.move_mailbox(old, new_name.as_str())?;
        self.store.save(&minion)?;
        tracing::info!(minion = %minion.name, from = old, "renamed");
        Ok(minion)
    }

    /// Delete finished minions. Returns the selected names, sorted.
    ///
    /// Only minions whose signal is `COMPLETE` or `FAILED` are candidates.
    /// With `dry_run` nothing is touched.
    pub async fn prune(&self, opts: &PruneOptions) -> Result<Vec<MinionName>, MinionError> {
        let now = self.clock.epoch_ms();
        let mut pruned = Vec::new();
        for name in self.store.names()? {
            let mut minion = match self.store.load(&name) {
                Ok(Some(minion)) => minion,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(minion = %name, error = %e, "skipping unreadable minion");
                    continue;
                }
            };
            let terminal = self
                .store
                .read_signal(&name)?
                .is_some_and(|status| status.is_terminal());
            if !terminal {
                continue;
            }
            let selected = match opts.selection {
                PruneSelection::All => true,
                PruneSelection::OlderThan(threshold) => {
                    u128::from(minion.age_ms(now)) > threshold.as_millis()
                }
            };
            if !selected {
                continue;
            }
            if !opts.dry_run {
                self.teardown(&mut minion).await;
                self.remove_all(&name)?;
            }
            pruned.push(minion.name);
        }
        tracing::info!(count = pruned.len(), dry_run = opts.dry_run, "pruned");
        Ok(pruned)
    }

    /// Force-remove a minion whatever its status.
    pub async fn cleanup(&self, name: &str) -> Result<(), MinionError> {
        if !self.store.exists(name)? {
            return Err(MinionError::not_found(Entity::Minion, name));
        }
        // A workspace without readable metadata is still removed
        match self.store.load(name) {
            Ok(Some(mut minion)) => self.teardown(&mut minion).await,
            Ok(None) => {}
            Err(e) => tracing::warn!(minion = name, error = %e, "removing unreadable minion"),
        }
        self.remove_all(name)?;
        tracing::info!(minion = name, "cleaned up");
        Ok(())
    }

    /// Wait until `name` signals a terminal status or the timeout elapses.
    pub async fn wait_for_completion(
        &self,
        name: &str,
        opts: &WaitOptions,
    ) -> Result<WaitOutcome, MinionError> {
        wait_for_completion(&self.store, name, opts).await
    }

    /// Start a sandbox for `minion` and record it as running.
    async fn launch(
        &self,
        mut minion: Minion,
        opts: &StartOptions,
        op: &'static str,
    ) -> Result<Minion, MinionError> {
        let name = minion.name.to_string();
        let limits = opts.limits.clone().or(&minion.limits);
        let spec = SandboxSpec {
            name: name.clone(),
            workspace: self.store.workspace_path(&name),
            env: self.config.sandbox_env(&name, opts),
            limits: limits.clone(),
        };
        let handle = must_adapter_call(&name, op, self.adapter.start(&spec)).await?;

        minion.status = LifecycleStatus::Running;
        minion.sandbox = Some(handle.clone());
        minion.limits = limits;
        minion.started_at_ms = Some(self.clock.epoch_ms());
        if let Err(e) = self.store.save(&minion) {
            // Nothing would know about the sandbox
            try_adapter_call(&name, "remove", self.adapter.remove(&handle)).await;
            return Err(e.into());
        }
        tracing::info!(minion = %name, handle = handle.short(12), "started");
        Ok(minion)
    }

    /// Best-effort stop and removal of the minion's sandbox. Clears the handle.
    async fn teardown(&self, minion: &mut Minion) {
        let Some(handle) = minion.sandbox.take() else {
            return;
        };
        let name = minion.name.as_str();
        try_adapter_call(name, "stop", self.adapter.stop(&handle)).await;
        try_adapter_call(name, "remove", self.adapter.remove(&handle)).await;
        // Without a handle a live status would break the record's invariants
        if minion.status.is_live() {
            minion.status = LifecycleStatus::Killed;
        }
    }

    /// Handle of a minion expected to be in `required` status.
    fn live_handle(
        &self,
        minion: &Minion,
        op: &'static str,
        required: LifecycleStatus,
    ) -> Result<SandboxHandle, MinionError> {
        let handle = minion
            .sandbox
            .clone()
            .ok_or_else(|| MinionError::NoSandbox(minion.name.to_string()))?;
        if minion.status != required {
            return Err(MinionError::InvalidTransition {
                name: minion.name.to_string(),
                op,
                status: minion.status,
            });
        }
        Ok(handle)
    }

    /// Create the minion's workspace, mapping a taken name to `AlreadyExists`.
    fn claim(&self, minion: &Minion, task: &str) -> Result<(), MinionError> {
        self.store
            .create(minion, task)
            .map_err(|e| already_exists(e, &minion.name))
    }

    fn remove_all(&self, name: &str) -> Result<(), MinionError> {
        self.store.remove(name)?;
        self.store.raw().remove_scope(&Scope::mailbox(name))?;
        Ok(())
    }

    // Leftover mail under the new name is replaced in both copy and move
    fn copy_mailbox(&self, from: &str, to: &str) -> Result<(), MinionError> {
        let (src, dst) = (Scope::mailbox(from), Scope::mailbox(to));
        if !self.store.raw().scope_exists(&src)? {
            return Ok(());
        }
        self.store.raw().remove_scope(&dst)?;
        self.store.raw().copy_scope(&src, &dst)?;
        Ok(())
    }

    fn move_mailbox(&self, from: &str, to: &str) -> Result<(), MinionError> {
        let (src, dst) = (Scope::mailbox(from), Scope::mailbox(to));
        if !self.store.raw().scope_exists(&src)? {
            return Ok(());
        }
        self.store.raw().remove_scope(&dst)?;
        self.store.raw().move_scope(&src, &dst)?;
        Ok(())
    }
}

fn already_exists(err: StoreError, name: &MinionName) -> MinionError {
    match err {
        StoreError::ScopeExists(_) => MinionError::AlreadyExists(name.to_string()),
        other => other.into(),
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

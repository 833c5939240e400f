// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed metadata store for minions.
//!
//! One scope per minion holds the metadata record, the full task text, the
//! worker-written terminal signal and the worker's output. The scope existing
//! is the sole existence predicate for a minion. Metadata is validated against
//! its invariants before every write and fully rewritten each time.

use crate::store::{Scope, ScopeKind, Store, StoreError};
use mn_core::{Minion, TaskStatus};
use std::path::PathBuf;

/// Metadata record key.
pub const META_KEY: &str = "meta.json";
/// Full task text key.
pub const TASK_KEY: &str = "task.md";
/// Terminal signal key, written by the worker process.
pub const SIGNAL_KEY: &str = "status";
/// Prefix of output artifacts written by the worker process.
pub const OUTPUT_PREFIX: &str = "output/";

/// Typed access to minion workspaces on top of a [`Store`].
#[derive(Clone)]
pub struct MinionStore<S> {
    store: S,
}

impl<S: Store> MinionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying key-value store.
    pub fn raw(&self) -> &S {
        &self.store
    }

    pub fn exists(&self, name: &str) -> Result<bool, StoreError> {
        self.store.scope_exists(&Scope::minion(name))
    }

    /// Names of every registered minion, sorted.
    pub fn names(&self) -> Result<Vec<String>, StoreError> {
        self.store.list_scopes(ScopeKind::Minion)
    }

    /// Claim the workspace for a new minion. Fails with `ScopeExists` if taken.
    pub fn create(&self, minion: &Minion, task: &str) -> Result<(), StoreError> {
        minion.check_invariants()?;
        let scope = Scope::minion(minion.name.as_str());
        self.store.create_scope(&scope)?;
        self.write_task(minion.name.as_str(), task)?;
        self.save(minion)
    }

    /// Load the metadata record. `Ok(None)` if there is none.
    pub fn load(&self, name: &str) -> Result<Option<Minion>, StoreError> {
        let Some(bytes) = self.store.get(&Scope::minion(name), META_KEY)? else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: format!("{}/{}", Scope::minion(name), META_KEY),
                source,
            })
    }

    /// Validate and persist the metadata record, replacing the previous one.
    pub fn save(&self, minion: &Minion) -> Result<(), StoreError> {
        minion.check_invariants()?;
        let json = serde_json::to_vec_pretty(minion).map_err(|source| StoreError::Corrupt {
            key: format!("{}/{}", Scope::minion(minion.name.as_str()), META_KEY),
            source,
        })?;
        self.store
            .put(&Scope::minion(minion.name.as_str()), META_KEY, &json)
    }

    pub fn read_task(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .store
            .get(&Scope::minion(name), TASK_KEY)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    pub fn write_task(&self, name: &str, task: &str) -> Result<(), StoreError> {
        self.store
            .put(&Scope::minion(name), TASK_KEY, task.as_bytes())
    }

    /// Read the worker's terminal signal.
    ///
    /// Absent or unrecognised content reads as `None`: the worker has not
    /// reported anything this system understands yet.
    pub fn read_signal(&self, name: &str) -> Result<Option<TaskStatus>, StoreError> {
        let Some(bytes) = self.store.get(&Scope::minion(name), SIGNAL_KEY)? else {
            return Ok(None);
        };
        let content = String::from_utf8_lossy(&bytes);
        match content.parse() {
            Ok(status) => Ok(Some(status)),
            Err(e) => {
                tracing::debug!(minion = name, error = %e, "ignoring unrecognised signal");
                Ok(None)
            }
        }
    }

    pub fn clear_signal(&self, name: &str) -> Result<bool, StoreError> {
        self.store.delete(&Scope::minion(name), SIGNAL_KEY)
    }

    /// Keys of all output artifacts, relative to the scope.
    pub fn output_keys(&self, name: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .store
            .list_keys(&Scope::minion(name))?
            .into_iter()
            .filter(|key| key.starts_with(OUTPUT_PREFIX))
            .collect())
    }

    /// Concatenated output artifacts, in key order.
    pub fn read_output(&self, name: &str) -> Result<Option<String>, StoreError> {
        let keys = self.output_keys(name)?;
        if keys.is_empty() {
            return Ok(None);
        }
        let mut out = String::new();
        for key in keys {
            if let Some(bytes) = self.store.get(&Scope::minion(name), &key)? {
                out.push_str(&String::from_utf8_lossy(&bytes));
            }
        }
        Ok(Some(out))
    }

    /// Delete every output artifact. Returns how many were removed.
    pub fn clear_output(&self, name: &str) -> Result<usize, StoreError> {
        let scope = Scope::minion(name);
        let mut removed = 0;
        for key in self.output_keys(name)? {
            if self.store.delete(&scope, &key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Deep-copy a workspace, including output and signal, to a new name.
    pub fn copy_workspace(&self, from: &str, to: &str) -> Result<(), StoreError> {
        self.store
            .copy_scope(&Scope::minion(from), &Scope::minion(to))
    }

    pub fn move_workspace(&self, from: &str, to: &str) -> Result<(), StoreError> {
        self.store
            .move_scope(&Scope::minion(from), &Scope::minion(to))
    }

    /// Delete the workspace. Returns whether it existed.
    pub fn remove(&self, name: &str) -> Result<bool, StoreError> {
        self.store.remove_scope(&Scope::minion(name))
    }

    /// Host directory mounted into the minion's sandbox.
    pub fn workspace_path(&self, name: &str) -> PathBuf {
        self.store.scope_path(&Scope::minion(name))
    }
}

/// Stand-ins for the worker process, which owns the signal and output files.
#[cfg(any(test, feature = "test-support"))]
impl<S: Store> MinionStore<S> {
    pub fn write_signal(&self, name: &str, status: TaskStatus) -> Result<(), StoreError> {
        self.store
            .put(&Scope::minion(name), SIGNAL_KEY, status.as_str().as_bytes())
    }

    pub fn write_output(&self, name: &str, file: &str, content: &str) -> Result<(), StoreError> {
        self.store.put(
            &Scope::minion(name),
            &format!("{OUTPUT_PREFIX}{file}"),
            content.as_bytes(),
        )
    }
}

#[cfg(test)]
#[path = "minion_store_tests.rs"]
mod tests;

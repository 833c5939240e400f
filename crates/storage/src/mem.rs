// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store for tests and embedding.

use crate::store::{Scope, ScopeKind, Store, StoreError};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

type Records = BTreeMap<String, Vec<u8>>;

/// Store backed by a shared map. Clones share state.
#[derive(Clone, Default)]
pub struct MemStore {
    scopes: Arc<Mutex<BTreeMap<Scope, Records>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemStore {
    fn get(&self, scope: &Scope, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .scopes
            .lock()
            .get(scope)
            .and_then(|records| records.get(key).cloned()))
    }

    fn put(&self, scope: &Scope, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.scopes
            .lock()
            .entry(scope.clone())
            .or_default()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, scope: &Scope, key: &str) -> Result<bool, StoreError> {
        Ok(self
            .scopes
            .lock()
            .get_mut(scope)
            .map(|records| records.remove(key).is_some())
            .unwrap_or(false))
    }

    fn list_keys(&self, scope: &Scope) -> Result<Vec<String>, StoreError> {
        Ok(self
            .scopes
            .lock()
            .get(scope)
            .map(|records| records.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn list_scopes(&self, kind: ScopeKind) -> Result<Vec<String>, StoreError> {
        Ok(self
            .scopes
            .lock()
            .keys()
            .filter(|scope| scope.kind == kind)
            .map(|scope| scope.name.clone())
            .collect())
    }

    fn scope_exists(&self, scope: &Scope) -> Result<bool, StoreError> {
        Ok(self.scopes.lock().contains_key(scope))
    }

    fn create_scope(&self, scope: &Scope) -> Result<(), StoreError> {
        let mut scopes = self.scopes.lock();
        if scopes.contains_key(scope) {
            return Err(StoreError::ScopeExists(scope.clone()));
        }
        scopes.insert(scope.clone(), Records::new());
        Ok(())
    }

    fn remove_scope(&self, scope: &Scope) -> Result<bool, StoreError> {
        Ok(self.scopes.lock().remove(scope).is_some())
    }

    fn copy_scope(&self, from: &Scope, to: &Scope) -> Result<(), StoreError> {
        let mut scopes = self.scopes.lock();
        if scopes.contains_key(to) {
            return Err(StoreError::ScopeExists(to.clone()));
        }
        let records = scopes
            .get(from)
            .cloned()
            .ok_or_else(|| StoreError::ScopeNotFound(from.clone()))?;
        scopes.insert(to.clone(), records);
        Ok(())
    }

    fn move_scope(&self, from: &Scope, to: &Scope) -> Result<(), StoreError> {
        let mut scopes = self.scopes.lock();
        if scopes.contains_key(to) {
            return Err(StoreError::ScopeExists(to.clone()));
        }
        let records = scopes
            .remove(from)
            .ok_or_else(|| StoreError::ScopeNotFound(from.clone()))?;
        scopes.insert(to.clone(), records);
        Ok(())
    }

    fn scope_path(&self, scope: &Scope) -> PathBuf {
        PathBuf::from("/mem")
            .join(scope.kind.dir_name())
            .join(&scope.name)
    }
}

#[cfg(test)]
#[path = "mem_tests.rs"]
mod tests;

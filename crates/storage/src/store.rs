// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The key-value store contract.
//!
//! Records live inside scopes: one scope per minion workspace and one per
//! mailbox. Keys are `/`-separated paths relative to their scope. Every `put`
//! replaces the whole record; a concurrent reader sees either the old value or
//! the new one, never a partial write.

use mn_core::InvariantViolation;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt record {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("refusing to write inconsistent record: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error("scope already exists: {0}")]
    ScopeExists(Scope),
    #[error("scope not found: {0}")]
    ScopeNotFound(Scope),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Which family of scopes a scope belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScopeKind {
    /// A minion's private workspace: metadata, task, signal, output
    Minion,
    /// A minion's incoming messages
    Mailbox,
}

impl ScopeKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            ScopeKind::Minion => "minions",
            ScopeKind::Mailbox => "mailbox",
        }
    }
}

/// A named namespace of keys, e.g. the workspace of minion `a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope {
    pub kind: ScopeKind,
    pub name: String,
}

impl Scope {
    pub fn minion(name: impl Into<String>) -> Self {
        Self {
            kind: ScopeKind::Minion,
            name: name.into(),
        }
    }

    pub fn mailbox(name: impl Into<String>) -> Self {
        Self {
            kind: ScopeKind::Mailbox,
            name: name.into(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.dir_name(), self.name)
    }
}

/// Scoped key-value store with whole-record replace semantics.
///
/// Implementations hold no cross-scope locks: operations on different scopes
/// never coordinate, and read-modify-write on one scope is not atomic.
pub trait Store: Clone + Send + Sync + 'static {
    /// Read a record. `Ok(None)` if it does not exist.
    fn get(&self, scope: &Scope, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write a record, creating the scope if needed.
    fn put(&self, scope: &Scope, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Delete a record. Returns whether it existed.
    fn delete(&self, scope: &Scope, key: &str) -> Result<bool, StoreError>;

    /// All keys in a scope, sorted. Empty if the scope does not exist.
    fn list_keys(&self, scope: &Scope) -> Result<Vec<String>, StoreError>;

    /// Names of all scopes of `kind`, sorted.
    fn list_scopes(&self, kind: ScopeKind) -> Result<Vec<String>, StoreError>;

    fn scope_exists(&self, scope: &Scope) -> Result<bool, StoreError>;

    /// Create an empty scope. Fails with `ScopeExists` if it is already there.
    fn create_scope(&self, scope: &Scope) -> Result<(), StoreError>;

    /// Delete a scope and everything in it. Returns whether it existed.
    fn remove_scope(&self, scope: &Scope) -> Result<bool, StoreError>;

    /// Deep-copy `from` into a new scope `to`.
    fn copy_scope(&self, from: &Scope, to: &Scope) -> Result<(), StoreError>;

    /// Move `from` to a new scope `to`.
    fn move_scope(&self, from: &Scope, to: &Scope) -> Result<(), StoreError>;

    /// Host path backing a scope, used as the sandbox mount source.
    fn scope_path(&self, scope: &Scope) -> PathBuf;
}

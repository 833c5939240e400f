// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-backed store.
//!
//! Layout: `<root>/<kind>/<scope name>/<key>`. Writes go to `<key>.tmp` and are
//! renamed over the target so a reader never observes a partial record.

use crate::store::{Scope, ScopeKind, Store, StoreError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const TMP_SUFFIX: &str = ".tmp";

/// Store rooted at a state directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn kind_dir(&self, kind: ScopeKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    fn key_path(&self, scope: &Scope, key: &str) -> PathBuf {
        key.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.scope_path(scope), |path, part| path.join(part))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(TMP_SUFFIX);
    path.with_file_name(name)
}

/// Recursively collect files under `dir` as `/`-joined paths relative to it.
fn walk(dir: &Path, prefix: &str, out: &mut Vec<String>) -> Result<(), StoreError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(StoreError::io(dir, e)),
    };
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(dir, e))?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let rel = if prefix.is_empty() {
            file_name.clone()
        } else {
            format!("{prefix}/{file_name}")
        };
        let file_type = entry.file_type().map_err(|e| StoreError::io(entry.path(), e))?;
        if file_type.is_dir() {
            walk(&entry.path(), &rel, out)?;
        } else if !file_name.ends_with(TMP_SUFFIX) {
            out.push(rel);
        }
    }
    Ok(())
}

fn copy_dir_all(from: &Path, to: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(to).map_err(|e| StoreError::io(to, e))?;
    for entry in fs::read_dir(from).map_err(|e| StoreError::io(from, e))? {
        let entry = entry.map_err(|e| StoreError::io(from, e))?;
        let src = entry.path();
        let dst = to.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| StoreError::io(&src, e))?;
        if file_type.is_dir() {
            copy_dir_all(&src, &dst)?;
        } else {
            fs::copy(&src, &dst).map_err(|e| StoreError::io(&src, e))?;
        }
    }
    Ok(())
}

impl Store for FsStore {
    fn get(&self, scope: &Scope, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.key_path(scope, key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            // A directory where a file was expected reads as absent
            Err(_) if path.is_dir() => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn put(&self, scope: &Scope, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let path = self.key_path(scope, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let tmp = tmp_path(&path);
        {
            let mut file = fs::File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
            file.write_all(value).map_err(|e| StoreError::io(&tmp, e))?;
            file.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
        }
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))
    }

    fn delete(&self, scope: &Scope, key: &str) -> Result<bool, StoreError> {
        let path = self.key_path(scope, key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn list_keys(&self, scope: &Scope) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        walk(&self.scope_path(scope), "", &mut keys)?;
        keys.sort();
        Ok(keys)
    }

    fn list_scopes(&self, kind: ScopeKind) -> Result<Vec<String>, StoreError> {
        let dir = self.kind_dir(kind);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(dir, e)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn scope_exists(&self, scope: &Scope) -> Result<bool, StoreError> {
        Ok(self.scope_path(scope).is_dir())
    }

    fn create_scope(&self, scope: &Scope) -> Result<(), StoreError> {
        let parent = self.kind_dir(scope.kind);
        fs::create_dir_all(&parent).map_err(|e| StoreError::io(&parent, e))?;
        let path = self.scope_path(scope);
        // create_dir (not create_dir_all) so two creators cannot both succeed
        match fs::create_dir(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::ScopeExists(scope.clone()))
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn remove_scope(&self, scope: &Scope) -> Result<bool, StoreError> {
        let path = self.scope_path(scope);
        match fs::remove_dir_all(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn copy_scope(&self, from: &Scope, to: &Scope) -> Result<(), StoreError> {
        let src = self.scope_path(from);
        if !src.is_dir() {
            return Err(StoreError::ScopeNotFound(from.clone()));
        }
        let dst = self.scope_path(to);
        if dst.exists() {
            return Err(StoreError::ScopeExists(to.clone()));
        }
        copy_dir_all(&src, &dst)
    }

    fn move_scope(&self, from: &Scope, to: &Scope) -> Result<(), StoreError> {
        let src = self.scope_path(from);
        if !src.is_dir() {
            return Err(StoreError::ScopeNotFound(from.clone()));
        }
        let dst = self.scope_path(to);
        if dst.exists() {
            return Err(StoreError::ScopeExists(to.clone()));
        }
        let parent = self.kind_dir(to.kind);
        fs::create_dir_all(&parent).map_err(|e| StoreError::io(&parent, e))?;
        fs::rename(&src, &dst).map_err(|e| StoreError::io(src, e))
    }

    fn scope_path(&self, scope: &Scope) -> PathBuf {
        self.kind_dir(scope.kind).join(&scope.name)
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;

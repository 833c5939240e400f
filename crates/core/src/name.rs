// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validated minion names.
//!
//! A name is the sole identity of a minion: it names the workspace directory,
//! the mailbox directory, and (prefixed) the sandbox. Names must match
//! `[A-Za-z0-9][A-Za-z0-9_.-]*` and be at most [`MAX_NAME_LEN`] characters.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Longest accepted minion name.
pub const MAX_NAME_LEN: usize = 128;

/// A name that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid minion name {name:?}: {reason}")]
pub struct NameError {
    pub name: String,
    pub reason: &'static str,
}

/// A minion name that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MinionName(String);

impl MinionName {
    /// Validate `name` and wrap it.
    pub fn parse(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        let reject = |reason| NameError {
            name: name.clone(),
            reason,
        };

        let mut chars = name.chars();
        match chars.next() {
            None => return Err(reject("name is empty")),
            Some(c) if !c.is_ascii_alphanumeric() => {
                return Err(reject("must start with a letter or digit"))
            }
            Some(_) => {}
        }
        if chars.any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))) {
            return Err(reject("only letters, digits, '_', '.' and '-' are allowed"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(reject("longer than 128 characters"));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MinionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MinionName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<MinionName> for String {
    fn from(name: MinionName) -> Self {
        name.0
    }
}

impl AsRef<str> for MinionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for MinionName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MinionName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::borrow::Borrow<str> for MinionName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "name_tests.rs"]
mod tests;

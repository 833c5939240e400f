// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for minion operations

use mn_adapters::SandboxError;
use mn_core::{AgeFormatError, LifecycleStatus, NameError};
use mn_storage::StoreError;
use std::fmt;
use thiserror::Error;

/// What a missing name was supposed to refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Minion,
    Dependency,
    Sender,
    Recipient,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Minion => "minion",
            Entity::Dependency => "dependency",
            Entity::Sender => "sender",
            Entity::Recipient => "recipient",
        })
    }
}

/// Errors surfaced by lifecycle, scheduler, mailbox and registry operations
#[derive(Debug, Error)]
pub enum MinionError {
    #[error(transparent)]
    InvalidName(#[from] NameError),
    #[error("minion already exists: {0}")]
    AlreadyExists(String),
    #[error("{kind} not found: {name}")]
    NotFound { kind: Entity, name: String },
    #[error("cannot {op} minion {name}: it is {status}")]
    InvalidTransition {
        name: String,
        op: &'static str,
        status: LifecycleStatus,
    },
    #[error("minion {0} has no sandbox")]
    NoSandbox(String),
    #[error("minion {0} has no task")]
    MissingTask(String),
    #[error("minion {name} has a {state} sandbox; stop it first")]
    RunningConflict { name: String, state: String },
    #[error("{op} failed for minion {name}: {source}")]
    Adapter {
        name: String,
        op: &'static str,
        #[source]
        source: SandboxError,
    },
    #[error(transparent)]
    InvalidAgeFormat(#[from] AgeFormatError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MinionError {
    pub(crate) fn not_found(kind: Entity, name: impl Into<String>) -> Self {
        MinionError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Whether this is a caller-side validation failure rather than an I/O or
    /// runtime failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MinionError::InvalidName(_)
                | MinionError::AlreadyExists(_)
                | MinionError::NotFound { .. }
                | MinionError::InvalidTransition { .. }
                | MinionError::NoSandbox(_)
                | MinionError::MissingTask(_)
                | MinionError::RunningConflict { .. }
                | MinionError::InvalidAgeFormat(_)
        )
    }
}

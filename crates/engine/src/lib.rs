// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Minions orchestration engine: lifecycle, dependency scheduling,
//! mailboxes and registry views.

pub mod adapter_call;
mod config;
mod error;
mod lifecycle;
mod mailbox;
mod options;
pub mod poll;
mod registry;
mod scheduler;
mod signal;
mod wait;

#[cfg(test)]
mod test_helpers;

pub use config::LifecycleConfig;
pub use error::{Entity, MinionError};
pub use lifecycle::LifecycleManager;
pub use mailbox::Mailbox;
pub use options::{
    CloneMode, CloneOptions, CreateOptions, PruneOptions, PruneSelection, StartOptions,
    WaitOptions,
};
pub use registry::{
    MinionStatus, MinionView, Registry, RegistryReport, RUNTIME_NONE, RUNTIME_REMOVED,
};
pub use scheduler::{DependencyScheduler, PassReport};
pub use signal::SignalSource;
pub use wait::{wait_for_completion, WaitOutcome};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observing the worker-written terminal signal

use crate::error::{Entity, MinionError};
use mn_core::TaskStatus;
use mn_storage::{MinionStore, Store};

/// Where the scheduler and waiters read a minion's reported task status.
pub trait SignalSource: Send + Sync {
    /// Current signal for `name`; `None` until the worker reports.
    ///
    /// Fails with `NotFound` if the minion does not exist.
    fn poll_signal(&self, name: &str) -> Result<Option<TaskStatus>, MinionError>;
}

impl<S: Store> SignalSource for MinionStore<S> {
    fn poll_signal(&self, name: &str) -> Result<Option<TaskStatus>, MinionError> {
        if !self.exists(name)? {
            return Err(MinionError::not_found(Entity::Minion, name));
        }
        Ok(self.read_signal(name)?)
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Storage layer for minions: a scoped key-value store and the typed
//! metadata store built on it.

mod fs;
mod mem;
mod minion_store;
mod store;

pub use fs::FsStore;
pub use mem::MemStore;
pub use minion_store::{MinionStore, META_KEY, OUTPUT_PREFIX, SIGNAL_KEY, TASK_KEY};
pub use store::{Scope, ScopeKind, Store, StoreError};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mn-core: domain types for the minions orchestrator

pub mod clock;
pub mod id;
pub mod message;
pub mod minion;
pub mod name;
pub mod time_fmt;

pub use clock::{Clock, SystemClock};
pub use id::{SandboxHandle, ShortId};
pub use message::{Message, MessageId};
pub use minion::{
    InvariantViolation, LifecycleStatus, Minion, ResourceLimits, TaskStatus, TASK_PREVIEW_CHARS,
};
pub use name::{MinionName, NameError, MAX_NAME_LEN};
pub use time_fmt::{format_elapsed, format_elapsed_ms, parse_age, AgeFormatError};

#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded wait for a minion's terminal signal

use crate::error::MinionError;
use crate::options::WaitOptions;
use crate::poll::{Poller, Tick};
use crate::signal::SignalSource;
use mn_core::TaskStatus;
use std::fmt;

/// How a bounded wait ended. Exactly one is always returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Complete,
    Failed,
    TimedOut,
}

impl fmt::Display for WaitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WaitOutcome::Complete => "complete",
            WaitOutcome::Failed => "failed",
            WaitOutcome::TimedOut => "timed out",
        })
    }
}

/// Poll `name`'s signal until it is terminal or `opts.timeout` elapses.
///
/// The signal is checked once before the first sleep, so an already finished
/// minion returns immediately even with a zero timeout.
pub async fn wait_for_completion<P: SignalSource>(
    signals: &P,
    name: &str,
    opts: &WaitOptions,
) -> Result<WaitOutcome, MinionError> {
    let mut poller = Poller::new(opts.interval, Some(opts.timeout));
    loop {
        match signals.poll_signal(name)? {
            Some(TaskStatus::Complete) => return Ok(WaitOutcome::Complete),
            Some(TaskStatus::Failed) => return Ok(WaitOutcome::Failed),
            _ => {}
        }
        match poller.tick().await {
            Tick::Ready => {}
            Tick::Timeout | Tick::Cancelled => {
                tracing::debug!(
                    minion = name,
                    timeout_ms = opts.timeout.as_millis() as u64,
                    "wait timed out"
                );
                return Ok(WaitOutcome::TimedOut);
            }
        }
    }
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod tests;

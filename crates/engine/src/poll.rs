// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polling loop helper.
//!
//! Shared by the scheduler's watch loop and `wait_for_completion`: fixed
//! interval sleeps, an optional deadline, and cooperative cancellation at
//! tick boundaries.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Result of waiting for the next poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Ready for the next poll iteration.
    Ready,
    /// The deadline was reached.
    Timeout,
    /// The cancellation token fired.
    Cancelled,
}

/// A polling loop helper with interval timing, optional deadline, and cancellation.
pub struct Poller {
    interval: Duration,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl Poller {
    /// Create a new poller with the given interval and optional timeout.
    pub fn new(interval: Duration, timeout: Option<Duration>) -> Self {
        Self {
            interval,
            deadline: timeout.map(|t| Instant::now() + t),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop ticking once `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Wait for the next poll tick.
    ///
    /// Returns [`Tick::Timeout`] if the deadline has been reached (checked
    /// both before and after sleeping). The sleep is cut short at the
    /// deadline rather than overshooting it.
    pub async fn tick(&mut self) -> Tick {
        if self.cancel.is_cancelled() {
            return Tick::Cancelled;
        }
        let now = Instant::now();
        let wake = match self.deadline {
            Some(deadline) if now >= deadline => return Tick::Timeout,
            Some(deadline) => deadline.min(now + self.interval),
            None => now + self.interval,
        };

        tokio::select! {
            _ = self.cancel.cancelled() => Tick::Cancelled,
            _ = tokio::time::sleep_until(wake) => {
                if let Some(deadline) = self.deadline {
                    if Instant::now() >= deadline {
                        return Tick::Timeout;
                    }
                }
                Tick::Ready
            }
        }
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;

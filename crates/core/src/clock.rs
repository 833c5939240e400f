// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time source abstraction so timestamps and ages are testable.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Source of wall-clock and monotonic time.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for deadlines.
    fn now(&self) -> Instant;

    /// Milliseconds since the unix epoch, used for persisted timestamps.
    fn epoch_ms(&self) -> u64;
}

/// Real system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeClock;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::Clock;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    struct FakeClockState {
        instant: Instant,
        epoch_ms: u64,
    }

    /// Manually advanced clock for tests. Clones share state.
    #[derive(Clone)]
    pub struct FakeClock {
        inner: Arc<Mutex<FakeClockState>>,
    }

    impl Default for FakeClock {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeClockState {
                    instant: Instant::now(),
                    epoch_ms: 1_700_000_000_000,
                })),
            }
        }
    }

    impl FakeClock {
        pub fn new() -> Self {
            Self::default()
        }

        /// Move both time sources forward.
        pub fn advance(&self, by: Duration) {
            let mut inner = self.inner.lock();
            inner.instant += by;
            inner.epoch_ms += by.as_millis() as u64;
        }

        pub fn set_epoch_ms(&self, ms: u64) {
            self.inner.lock().epoch_ms = ms;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            self.inner.lock().instant
        }

        fn epoch_ms(&self) -> u64 {
            self.inner.lock().epoch_ms
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;

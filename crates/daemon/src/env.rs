// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::DaemonError;

const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(5);

/// Resolve state directory: MN_STATE_DIR > XDG_STATE_HOME/minions > ~/.local/state/minions
pub fn state_dir() -> Result<PathBuf, DaemonError> {
    if let Ok(dir) = std::env::var("MN_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("minions"));
    }
    let home = dirs::home_dir().ok_or(DaemonError::NoStateDir)?;
    Ok(home.join(".local/state/minions"))
}

/// Sandbox image override
pub fn image() -> Option<String> {
    std::env::var("MN_IMAGE").ok().filter(|s| !s.is_empty())
}

/// Docker CLI override
pub fn docker_binary() -> Option<PathBuf> {
    std::env::var("MN_DOCKER").ok().map(PathBuf::from)
}

/// Scheduler pass interval, from `MN_WATCH_MS`
pub fn watch_interval() -> Duration {
    std::env::var("MN_WATCH_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_WATCH_INTERVAL)
}

/// Credential handed to minions the daemon promotes
pub fn credential() -> Option<String> {
    std::env::var("MN_CREDENTIAL").ok().filter(|s| !s.is_empty())
}

pub fn keep_alive() -> bool {
    matches!(
        std::env::var("MN_KEEP_ALIVE").as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;

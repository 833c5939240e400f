// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two ways an operation may treat a sandbox runtime failure.
//!
//! Teardown paths (kill, cleanup, prune, retry) converge on the desired state
//! whatever the runtime says and use [`try_adapter_call`]. Operations whose
//! success is the runtime call itself (start, pause, resume, restart) use
//! [`must_adapter_call`].

use crate::error::MinionError;
use mn_adapters::SandboxError;
use std::future::Future;

/// Run an adapter call, surfacing failure as [`MinionError::Adapter`].
pub async fn must_adapter_call<T>(
    name: &str,
    op: &'static str,
    call: impl Future<Output = Result<T, SandboxError>>,
) -> Result<T, MinionError> {
    call.await.map_err(|source| MinionError::Adapter {
        name: name.to_string(),
        op,
        source,
    })
}

/// Run an adapter call, logging and discarding failure.
pub async fn try_adapter_call<T>(
    name: &str,
    op: &'static str,
    call: impl Future<Output = Result<T, SandboxError>>,
) -> Option<T> {
    match call.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(minion = name, op, error = %e, "ignoring sandbox failure");
            None
        }
    }
}

#[cfg(test)]
#[path = "adapter_call_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::sandbox::{SandboxAdapter, SandboxError, SandboxSpec, SandboxStats};
use async_trait::async_trait;
use mn_core::SandboxHandle;
use tracing::Instrument;

/// Wrapper that adds tracing to any SandboxAdapter
#[derive(Clone)]
pub struct TracedSandbox<A> {
    inner: A,
}

impl<A> TracedSandbox<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: SandboxAdapter> SandboxAdapter for TracedSandbox<A> {
    async fn image_exists(&self) -> bool {
        let exists = self.inner.image_exists().await;
        tracing::debug!(exists, "image checked");
        exists
    }

    async fn start(&self, spec: &SandboxSpec) -> Result<SandboxHandle, SandboxError> {
        let span = tracing::info_span!("sandbox.start", minion = %spec.name, workspace = %spec.workspace.display());
        async {
            tracing::info!(env_count = spec.env.len(), "starting");
            let start = std::time::Instant::now();
            let result = self.inner.start(spec).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(h) => tracing::info!(handle = h.short(12), elapsed_ms, "sandbox started"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "start failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn stop(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.stop(handle).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "stopped"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "stop failed (may be expected)"),
            }
            result
        }
        .instrument(tracing::info_span!("sandbox.stop", handle = handle.short(12)))
        .await
    }

    async fn remove(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        let result = self.inner.remove(handle).await;
        tracing::info_span!("sandbox.remove", handle = handle.short(12)).in_scope(|| {
            match &result {
                Ok(()) => tracing::info!("removed"),
                Err(e) => tracing::warn!(error = %e, "remove failed (may be expected)"),
            }
        });
        result
    }

    async fn pause(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        let result = self.inner.pause(handle).await;
        tracing::info_span!("sandbox.pause", handle = handle.short(12)).in_scope(|| {
            match &result {
                Ok(()) => tracing::info!("paused"),
                Err(e) => tracing::error!(error = %e, "pause failed"),
            }
        });
        result
    }

    async fn unpause(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        let result = self.inner.unpause(handle).await;
        tracing::info_span!("sandbox.unpause", handle = handle.short(12)).in_scope(|| {
            match &result {
                Ok(()) => tracing::info!("unpaused"),
                Err(e) => tracing::error!(error = %e, "unpause failed"),
            }
        });
        result
    }

    async fn restart(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.restart(handle).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "restarted"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "restart failed"),
            }
            result
        }
        .instrument(tracing::info_span!("sandbox.restart", handle = handle.short(12)))
        .await
    }

    async fn inspect_status(&self, handle: &SandboxHandle) -> Result<String, SandboxError> {
        let result = self.inner.inspect_status(handle).await;
        tracing::trace!(handle = handle.short(12), status = ?result.as_ref().ok(), "inspected");
        result
    }

    async fn logs(&self, handle: &SandboxHandle, tail: u32) -> Result<String, SandboxError> {
        let result = self.inner.logs(handle, tail).await;
        tracing::info_span!("sandbox.logs", handle = handle.short(12), tail).in_scope(|| {
            tracing::debug!(
                captured_len = result.as_ref().map(|s| s.len()).ok(),
                "captured"
            )
        });
        result
    }

    async fn stats(&self, handle: &SandboxHandle) -> Result<SandboxStats, SandboxError> {
        self.inner.stats(handle).await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

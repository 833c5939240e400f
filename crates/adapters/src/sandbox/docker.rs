// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker sandbox adapter, driven through the `docker` CLI.

use super::{SandboxAdapter, SandboxError, SandboxSpec, SandboxStats};
use crate::subprocess::{run_with_timeout, DOCKER_RUN_TIMEOUT, DOCKER_STOP_TIMEOUT, DOCKER_TIMEOUT};
use async_trait::async_trait;
use mn_core::SandboxHandle;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;

/// Prefix of every container name created by this adapter.
pub const CONTAINER_PREFIX: &str = "minion-";

/// Settings for [`DockerAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerConfig {
    /// Path or name of the docker CLI
    pub binary: PathBuf,
    pub image: String,
    /// Command run inside the container; empty uses the image's entrypoint
    pub command: Vec<String>,
    /// Where the workspace is mounted inside the container
    pub workspace_mount: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("docker"),
            image: "minions:latest".to_string(),
            command: Vec::new(),
            workspace_mount: "/workspace".to_string(),
        }
    }
}

/// Docker-based sandbox adapter
#[derive(Debug, Clone, Default)]
pub struct DockerAdapter {
    config: DockerConfig,
}

impl DockerAdapter {
    pub fn new(config: DockerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DockerConfig {
        &self.config
    }

    /// Arguments for `docker run` for the given spec.
    pub fn run_args(&self, spec: &SandboxSpec) -> Vec<String> {
        let mount = &self.config.workspace_mount;
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            container_name(&spec.name),
            "-v".to_string(),
            format!("{}:{}", spec.workspace.display(), mount),
            "-w".to_string(),
            mount.clone(),
        ];
        for (key, value) in &spec.env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }
        if let Some(memory) = &spec.limits.memory {
            args.push("--memory".to_string());
            args.push(memory.clone());
        }
        if let Some(cpus) = &spec.limits.cpus {
            args.push("--cpus".to_string());
            args.push(cpus.clone());
        }
        args.push(self.config.image.clone());
        args.extend(self.config.command.iter().cloned());
        args
    }

    /// Run a docker command and return its output, mapping a non-zero exit
    /// to `NotFound` for the handle involved.
    async fn docker_output(
        &self,
        args: &[&str],
        timeout: Duration,
        description: &str,
    ) -> Result<std::process::Output, SandboxError> {
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(args);
        let output = run_with_timeout(cmd, timeout, description)
            .await
            .map_err(SandboxError::CommandFailed)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let subject = args.last().copied().unwrap_or("unknown");
            tracing::debug!(subject, stderr = %stderr, "{} failed", description);
            if stderr.contains("No such container") || stderr.contains("No such object") {
                return Err(SandboxError::NotFound(subject.to_string()));
            }
            return Err(SandboxError::CommandFailed(format!(
                "{}: {}",
                description,
                stderr.trim()
            )));
        }
        Ok(output)
    }

    async fn docker_run(
        &self,
        args: &[&str],
        timeout: Duration,
        description: &str,
    ) -> Result<(), SandboxError> {
        self.docker_output(args, timeout, description)
            .await
            .map(|_| ())
    }
}

/// Container name for a minion.
pub fn container_name(minion: &str) -> String {
    format!("{}{}", CONTAINER_PREFIX, minion)
}

/// One line of `docker stats --format '{{json .}}'`.
#[derive(Debug, Deserialize)]
struct DockerStatsLine {
    #[serde(rename = "CPUPerc", default)]
    cpu_perc: String,
    #[serde(rename = "MemUsage", default)]
    mem_usage: String,
    #[serde(rename = "MemPerc", default)]
    mem_perc: String,
    #[serde(rename = "NetIO", default)]
    net_io: String,
    #[serde(rename = "BlockIO", default)]
    block_io: String,
    #[serde(rename = "PIDs", default)]
    pids: String,
}

/// Parse the first line of `docker stats --no-stream --format '{{json .}}'`.
pub(crate) fn parse_stats(stdout: &str) -> Result<SandboxStats, SandboxError> {
    let line = stdout
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| SandboxError::CommandFailed("docker stats returned nothing".into()))?;
    let raw: DockerStatsLine = serde_json::from_str(line)
        .map_err(|e| SandboxError::CommandFailed(format!("unreadable docker stats: {}", e)))?;
    Ok(SandboxStats {
        cpu_percent: raw.cpu_perc,
        mem_usage: raw.mem_usage,
        mem_percent: raw.mem_perc,
        net_io: raw.net_io,
        block_io: raw.block_io,
        pids: raw.pids,
    })
}

#[async_trait]
impl SandboxAdapter for DockerAdapter {
    async fn image_exists(&self) -> bool {
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(["image", "inspect", &self.config.image]);
        match run_with_timeout(cmd, DOCKER_TIMEOUT, "docker image inspect").await {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::warn!(image = %self.config.image, error = %e, "image check failed");
                false
            }
        }
    }

    async fn start(&self, spec: &SandboxSpec) -> Result<SandboxHandle, SandboxError> {
        // Precondition: the workspace must exist to be mounted
        if !spec.workspace.exists() {
            return Err(SandboxError::StartFailed(format!(
                "workspace does not exist: {}",
                spec.workspace.display()
            )));
        }

        // A leftover container with the same name blocks `docker run`
        let name = container_name(&spec.name);
        let mut rm = Command::new(&self.config.binary);
        rm.args(["rm", "-f", &name]);
        if let Ok(output) = run_with_timeout(rm, DOCKER_TIMEOUT, "docker rm").await {
            if output.status.success() {
                tracing::debug!(container = %name, "removed stale container");
            }
        }

        let args = self.run_args(spec);
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(&args);
        let output = run_with_timeout(cmd, DOCKER_RUN_TIMEOUT, "docker run")
            .await
            .map_err(SandboxError::StartFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(container = %name, stderr = %stderr, "docker run failed");
            if stderr.contains("Unable to find image") || stderr.contains("pull access denied") {
                return Err(SandboxError::ImageMissing(self.config.image.clone()));
            }
            return Err(SandboxError::StartFailed(stderr.trim().to_string()));
        }

        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(SandboxError::StartFailed(
                "docker run printed no container id".to_string(),
            ));
        }
        Ok(SandboxHandle::new(id))
    }

    async fn stop(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        self.docker_run(
            &["stop", handle.as_str()],
            DOCKER_STOP_TIMEOUT,
            "docker stop",
        )
        .await
    }

    async fn remove(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        self.docker_run(&["rm", "-f", handle.as_str()], DOCKER_TIMEOUT, "docker rm")
            .await
    }

    async fn pause(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        self.docker_run(&["pause", handle.as_str()], DOCKER_TIMEOUT, "docker pause")
            .await
    }

    async fn unpause(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        self.docker_run(
            &["unpause", handle.as_str()],
            DOCKER_TIMEOUT,
            "docker unpause",
        )
        .await
    }

    async fn restart(&self, handle: &SandboxHandle) -> Result<(), SandboxError> {
        self.docker_run(
            &["restart", handle.as_str()],
            DOCKER_STOP_TIMEOUT,
            "docker restart",
        )
        .await
    }

    async fn inspect_status(&self, handle: &SandboxHandle) -> Result<String, SandboxError> {
        let output = self
            .docker_output(
                &["inspect", "--format", "{{.State.Status}}", handle.as_str()],
                DOCKER_TIMEOUT,
                "docker inspect",
            )
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn logs(&self, handle: &SandboxHandle, tail: u32) -> Result<String, SandboxError> {
        let tail = tail.to_string();
        let output = self
            .docker_output(
                &["logs", "--tail", &tail, handle.as_str()],
                DOCKER_TIMEOUT,
                "docker logs",
            )
            .await?;
        // docker logs replays the container's stderr on our stderr
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }

    async fn stats(&self, handle: &SandboxHandle) -> Result<SandboxStats, SandboxError> {
        let output = self
            .docker_output(
                &[
                    "stats",
                    "--no-stream",
                    "--format",
                    "{{json .}}",
                    handle.as_str(),
                ],
                DOCKER_TIMEOUT,
                "docker stats",
            )
            .await?;
        parse_stats(&String::from_utf8_lossy(&output.stdout))
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;

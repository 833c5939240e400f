// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minions Daemon (mnd)
//!
//! Background process that runs the dependency scheduler: waiting minions
//! are started once the minion they depend on signals completion.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod lifecycle;

use std::path::Path;

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::lifecycle::{Config, DaemonError};

/// Logs larger than this are rotated at startup.
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Rotated copies kept alongside the live log (`mnd.log.1` .. `mnd.log.3`).
const MAX_ROTATIONS: u32 = 3;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("mnd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("mnd {}", env!("CARGO_PKG_VERSION"));
                println!("Minions Daemon - starts waiting minions when their dependency completes");
                println!();
                println!("USAGE:");
                println!("    mnd");
                println!();
                println!("ENVIRONMENT:");
                println!("    MN_STATE_DIR     State directory (default ~/.local/state/minions)");
                println!("    MN_IMAGE         Sandbox image (default minions:latest)");
                println!("    MN_WATCH_MS      Scheduler interval in milliseconds (default 5000)");
                println!("    MN_CREDENTIAL    Credential passed to promoted minions");
                println!("    MN_KEEP_ALIVE    Keep promoted sandboxes alive after the worker exits");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: mnd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    let log_guard = setup_logging(&config)?;
    info!(pid = std::process::id(), "starting daemon");

    let daemon = match lifecycle::startup(config).await {
        Ok(daemon) => daemon,
        Err(DaemonError::LockFailed(_)) => {
            eprintln!("mnd is already running");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let cancel = CancellationToken::new();
    spawn_signal_handler(cancel.clone())?;

    info!(
        interval_ms = daemon.config.watch_interval.as_millis() as u64,
        "daemon ready"
    );
    println!("READY");

    daemon
        .scheduler
        .watch(
            daemon.config.watch_interval,
            &daemon.config.start,
            |name| info!(minion = %name, "promoted"),
            cancel,
        )
        .await;

    info!("Daemon stopped");
    Ok(())
}

/// Cancel `token` on SIGTERM or SIGINT.
fn spawn_signal_handler(token: CancellationToken) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
        }
        token.cancel();
    });
    Ok(())
}

/// Shift `log.N` to `log.N+1` and move an oversized `log` to `log.1`.
///
/// The oldest rotation is dropped. Failures are ignored; logging still
/// works against an unrotated file.
fn rotate_log_if_needed(log_path: &Path) {
    let Ok(meta) = std::fs::metadata(log_path) else {
        return;
    };
    if meta.len() <= MAX_LOG_SIZE {
        return;
    }
    let rotated = |n: u32| {
        let mut name = log_path.as_os_str().to_owned();
        name.push(format!(".{n}"));
        std::path::PathBuf::from(name)
    };
    let _ = std::fs::remove_file(rotated(MAX_ROTATIONS));
    for n in (1..MAX_ROTATIONS).rev() {
        let from = rotated(n);
        if from.exists() {
            let _ = std::fs::rename(&from, rotated(n + 1));
        }
    }
    let _ = std::fs::rename(log_path, rotated(1));
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, DaemonError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = config.log_path.parent().ok_or(DaemonError::NoStateDir)?;
    std::fs::create_dir_all(dir)?;
    rotate_log_if_needed(&config.log_path);

    let file_appender = tracing_appender::rolling::never(
        dir,
        config
            .log_path
            .file_name()
            .ok_or(DaemonError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

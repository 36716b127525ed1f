// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Gray Logic Daemon (gld)
//!
//! Background process hosting the KNX routing-daemon supervisor: launches
//! the daemon, polls its health, restarts it on recoverable failures, and
//! stops it cleanly on SIGTERM/SIGINT.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use gl_daemon::{startup, Config, LifecycleError};
use std::path::Path;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

/// Rotate the log once it grows past this size.
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("gld {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("gld {}", env!("CARGO_PKG_VERSION"));
                println!("Gray Logic Daemon - supervises the KNX routing daemon");
                println!();
                println!("USAGE:");
                println!("    gld");
                println!();
                println!("Configuration is read from $GL_CONFIG or");
                println!("<state_dir>/config.toml; state lives under $GL_STATE_DIR");
                println!("or ~/.local/state/graylogic.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: gld [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)?;
    rotate_log_if_needed(&config.log_path);
    let _log_guard = setup_logging(&config)?;

    info!("starting gray logic daemon");

    let mut daemon = match startup(&config).await {
        Ok(daemon) => daemon,
        Err(LifecycleError::LockFailed(_)) => {
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("gld is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            error!("failed to start daemon: {}", e);
            return Err(e.into());
        }
    };

    let health_loop = daemon.spawn_health_loop();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }

    daemon.shutdown().await?;
    health_loop.abort();
    Ok(())
}

/// Set up tracing to a non-blocking file writer with env-filter control.
fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, Box<dyn std::error::Error>> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

/// Keep one rotated copy once the log passes the size cap.
fn rotate_log_if_needed(log_path: &Path) {
    let Ok(metadata) = std::fs::metadata(log_path) else {
        return;
    };
    if metadata.len() <= MAX_LOG_SIZE {
        return;
    }
    let rotated = log_path.with_extension("log.old");
    let _ = std::fs::rename(log_path, rotated);
}

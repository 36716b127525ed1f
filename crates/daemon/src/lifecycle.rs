// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Daemon lifecycle management: startup, health loop, shutdown.

use crate::config::Config;
use fs2::FileExt;
use gl_adapters::ChildProcessAdapter;
use gl_knx::{KnxSupervisor, NoOpAddressProvider, SupervisorError};
use std::fs::File;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// The concrete supervisor the daemon runs.
pub type DaemonSupervisor = KnxSupervisor<ChildProcessAdapter, NoOpAddressProvider>;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),
}

/// Running daemon state.
#[derive(Debug)]
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub supervisor: Arc<DaemonSupervisor>,
    pub cancel: CancellationToken,
}

/// Start the daemon: take the instance lock, then launch the supervisor.
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Acquire lock file FIRST - prevents races.
    // Open without truncating so a failed lock doesn't wipe the running
    // daemon's PID.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let cancel = CancellationToken::new();
    let supervisor = Arc::new(KnxSupervisor::new(
        config.settings.knx.clone(),
        ChildProcessAdapter::new(),
        None::<NoOpAddressProvider>,
    ));

    if let Err(e) = supervisor.start(&cancel).await {
        // Roll back the instance lock so a retry can start cleanly
        let _ = std::fs::remove_file(&config.lock_path);
        return Err(e.into());
    }

    info!("daemon started");
    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        supervisor,
        cancel,
    })
}

impl DaemonState {
    /// Spawn the periodic health loop.
    ///
    /// Recoverable failures restart the routing daemon; non-recoverable
    /// ones (absent hardware) stop it and leave it stopped.
    pub fn spawn_health_loop(&self) -> JoinHandle<()> {
        let supervisor = Arc::clone(&self.supervisor);
        let cancel = self.cancel.clone();
        let interval = self.config.settings.health_check_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so startup settles
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = ticker.tick() => {}
                }
                match supervisor.health_check(&cancel).await {
                    Ok(()) => {
                        debug!(stats = ?serde_json::to_string(&supervisor.stats()).ok(), "health check passed");
                    }
                    Err(e) if e.recoverable => {
                        warn!(layer = e.layer, error = %e, "recoverable health failure, restarting daemon");
                        if let Err(stop_err) = supervisor.stop().await {
                            warn!(error = %stop_err, "stop during recovery failed");
                        }
                        if let Err(start_err) = supervisor.start(&cancel).await {
                            error!(error = %start_err, "restart after health failure failed");
                        }
                    }
                    Err(e) => {
                        error!(
                            layer = e.layer,
                            error = %e,
                            "non-recoverable health failure, leaving daemon stopped"
                        );
                        if let Err(stop_err) = supervisor.stop().await {
                            warn!(error = %stop_err, "stop after fatal health failure failed");
                        }
                    }
                }
            }
        })
    }

    /// Shutdown the daemon gracefully.
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("shutting down daemon...");
        self.cancel.cancel();
        self.supervisor.stop().await?;

        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("failed to remove pid file: {}", e);
            }
        }
        // Lock itself is released when self.lock_file drops

        info!("daemon shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Lifecycle supervisor for the external KNX routing daemon.

use crate::address::GroupAddress;
use crate::config::KnxConfig;
use crate::health::{
    self, evaluate_process_state, HealthError, LAYER_BUS_DIALOGUE, LAYER_PROCESS_STATE,
    LAYER_USB_PRESENCE,
};
use crate::pidfile::{PidLock, PidLockError};
use crate::probe::probe_group_address;
use crate::proc;
use crate::provider::GroupAddressProvider;
use crate::usb::{self, UsbResetError};
use gl_adapters::{ProcessAdapter, ProcessError};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

/// How long the daemon gets to start accepting TCP clients.
const TCP_READY_DEADLINE: Duration = Duration::from_secs(30);
/// Poll cadence while waiting for readiness.
const TCP_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Per-attempt dial timeout during the readiness poll.
const TCP_DIAL_TIMEOUT: Duration = Duration::from_millis(500);
/// Candidate group addresses requested per bus health check.
const HEALTH_CHECK_ADDRESS_LIMIT: usize = 5;
/// The kernel truncates `/proc/<pid>/comm` to this many characters.
const COMM_MAX_LEN: usize = 15;

/// Supervisor failures
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("process error: {0}")]
    Process(#[from] ProcessError),
    #[error("pid lock error: {0}")]
    PidLock(#[from] PidLockError),
    #[error("daemon exited during startup: {0}")]
    ChildExited(String),
    #[error("daemon did not accept tcp connections within {0:?}")]
    StartupTimeout(Duration),
    #[error("startup cancelled")]
    Cancelled,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reported supervisor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorStatus {
    Running,
    Stopped,
    /// Daemon exists but is not managed by us
    External,
}

/// JSON stats surface.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorStats {
    pub managed: bool,
    pub status: SupervisorStatus,
    pub backend: String,
    pub connection_url: String,
    pub pid: Option<u32>,
    pub uptime_secs: u64,
    pub restart_count: u64,
    pub last_error: Option<String>,
}

/// Supervises the routing daemon: launch, readiness, single-instance
/// ownership, layered health checks, targeted recovery.
#[derive(Debug)]
pub struct KnxSupervisor<P: ProcessAdapter, G: GroupAddressProvider> {
    config: KnxConfig,
    process: P,
    provider: Option<G>,
    pid_lock: Mutex<Option<PidLock>>,
    disk_sleep_streak: Mutex<u32>,
    started_at: Mutex<Option<Instant>>,
}

impl<P: ProcessAdapter, G: GroupAddressProvider> KnxSupervisor<P, G> {
    pub fn new(config: KnxConfig, process: P, provider: Option<G>) -> Self {
        Self {
            config,
            process,
            provider,
            pid_lock: Mutex::new(None),
            disk_sleep_streak: Mutex::new(0),
            started_at: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &KnxConfig {
        &self.config
    }

    /// Launch the daemon and wait until it is ready.
    ///
    /// Unmanaged configurations return success immediately: the daemon is
    /// someone else's process. The PID lock is taken only after readiness,
    /// so a failed launch never leaves a lockfile behind.
    pub async fn start(&self, cancel: &CancellationToken) -> Result<(), SupervisorError> {
        if !self.config.managed {
            tracing::info!("knx daemon is external, skipping launch");
            return Ok(());
        }

        let mut spec = self.config.process_spec();
        if self.config.backend.is_usb() && self.config.reset_on_retry {
            let vendor = self.config.usb_vendor_id.clone();
            let product = self.config.usb_product_id.clone();
            spec.on_restart = Some(Arc::new(move || {
                let vendor = vendor.clone();
                let product = product.clone();
                Box::pin(async move {
                    if let Err(e) = usb::reset_usb_device(&vendor, &product).await {
                        tracing::warn!(error = %e, "usb reset before restart failed");
                    }
                }) as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
            }));
        }

        let pid = self.process.spawn(spec).await?;
        tracing::info!(pid, args = ?self.config.build_args(), "knx daemon launched");

        if self.config.listen_tcp {
            self.wait_tcp_ready(cancel).await?;
        }

        let comm = expected_comm(&self.config.binary);
        let lock = match self.config.pid_file.clone() {
            Some(path) => PidLock::acquire_at(path, pid, &comm)?,
            None => PidLock::acquire(pid, &comm)?,
        };
        *self.pid_lock.lock() = Some(lock);
        *self.started_at.lock() = Some(Instant::now());
        tracing::info!(pid, url = %self.config.connection_url(), "knx daemon ready");
        Ok(())
    }

    /// Poll-connect to the daemon's TCP port until it answers.
    async fn wait_tcp_ready(&self, cancel: &CancellationToken) -> Result<(), SupervisorError> {
        let deadline = Instant::now() + TCP_READY_DEADLINE;
        let port = self.config.listen_port;
        loop {
            if cancel.is_cancelled() {
                let _ = self.process.stop().await;
                return Err(SupervisorError::Cancelled);
            }
            if !self.process.is_running() {
                let last = self
                    .process
                    .last_error()
                    .unwrap_or_else(|| "daemon exited during startup".to_string());
                let _ = self.process.stop().await;
                return Err(SupervisorError::ChildExited(last));
            }
            if let Ok(Ok(_stream)) = tokio::time::timeout(
                TCP_DIAL_TIMEOUT,
                TcpStream::connect(("127.0.0.1", port)),
            )
            .await
            {
                return Ok(());
            }
            if Instant::now() >= deadline {
                let _ = self.process.stop().await;
                return Err(SupervisorError::StartupTimeout(TCP_READY_DEADLINE));
            }
            tokio::time::sleep(TCP_POLL_INTERVAL).await;
        }
    }

    /// Stop the daemon, then release the PID lock.
    ///
    /// Order matters: removing the lockfile first would let a fresh
    /// instance race into a USB device the dying child still holds.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        if !self.config.managed {
            return Ok(());
        }
        self.process.stop().await?;
        if let Some(lock) = self.pid_lock.lock().take() {
            lock.release()?;
        }
        *self.started_at.lock() = None;
        tracing::info!("knx daemon stopped");
        Ok(())
    }

    /// Layered liveness probe; fails fast on the first failing layer.
    pub async fn health_check(&self, cancel: &CancellationToken) -> Result<(), HealthError> {
        // Layer 0 — hardware presence (USB backend only)
        if self.config.backend.is_usb() {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(HealthError::recoverable(
                        LAYER_USB_PRESENCE,
                        "health check cancelled",
                    ));
                }
                result = health::check_usb_presence(
                    &self.config.usb_vendor_id,
                    &self.config.usb_product_id,
                ) => result?,
            }
        }

        // Layer 1 — kernel process state (managed child only)
        if self.config.managed {
            let pid = self.process.pid().ok_or_else(|| {
                HealthError::recoverable(LAYER_PROCESS_STATE, "no child process")
            })?;
            let state = proc::process_state(pid).map_err(|e| {
                HealthError::recoverable(
                    LAYER_PROCESS_STATE,
                    format!("cannot read process state for pid {}: {}", pid, e),
                )
            })?;
            let verdict = {
                let mut streak = self.disk_sleep_streak.lock();
                let (next, verdict) = evaluate_process_state(state, *streak);
                *streak = next;
                verdict
            };
            verdict?;
        }

        // Layer 3 — live bus dialogue (needs known group addresses)
        if let Some(provider) = &self.provider {
            let addresses = provider
                .health_check_addresses(HEALTH_CHECK_ADDRESS_LIMIT)
                .await;
            if !addresses.is_empty() {
                return self.check_bus_dialogue(cancel, &addresses, provider).await;
            }
        }
        Ok(())
    }

    async fn check_bus_dialogue(
        &self,
        cancel: &CancellationToken,
        addresses: &[String],
        provider: &G,
    ) -> Result<(), HealthError> {
        let timeout = self.config.bus_check_timeout();
        for raw in addresses {
            if cancel.is_cancelled() {
                return Err(HealthError::recoverable(
                    LAYER_BUS_DIALOGUE,
                    "health check cancelled",
                ));
            }
            let Ok(address) = raw.parse::<GroupAddress>() else {
                tracing::warn!(address = %raw, "provider supplied unparseable group address");
                continue;
            };
            match probe_group_address(self.config.listen_port, address, timeout).await {
                Ok(()) => {
                    provider.mark_health_check_used(raw).await;
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(address = %raw, error = %e, "bus dialogue attempt failed");
                }
            }
        }

        if self.config.backend.is_usb() && self.config.reset_on_bus_failure {
            if let Err(e) = self.reset_usb_device().await {
                tracing::warn!(error = %e, "usb reset after bus failure failed");
            }
        }
        Err(HealthError::recoverable(
            LAYER_BUS_DIALOGUE,
            format!("no bus response from {} candidate address(es)", addresses.len()),
        ))
    }

    /// Reset the configured USB interface.
    pub async fn reset_usb_device(&self) -> Result<(), UsbResetError> {
        usb::reset_usb_device(&self.config.usb_vendor_id, &self.config.usb_product_id).await
    }

    /// Current stats surface.
    pub fn stats(&self) -> SupervisorStats {
        let status = if !self.config.managed {
            SupervisorStatus::External
        } else if self.process.is_running() {
            SupervisorStatus::Running
        } else {
            SupervisorStatus::Stopped
        };
        SupervisorStats {
            managed: self.config.managed,
            status,
            backend: self.config.backend.as_arg(),
            connection_url: self.config.connection_url(),
            pid: if self.config.managed {
                self.process.pid()
            } else {
                None
            },
            uptime_secs: self
                .started_at
                .lock()
                .map(|t| t.elapsed().as_secs())
                .unwrap_or(0),
            restart_count: self.process.restart_count(),
            last_error: self.process.last_error(),
        }
    }
}

/// Kernel process name the lockfile owner must carry, truncated the way
/// the kernel truncates comm.
fn expected_comm(binary: &Path) -> String {
    let name = binary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "knxd".to_string());
    name.chars().take(COMM_MAX_LEN).collect()
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! tokio::process implementation of [`ProcessAdapter`].

use super::{ProcessAdapter, ProcessError, ProcessSpec, RestartPolicy};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};

/// Poll interval while waiting for a killed process to disappear.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Default)]
struct Inner {
    pid: Option<u32>,
    running: bool,
    stopping: bool,
    restart_count: u64,
    last_error: Option<String>,
    graceful_stop: Duration,
}

/// Supervises one external child process with restart policy.
#[derive(Debug, Clone, Default)]
pub struct ChildProcessAdapter {
    inner: Arc<Mutex<Inner>>,
}

impl ChildProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn_child(spec: &ProcessSpec) -> Result<Child, ProcessError> {
        Command::new(&spec.program)
            .args(&spec.args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| ProcessError::SpawnFailed(format!("{}: {}", spec.program.display(), e)))
    }
}

#[async_trait]
impl ProcessAdapter for ChildProcessAdapter {
    async fn spawn(&self, spec: ProcessSpec) -> Result<u32, ProcessError> {
        {
            let state = self.inner.lock();
            if state.running {
                return Err(ProcessError::AlreadyRunning(state.pid.unwrap_or_default()));
            }
        }

        let child = Self::spawn_child(&spec)?;
        let pid = child
            .id()
            .ok_or_else(|| ProcessError::SpawnFailed("child has no pid".to_string()))?;

        {
            let mut state = self.inner.lock();
            state.pid = Some(pid);
            state.running = true;
            state.stopping = false;
            state.restart_count = 0;
            state.last_error = None;
            state.graceful_stop = spec.graceful_stop;
        }

        tracing::info!(pid, program = %spec.program.display(), "child started");
        tokio::spawn(supervise(Arc::clone(&self.inner), spec, child));
        Ok(pid)
    }

    async fn stop(&self) -> Result<(), ProcessError> {
        let (pid, graceful) = {
            let mut state = self.inner.lock();
            state.stopping = true;
            (state.pid, state.graceful_stop)
        };
        let Some(pid) = pid else {
            return Ok(());
        };
        if !process_exists(pid) {
            self.inner.lock().running = false;
            return Ok(());
        }

        tracing::info!(pid, "stopping child");
        kill_signal("-15", pid);
        if !wait_for_exit(pid, graceful).await {
            tracing::warn!(pid, "child ignored SIGTERM, sending SIGKILL");
            kill_signal("-9", pid);
            if !wait_for_exit(pid, graceful).await {
                return Err(ProcessError::StopFailed(format!(
                    "pid {} survived SIGKILL",
                    pid
                )));
            }
        }
        self.inner.lock().running = false;
        Ok(())
    }

    fn pid(&self) -> Option<u32> {
        self.inner.lock().pid
    }

    fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    fn restart_count(&self) -> u64 {
        self.inner.lock().restart_count
    }

    fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }
}

/// Supervision loop: wait for exit, apply restart policy, respawn.
async fn supervise(inner: Arc<Mutex<Inner>>, spec: ProcessSpec, mut child: Child) {
    let mut attempts: u32 = 0;
    loop {
        let status = child.wait().await;
        {
            let mut state = inner.lock();
            state.running = false;
            match &status {
                Ok(st) if st.success() => state.last_error = None,
                Ok(st) => state.last_error = Some(format!("child exited with {}", st)),
                Err(e) => state.last_error = Some(format!("wait failed: {}", e)),
            }
            if state.stopping {
                tracing::debug!("child stopped on request");
                return;
            }
        }

        let Some(delay) = restart_delay(&spec.restart, attempts) else {
            tracing::warn!(attempts, "child exited, restart budget exhausted");
            return;
        };
        attempts += 1;
        tracing::warn!(
            attempt = attempts,
            delay_ms = delay.as_millis() as u64,
            "child exited, restarting"
        );
        tokio::time::sleep(delay).await;
        if inner.lock().stopping {
            return;
        }

        if let Some(hook) = &spec.on_restart {
            hook().await;
        }

        match ChildProcessAdapter::spawn_child(&spec) {
            Ok(new_child) => {
                let pid = new_child.id();
                child = new_child;
                let mut state = inner.lock();
                state.pid = pid;
                state.running = true;
                state.restart_count += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "restart spawn failed");
                inner.lock().last_error = Some(e.to_string());
                // Old handle already exited; loop charges another attempt.
            }
        }
    }
}

/// Delay before the next restart attempt, `None` when the policy is spent.
fn restart_delay(policy: &RestartPolicy, attempts: u32) -> Option<Duration> {
    match *policy {
        RestartPolicy::Never => None,
        RestartPolicy::Fixed {
            delay,
            max_attempts,
        } => (attempts < max_attempts).then_some(delay),
        RestartPolicy::Exponential {
            base,
            cap,
            max_attempts,
        } => {
            if attempts >= max_attempts {
                return None;
            }
            let scaled = base.saturating_mul(2u32.saturating_pow(attempts)).min(cap);
            // Up to 10% jitter so co-restarting daemons do not stampede
            let jitter_ceiling = (scaled.as_millis() as u64 / 10).max(1);
            let jitter = rand::rng().random_range(0..=jitter_ceiling);
            Some(scaled + Duration::from_millis(jitter))
        }
    }
}

/// Execute kill with the given signal and PID
fn kill_signal(signal: &str, pid: u32) -> bool {
    std::process::Command::new("kill")
        .args([signal, &pid.to_string()])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Check if a process with the given PID exists
fn process_exists(pid: u32) -> bool {
    kill_signal("-0", pid)
}

/// Poll until the process disappears or the timeout elapses
async fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if !process_exists(pid) {
            return true;
        }
        tokio::time::sleep(STOP_POLL_INTERVAL).await;
    }
    !process_exists(pid)
}

#[cfg(test)]
#[path = "child_tests.rs"]
mod tests;

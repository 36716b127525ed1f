// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Managed external process adapters.
//!
//! One adapter instance owns at most one child process. Restart policy and
//! stop semantics live here; callers decide what to run and when.

mod child;

pub use child::ChildProcessAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProcessAdapter;

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors from process management
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("process already running (pid {0})")]
    AlreadyRunning(u32),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("stop failed: {0}")]
    StopFailed(String),
}

/// Restart behavior after the child exits on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Exit stays final
    Never,
    /// Fixed delay between bounded restart attempts
    Fixed { delay: Duration, max_attempts: u32 },
    /// Doubling delay from `base` up to `cap`, bounded attempts
    Exponential {
        base: Duration,
        cap: Duration,
        max_attempts: u32,
    },
}

/// Async callback invoked between a child exit and its restart.
pub type RestartHook = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// What to run and how to keep it running.
#[derive(Clone)]
pub struct ProcessSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub restart: RestartPolicy,
    /// SIGTERM grace window before SIGKILL
    pub graceful_stop: Duration,
    /// Runs before each restart attempt (e.g. a USB reset)
    pub on_restart: Option<RestartHook>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            restart: RestartPolicy::Never,
            graceful_stop: Duration::from_secs(5),
            on_restart: None,
        }
    }
}

impl fmt::Debug for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessSpec")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("restart", &self.restart)
            .field("graceful_stop", &self.graceful_stop)
            .field("on_restart", &self.on_restart.is_some())
            .finish()
    }
}

/// Adapter supervising a single external child process.
#[async_trait]
pub trait ProcessAdapter: Clone + Send + Sync + 'static {
    /// Launch the child. Returns its PID.
    async fn spawn(&self, spec: ProcessSpec) -> Result<u32, ProcessError>;

    /// Stop the child: SIGTERM, grace window, then SIGKILL.
    ///
    /// Idempotent; succeeds when nothing is running.
    async fn stop(&self) -> Result<(), ProcessError>;

    /// PID of the current (or last) child.
    fn pid(&self) -> Option<u32>;

    /// Whether a child is currently alive.
    fn is_running(&self) -> bool;

    /// Number of restarts performed since `spawn`.
    fn restart_count(&self) -> u64;

    /// Last recorded child error (abnormal exit or spawn failure).
    fn last_error(&self) -> Option<String>;
}

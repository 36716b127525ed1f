// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Fake process adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProcessAdapter, ProcessError, ProcessSpec};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

struct FakeProcessState {
    specs: Vec<ProcessSpec>,
    pid: u32,
    running: bool,
    restart_count: u64,
    last_error: Option<String>,
    fail_spawn: Option<String>,
    exit_immediately: bool,
    stop_calls: u32,
}

impl Default for FakeProcessState {
    fn default() -> Self {
        Self {
            specs: Vec::new(),
            pid: 4242,
            running: false,
            restart_count: 0,
            last_error: None,
            fail_spawn: None,
            exit_immediately: false,
            stop_calls: 0,
        }
    }
}

/// Fake process adapter for testing
#[derive(Clone, Default)]
pub struct FakeProcessAdapter {
    inner: Arc<Mutex<FakeProcessState>>,
}

impl FakeProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Specs passed to `spawn`, in order.
    pub fn spawned_specs(&self) -> Vec<ProcessSpec> {
        self.inner.lock().specs.clone()
    }

    /// PID returned by the next `spawn`.
    pub fn set_pid(&self, pid: u32) {
        self.inner.lock().pid = pid;
    }

    /// Make the next `spawn` fail with the given message.
    pub fn fail_next_spawn(&self, message: impl Into<String>) {
        self.inner.lock().fail_spawn = Some(message.into());
    }

    /// Simulate the child dying right after spawn.
    pub fn exit_immediately(&self, last_error: impl Into<String>) {
        let mut state = self.inner.lock();
        state.exit_immediately = true;
        state.last_error = Some(last_error.into());
    }

    /// Flip the running flag (child died on its own).
    pub fn set_running(&self, running: bool) {
        self.inner.lock().running = running;
    }

    pub fn set_restart_count(&self, count: u64) {
        self.inner.lock().restart_count = count;
    }

    /// Number of `stop` calls.
    pub fn stop_calls(&self) -> u32 {
        self.inner.lock().stop_calls
    }
}

#[async_trait]
impl ProcessAdapter for FakeProcessAdapter {
    async fn spawn(&self, spec: ProcessSpec) -> Result<u32, ProcessError> {
        let mut state = self.inner.lock();
        if let Some(message) = state.fail_spawn.take() {
            return Err(ProcessError::SpawnFailed(message));
        }
        state.specs.push(spec);
        state.running = !state.exit_immediately;
        Ok(state.pid)
    }

    async fn stop(&self) -> Result<(), ProcessError> {
        let mut state = self.inner.lock();
        state.stop_calls += 1;
        state.running = false;
        Ok(())
    }

    fn pid(&self) -> Option<u32> {
        let state = self.inner.lock();
        if state.specs.is_empty() {
            None
        } else {
            Some(state.pid)
        }
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

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Layered health probing for the routing daemon.
//!
//! Layer 0 checks the USB interface is enumerated at all, layer 1 checks
//! the kernel's view of the child process, layer 3 exercises a live bus
//! dialogue. The supervisor fails fast on the first failing layer.

use gl_adapters::subprocess::{run_with_timeout, SubprocessError};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// USB interface presence.
pub const LAYER_USB_PRESENCE: u8 = 0;
/// Kernel process state.
pub const LAYER_PROCESS_STATE: u8 = 1;
/// Live bus dialogue.
pub const LAYER_BUS_DIALOGUE: u8 = 3;

/// Timeout for the USB enumeration probe.
pub const USB_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Consecutive uninterruptible-sleep observations tolerated before the USB
/// stack is presumed wedged.
pub const MAX_DISK_SLEEP_STREAK: u32 = 3;

/// A failed health layer.
///
/// `recoverable: false` tells the process manager that restarting the
/// daemon cannot fix the condition (e.g. unplugged hardware).
#[derive(Debug, Error)]
#[error("health layer {layer} failed (recoverable: {recoverable}): {message}")]
pub struct HealthError {
    pub layer: u8,
    pub recoverable: bool,
    pub message: String,
}

impl HealthError {
    pub fn recoverable(layer: u8, message: impl Into<String>) -> Self {
        Self {
            layer,
            recoverable: true,
            message: message.into(),
        }
    }

    pub fn fatal(layer: u8, message: impl Into<String>) -> Self {
        Self {
            layer,
            recoverable: false,
            message: message.into(),
        }
    }
}

/// Layer 0: ask the host's USB enumeration tool whether the configured
/// interface is present. Absent hardware is not recoverable by restarts.
pub async fn check_usb_presence(vendor_id: &str, product_id: &str) -> Result<(), HealthError> {
    let filter = format!("{}:{}", vendor_id, product_id);
    let mut cmd = Command::new("lsusb");
    cmd.args(["-d", &filter]);

    let output = run_with_timeout(cmd, USB_PROBE_TIMEOUT, "lsusb")
        .await
        .map_err(|e: SubprocessError| {
            HealthError::fatal(LAYER_USB_PRESENCE, format!("usb probe failed: {}", e))
        })?;

    if !output.status.success() || output.stdout.is_empty() {
        return Err(HealthError::fatal(
            LAYER_USB_PRESENCE,
            format!("usb interface {} not enumerated", filter),
        ));
    }
    Ok(())
}

/// Layer 1 policy: interpret one kernel state observation.
///
/// Returns the updated consecutive-`D` streak alongside the verdict. Any
/// healthy state resets the streak; `D` only fails once it has been seen
/// [`MAX_DISK_SLEEP_STREAK`] times in a row.
pub fn evaluate_process_state(state: char, disk_sleep_streak: u32) -> (u32, Result<(), HealthError>) {
    match state {
        'T' | 't' => (
            0,
            Err(HealthError::recoverable(
                LAYER_PROCESS_STATE,
                format!("daemon process is stopped/traced ({})", state),
            )),
        ),
        'Z' => (
            0,
            Err(HealthError::recoverable(
                LAYER_PROCESS_STATE,
                "daemon process is a zombie",
            )),
        ),
        'X' | 'x' => (
            0,
            Err(HealthError::recoverable(
                LAYER_PROCESS_STATE,
                "daemon process is dead",
            )),
        ),
        'D' => {
            let streak = disk_sleep_streak + 1;
            if streak >= MAX_DISK_SLEEP_STREAK {
                (
                    streak,
                    Err(HealthError::recoverable(
                        LAYER_PROCESS_STATE,
                        format!(
                            "daemon stuck in uninterruptible sleep ({} consecutive observations)",
                            streak
                        ),
                    )),
                )
            } else {
                tracing::debug!(streak, "daemon in uninterruptible sleep, tolerating");
                (streak, Ok(()))
            }
        }
        _ => (0, Ok(())),
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;

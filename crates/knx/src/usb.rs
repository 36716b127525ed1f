// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Targeted USB device reset via the host's `usbreset` utility.

use gl_adapters::subprocess::{run_checked, SubprocessError};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Upper bound for one reset invocation.
pub const USB_RESET_TIMEOUT: Duration = Duration::from_secs(10);

/// Devices need a moment to re-enumerate after a successful reset.
const REINIT_SETTLE: Duration = Duration::from_millis(500);

/// USB reset failures
#[derive(Debug, Error)]
pub enum UsbResetError {
    #[error("usb reset failed: {0}")]
    Reset(#[from] SubprocessError),
}

/// Reset the interface identified by `vendor_id:product_id`.
pub async fn reset_usb_device(vendor_id: &str, product_id: &str) -> Result<(), UsbResetError> {
    let target = format!("{}:{}", vendor_id, product_id);
    tracing::warn!(target = %target, "resetting usb interface");

    let mut cmd = Command::new("usbreset");
    cmd.arg(&target);
    run_checked(cmd, USB_RESET_TIMEOUT, "usbreset").await?;

    tokio::time::sleep(REINIT_SETTLE).await;
    tracing::info!(target = %target, "usb interface reset complete");
    Ok(())
}

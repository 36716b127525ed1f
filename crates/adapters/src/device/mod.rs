// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Device registry boundary.

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDeviceRegistry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from device lookups
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device not found: {0}")]
    NotFound(String),
    #[error("device lookup failed: {0}")]
    Lookup(String),
}

/// What the engine needs to know about a device.
///
/// Only `id` and `protocol` feed into command routing; the gateway id is
/// opaque metadata carried for collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: String,
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<String>,
}

/// Adapter for resolving device metadata.
#[async_trait]
pub trait DeviceRegistry: Clone + Send + Sync + 'static {
    async fn get_device(&self, id: &str) -> Result<DeviceRecord, DeviceError>;
}

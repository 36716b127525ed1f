// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Fake device registry for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DeviceError, DeviceRecord, DeviceRegistry};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Fake device registry seeded with known devices.
#[derive(Clone, Default)]
pub struct FakeDeviceRegistry {
    devices: Arc<Mutex<HashMap<String, DeviceRecord>>>,
}

impl FakeDeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a device with the given protocol.
    pub fn insert(&self, id: impl Into<String>, protocol: impl Into<String>) {
        let id = id.into();
        self.devices.lock().insert(
            id.clone(),
            DeviceRecord {
                id,
                protocol: protocol.into(),
                gateway_id: None,
            },
        );
    }

    /// Seed a full device record.
    pub fn insert_record(&self, record: DeviceRecord) {
        self.devices.lock().insert(record.id.clone(), record);
    }
}

#[async_trait]
impl DeviceRegistry for FakeDeviceRegistry {
    async fn get_device(&self, id: &str) -> Result<DeviceRecord, DeviceError> {
        self.devices
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| DeviceError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

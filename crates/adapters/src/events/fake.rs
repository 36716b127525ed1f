// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Fake event hub for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{EventHub, EventHubError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Recorded broadcast
#[derive(Debug, Clone)]
pub struct BroadcastCall {
    pub channel: String,
    pub payload: serde_json::Value,
}

/// Fake event hub for testing
#[derive(Clone, Default)]
pub struct FakeEventHub {
    calls: Arc<Mutex<Vec<BroadcastCall>>>,
}

impl FakeEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded broadcasts
    pub fn broadcasts(&self) -> Vec<BroadcastCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl EventHub for FakeEventHub {
    async fn broadcast(
        &self,
        channel: &str,
        payload: serde_json::Value,
    ) -> Result<(), EventHubError> {
        self.calls.lock().push(BroadcastCall {
            channel: channel.to_string(),
            payload,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

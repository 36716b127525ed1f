// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Event hub boundary (WebSocket fan-out in the full stack).

mod noop;

pub use noop::NoOpEventHub;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BroadcastCall, FakeEventHub};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from event broadcasting
#[derive(Debug, Error)]
pub enum EventHubError {
    #[error("broadcast failed: {0}")]
    BroadcastFailed(String),
}

/// Adapter for broadcasting events to connected clients.
#[async_trait]
pub trait EventHub: Clone + Send + Sync + 'static {
    async fn broadcast(
        &self,
        channel: &str,
        payload: serde_json::Value,
    ) -> Result<(), EventHubError>;
}

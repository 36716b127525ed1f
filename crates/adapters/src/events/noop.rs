// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! No-op event hub for headless deployments

use super::{EventHub, EventHubError};
use async_trait::async_trait;

/// Event hub that drops every broadcast.
#[derive(Clone, Default)]
pub struct NoOpEventHub;

impl NoOpEventHub {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventHub for NoOpEventHub {
    async fn broadcast(
        &self,
        _channel: &str,
        _payload: serde_json::Value,
    ) -> Result<(), EventHubError> {
        Ok(())
    }
}

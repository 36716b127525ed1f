// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Message broker boundary.
//!
//! The transport (MQTT in the full stack) lives outside this repository;
//! consumers publish through this trait only.

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeBroker, PublishCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from broker operations
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("not connected: {0}")]
    NotConnected(String),
    #[error("publish failed: {0}")]
    PublishFailed(String),
}

/// Delivery guarantee for a published message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

/// Adapter for publishing messages to the command bus.
#[async_trait]
pub trait MessageBroker: Clone + Send + Sync + 'static {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
        retained: bool,
    ) -> Result<(), BrokerError>;
}

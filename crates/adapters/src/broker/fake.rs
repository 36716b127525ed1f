// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Fake message broker for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BrokerError, MessageBroker, QoS};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Recorded publish
#[derive(Debug, Clone)]
pub struct PublishCall {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub retained: bool,
}

impl PublishCall {
    /// Payload parsed as JSON (`Null` when the payload is not JSON).
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.payload).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Default)]
struct FakeBrokerState {
    calls: Vec<PublishCall>,
    fail_topic_substrings: Vec<String>,
}

/// Fake message broker for testing
#[derive(Clone, Default)]
pub struct FakeBroker {
    inner: Arc<Mutex<FakeBrokerState>>,
}

impl FakeBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded publishes
    pub fn publishes(&self) -> Vec<PublishCall> {
        self.inner.lock().calls.clone()
    }

    /// Make publishes to topics containing `substring` fail.
    pub fn fail_topics_containing(&self, substring: impl Into<String>) {
        self.inner.lock().fail_topic_substrings.push(substring.into());
    }
}

#[async_trait]
impl MessageBroker for FakeBroker {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        qos: QoS,
        retained: bool,
    ) -> Result<(), BrokerError> {
        let mut state = self.inner.lock();
        if state
            .fail_topic_substrings
            .iter()
            .any(|s| topic.contains(s.as_str()))
        {
            return Err(BrokerError::PublishFailed(format!(
                "injected failure for {topic}"
            )));
        }
        state.calls.push(PublishCall {
            topic: topic.to_string(),
            payload,
            qos,
            retained,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

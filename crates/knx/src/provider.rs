// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Group-address provider boundary.
//!
//! Supplies passively-learned group addresses for bus health probes and is
//! told which one answered so it can rotate its selection.

use async_trait::async_trait;

/// Source of health-check candidate group addresses.
#[async_trait]
pub trait GroupAddressProvider: Clone + Send + Sync + 'static {
    /// Up to `limit` candidate addresses, most promising first.
    async fn health_check_addresses(&self, limit: usize) -> Vec<String>;

    /// Record that `address` answered a probe.
    async fn mark_health_check_used(&self, address: &str);
}

/// Provider for deployments where discovery has not been wired up;
/// supplies no candidates, so the bus-dialogue layer is skipped.
#[derive(Debug, Clone, Default)]
pub struct NoOpAddressProvider;

#[async_trait]
impl GroupAddressProvider for NoOpAddressProvider {
    async fn health_check_addresses(&self, _limit: usize) -> Vec<String> {
        Vec::new()
    }

    async fn mark_health_check_used(&self, _address: &str) {}
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeAddressProvider;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::GroupAddressProvider;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Fake provider seeded with candidate addresses, recording marks.
    #[derive(Clone, Default)]
    pub struct FakeAddressProvider {
        inner: Arc<Mutex<FakeProviderState>>,
    }

    #[derive(Default)]
    struct FakeProviderState {
        addresses: Vec<String>,
        used: Vec<String>,
    }

    impl FakeAddressProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn seed(addresses: &[&str]) -> Self {
            let provider = Self::default();
            provider.inner.lock().addresses =
                addresses.iter().map(|s| s.to_string()).collect();
            provider
        }

        /// Addresses reported as used, in order.
        pub fn used(&self) -> Vec<String> {
            self.inner.lock().used.clone()
        }
    }

    #[async_trait]
    impl GroupAddressProvider for FakeAddressProvider {
        async fn health_check_addresses(&self, limit: usize) -> Vec<String> {
            let state = self.inner.lock();
            state.addresses.iter().take(limit).cloned().collect()
        }

        async fn mark_health_check_used(&self, address: &str) {
            self.inner.lock().used.push(address.to_string());
        }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O

pub mod broker;
pub mod device;
pub mod events;
pub mod process;
pub mod subprocess;

pub use broker::{BrokerError, MessageBroker, QoS};
pub use device::{DeviceError, DeviceRecord, DeviceRegistry};
pub use events::{EventHub, EventHubError, NoOpEventHub};
pub use process::{
    ChildProcessAdapter, ProcessAdapter, ProcessError, ProcessSpec, RestartHook, RestartPolicy,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use broker::{FakeBroker, PublishCall};
#[cfg(any(test, feature = "test-support"))]
pub use device::FakeDeviceRegistry;
#[cfg(any(test, feature = "test-support"))]
pub use events::{BroadcastCall, FakeEventHub};
#[cfg(any(test, feature = "test-support"))]
pub use process::FakeProcessAdapter;

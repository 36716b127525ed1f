// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! gl-knx: KNX bus access and routing-daemon supervision
//!
//! Covers the address codec, the daemon's length-prefixed frame protocol,
//! the bus-dialogue health probe, PID-lockfile ownership, layered health
//! checks, and the process supervisor that ties them together.

pub mod address;
pub mod config;
pub mod frame;
pub mod health;
pub mod pidfile;
pub mod probe;
mod proc;
pub mod provider;
pub mod supervisor;
pub mod usb;

pub use address::{AddressError, GroupAddress, IndividualAddress};
pub use config::{KnxBackend, KnxConfig, RestartSettings};
pub use frame::{Frame, FrameError, GROUP_PACKET, OPEN_GROUP_SOCKET};
pub use health::{
    HealthError, LAYER_BUS_DIALOGUE, LAYER_PROCESS_STATE, LAYER_USB_PRESENCE,
};
pub use pidfile::{PidLock, PidLockError};
pub use probe::{probe_group_address, ProbeError};
pub use provider::{GroupAddressProvider, NoOpAddressProvider};
pub use supervisor::{KnxSupervisor, SupervisorError, SupervisorStats, SupervisorStatus};
pub use usb::{reset_usb_device, UsbResetError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use provider::FakeAddressProvider;

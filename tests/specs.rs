//! Behavioral specifications for the Gray Logic core.
//!
//! These tests are in-process: they drive the scene engine and the KNX
//! supervisor through their public APIs with fake collaborators and verify
//! published commands, audit records, and lockfile behavior.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// scene/
#[path = "specs/scene/activation.rs"]
mod scene_activation;
#[path = "specs/scene/registry.rs"]
mod scene_registry;

// knx/
#[path = "specs/knx/addresses.rs"]
mod knx_addresses;
#[path = "specs/knx/supervisor.rs"]
mod knx_supervisor;

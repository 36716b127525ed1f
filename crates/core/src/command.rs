// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Device command wire format published to the message broker.

use crate::scene::Parameters;
use serde::{Deserialize, Serialize};

/// JSON payload published to `graylogic/command/<protocol>/<device_id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceCommand {
    /// Fresh id per published command
    pub id: String,
    pub device_id: String,
    pub command: String,
    /// Action parameters, possibly including an injected `fade_ms`
    #[serde(default)]
    pub parameters: Parameters,
    /// Origin marker, `scene:<scene_id>` for scene activations
    pub source: String,
    pub execution_id: String,
}

impl DeviceCommand {
    /// Topic the command is published to.
    ///
    /// The device's protocol segment routes to the right bridge; the
    /// gateway id is deliberately not part of the topic.
    pub fn topic(protocol: &str, device_id: &str) -> String {
        format!("graylogic/command/{}/{}", protocol, device_id)
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;

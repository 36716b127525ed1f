// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Scene definitions: named ordered collections of device commands.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

crate::define_id! {
    /// Unique identifier for a scene definition.
    #[derive(Default)]
    pub struct SceneId;
}

/// Opaque per-command parameter map.
///
/// Insertion order is preserved so published payloads keep the author's
/// key ordering.
pub type Parameters = IndexMap<String, serde_json::Value>;

/// Closed set of scene categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneCategory {
    Comfort,
    Entertainment,
    Productivity,
    Daily,
    Security,
    Energy,
}

impl SceneCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneCategory::Comfort => "comfort",
            SceneCategory::Entertainment => "entertainment",
            SceneCategory::Productivity => "productivity",
            SceneCategory::Daily => "daily",
            SceneCategory::Security => "security",
            SceneCategory::Energy => "energy",
        }
    }
}

impl fmt::Display for SceneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SceneCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comfort" => Ok(SceneCategory::Comfort),
            "entertainment" => Ok(SceneCategory::Entertainment),
            "productivity" => Ok(SceneCategory::Productivity),
            "daily" => Ok(SceneCategory::Daily),
            "security" => Ok(SceneCategory::Security),
            "energy" => Ok(SceneCategory::Energy),
            other => Err(format!("unknown scene category: {}", other)),
        }
    }
}

/// One device command inside a scene.
///
/// Immutable once the parent scene has been accepted; changed only through
/// a full scene update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneAction {
    /// Target device identifier
    pub device_id: String,
    /// Command verb (e.g. "set", "dim", "position")
    pub command: String,
    /// Opaque command parameters (at most 20 keys)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: Parameters,
    /// Pre-execution delay in milliseconds (0..=300_000)
    #[serde(default)]
    pub delay_ms: u64,
    /// Fade/transition duration in milliseconds (0..=60_000)
    #[serde(default)]
    pub fade_ms: u64,
    /// Joins the previous action's concurrent group when true
    #[serde(default)]
    pub parallel: bool,
    /// Later groups still run if this action fails
    #[serde(default)]
    pub continue_on_error: bool,
    /// Position within the scene
    #[serde(default)]
    pub sort_order: u32,
}

impl SceneAction {
    pub fn new(device_id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            command: command.into(),
            parameters: Parameters::new(),
            delay_ms: 0,
            fade_ms: 0,
            parallel: false,
            continue_on_error: false,
            sort_order: 0,
        }
    }
}

/// A named, ordered collection of device commands with metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
    /// URL-safe identifier, unique across scenes
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Activation priority 1..=100, default 50
    #[serde(default)]
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<SceneCategory>,
    pub actions: Vec<SceneAction>,
    #[serde(default)]
    pub sort_order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_enabled() -> bool {
    true
}

impl Scene {
    /// Minimal enabled scene with the given actions, timestamps at `at`.
    pub fn new(
        id: impl Into<SceneId>,
        name: impl Into<String>,
        actions: Vec<SceneAction>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: String::new(),
            description: None,
            room_id: None,
            area_id: None,
            enabled: true,
            priority: 50,
            icon: None,
            color: None,
            category: None,
            actions,
            sort_order: 0,
            created_at: at,
            updated_at: at,
        }
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;

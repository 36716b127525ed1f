// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Scene execution audit records.

use crate::scene::SceneId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

crate::define_id! {
    /// Unique identifier for one scene activation.
    #[derive(Default)]
    pub struct ExecutionId;
}

/// Stable error code attached to every action failure.
pub const EXECUTION_FAILED: &str = "EXECUTION_FAILED";

/// How an activation was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Manual,
    Schedule,
    Event,
    Voice,
    Automation,
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TriggerType::Manual => "manual",
            TriggerType::Schedule => "schedule",
            TriggerType::Event => "event",
            TriggerType::Voice => "voice",
            TriggerType::Automation => "automation",
        };
        write!(f, "{}", s)
    }
}

/// Lifecycle status of a scene execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Created, not yet started
    Pending,
    /// Groups are executing
    Running,
    /// Every action succeeded
    Completed,
    /// Some actions failed but execution ran to the end
    Partial,
    /// A non-continuable action failed; later groups were skipped
    Failed,
    /// Caller cancellation observed between groups
    Cancelled,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Partial => "partial",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// One failed action within an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFailure {
    /// Index of the action within its group
    pub action_index: usize,
    pub device_id: String,
    pub command: String,
    /// Stable error code, always [`EXECUTION_FAILED`]
    pub error_code: String,
    pub error_message: String,
}

impl ActionFailure {
    pub fn new(
        action_index: usize,
        device_id: impl Into<String>,
        command: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            action_index,
            device_id: device_id.into(),
            command: command.into(),
            error_code: EXECUTION_FAILED.to_string(),
            error_message: message.into(),
        }
    }
}

/// Audit record of one scene activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneExecution {
    pub id: ExecutionId,
    pub scene_id: SceneId,
    pub triggered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub trigger: TriggerType,
    /// Free-form origin label (e.g. "wall-panel-3")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_source: Option<String>,
    pub status: ExecutionStatus,
    pub actions_total: usize,
    #[serde(default)]
    pub actions_completed: usize,
    #[serde(default)]
    pub actions_failed: usize,
    #[serde(default)]
    pub actions_skipped: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ActionFailure>,
    #[serde(default)]
    pub duration_ms: u64,
}

impl SceneExecution {
    /// Fresh `pending` record created before any action runs.
    pub fn pending(
        id: impl Into<ExecutionId>,
        scene_id: impl Into<SceneId>,
        actions_total: usize,
        trigger: TriggerType,
        trigger_source: Option<String>,
        triggered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            scene_id: scene_id.into(),
            triggered_at,
            started_at: None,
            completed_at: None,
            trigger,
            trigger_source,
            status: ExecutionStatus::Pending,
            actions_total,
            actions_completed: 0,
            actions_failed: 0,
            actions_skipped: 0,
            failures: Vec::new(),
            duration_ms: 0,
        }
    }
}

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;

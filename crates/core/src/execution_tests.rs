// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

use super::*;

#[test]
fn pending_execution_starts_zeroed() {
    let execution = SceneExecution::pending(
        "exec-1",
        "scene-1",
        3,
        TriggerType::Manual,
        Some("wall-panel".to_string()),
        Utc::now(),
    );
    assert_eq!(execution.status, ExecutionStatus::Pending);
    assert_eq!(execution.actions_total, 3);
    assert_eq!(execution.actions_completed, 0);
    assert_eq!(execution.actions_failed, 0);
    assert_eq!(execution.actions_skipped, 0);
    assert!(execution.failures.is_empty());
    assert!(execution.started_at.is_none());
    assert!(execution.completed_at.is_none());
}

#[test]
fn action_failure_carries_stable_code() {
    let failure = ActionFailure::new(2, "light-01", "set", "device offline");
    assert_eq!(failure.error_code, EXECUTION_FAILED);
    assert_eq!(failure.action_index, 2);
}

#[yare::parameterized(
    pending   = { ExecutionStatus::Pending,   "pending" },
    running   = { ExecutionStatus::Running,   "running" },
    completed = { ExecutionStatus::Completed, "completed" },
    partial   = { ExecutionStatus::Partial,   "partial" },
    failed    = { ExecutionStatus::Failed,    "failed" },
    cancelled = { ExecutionStatus::Cancelled, "cancelled" },
)]
fn status_display(status: ExecutionStatus, text: &str) {
    assert_eq!(status.to_string(), text);
    assert_eq!(serde_json::to_string(&status).unwrap(), format!("\"{text}\""));
}

#[yare::parameterized(
    manual     = { TriggerType::Manual,     "manual" },
    schedule   = { TriggerType::Schedule,   "schedule" },
    event      = { TriggerType::Event,      "event" },
    voice      = { TriggerType::Voice,      "voice" },
    automation = { TriggerType::Automation, "automation" },
)]
fn trigger_display(trigger: TriggerType, text: &str) {
    assert_eq!(trigger.to_string(), text);
}

#[test]
fn execution_serde_roundtrip() {
    let mut execution = SceneExecution::pending(
        "exec-1",
        "scene-1",
        2,
        TriggerType::Schedule,
        None,
        Utc::now(),
    );
    execution.status = ExecutionStatus::Partial;
    execution.actions_completed = 1;
    execution.actions_failed = 1;
    execution
        .failures
        .push(ActionFailure::new(0, "d1", "set", "boom"));
    let text = serde_json::to_string(&execution).unwrap();
    let back: SceneExecution = serde_json::from_str(&text).unwrap();
    assert_eq!(back, execution);
}

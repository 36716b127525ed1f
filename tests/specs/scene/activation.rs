//! Scene activation end-to-end: grouping, publishing, status, audit.

use crate::prelude::*;
use gl_core::{ExecutionStatus, TriggerType, EXECUTION_FAILED};
use gl_storage::SceneRepository;
use serde_json::json;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn happy_path_two_actions_one_group() {
    let mut off = action("light-01", "set");
    off.parameters.insert("on".to_string(), json!(false));
    off.continue_on_error = true;
    let mut blind = action("blind-01", "position");
    blind.parameters.insert("position".to_string(), json!(0));
    blind.parallel = true;
    blind.continue_on_error = true;
    let world = World::with_scenes(vec![scene("cinema", vec![off, blind])]).await;

    let execution_id = world
        .engine
        .activate_scene(
            &CancellationToken::new(),
            "cinema",
            TriggerType::Manual,
            None,
        )
        .await
        .unwrap();

    let publishes = world.broker.publishes();
    assert_eq!(publishes.len(), 2);
    let mut topics: Vec<&str> = publishes.iter().map(|p| p.topic.as_str()).collect();
    topics.sort_unstable();
    assert_eq!(
        topics,
        [
            "graylogic/command/knx/blind-01",
            "graylogic/command/knx/light-01"
        ]
    );
    for publish in &publishes {
        assert_eq!(publish.qos, gl_adapters::QoS::AtLeastOnce);
        assert!(!publish.retained);
        assert_eq!(publish.json()["source"], "scene:cinema");
    }

    let execution = world
        .repo
        .get_execution(execution_id.as_str())
        .await
        .unwrap();
    assert_eq!(execution.status, ExecutionStatus::Completed);
    assert_eq!(execution.actions_completed, 2);
    assert_eq!(execution.actions_failed, 0);
    assert_eq!(execution.actions_skipped, 0);

    let broadcasts = world.events.broadcasts();
    assert_eq!(broadcasts.len(), 1);
    assert_eq!(broadcasts[0].channel, "scene.activated");
    assert_eq!(broadcasts[0].payload["status"], "completed");
}

#[tokio::test]
async fn continue_on_error_publishes_around_the_failure() {
    let mut first = action("light-01", "set");
    first.continue_on_error = true;
    let mut missing = action("nonexistent", "set");
    missing.continue_on_error = true;
    let mut last = action("light-02", "set");
    last.continue_on_error = true;
    let world = World::with_scenes(vec![scene("resilient", vec![first, missing, last])]).await;

    let execution_id = world
        .engine
        .activate_scene(
            &CancellationToken::new(),
            "resilient",
            TriggerType::Automation,
            None,
        )
        .await
        .unwrap();

    let topics: Vec<String> = world
        .broker
        .publishes()
        .iter()
        .map(|p| p.topic.clone())
        .collect();
    assert_eq!(
        topics,
        [
            "graylogic/command/knx/light-01",
            "graylogic/command/knx/light-02"
        ]
    );

    let execution = world
        .repo
        .get_execution(execution_id.as_str())
        .await
        .unwrap();
    assert_eq!(execution.status, ExecutionStatus::Partial);
    assert_eq!(execution.actions_completed, 2);
    assert_eq!(execution.actions_failed, 1);
    assert_eq!(execution.actions_skipped, 0);
}

#[tokio::test]
async fn fail_fast_aborts_remaining_groups() {
    let first = action("light-01", "set");
    let missing = action("nonexistent", "set"); // continue_on_error = false
    let last = action("light-02", "set");
    let world = World::with_scenes(vec![scene("strict", vec![first, missing, last])]).await;

    let execution_id = world
        .engine
        .activate_scene(
            &CancellationToken::new(),
            "strict",
            TriggerType::Manual,
            None,
        )
        .await
        .unwrap();

    let publishes = world.broker.publishes();
    assert_eq!(publishes.len(), 1);
    assert_eq!(publishes[0].topic, "graylogic/command/knx/light-01");

    let execution = world
        .repo
        .get_execution(execution_id.as_str())
        .await
        .unwrap();
    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert_eq!(execution.actions_failed, 1);
    assert_eq!(execution.actions_skipped, 1);
    assert_eq!(execution.failures.len(), 1);
    assert_eq!(execution.failures[0].device_id, "nonexistent");
    assert_eq!(execution.failures[0].error_code, EXECUTION_FAILED);
}

#[tokio::test]
async fn immediate_cancellation_publishes_nothing() {
    let mut slow = action("light-01", "set");
    slow.delay_ms = 5_000;
    slow.continue_on_error = true;
    let world = World::with_scenes(vec![scene("slow", vec![slow])]).await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let execution_id = world
        .engine
        .activate_scene(&cancel, "slow", TriggerType::Manual, None)
        .await
        .unwrap();

    assert!(world.broker.publishes().is_empty());
    let execution = world
        .repo
        .get_execution(execution_id.as_str())
        .await
        .unwrap();
    assert_eq!(execution.status, ExecutionStatus::Cancelled);
}

#[tokio::test]
async fn fade_injection_leaves_the_scene_definition_alone() {
    let mut dim = action("light-01", "dim");
    dim.parameters.insert("brightness".to_string(), json!(30));
    dim.fade_ms = 3_000;
    let world = World::with_scenes(vec![scene("fade", vec![dim])]).await;

    world
        .engine
        .activate_scene(&CancellationToken::new(), "fade", TriggerType::Voice, None)
        .await
        .unwrap();

    let payload = world.broker.publishes()[0].json();
    similar_asserts::assert_eq!(
        payload["parameters"],
        json!({"brightness": 30, "fade_ms": 3000})
    );

    let cached = world.registry.get_scene("fade").unwrap();
    assert!(!cached.actions[0].parameters.contains_key("fade_ms"));
    let persisted = world.repo.get_by_id("fade").await.unwrap();
    assert!(!persisted.actions[0].parameters.contains_key("fade_ms"));
}

#[tokio::test]
async fn counters_always_sum_to_total() {
    // One failure mid-scene with mixed grouping
    let mut a = action("light-01", "set");
    a.continue_on_error = true;
    let mut b = action("nonexistent", "set");
    b.parallel = true;
    b.continue_on_error = true;
    let c = action("light-02", "set");
    let d = action("blind-01", "position");
    let world = World::with_scenes(vec![scene("mixed", vec![a, b, c, d])]).await;

    let execution_id = world
        .engine
        .activate_scene(
            &CancellationToken::new(),
            "mixed",
            TriggerType::Schedule,
            None,
        )
        .await
        .unwrap();

    let execution = world
        .repo
        .get_execution(execution_id.as_str())
        .await
        .unwrap();
    assert_eq!(
        execution.actions_completed + execution.actions_failed + execution.actions_skipped,
        execution.actions_total
    );
    assert_eq!(execution.actions_total, 4);
}

#[tokio::test]
async fn executions_list_newest_first() {
    let mut quick = action("light-01", "set");
    quick.continue_on_error = true;
    let world = World::with_scenes(vec![scene("cinema", vec![quick])]).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        ids.push(
            world
                .engine
                .activate_scene(
                    &CancellationToken::new(),
                    "cinema",
                    TriggerType::Manual,
                    None,
                )
                .await
                .unwrap(),
        );
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let listed = world.repo.list_executions("cinema", 10).await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[0].id, ids[2]);
    assert_eq!(listed[2].id, ids[0]);
}

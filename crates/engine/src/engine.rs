// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Scene activation: group scheduling, command publishing, audit records.

use crate::error::EngineError;
use crate::groups::group_actions;
use crate::registry::SceneRegistry;
use gl_adapters::{DeviceRegistry, EventHub, MessageBroker, QoS};
use gl_core::{
    generate_id, ActionFailure, Clock, DeviceCommand, ExecutionId, ExecutionStatus, Scene,
    SceneAction, SceneExecution, SceneId, TriggerType,
};
use gl_storage::SceneRepository;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Upper bound for one activation, enforced through a derived token.
pub const ACTIVATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Collaborators the engine publishes through.
///
/// Broker and event hub are optional: a missing hub is tolerated, a
/// missing broker fails activation pre-flight.
pub struct EngineDeps<R, B, D, H> {
    pub repository: R,
    pub broker: Option<B>,
    pub devices: D,
    pub events: Option<H>,
}

/// Activation orchestrator.
///
/// Holds the registry for scene reads and the repository for execution
/// audit records. Multiple activations proceed independently.
pub struct SceneEngine<R, B, D, H, C>
where
    R: SceneRepository,
    B: MessageBroker,
    D: DeviceRegistry,
    H: EventHub,
    C: Clock,
{
    registry: Arc<SceneRegistry<R>>,
    deps: EngineDeps<R, B, D, H>,
    clock: C,
}

impl<R, B, D, H, C> SceneEngine<R, B, D, H, C>
where
    R: SceneRepository,
    B: MessageBroker,
    D: DeviceRegistry,
    H: EventHub,
    C: Clock,
{
    pub fn new(registry: Arc<SceneRegistry<R>>, deps: EngineDeps<R, B, D, H>, clock: C) -> Self {
        Self {
            registry,
            deps,
            clock,
        }
    }

    pub fn registry(&self) -> &SceneRegistry<R> {
        &self.registry
    }

    /// Activate a scene and return its execution id.
    ///
    /// Only pre-flight conditions (unknown scene, disabled scene, missing
    /// broker) fail the call; action failures are captured in the
    /// execution record instead. Audit persistence errors are logged and
    /// swallowed: the activation matters more than its paper trail.
    pub async fn activate_scene(
        &self,
        cancel: &CancellationToken,
        scene_id: &str,
        trigger: TriggerType,
        trigger_source: Option<String>,
    ) -> Result<ExecutionId, EngineError> {
        let scene = self.registry.get_scene(scene_id)?;
        if !scene.enabled {
            return Err(EngineError::SceneDisabled(scene_id.to_string()));
        }
        let Some(broker) = self.deps.broker.clone() else {
            return Err(EngineError::BrokerUnavailable);
        };

        // Derive the activation-wide deadline from the caller's token
        let cancel = cancel.child_token();
        let watchdog = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(ACTIVATION_TIMEOUT).await;
                cancel.cancel();
            })
        };

        let execution_id = ExecutionId::new(generate_id());
        tracing::info!(
            scene_id = %scene.id,
            execution_id = %execution_id,
            trigger = %trigger,
            actions = scene.actions.len(),
            "activating scene"
        );

        let mut execution = SceneExecution::pending(
            execution_id.clone(),
            scene.id.clone(),
            scene.actions.len(),
            trigger,
            trigger_source,
            self.clock.now_utc(),
        );
        if let Err(e) = self.deps.repository.create_execution(&execution).await {
            tracing::warn!(execution_id = %execution_id, error = %e, "failed to persist pending execution");
        }

        execution.status = ExecutionStatus::Running;
        execution.started_at = Some(self.clock.now_utc());
        let started = self.clock.now();

        let groups = group_actions(&scene.actions);
        let mut aborted = false;
        let mut cancelled = false;
        for group in &groups {
            if aborted {
                execution.actions_skipped += group.len();
                continue;
            }
            if cancel.is_cancelled() {
                cancelled = true;
                aborted = true;
                execution.actions_skipped += group.len();
                continue;
            }

            let failures = self
                .run_group(&cancel, &scene, group, &execution_id, &broker)
                .await;
            execution.actions_completed += group.len() - failures.len();
            execution.actions_failed += failures.len();
            if failures
                .iter()
                .any(|f| !group[f.action_index].continue_on_error)
            {
                aborted = true;
            }
            execution.failures.extend(failures);
        }

        execution.completed_at = Some(self.clock.now_utc());
        execution.duration_ms = self.clock.now().duration_since(started).as_millis() as u64;
        execution.status = if cancelled {
            ExecutionStatus::Cancelled
        } else if execution.actions_failed > 0 && aborted {
            ExecutionStatus::Failed
        } else if execution.actions_failed > 0 {
            ExecutionStatus::Partial
        } else {
            ExecutionStatus::Completed
        };

        if let Err(e) = self.deps.repository.update_execution(&execution).await {
            tracing::warn!(execution_id = %execution_id, error = %e, "failed to persist final execution");
        }

        if let Some(events) = &self.deps.events {
            let payload = json!({
                "scene_id": &scene.id,
                "scene_name": &scene.name,
                "execution_id": &execution_id,
                "status": execution.status,
                "duration_ms": execution.duration_ms,
            });
            if let Err(e) = events.broadcast("scene.activated", payload).await {
                tracing::warn!(execution_id = %execution_id, error = %e, "failed to broadcast activation event");
            }
        }

        watchdog.abort();
        tracing::info!(
            execution_id = %execution_id,
            status = %execution.status,
            completed = execution.actions_completed,
            failed = execution.actions_failed,
            skipped = execution.actions_skipped,
            "scene activation finished"
        );
        Ok(execution_id)
    }

    /// Run one group's actions concurrently; the group always runs to
    /// completion regardless of individual failures.
    async fn run_group(
        &self,
        cancel: &CancellationToken,
        scene: &Scene,
        group: &[SceneAction],
        execution_id: &ExecutionId,
        broker: &B,
    ) -> Vec<ActionFailure> {
        let failures: Arc<Mutex<Vec<ActionFailure>>> = Arc::new(Mutex::new(Vec::new()));
        let mut tasks = JoinSet::new();

        for (index, action) in group.iter().enumerate() {
            let action = action.clone();
            let cancel = cancel.clone();
            let devices = self.deps.devices.clone();
            let broker = broker.clone();
            let scene_id = scene.id.clone();
            let execution_id = execution_id.clone();
            let failures = Arc::clone(&failures);
            tasks.spawn(async move {
                if let Err(message) =
                    execute_action(cancel, devices, broker, scene_id, execution_id, &action).await
                {
                    tracing::warn!(
                        device_id = %action.device_id,
                        command = %action.command,
                        error = %message,
                        "scene action failed"
                    );
                    failures.lock().push(ActionFailure::new(
                        index,
                        &action.device_id,
                        &action.command,
                        message,
                    ));
                }
            });
        }
        while tasks.join_next().await.is_some() {}

        let mut failures = match Arc::try_unwrap(failures) {
            Ok(collected) => collected.into_inner(),
            Err(shared) => shared.lock().clone(),
        };
        failures.sort_by_key(|f| f.action_index);
        failures
    }
}

/// Execute one action: optional delay, device lookup, command publish.
async fn execute_action<B: MessageBroker, D: DeviceRegistry>(
    cancel: CancellationToken,
    devices: D,
    broker: B,
    scene_id: SceneId,
    execution_id: ExecutionId,
    action: &SceneAction,
) -> Result<(), String> {
    if action.delay_ms > 0 {
        tokio::select! {
            _ = cancel.cancelled() => {
                return Err("delay interrupted: activation cancelled".to_string());
            }
            _ = tokio::time::sleep(Duration::from_millis(action.delay_ms)) => {}
        }
    }

    let device = devices
        .get_device(&action.device_id)
        .await
        .map_err(|e| format!("device lookup failed: {}", e))?;

    // The clone isolates fade injection from every other activation that
    // shares this action definition
    let mut parameters = action.parameters.clone();
    if action.fade_ms > 0 {
        parameters.insert("fade_ms".to_string(), json!(action.fade_ms));
    }

    let command = DeviceCommand {
        id: generate_id(),
        device_id: action.device_id.clone(),
        command: action.command.clone(),
        parameters,
        source: format!("scene:{}", scene_id),
        execution_id: execution_id.to_string(),
    };
    let payload =
        serde_json::to_vec(&command).map_err(|e| format!("serialize command: {}", e))?;
    let topic = DeviceCommand::topic(&device.protocol, &action.device_id);

    broker
        .publish(&topic, payload, QoS::AtLeastOnce, false)
        .await
        .map_err(|e| format!("publish failed: {}", e))
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

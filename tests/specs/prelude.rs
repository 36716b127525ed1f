//! Shared helpers for spec tests.

use chrono::Utc;
use gl_adapters::{FakeBroker, FakeDeviceRegistry, FakeEventHub};
use gl_core::{Scene, SceneAction, SystemClock};
use gl_engine::{EngineDeps, SceneEngine, SceneRegistry};
use gl_storage::{MemoryRepository, SceneRepository};
use std::sync::Arc;

pub type SpecEngine =
    SceneEngine<MemoryRepository, FakeBroker, FakeDeviceRegistry, FakeEventHub, SystemClock>;

/// Everything a scene spec needs in one place.
pub struct World {
    pub repo: MemoryRepository,
    pub registry: Arc<SceneRegistry<MemoryRepository>>,
    pub broker: FakeBroker,
    pub devices: FakeDeviceRegistry,
    pub events: FakeEventHub,
    pub engine: SpecEngine,
}

impl World {
    /// World with the given scenes persisted and cached, and the usual
    /// bench devices (`light-01`, `light-02`, `blind-01`) known as `knx`.
    pub async fn with_scenes(scenes: Vec<Scene>) -> Self {
        let repo = MemoryRepository::new();
        for scene in &scenes {
            repo.create(scene).await.unwrap();
        }
        let registry = Arc::new(SceneRegistry::new(repo.clone()));
        registry.refresh_cache().await.unwrap();

        let broker = FakeBroker::new();
        let devices = FakeDeviceRegistry::new();
        for id in ["light-01", "light-02", "blind-01"] {
            devices.insert(id, "knx");
        }
        let events = FakeEventHub::new();
        let engine = SceneEngine::new(
            Arc::clone(&registry),
            EngineDeps {
                repository: repo.clone(),
                broker: Some(broker.clone()),
                devices: devices.clone(),
                events: Some(events.clone()),
            },
            SystemClock,
        );
        Self {
            repo,
            registry,
            broker,
            devices,
            events,
            engine,
        }
    }
}

/// Scene with slug = id and the given actions.
pub fn scene(id: &str, actions: Vec<SceneAction>) -> Scene {
    let mut scene = Scene::new(id, format!("Scene {id}"), actions, Utc::now());
    scene.slug = id.to_string();
    scene
}

/// Action builder: `action("light-01", "set")` then tweak fields.
pub fn action(device_id: &str, command: &str) -> SceneAction {
    SceneAction::new(device_id, command)
}

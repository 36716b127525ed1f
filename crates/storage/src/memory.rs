// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! In-memory repository used by the daemon and tests.

use crate::repository::{SceneRepository, StorageError, MAX_EXECUTION_LIST_LIMIT};
use async_trait::async_trait;
use gl_core::{Scene, SceneCategory, SceneExecution};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct Store {
    scenes: HashMap<String, Scene>,
    executions: HashMap<String, SceneExecution>,
}

/// Map-backed [`SceneRepository`].
///
/// Enforces the same id and slug uniqueness a database backend would, so
/// registry behavior is identical against either.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    store: Arc<Mutex<Store>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored executions (test visibility).
    pub fn execution_count(&self) -> usize {
        self.store.lock().executions.len()
    }
}

#[async_trait]
impl SceneRepository for MemoryRepository {
    async fn get_by_id(&self, id: &str) -> Result<Scene, StorageError> {
        self.store
            .lock()
            .scenes
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::SceneNotFound(id.to_string()))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Scene, StorageError> {
        self.store
            .lock()
            .scenes
            .values()
            .find(|s| s.slug == slug)
            .cloned()
            .ok_or_else(|| StorageError::SceneNotFound(slug.to_string()))
    }

    async fn list(&self) -> Result<Vec<Scene>, StorageError> {
        Ok(self.store.lock().scenes.values().cloned().collect())
    }

    async fn list_by_room(&self, room_id: &str) -> Result<Vec<Scene>, StorageError> {
        Ok(self
            .store
            .lock()
            .scenes
            .values()
            .filter(|s| s.room_id.as_deref() == Some(room_id))
            .cloned()
            .collect())
    }

    async fn list_by_area(&self, area_id: &str) -> Result<Vec<Scene>, StorageError> {
        Ok(self
            .store
            .lock()
            .scenes
            .values()
            .filter(|s| s.area_id.as_deref() == Some(area_id))
            .cloned()
            .collect())
    }

    async fn list_by_category(
        &self,
        category: SceneCategory,
    ) -> Result<Vec<Scene>, StorageError> {
        Ok(self
            .store
            .lock()
            .scenes
            .values()
            .filter(|s| s.category == Some(category))
            .cloned()
            .collect())
    }

    async fn create(&self, scene: &Scene) -> Result<(), StorageError> {
        let mut store = self.store.lock();
        if store.scenes.contains_key(scene.id.as_str()) {
            return Err(StorageError::SceneExists(scene.id.to_string()));
        }
        if store.scenes.values().any(|s| s.slug == scene.slug) {
            return Err(StorageError::SceneExists(scene.slug.clone()));
        }
        tracing::debug!(scene_id = %scene.id, slug = %scene.slug, "scene created");
        store.scenes.insert(scene.id.to_string(), scene.clone());
        Ok(())
    }

    async fn update(&self, scene: &Scene) -> Result<(), StorageError> {
        let mut store = self.store.lock();
        if !store.scenes.contains_key(scene.id.as_str()) {
            return Err(StorageError::SceneNotFound(scene.id.to_string()));
        }
        store.scenes.insert(scene.id.to_string(), scene.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let mut store = self.store.lock();
        store
            .scenes
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::SceneNotFound(id.to_string()))
    }

    async fn create_execution(&self, execution: &SceneExecution) -> Result<(), StorageError> {
        self.store
            .lock()
            .executions
            .insert(execution.id.to_string(), execution.clone());
        Ok(())
    }

    async fn update_execution(&self, execution: &SceneExecution) -> Result<(), StorageError> {
        let mut store = self.store.lock();
        if !store.executions.contains_key(execution.id.as_str()) {
            return Err(StorageError::ExecutionNotFound(execution.id.to_string()));
        }
        store
            .executions
            .insert(execution.id.to_string(), execution.clone());
        Ok(())
    }

    async fn get_execution(&self, id: &str) -> Result<SceneExecution, StorageError> {
        self.store
            .lock()
            .executions
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::ExecutionNotFound(id.to_string()))
    }

    async fn list_executions(
        &self,
        scene_id: &str,
        limit: usize,
    ) -> Result<Vec<SceneExecution>, StorageError> {
        let limit = limit.min(MAX_EXECUTION_LIST_LIMIT);
        let mut executions: Vec<SceneExecution> = self
            .store
            .lock()
            .executions
            .values()
            .filter(|e| e.scene_id.as_str() == scene_id)
            .cloned()
            .collect();
        executions.sort_by(|a, b| b.triggered_at.cmp(&a.triggered_at));
        executions.truncate(limit);
        Ok(executions)
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

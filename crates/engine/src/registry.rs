// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! In-memory scene registry with write-through persistence.
//!
//! The registry owns the authoritative scene cache. Every read hands out an
//! owned deep copy, so callers can mutate what they get without touching
//! later reads. The active-scene map is process-local on purpose: after a
//! restart no scene is considered active, because physical device state may
//! have drifted while we were down.

use crate::error::RegistryError;
use gl_core::{generate_id, generate_slug, validate_scene, Scene, SceneCategory};
use gl_storage::{SceneRepository, StorageError};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Default priority assigned when a scene arrives with none.
const DEFAULT_PRIORITY: u8 = 50;

/// Cached scene store, shared behind an `Arc` by engine and API surface.
pub struct SceneRegistry<R: SceneRepository> {
    repo: R,
    scenes: RwLock<HashMap<String, Scene>>,
    /// room id -> active scene id, last writer wins
    active: RwLock<HashMap<String, String>>,
}

impl<R: SceneRepository> SceneRegistry<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            scenes: RwLock::new(HashMap::new()),
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Reload every scene from the repository.
    ///
    /// On failure the existing cache is left untouched.
    pub async fn refresh_cache(&self) -> Result<(), RegistryError> {
        let scenes = self.repo.list().await?;
        let mut cache = self.scenes.write();
        cache.clear();
        for scene in scenes {
            cache.insert(scene.id.to_string(), scene);
        }
        tracing::info!(count = cache.len(), "scene cache refreshed");
        Ok(())
    }

    /// Deep copy of a cached scene.
    pub fn get_scene(&self, id: &str) -> Result<Scene, RegistryError> {
        self.scenes
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::SceneNotFound(id.to_string()).into())
    }

    /// Deep copy of a cached scene looked up by slug.
    pub fn get_scene_by_slug(&self, slug: &str) -> Result<Scene, RegistryError> {
        self.scenes
            .read()
            .values()
            .find(|s| s.slug == slug)
            .cloned()
            .ok_or_else(|| StorageError::SceneNotFound(slug.to_string()).into())
    }

    /// All scenes, sorted by `(sort_order, name)`.
    pub fn list_scenes(&self) -> Vec<Scene> {
        self.collect_sorted(|_| true)
    }

    pub fn list_by_room(&self, room_id: &str) -> Vec<Scene> {
        self.collect_sorted(|s| s.room_id.as_deref() == Some(room_id))
    }

    pub fn list_by_area(&self, area_id: &str) -> Vec<Scene> {
        self.collect_sorted(|s| s.area_id.as_deref() == Some(area_id))
    }

    pub fn list_by_category(&self, category: SceneCategory) -> Vec<Scene> {
        self.collect_sorted(|s| s.category == Some(category))
    }

    fn collect_sorted(&self, keep: impl Fn(&Scene) -> bool) -> Vec<Scene> {
        let mut scenes: Vec<Scene> = self
            .scenes
            .read()
            .values()
            .filter(|s| keep(s))
            .cloned()
            .collect();
        scenes.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        scenes
    }

    /// Normalize, validate, persist and cache a new scene.
    ///
    /// Fills in a fresh id, a slug derived from the name, the default
    /// priority, and per-action sort order where missing. Returns the
    /// normalized scene. The cache is only touched after the repository
    /// accepted the write.
    pub async fn create_scene(&self, mut scene: Scene) -> Result<Scene, RegistryError> {
        if scene.id.is_empty() {
            scene.id = generate_id().into();
        }
        if scene.slug.is_empty() {
            scene.slug = generate_slug(&scene.name);
        }
        if scene.priority == 0 {
            scene.priority = DEFAULT_PRIORITY;
        }
        for (index, action) in scene.actions.iter_mut().enumerate() {
            if action.sort_order == 0 {
                action.sort_order = index as u32;
            }
        }

        validate_scene(&scene)?;
        self.repo.create(&scene).await?;
        self.scenes
            .write()
            .insert(scene.id.to_string(), scene.clone());
        tracing::info!(scene_id = %scene.id, slug = %scene.slug, "scene created");
        Ok(scene)
    }

    /// Validate, persist and re-cache an existing scene.
    pub async fn update_scene(&self, scene: Scene) -> Result<(), RegistryError> {
        validate_scene(&scene)?;
        self.repo.update(&scene).await?;
        self.scenes
            .write()
            .insert(scene.id.to_string(), scene.clone());
        tracing::info!(scene_id = %scene.id, "scene updated");
        Ok(())
    }

    /// Delete a scene and clear any active-scene slot pointing at it.
    pub async fn delete_scene(&self, id: &str) -> Result<(), RegistryError> {
        self.repo.delete(id).await?;
        self.scenes.write().remove(id);
        self.active.write().retain(|_, active_id| active_id != id);
        tracing::info!(scene_id = %id, "scene deleted");
        Ok(())
    }

    /// Mark a scene active for a room (last writer wins).
    pub fn set_active_scene(&self, room_id: &str, scene_id: &str) {
        self.active
            .write()
            .insert(room_id.to_string(), scene_id.to_string());
    }

    pub fn clear_active_scene(&self, room_id: &str) {
        self.active.write().remove(room_id);
    }

    pub fn get_active_scene(&self, room_id: &str) -> Option<String> {
        self.active.read().get(room_id).cloned()
    }

    pub fn get_all_active_scenes(&self) -> HashMap<String, String> {
        self.active.read().clone()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Scene repository contract.
//!
//! The registry and engine depend on this trait only; concrete backends
//! (SQLite in the full stack, [`crate::MemoryRepository`] here) stay out of
//! the core crates.

use async_trait::async_trait;
use gl_core::{Scene, SceneCategory, SceneExecution};
use thiserror::Error;

/// Hard cap applied to `list_executions` limits.
pub const MAX_EXECUTION_LIST_LIMIT: usize = 100;

/// Errors from repository operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("scene not found: {0}")]
    SceneNotFound(String),
    #[error("scene already exists: {0}")]
    SceneExists(String),
    #[error("execution not found: {0}")]
    ExecutionNotFound(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence boundary for scenes and execution audit records.
#[async_trait]
pub trait SceneRepository: Clone + Send + Sync + 'static {
    async fn get_by_id(&self, id: &str) -> Result<Scene, StorageError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Scene, StorageError>;

    async fn list(&self) -> Result<Vec<Scene>, StorageError>;

    async fn list_by_room(&self, room_id: &str) -> Result<Vec<Scene>, StorageError>;

    async fn list_by_area(&self, area_id: &str) -> Result<Vec<Scene>, StorageError>;

    async fn list_by_category(&self, category: SceneCategory)
        -> Result<Vec<Scene>, StorageError>;

    /// Fails with [`StorageError::SceneExists`] on id or slug collision.
    async fn create(&self, scene: &Scene) -> Result<(), StorageError>;

    /// Fails with [`StorageError::SceneNotFound`] for unknown ids.
    async fn update(&self, scene: &Scene) -> Result<(), StorageError>;

    /// Fails with [`StorageError::SceneNotFound`] for unknown ids.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;

    async fn create_execution(&self, execution: &SceneExecution) -> Result<(), StorageError>;

    /// Fails with [`StorageError::ExecutionNotFound`] for unknown ids.
    async fn update_execution(&self, execution: &SceneExecution) -> Result<(), StorageError>;

    async fn get_execution(&self, id: &str) -> Result<SceneExecution, StorageError>;

    /// Executions for a scene, newest first by trigger time. `limit` is
    /// clamped to [`MAX_EXECUTION_LIST_LIMIT`].
    async fn list_executions(
        &self,
        scene_id: &str,
        limit: usize,
    ) -> Result<Vec<SceneExecution>, StorageError>;
}

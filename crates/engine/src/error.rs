// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Error types for the registry and engine

use gl_core::ValidationError;
use gl_storage::StorageError;
use thiserror::Error;

/// Errors from registry operations
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Pre-flight errors from scene activation
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("scene is disabled: {0}")]
    SceneDisabled(String),
    #[error("message broker unavailable")]
    BrokerUnavailable,
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

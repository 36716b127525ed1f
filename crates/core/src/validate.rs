// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

//! Structural validation of scenes and actions, slug + id derivation.
//!
//! Pure functions, no state. The registry runs these before anything is
//! persisted or cached.

use crate::scene::{Scene, SceneAction};
use thiserror::Error;

/// Maximum scene name length after trimming.
pub const MAX_NAME_LEN: usize = 100;
/// Maximum slug length.
pub const MAX_SLUG_LEN: usize = 50;
/// Maximum description length.
pub const MAX_DESCRIPTION_LEN: usize = 500;
/// Maximum actions per scene.
pub const MAX_ACTIONS: usize = 100;
/// Maximum parameter keys per action.
pub const MAX_PARAMETERS: usize = 20;
/// Maximum pre-execution delay in milliseconds.
pub const MAX_DELAY_MS: u64 = 300_000;
/// Maximum fade duration in milliseconds.
pub const MAX_FADE_MS: u64 = 60_000;

/// Validation failures
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid scene: {0}")]
    InvalidScene(String),
    #[error("invalid scene name: {0}")]
    InvalidName(String),
    #[error("invalid slug: {0}")]
    InvalidSlug(String),
    #[error("scene has no actions")]
    NoActions,
    #[error("invalid action: {0}")]
    InvalidAction(String),
}

/// Validate a full scene definition.
pub fn validate_scene(scene: &Scene) -> Result<(), ValidationError> {
    let name = scene.name.trim();
    if name.is_empty() {
        return Err(ValidationError::InvalidName("name is empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::InvalidName(format!(
            "name exceeds {} characters",
            MAX_NAME_LEN
        )));
    }

    if !scene.slug.is_empty() {
        validate_slug(&scene.slug)?;
    }

    if !(1..=100).contains(&scene.priority) {
        return Err(ValidationError::InvalidScene(format!(
            "priority {} outside 1..=100",
            scene.priority
        )));
    }

    if let Some(description) = &scene.description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::InvalidScene(format!(
                "description exceeds {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }
    }

    if scene.actions.is_empty() {
        return Err(ValidationError::NoActions);
    }
    if scene.actions.len() > MAX_ACTIONS {
        return Err(ValidationError::InvalidAction(format!(
            "scene has {} actions, maximum is {}",
            scene.actions.len(),
            MAX_ACTIONS
        )));
    }

    for (index, action) in scene.actions.iter().enumerate() {
        validate_action(action).map_err(|e| {
            ValidationError::InvalidAction(format!("action {}: {}", index, inner_message(&e)))
        })?;
    }

    Ok(())
}

/// Validate a single action.
pub fn validate_action(action: &SceneAction) -> Result<(), ValidationError> {
    if action.device_id.trim().is_empty() {
        return Err(ValidationError::InvalidAction(
            "device_id is empty".to_string(),
        ));
    }
    if action.command.trim().is_empty() {
        return Err(ValidationError::InvalidAction(
            "command is empty".to_string(),
        ));
    }
    if action.delay_ms > MAX_DELAY_MS {
        return Err(ValidationError::InvalidAction(format!(
            "delay_ms {} exceeds {}",
            action.delay_ms, MAX_DELAY_MS
        )));
    }
    if action.fade_ms > MAX_FADE_MS {
        return Err(ValidationError::InvalidAction(format!(
            "fade_ms {} exceeds {}",
            action.fade_ms, MAX_FADE_MS
        )));
    }
    if action.parameters.len() > MAX_PARAMETERS {
        return Err(ValidationError::InvalidAction(format!(
            "{} parameters, maximum is {}",
            action.parameters.len(),
            MAX_PARAMETERS
        )));
    }
    Ok(())
}

/// Validate a slug: lowercase alphanumeric runs joined by single hyphens,
/// 1..=50 characters.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() {
        return Err(ValidationError::InvalidSlug("slug is empty".to_string()));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(ValidationError::InvalidSlug(format!(
            "slug exceeds {} characters",
            MAX_SLUG_LEN
        )));
    }
    if slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err(ValidationError::InvalidSlug(format!(
            "malformed hyphens in {:?}",
            slug
        )));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidSlug(format!(
            "illegal characters in {:?}",
            slug
        )));
    }
    Ok(())
}

/// Derive a URL-safe slug from a human name.
///
/// Lowercase; spaces and underscores become hyphens; anything outside
/// `[a-z0-9-]` is dropped; hyphen runs collapse; the result is trimmed to
/// 50 characters with no leading or trailing hyphen. May be empty when the
/// name has no usable characters.
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.to_lowercase().chars() {
        match c {
            'a'..='z' | '0'..='9' => {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c);
            }
            ' ' | '_' | '-' => pending_hyphen = true,
            _ => {}
        }
    }
    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Fresh universally-unique identifier.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Strip the variant prefix so wrapped action errors read cleanly.
fn inner_message(e: &ValidationError) -> String {
    match e {
        ValidationError::InvalidAction(message) => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;

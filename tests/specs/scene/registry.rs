//! Registry behavior: normalization, deep copies, active-scene slots.

use crate::prelude::*;
use gl_core::{validate_scene, validate_slug};
use gl_engine::SceneRegistry;
use serde_json::json;

#[tokio::test]
async fn created_scenes_are_normalized_and_valid() {
    let world = World::with_scenes(vec![]).await;

    let mut draft = scene("", vec![action("light-01", "set")]);
    draft.name = "Movie Night!".to_string();
    draft.slug = String::new();
    draft.priority = 0;
    let created = world.registry.create_scene(draft).await.unwrap();

    assert!(!created.id.is_empty());
    assert_eq!(created.slug, "movie-night");
    assert_eq!(created.priority, 50);
    validate_scene(&created).unwrap();
    validate_slug(&created.slug).unwrap();
}

#[tokio::test]
async fn cache_reads_are_isolated_deep_copies() {
    let mut lit = action("light-01", "set");
    lit.parameters.insert("on".to_string(), json!(true));
    let world = World::with_scenes(vec![scene("s1", vec![lit])]).await;

    let mut first = world.registry.get_scene("s1").unwrap();
    first.actions[0]
        .parameters
        .insert("on".to_string(), json!(false));
    first.actions.push(action("blind-01", "position"));
    first.room_id = Some("hijacked".to_string());

    let second = world.registry.get_scene("s1").unwrap();
    assert_eq!(second.actions.len(), 1);
    assert_eq!(second.actions[0].parameters["on"], json!(true));
    assert!(second.room_id.is_none());
}

#[tokio::test]
async fn active_scenes_do_not_survive_a_registry_restart() {
    let world = World::with_scenes(vec![scene("s1", vec![action("light-01", "set")])]).await;
    world.registry.set_active_scene("living", "s1");
    assert_eq!(
        world.registry.get_active_scene("living"),
        Some("s1".to_string())
    );

    // A fresh registry over the same repository: physical state may have
    // drifted, so nothing is active
    let restarted = SceneRegistry::new(world.repo.clone());
    restarted.refresh_cache().await.unwrap();
    assert_eq!(restarted.get_active_scene("living"), None);
    assert!(restarted.get_all_active_scenes().is_empty());
}

#[tokio::test]
async fn slug_collision_between_scenes_is_rejected() {
    let world = World::with_scenes(vec![scene("s1", vec![action("light-01", "set")])]).await;

    let mut rival = scene("s2", vec![action("light-02", "set")]);
    rival.slug = "s1".to_string();
    assert!(world.registry.create_scene(rival).await.is_err());
    assert!(world.registry.get_scene("s2").is_err());
}

//! Data layer: populates the dialogue registry at startup.
//!
//! Runs in OnEnter(GameState::Loading), fills `DialogueRegistry` from the
//! built-in database, overlays `dialogue.json` from the data directory when
//! present, then moves the game into GameState::Playing.

mod dialogue;

pub use dialogue::populate_dialogue;

use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::*;
use crate::world::MapStoreError;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

pub fn dialogue_overlay_path(config: &GameConfig) -> PathBuf {
    config.data_dir.join("dialogue.json")
}

/// Merge an authored `dialogue.json` into the registry. Returns how many
/// NPC definitions it supplied.
pub fn load_dialogue_overlay(
    registry: &mut DialogueRegistry,
    path: &Path,
) -> Result<usize, MapStoreError> {
    let text = fs::read_to_string(path).map_err(|source| MapStoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    registry
        .merge_json(&text)
        .map_err(|source| MapStoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Single system that populates the registry and then starts play.
fn load_all_data(
    config: Res<GameConfig>,
    mut registry: ResMut<DialogueRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("DataPlugin: populating registries…");

    populate_dialogue(&mut registry);
    info!("  Built-in dialogues loaded: {}", registry.len());

    let path = dialogue_overlay_path(&config);
    match load_dialogue_overlay(&mut registry, &path) {
        Ok(count) => info!("  Dialogue overlay {}: {} NPCs", path.display(), count),
        Err(e) if e.is_missing() => {}
        Err(e) => warn!("  Dialogue overlay skipped: {e}"),
    }

    info!("DataPlugin: {} NPC dialogues ready, entering Playing.", registry.len());
    next_state.set(GameState::Playing);
}

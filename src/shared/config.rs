//! Game tunables, loaded from an optional `settings.ron`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Every tunable the game reads at runtime. Missing fields in the RON file
/// keep their default.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // Tile maps
    pub tile_size: f32,
    pub map_rows: i32,
    pub map_cols: i32,
    pub tile_folder: String,
    pub block_size: i32,
    /// Directory holding map_overrides_*, map_blocks_*, levels and dialogue.json.
    pub data_dir: PathBuf,

    // Side-view world
    pub world_width: f32,
    pub world_height: f32,
    /// Fraction of the screen height where the default ground line sits.
    pub ground_ratio: f32,

    // Player
    pub player_width: f32,
    pub player_height: f32,
    pub player_accel: f32,
    pub player_friction: f32,
    pub player_max_speed: f32,
    pub topdown_speed: f32,

    // NPCs
    pub npc_width: f32,
    pub npc_height: f32,
    /// Talk radius in side-view scenes.
    pub side_interaction_range: f32,
    /// Reach of the facing cone in top-down scenes.
    pub topdown_interaction_range: f32,
    pub facing_fov_deg: f32,
    /// Range multiplier applied when the player is standing still.
    pub idle_range_factor: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: 256.0,
            map_rows: 12,
            map_cols: 12,
            tile_folder: "assets/tiles".to_string(),
            block_size: 32,
            data_dir: PathBuf::from("."),
            world_width: 4800.0,
            world_height: super::SCREEN_HEIGHT,
            ground_ratio: 0.78,
            player_width: 72.0,
            player_height: 90.0,
            player_accel: 1200.0,
            player_friction: 1600.0,
            player_max_speed: 260.0,
            topdown_speed: 240.0,
            npc_width: 32.0,
            npc_height: 56.0,
            side_interaction_range: 90.0,
            topdown_interaction_range: 70.0,
            facing_fov_deg: 70.0,
            idle_range_factor: 0.6,
        }
    }
}

impl GameConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    /// Read `path` if present. A missing file is silent, a broken one warns.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded settings from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn player_size(&self) -> Vec2 {
        Vec2::new(self.player_width, self.player_height)
    }

    pub fn npc_size(&self) -> Vec2 {
        Vec2::new(self.npc_width, self.npc_height)
    }

    pub fn ground_y(&self) -> f32 {
        (super::SCREEN_HEIGHT * self.ground_ratio).floor()
    }

    /// Pixel size of a tile map.
    pub fn map_pixel_size(&self) -> Vec2 {
        Vec2::new(
            self.map_cols as f32 * self.tile_size,
            self.map_rows as f32 * self.tile_size,
        )
    }

    /// Centre of a 1-based `(row, col)` cell.
    pub fn cell_center(&self, row: i32, col: i32) -> Vec2 {
        Vec2::new(
            (col as f32 - 0.5) * self.tile_size,
            (row as f32 - 0.5) * self.tile_size,
        )
    }

    pub fn overrides_path(&self, map_key: &str) -> PathBuf {
        self.data_dir.join(format!("map_overrides_{map_key}.json"))
    }

    pub fn blocks_path(&self, map_key: &str) -> PathBuf {
        self.data_dir.join(format!("map_blocks_{map_key}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = GameConfig::from_ron_str("(tile_size: 128.0, map_rows: 8)").unwrap();
        assert_eq!(config.tile_size, 128.0);
        assert_eq!(config.map_rows, 8);
        assert_eq!(config.map_cols, 12);
        assert_eq!(config.side_interaction_range, 90.0);
        assert_eq!(config.topdown_interaction_range, 70.0);
    }

    #[test]
    fn test_broken_ron_is_an_error() {
        assert!(matches!(
            GameConfig::from_ron_str("(tile_size: )"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load_or_default(dir.path().join("settings.ron"));
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_cell_center_is_one_based() {
        let config = GameConfig::default();
        assert_eq!(config.cell_center(1, 1), Vec2::new(128.0, 128.0));
        assert_eq!(config.cell_center(7, 6), Vec2::new(1408.0, 1664.0));
    }

    #[test]
    fn test_ground_line() {
        assert_eq!(GameConfig::default().ground_y(), 421.0);
    }
}

//! Editor-placed collision blocks on a fixed square grid.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use super::persist::{read_json, write_json_atomic, MapStoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BlockMeta {
    #[serde(default)]
    map: String,
    #[serde(default)]
    block_size: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BlockFile {
    #[serde(rename = "_meta", default)]
    meta: BlockMeta,
    #[serde(default)]
    blocks: Vec<serde_json::Value>,
}

#[derive(Resource, Debug, Clone)]
pub struct BlockGrid {
    map_id: String,
    block_size: i32,
    /// World extent; the circle test never looks outside it.
    world_size: Vec2,
    blocks: BTreeSet<(i32, i32)>,
}

impl Default for BlockGrid {
    fn default() -> Self {
        Self::new("city", 32, Vec2::splat(12.0 * 256.0))
    }
}

impl BlockGrid {
    pub fn new(map_id: &str, block_size: i32, world_size: Vec2) -> Self {
        Self {
            map_id: map_id.to_string(),
            block_size: block_size.max(1),
            world_size,
            blocks: BTreeSet::new(),
        }
    }

    pub fn switch_map(&mut self, map_id: &str, world_size: Vec2) {
        self.map_id = map_id.to_string();
        self.world_size = world_size;
        self.blocks.clear();
    }

    pub fn block_size(&self) -> i32 {
        self.block_size
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn contains(&self, block: (i32, i32)) -> bool {
        self.blocks.contains(&block)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.blocks.iter().copied()
    }

    pub fn world_to_block(&self, pos: Vec2) -> (i32, i32) {
        let size = self.block_size as f32;
        ((pos.x / size).floor() as i32, (pos.y / size).floor() as i32)
    }

    pub fn block_rect(&self, (bx, by): (i32, i32)) -> Rect {
        let size = self.block_size as f32;
        let min = Vec2::new(bx as f32 * size, by as f32 * size);
        Rect::from_corners(min, min + Vec2::splat(size))
    }

    /// `set_to`: `None` toggles, `Some(true)` adds, `Some(false)` removes.
    pub fn toggle_at_world(&mut self, pos: Vec2, set_to: Option<bool>) {
        let block = self.world_to_block(pos);
        let present = self.blocks.contains(&block);
        let want = set_to.unwrap_or(!present);
        if want {
            self.blocks.insert(block);
        } else {
            self.blocks.remove(&block);
        }
    }

    /// Does the circle touch any block? Only the blocks under the circle's
    /// bounding box are tested.
    pub fn collides_circle(&self, center: Vec2, radius: f32) -> bool {
        let size = self.block_size as f32;
        let max_bx = (self.world_size.x / size).floor() as i32;
        let max_by = (self.world_size.y / size).floor() as i32;
        let bx0 = (((center.x - radius) / size).floor() as i32).max(0);
        let by0 = (((center.y - radius) / size).floor() as i32).max(0);
        let bx1 = (((center.x + radius) / size).floor() as i32).min(max_bx);
        let by1 = (((center.y + radius) / size).floor() as i32).min(max_by);

        for by in by0..=by1 {
            for bx in bx0..=bx1 {
                if !self.blocks.contains(&(bx, by)) {
                    continue;
                }
                let rect = self.block_rect((bx, by));
                let nearest = center.clamp(rect.min, rect.max);
                if center.distance_squared(nearest) <= radius * radius {
                    return true;
                }
            }
        }
        false
    }

    /// Does `rect` overlap any block?
    pub fn collides_rect(&self, rect: Rect) -> bool {
        let (bx0, by0) = self.world_to_block(rect.min);
        let (bx1, by1) = self.world_to_block(rect.max);
        (by0..=by1).any(|by| {
            (bx0..=bx1).any(|bx| {
                self.blocks.contains(&(bx, by))
                    && !rect.intersect(self.block_rect((bx, by))).is_empty()
            })
        })
    }

    pub fn try_load(&mut self, path: &Path) -> Result<usize, MapStoreError> {
        self.blocks.clear();
        let file: BlockFile = read_json(path)?;
        for pair in file.blocks {
            if let Some([bx, by]) = pair.as_array().and_then(|a| block_pair(a)) {
                self.blocks.insert((bx, by));
            }
        }
        Ok(self.blocks.len())
    }

    pub fn load(&mut self, path: &Path) {
        match self.try_load(path) {
            Ok(count) => info!("[{}] blocks loaded: {}", self.map_id, count),
            Err(e) if e.is_missing() => {
                info!("[{}] no block file at {}", self.map_id, path.display())
            }
            Err(e) => warn!("[{}] blocks load failed: {}", self.map_id, e),
        }
    }

    /// Write `{"_meta": {...}, "blocks": [[bx, by], ...]}`, sorted.
    pub fn save(&self, path: &Path) -> Result<(), MapStoreError> {
        let file = BlockFile {
            meta: BlockMeta {
                map: self.map_id.clone(),
                block_size: self.block_size,
            },
            blocks: self
                .blocks
                .iter()
                .map(|(bx, by)| serde_json::json!([bx, by]))
                .collect(),
        };
        write_json_atomic(path, &file)?;
        info!(
            "[{}] blocks saved: {} -> {}",
            self.map_id,
            self.blocks.len(),
            path.display()
        );
        Ok(())
    }
}

fn block_pair(items: &[serde_json::Value]) -> Option<[i32; 2]> {
    match items {
        [x, y] => Some([x.as_f64()? as i32, y.as_f64()? as i32]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn grid() -> BlockGrid {
        BlockGrid::new("city", 32, Vec2::splat(3072.0))
    }

    #[test]
    fn test_toggle_modes() {
        let mut g = grid();
        let pos = Vec2::new(40.0, 70.0);
        g.toggle_at_world(pos, None);
        assert!(g.contains((1, 2)));
        g.toggle_at_world(pos, None);
        assert!(!g.contains((1, 2)));
        g.toggle_at_world(pos, Some(true));
        g.toggle_at_world(pos, Some(true));
        assert_eq!(g.len(), 1);
        g.toggle_at_world(pos, Some(false));
        assert!(g.is_empty());
    }

    #[test]
    fn test_circle_collision() {
        let mut g = grid();
        g.toggle_at_world(Vec2::new(80.0, 80.0), Some(true)); // block (2,2): 64..96
        assert!(g.collides_circle(Vec2::new(60.0, 80.0), 5.0));
        assert!(!g.collides_circle(Vec2::new(50.0, 80.0), 5.0));
        assert!(g.collides_circle(Vec2::new(80.0, 80.0), 1.0));
    }

    #[test]
    fn test_rect_collision_ignores_touching() {
        let mut g = grid();
        g.toggle_at_world(Vec2::new(80.0, 80.0), Some(true));
        assert!(g.collides_rect(Rect::new(60.0, 60.0, 70.0, 70.0)));
        assert!(!g.collides_rect(Rect::new(32.0, 64.0, 64.0, 96.0)));
    }

    #[test]
    fn test_save_load_round_trip_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map_blocks_city.json");
        let mut g = grid();
        g.toggle_at_world(Vec2::new(100.0, 5.0), Some(true));
        g.toggle_at_world(Vec2::new(5.0, 100.0), Some(true));
        g.save(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["blocks"], serde_json::json!([[0, 3], [3, 0]]));
        assert_eq!(raw["_meta"]["block_size"], 32);

        let mut back = grid();
        assert_eq!(back.try_load(&path).unwrap(), 2);
        assert_eq!(back.iter().collect::<Vec<_>>(), g.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_load_skips_malformed_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.json");
        fs::write(&path, r#"{"blocks": [[1, 2], [3], "x", [4, 5, 6], [7, 8]]}"#).unwrap();
        let mut g = grid();
        assert_eq!(g.try_load(&path).unwrap(), 2);
        assert!(g.contains((1, 2)));
        assert!(g.contains((7, 8)));
    }
}

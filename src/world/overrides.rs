//! Per-map tile image overrides.
//!
//! A map is a `rows x cols` grid of tiles addressed by 1-based `(row, col)`.
//! Each cell shows `{tile_folder}/{row}-{col}.png` unless an override path is
//! set for it. Overrides persist as `map_overrides_{map}.json`:
//!
//! ```json
//! { "_meta": { "map": "city", "override_file": "...", "tile_folder": "..." },
//!   "overrides": { "3,4": "assets/tiles/custom.png" } }
//! ```
//!
//! Older flat files (`{"3,4": "..."}` or `{"(3,4)": "..."}`) are still read.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use super::image_cache::ImageCache;
use super::persist::{normalize_path, read_json, write_json_atomic, MapStoreError};

pub type Cell = (i32, i32);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideMeta {
    pub map: String,
    pub override_file: String,
    /// Alias of `override_file` kept for older map tools.
    pub file: String,
    pub tile_folder: String,
    pub count: usize,
}

#[derive(Serialize)]
struct OverrideFile<'a> {
    #[serde(rename = "_meta")]
    meta: &'a OverrideMeta,
    overrides: BTreeMap<String, &'a str>,
}

#[derive(Resource, Debug, Clone)]
pub struct TileOverrideStore {
    map_id: String,
    tile_folder: String,
    tile_size: f32,
    rows: i32,
    cols: i32,
    overrides: BTreeMap<Cell, String>,
    meta: OverrideMeta,
    cache: ImageCache<Handle<Image>>,
}

impl Default for TileOverrideStore {
    fn default() -> Self {
        Self::new("city", "assets/tiles", 256.0, 12, 12)
    }
}

impl TileOverrideStore {
    pub fn new(map_id: &str, tile_folder: &str, tile_size: f32, rows: i32, cols: i32) -> Self {
        let mut store = Self {
            map_id: String::new(),
            tile_folder: normalize_path(tile_folder),
            tile_size,
            rows,
            cols,
            overrides: BTreeMap::new(),
            meta: OverrideMeta::default(),
            cache: ImageCache::default(),
        };
        store.switch_map(map_id);
        store
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn tile_folder(&self) -> &str {
        &self.tile_folder
    }

    pub fn meta(&self) -> &OverrideMeta {
        &self.meta
    }

    /// Forget everything about the previous map and point at `map_id`.
    pub fn switch_map(&mut self, map_id: &str) {
        self.map_id = map_id.to_string();
        self.overrides.clear();
        self.cache.clear();
        self.meta = self.default_meta();
    }

    pub fn in_bounds(&self, (row, col): Cell) -> bool {
        (1..=self.rows).contains(&row) && (1..=self.cols).contains(&col)
    }

    /// 1-based cell under a world position, `None` outside the map.
    pub fn cell_from_world(&self, pos: Vec2) -> Option<Cell> {
        let col = (pos.x / self.tile_size).floor() as i32 + 1;
        let row = (pos.y / self.tile_size).floor() as i32 + 1;
        self.in_bounds((row, col)).then_some((row, col))
    }

    /// The override path for `cell`, if any.
    pub fn get(&self, cell: Cell) -> Option<&str> {
        self.overrides.get(&cell).map(String::as_str)
    }

    /// Image path the cell should display.
    pub fn resolve(&self, cell: Cell) -> String {
        match self.get(cell) {
            Some(path) => path.to_string(),
            None => format!("{}/{}-{}.png", self.tile_folder, cell.0, cell.1),
        }
    }

    /// Override `cell` with `path`; an empty path clears it. Out-of-range
    /// cells are ignored and return false.
    pub fn set(&mut self, cell: Cell, path: &str) -> bool {
        if !self.in_bounds(cell) {
            return false;
        }
        if path.is_empty() {
            return self.clear(cell);
        }
        let path = normalize_path(path);
        if let Some(old) = self.overrides.insert(cell, path.clone()) {
            self.cache.invalidate(&old);
        }
        self.cache.invalidate(&path);
        self.meta.count = self.overrides.len();
        true
    }

    pub fn clear(&mut self, cell: Cell) -> bool {
        if !self.in_bounds(cell) {
            return false;
        }
        if let Some(old) = self.overrides.remove(&cell) {
            self.cache.invalidate(&old);
        }
        let fallback = self.resolve(cell);
        self.cache.invalidate(&fallback);
        self.meta.count = self.overrides.len();
        true
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Cell, &str)> {
        self.overrides.iter().map(|(cell, path)| (*cell, path.as_str()))
    }

    /// Cached image for `cell`, loading it through `loader` on first use.
    pub fn image(
        &mut self,
        cell: Cell,
        loader: impl FnOnce(&str) -> Option<Handle<Image>>,
    ) -> Option<&Handle<Image>> {
        let path = self.resolve(cell);
        self.cache.get_or_load(&path, loader)
    }

    pub fn cache(&self) -> &ImageCache<Handle<Image>> {
        &self.cache
    }

    /// Replace the in-memory overrides with the contents of `path`.
    /// A missing file leaves the store empty. Returns the number of cells read.
    pub fn try_load(&mut self, path: &Path) -> Result<usize, MapStoreError> {
        self.overrides.clear();
        self.cache.clear();
        self.meta = self.default_meta();

        let raw: Value = read_json(path)?;
        let Value::Object(mut root) = raw else {
            return Ok(0);
        };
        let meta_in = root.remove("_meta");
        let entries: Map<String, Value> = match root.remove("overrides") {
            Some(Value::Object(wrapped)) => wrapped,
            // legacy flat file
            Some(other) => {
                root.insert("overrides".to_string(), other);
                root
            }
            None => root,
        };

        for (key, value) in entries {
            let (Some(cell), Value::String(p)) = (parse_cell_key(&key), value) else {
                continue;
            };
            if self.in_bounds(cell) && !p.is_empty() {
                self.overrides.insert(cell, normalize_path(&p));
            }
        }

        if let Some(meta) = meta_in.and_then(|m| serde_json::from_value::<OverrideMeta>(m).ok()) {
            self.meta = self.fill_meta(meta);
        }
        self.meta.count = self.overrides.len();
        Ok(self.overrides.len())
    }

    /// `try_load`, logging instead of failing. Broken or missing files
    /// leave the store empty.
    pub fn load(&mut self, path: &Path) {
        match self.try_load(path) {
            Ok(count) => info!("[{}] overrides loaded: {} cells", self.map_id, count),
            Err(e) if e.is_missing() => {
                info!("[{}] no override file at {}", self.map_id, path.display())
            }
            Err(e) => warn!("[{}] overrides load failed: {}", self.map_id, e),
        }
    }

    /// Write the wrapped format to `path`.
    pub fn save(&mut self, path: &Path) -> Result<(), MapStoreError> {
        let name = file_name(path);
        self.meta = OverrideMeta {
            override_file: name.clone(),
            file: name,
            count: self.overrides.len(),
            ..self.default_meta()
        };
        let file = OverrideFile {
            meta: &self.meta,
            overrides: self
                .overrides
                .iter()
                .map(|((r, c), p)| (format!("{r},{c}"), p.as_str()))
                .collect(),
        };
        write_json_atomic(path, &file)?;
        info!(
            "[{}] overrides saved: {} cells -> {}",
            self.map_id,
            self.overrides.len(),
            path.display()
        );
        Ok(())
    }

    fn default_meta(&self) -> OverrideMeta {
        let override_file = format!("map_overrides_{}.json", self.map_id);
        OverrideMeta {
            map: self.map_id.clone(),
            file: override_file.clone(),
            override_file,
            tile_folder: self.tile_folder.clone(),
            count: 0,
        }
    }

    fn fill_meta(&self, meta: OverrideMeta) -> OverrideMeta {
        let defaults = self.default_meta();
        let pick = |value: String, fallback: String| if value.is_empty() { fallback } else { value };
        let override_file = pick(meta.override_file, defaults.override_file);
        OverrideMeta {
            map: pick(meta.map, defaults.map),
            file: pick(meta.file, override_file.clone()),
            override_file,
            tile_folder: pick(meta.tile_folder, defaults.tile_folder),
            count: meta.count,
        }
    }
}

/// `"3,4"` or `"(3,4)"` (whitespace allowed) into `(3, 4)`.
pub fn parse_cell_key(key: &str) -> Option<Cell> {
    let inner = key.trim();
    let inner = inner
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(inner);
    let (r, c) = inner.split_once(',')?;
    Some((r.trim().parse().ok()?, c.trim().parse().ok()?))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

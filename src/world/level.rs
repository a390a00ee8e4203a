//! Side-view level geometry: a ground polyline, walls, props and photos,
//! plus a small editable wall grid.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use super::persist::{read_json, write_json_atomic, MapStoreError};

/// Anything the player and NPCs can stand on and bump into.
pub trait SupportSurface {
    /// Ground line height at `x`.
    fn ground_y(&self, x: f32) -> f32;

    fn world_size(&self) -> Vec2;

    /// Highest walkable top at `x`. Plain ground unless overridden.
    fn support_y(&self, x: f32) -> f32 {
        self.ground_y(x)
    }

    fn solid_rects(&self) -> Vec<Rect> {
        Vec::new()
    }
}

/// A level-less floor at a fixed height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatGround {
    pub y: f32,
    pub world_size: Vec2,
}

impl SupportSurface for FlatGround {
    fn ground_y(&self, _x: f32) -> f32 {
        self.y
    }

    fn world_size(&self) -> Vec2 {
        self.world_size
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FILE FORMAT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LevelMeta {
    #[serde(default)]
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    world_w: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    world_h: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sky_top: Option<[u8; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sky_bottom: Option<[u8; 3]>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RectDef {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl From<RectDef> for Rect {
    fn from(r: RectDef) -> Self {
        Rect::new(r.x, r.y, r.x + r.w, r.y + r.h)
    }
}

impl From<Rect> for RectDef {
    fn from(r: Rect) -> Self {
        Self {
            x: r.min.x,
            y: r.min.y,
            w: r.width(),
            h: r.height(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PropDef {
    #[serde(flatten)]
    rect: RectDef,
    #[serde(default = "default_true")]
    solid: bool,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PhotoDef {
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default = "default_photo_side")]
    w: f32,
    #[serde(default = "default_photo_side")]
    h: f32,
    #[serde(default)]
    path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LevelFile {
    #[serde(rename = "_meta", default)]
    meta: LevelMeta,
    #[serde(default)]
    ground_segments: Vec<[f32; 2]>,
    #[serde(default)]
    walls: Vec<RectDef>,
    #[serde(default)]
    props: Vec<PropDef>,
    #[serde(default)]
    photos: Vec<PhotoDef>,
    #[serde(default)]
    wall_grid: Option<WallGrid>,
    #[serde(default)]
    wall_cells: Vec<[i32; 2]>,
}

fn default_true() -> bool {
    true
}

fn default_photo_side() -> f32 {
    96.0
}

// ═══════════════════════════════════════════════════════════════════════
// LEVEL
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub rect: Rect,
    pub solid: bool,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub rect: Rect,
    pub path: String,
}

/// Editable `cols x rows` grid of square wall cells anchored at `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallGrid {
    pub cols: i32,
    pub rows: i32,
    pub cell: f32,
    pub origin: [f32; 2],
}

impl Default for WallGrid {
    fn default() -> Self {
        Self {
            cols: 5,
            rows: 3,
            cell: 80.0,
            origin: [1200.0, 180.0],
        }
    }
}

impl WallGrid {
    pub fn contains(&self, (c, r): (i32, i32)) -> bool {
        (0..self.cols).contains(&c) && (0..self.rows).contains(&r)
    }

    pub fn cell_rect(&self, (c, r): (i32, i32)) -> Rect {
        let min = Vec2::new(
            self.origin[0] + c as f32 * self.cell,
            self.origin[1] + r as f32 * self.cell,
        );
        Rect::from_corners(min, min + Vec2::splat(self.cell))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub id: String,
    pub world_size: Vec2,
    pub sky_top: [u8; 3],
    pub sky_bottom: [u8; 3],
    /// Ground polyline, sorted by x. Never empty.
    ground: Vec<Vec2>,
    /// Free-placed walls.
    pub walls: Vec<Rect>,
    pub props: Vec<Prop>,
    pub photos: Vec<Photo>,
    pub wall_grid: WallGrid,
    wall_cells: BTreeSet<(i32, i32)>,
    /// Walls derived from `wall_cells`.
    grid_walls: Vec<Rect>,
}

impl Level {
    /// A level whose ground follows `ground`. Errors when it has no points.
    pub fn new(id: &str, world_size: Vec2, ground: Vec<Vec2>) -> Result<Self, String> {
        if ground.is_empty() {
            return Err("ground_segments is empty".to_string());
        }
        let mut ground = ground;
        ground.sort_by(|a, b| a.x.total_cmp(&b.x));
        Ok(Self {
            id: id.to_string(),
            world_size,
            sky_top: [255, 210, 225],
            sky_bottom: [255, 230, 240],
            ground,
            walls: Vec::new(),
            props: Vec::new(),
            photos: Vec::new(),
            wall_grid: WallGrid::default(),
            wall_cells: BTreeSet::new(),
            grid_walls: Vec::new(),
        })
    }

    pub fn load(path: &Path, default_world: Vec2) -> Result<Self, MapStoreError> {
        let file: LevelFile = read_json(path)?;
        let ground = file
            .ground_segments
            .iter()
            .map(|[x, y]| Vec2::new(*x, *y))
            .collect();
        let world_size = Vec2::new(
            file.meta.world_w.unwrap_or(default_world.x),
            file.meta.world_h.unwrap_or(default_world.y),
        );
        let id = match file.meta.id.as_str() {
            "" => file_stem(path),
            id => id.to_string(),
        };
        let mut level = Level::new(&id, world_size, ground).map_err(|reason| {
            MapStoreError::InvalidLevel {
                path: path.to_path_buf(),
                reason,
            }
        })?;

        if let Some(sky) = file.meta.sky_top {
            level.sky_top = sky;
        }
        if let Some(sky) = file.meta.sky_bottom {
            level.sky_bottom = sky;
        }
        level.walls = file.walls.into_iter().map(Rect::from).collect();
        level.props = file
            .props
            .into_iter()
            .map(|p| Prop {
                rect: p.rect.into(),
                solid: p.solid,
                name: p.name,
            })
            .collect();
        level.photos = file
            .photos
            .into_iter()
            .map(|p| Photo {
                rect: Rect::new(p.x, p.y, p.x + p.w, p.y + p.h),
                path: p.path,
            })
            .collect();
        if let Some(grid) = file.wall_grid {
            level.wall_grid = grid;
        }
        level.wall_cells = file.wall_cells.iter().map(|[c, r]| (*c, *r)).collect();
        level.rebuild_walls_from_grid();

        info!("Level {} loaded from {}", level.id, path.display());
        Ok(level)
    }

    pub fn save(&self, path: &Path) -> Result<(), MapStoreError> {
        let file = LevelFile {
            meta: LevelMeta {
                id: file_stem(path),
                world_w: Some(self.world_size.x),
                world_h: Some(self.world_size.y),
                sky_top: Some(self.sky_top),
                sky_bottom: Some(self.sky_bottom),
            },
            ground_segments: self.ground.iter().map(|p| [p.x, p.y]).collect(),
            walls: self.walls.iter().copied().map(RectDef::from).collect(),
            props: self
                .props
                .iter()
                .map(|p| PropDef {
                    rect: p.rect.into(),
                    solid: p.solid,
                    name: p.name.clone(),
                })
                .collect(),
            photos: self
                .photos
                .iter()
                .map(|p| PhotoDef {
                    x: p.rect.min.x,
                    y: p.rect.min.y,
                    w: p.rect.width(),
                    h: p.rect.height(),
                    path: p.path.clone(),
                })
                .collect(),
            wall_grid: Some(self.wall_grid),
            wall_cells: self.wall_cells.iter().map(|(c, r)| [*c, *r]).collect(),
        };
        write_json_atomic(path, &file)?;
        info!("Level {} saved -> {}", self.id, path.display());
        Ok(())
    }

    pub fn ground_points(&self) -> &[Vec2] {
        &self.ground
    }

    pub fn wall_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.wall_cells.iter().copied()
    }

    pub fn wall_cell_from_world(&self, pos: Vec2) -> Option<(i32, i32)> {
        let grid = &self.wall_grid;
        let local = pos - Vec2::from(grid.origin);
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let cell = (
            (local.x / grid.cell).floor() as i32,
            (local.y / grid.cell).floor() as i32,
        );
        grid.contains(cell).then_some(cell)
    }

    /// `set_to`: `None` toggles, `Some(true)` adds, `Some(false)` removes.
    pub fn toggle_wall_cell(&mut self, c: i32, r: i32, set_to: Option<bool>) {
        let key = (c, r);
        let want = set_to.unwrap_or(!self.wall_cells.contains(&key));
        if want {
            self.wall_cells.insert(key);
        } else {
            self.wall_cells.remove(&key);
        }
        self.rebuild_walls_from_grid();
    }

    /// Recompute grid walls. Cells outside the grid are kept but ignored.
    pub fn rebuild_walls_from_grid(&mut self) {
        let grid = self.wall_grid;
        self.grid_walls = self
            .wall_cells
            .iter()
            .copied()
            .filter(|cell| grid.contains(*cell))
            .map(|cell| grid.cell_rect(cell))
            .collect();
    }
}

impl SupportSurface for Level {
    fn ground_y(&self, x: f32) -> f32 {
        let segs = &self.ground;
        let (first, last) = (segs[0], segs[segs.len() - 1]);
        if x <= first.x {
            return first.y;
        }
        if x >= last.x {
            return last.y;
        }
        for pair in segs.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.x <= x && x <= b.x {
                let t = (x - a.x) / (b.x - a.x).max(1.0);
                return a.y + (b.y - a.y) * t;
            }
        }
        last.y
    }

    fn world_size(&self) -> Vec2 {
        self.world_size
    }

    fn support_y(&self, x: f32) -> f32 {
        self.props
            .iter()
            .filter(|p| p.solid && p.rect.min.x <= x && x <= p.rect.max.x)
            .map(|p| p.rect.min.y)
            .fold(self.ground_y(x), f32::min)
    }

    fn solid_rects(&self) -> Vec<Rect> {
        self.walls
            .iter()
            .chain(self.grid_walls.iter())
            .copied()
            .chain(self.props.iter().filter(|p| p.solid).map(|p| p.rect))
            .collect()
    }
}

/// The ground of the loaded scene.
#[derive(Resource, Debug, Clone)]
pub enum SceneSurface {
    Level(Level),
    Flat(FlatGround),
}

impl Default for SceneSurface {
    fn default() -> Self {
        SceneSurface::Flat(FlatGround {
            y: 0.0,
            world_size: Vec2::splat(12.0 * 256.0),
        })
    }
}

impl SceneSurface {
    pub fn level(&self) -> Option<&Level> {
        match self {
            SceneSurface::Level(level) => Some(level),
            SceneSurface::Flat(_) => None,
        }
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        match self {
            SceneSurface::Level(level) => Some(level),
            SceneSurface::Flat(_) => None,
        }
    }

    fn inner(&self) -> &dyn SupportSurface {
        match self {
            SceneSurface::Level(level) => level,
            SceneSurface::Flat(flat) => flat,
        }
    }
}

impl SupportSurface for SceneSurface {
    fn ground_y(&self, x: f32) -> f32 {
        self.inner().ground_y(x)
    }

    fn world_size(&self) -> Vec2 {
        self.inner().world_size()
    }

    fn support_y(&self, x: f32) -> f32 {
        self.inner().support_y(x)
    }

    fn solid_rects(&self) -> Vec<Rect> {
        self.inner().solid_rects()
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const WORLD: Vec2 = Vec2::new(4800.0, 540.0);

    fn sample() -> Level {
        let mut level = Level::new(
            "casino_map",
            WORLD,
            vec![Vec2::new(0.0, 400.0), Vec2::new(100.0, 300.0), Vec2::new(200.0, 300.0)],
        )
        .unwrap();
        level.props.push(Prop {
            rect: Rect::new(140.0, 250.0, 180.0, 300.0),
            solid: true,
            name: "crate".into(),
        });
        level.props.push(Prop {
            rect: Rect::new(140.0, 100.0, 180.0, 120.0),
            solid: false,
            name: "sign".into(),
        });
        level
    }

    #[test]
    fn test_ground_interpolates_and_clamps() {
        let level = sample();
        assert_eq!(level.ground_y(-50.0), 400.0);
        assert_eq!(level.ground_y(50.0), 350.0);
        assert_eq!(level.ground_y(150.0), 300.0);
        assert_eq!(level.ground_y(9999.0), 300.0);
    }

    #[test]
    fn test_support_uses_solid_props_only() {
        let level = sample();
        assert_eq!(level.support_y(160.0), 250.0);
        assert_eq!(level.support_y(190.0), 300.0);
    }

    #[test]
    fn test_empty_ground_is_rejected() {
        assert!(Level::new("x", WORLD, Vec::new()).is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, r#"{"ground_segments": []}"#).unwrap();
        let err = Level::load(&path, WORLD).unwrap_err();
        assert!(matches!(err, MapStoreError::InvalidLevel { .. }));
    }

    #[test]
    fn test_wall_grid_cells() {
        let mut level = sample();
        assert_eq!(level.wall_cell_from_world(Vec2::new(1210.0, 190.0)), Some((0, 0)));
        assert_eq!(level.wall_cell_from_world(Vec2::new(1599.0, 419.0)), Some((4, 2)));
        assert_eq!(level.wall_cell_from_world(Vec2::new(1600.0, 190.0)), None);
        assert_eq!(level.wall_cell_from_world(Vec2::new(1100.0, 190.0)), None);

        level.toggle_wall_cell(1, 1, None);
        assert!(level
            .solid_rects()
            .contains(&Rect::new(1280.0, 260.0, 1360.0, 340.0)));
        level.toggle_wall_cell(1, 1, None);
        assert_eq!(level.solid_rects().len(), 1);
    }

    #[test]
    fn test_solid_rects_combine_walls_and_props() {
        let mut level = sample();
        level.walls.push(Rect::new(0.0, 0.0, 10.0, 10.0));
        level.toggle_wall_cell(0, 0, Some(true));
        level.toggle_wall_cell(9, 9, Some(true));
        assert_eq!(level.solid_rects().len(), 3);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("casino_map.json");
        let mut level = sample();
        level.walls.push(Rect::new(500.0, 200.0, 540.0, 300.0));
        level.photos.push(Photo {
            rect: Rect::new(10.0, 20.0, 106.0, 116.0),
            path: "assets/photos/a.png".into(),
        });
        level.toggle_wall_cell(2, 1, Some(true));
        level.save(&path).unwrap();

        let back = Level::load(&path, Vec2::ZERO).unwrap();
        assert_eq!(back, level);
    }

    #[test]
    fn test_load_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map_lab.json");
        fs::write(
            &path,
            r#"{"ground_segments": [[0, 420]], "props": [{"x": 1, "y": 2, "w": 3, "h": 4}],
                "photos": [{"x": 5, "y": 6}]}"#,
        )
        .unwrap();
        let level = Level::load(&path, WORLD).unwrap();
        assert_eq!(level.id, "map_lab");
        assert_eq!(level.world_size, WORLD);
        assert!(level.props[0].solid);
        assert_eq!(level.photos[0].rect, Rect::new(5.0, 6.0, 101.0, 102.0));
        assert_eq!(level.wall_grid, WallGrid::default());
        assert_eq!(level.ground_y(1000.0), 420.0);
    }

    #[test]
    fn test_flat_ground_defaults() {
        let flat = FlatGround {
            y: 421.0,
            world_size: WORLD,
        };
        assert_eq!(flat.support_y(123.0), 421.0);
        assert!(flat.solid_rects().is_empty());
    }

    #[test]
    fn test_scene_surface_delegates() {
        let surface = SceneSurface::Level(sample());
        assert_eq!(surface.support_y(160.0), 250.0);
        assert_eq!(surface.solid_rects().len(), 1);
        assert!(surface.level().is_some());
        assert!(SceneSurface::default().level().is_none());
    }
}

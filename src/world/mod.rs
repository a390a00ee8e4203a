//! World domain: scene loading, tile overrides, wall blocks, side-view levels
//! and the editor operations that mutate them.

use bevy::prelude::*;
use std::path::Path;

use crate::shared::*;

pub mod blocks;
pub mod image_cache;
pub mod level;
pub mod overrides;
pub mod persist;
pub mod scenes;

pub use blocks::BlockGrid;
pub use level::{FlatGround, Level, Photo, Prop, SceneSurface, SupportSurface};
pub use overrides::TileOverrideStore;
pub use persist::MapStoreError;
pub use scenes::{scene_def, SceneDef, SceneLayout};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileOverrideStore>()
            .init_resource::<BlockGrid>()
            .init_resource::<SceneSurface>()
            // Size the stores from config, then boot into the city
            .add_systems(
                OnExit(GameState::Loading),
                (configure_map_stores, enter_first_scene).chain(),
            )
            .add_systems(
                Update,
                (
                    // Swap stores, geometry and gates when a transition fires
                    handle_map_transition,
                    // Editor edits, save and reload
                    apply_editor_commands,
                    // Redraw tiles after overrides change
                    refresh_tile_sprites.run_if(resource_changed::<TileOverrideStore>),
                    // Redraw level geometry after it changes
                    refresh_level_sprites.run_if(resource_changed::<SceneSurface>),
                    // Map space -> render space
                    sync_body_transforms,
                )
                    .chain(),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component, Debug, Clone, Copy)]
pub struct TileSprite {
    pub cell: (i32, i32),
}

#[derive(Component, Debug, Clone, Copy)]
pub struct LevelSprite;

const GATE_SIZE_TOPDOWN: Vec2 = Vec2::new(64.0, 64.0);
const GATE_SIZE_SIDE: Vec2 = Vec2::new(64.0, 96.0);

// ═══════════════════════════════════════════════════════════════════════
// SCENE LOADING
// ═══════════════════════════════════════════════════════════════════════

/// Rebuild the map stores with the configured grid dimensions.
fn configure_map_stores(
    config: Res<GameConfig>,
    mut overrides: ResMut<TileOverrideStore>,
    mut blocks: ResMut<BlockGrid>,
) {
    let key = overrides.map_id().to_string();
    *overrides = TileOverrideStore::new(
        &key,
        &config.tile_folder,
        config.tile_size,
        config.map_rows,
        config.map_cols,
    );
    *blocks = BlockGrid::new(&key, config.block_size, config.map_pixel_size());
}

fn enter_first_scene(config: Res<GameConfig>, mut events: EventWriter<MapTransitionEvent>) {
    let def = scene_def(SceneId::City, &config);
    events.send(MapTransitionEvent {
        to: def.id,
        spawn: def.spawn,
    });
}

/// Build the support surface for a scene. Level files that fail to load
/// fall back to flat ground.
pub fn load_surface(def: &SceneDef, config: &GameConfig) -> SceneSurface {
    match def.layout {
        SceneLayout::TileMap => {
            let size = config.map_pixel_size();
            SceneSurface::Flat(FlatGround {
                y: size.y,
                world_size: size,
            })
        }
        SceneLayout::Level { file } => {
            let path = config.data_dir.join(file);
            let default_world = Vec2::new(config.world_width, config.world_height);
            match Level::load(&path, default_world) {
                Ok(level) => SceneSurface::Level(level),
                Err(e) => {
                    warn!("{}; using flat ground", e);
                    SceneSurface::Flat(FlatGround {
                        y: config.ground_y(),
                        world_size: default_world,
                    })
                }
            }
        }
    }
}

/// Handle MapTransitionEvent: drop the old scene, reload every store for
/// the new map and spawn its gates.
pub fn handle_map_transition(
    mut commands: Commands,
    mut events: EventReader<MapTransitionEvent>,
    config: Res<GameConfig>,
    scene_entities: Query<Entity, With<SceneEntity>>,
    mut current: ResMut<CurrentScene>,
    mut overrides: ResMut<TileOverrideStore>,
    mut blocks: ResMut<BlockGrid>,
    mut surface: ResMut<SceneSurface>,
    clear_color: Option<ResMut<ClearColor>>,
) {
    // Only the most recent transition matters
    let Some(event) = events.read().last() else {
        return;
    };

    for entity in &scene_entities {
        commands.entity(entity).despawn_recursive();
    }

    let def = scene_def(event.to, &config);
    let key = def.id.map_key();

    overrides.switch_map(key);
    overrides.load(&config.overrides_path(key));

    *surface = load_surface(&def, &config);
    blocks.switch_map(key, surface.world_size());
    blocks.load(&config.blocks_path(key));

    current.id = def.id;
    current.view = def.view;

    if let Some(mut clear_color) = clear_color {
        clear_color.0 = match surface.level() {
            Some(level) => sky_color(level.sky_top),
            None => Color::srgb(17.0 / 255.0, 19.0 / 255.0, 24.0 / 255.0),
        };
    }

    for gate in &def.gates {
        let size = match def.view {
            ViewMode::TopDown => GATE_SIZE_TOPDOWN,
            ViewMode::Side => GATE_SIZE_SIDE,
        };
        let mut body = Body::new(Vec2::ZERO, size);
        body.set_center(gate.at);
        if def.view == ViewMode::Side {
            body.pos.y = surface.support_y(gate.at.x) - size.y;
        }
        commands.spawn((
            Gate {
                to: gate.to,
                spawn: gate.spawn,
            },
            body,
            SceneEntity,
            Sprite::from_color(Color::srgba(0.9, 0.8, 0.3, 0.6), size),
            Transform::from_xyz(body.center().x, -body.center().y, 1.0),
        ));
    }

    info!(
        "Entered {:?}: {} overrides, {} blocks, {} gates",
        def.id,
        overrides.len(),
        blocks.len(),
        def.gates.len()
    );
}

fn sky_color([r, g, b]: [u8; 3]) -> Color {
    Color::srgb_u8(r, g, b)
}

// ═══════════════════════════════════════════════════════════════════════
// EDITOR OPERATIONS
// ═══════════════════════════════════════════════════════════════════════

/// Apply map edits from the editor. Save and reload act on the current map.
pub fn apply_editor_commands(
    mut events: EventReader<EditorCommandEvent>,
    config: Res<GameConfig>,
    current: Res<CurrentScene>,
    mut overrides: ResMut<TileOverrideStore>,
    mut blocks: ResMut<BlockGrid>,
    mut surface: ResMut<SceneSurface>,
) {
    for EditorCommandEvent(command) in events.read() {
        match command {
            EditorCommand::SetTileOverride { cell, path } => {
                if overrides.set(*cell, path) {
                    info!("Tile {:?} -> {:?}", cell, overrides.resolve(*cell));
                } else {
                    warn!("Tile {:?} is outside the map", cell);
                }
            }
            EditorCommand::ClearTileOverride { cell } => {
                if overrides.clear(*cell) {
                    info!("Tile {:?} override cleared", cell);
                }
            }
            EditorCommand::ToggleBlock { world_pos, set_to } => {
                blocks.toggle_at_world(*world_pos, *set_to);
                debug!("Block at {:?} toggled ({} total)", world_pos, blocks.len());
            }
            EditorCommand::ToggleWallCell { col, row, set_to } => match surface.level_mut() {
                Some(level) => level.toggle_wall_cell(*col, *row, *set_to),
                None => warn!("No level loaded; wall cell ignored"),
            },
            EditorCommand::AddWall { rect } => match surface.level_mut() {
                Some(level) => level.walls.push(*rect),
                None => warn!("No level loaded; wall ignored"),
            },
            EditorCommand::AddProp { rect, solid, name } => match surface.level_mut() {
                Some(level) => level.props.push(Prop {
                    rect: *rect,
                    solid: *solid,
                    name: name.clone(),
                }),
                None => warn!("No level loaded; prop ignored"),
            },
            EditorCommand::AddPhoto { rect, path } => match surface.level_mut() {
                Some(level) => level.photos.push(Photo {
                    rect: *rect,
                    path: persist::normalize_path(path),
                }),
                None => warn!("No level loaded; photo ignored"),
            },
            EditorCommand::Save => {
                save_scene(&current, &config, &mut overrides, &blocks, &surface);
            }
            EditorCommand::Reload => {
                let key = current.id.map_key();
                overrides.load(&config.overrides_path(key));
                blocks.load(&config.blocks_path(key));
                let def = scene_def(current.id, &config);
                if matches!(def.layout, SceneLayout::Level { .. }) {
                    *surface = load_surface(&def, &config);
                }
                info!("Reloaded {:?}", current.id);
            }
        }
    }
}

fn save_scene(
    current: &CurrentScene,
    config: &GameConfig,
    overrides: &mut TileOverrideStore,
    blocks: &BlockGrid,
    surface: &SceneSurface,
) {
    let key = current.id.map_key();
    if let Err(e) = overrides.save(&config.overrides_path(key)) {
        warn!("Save failed: {}", e);
    }
    if let Err(e) = blocks.save(&config.blocks_path(key)) {
        warn!("Save failed: {}", e);
    }
    if let (Some(level), SceneLayout::Level { file }) =
        (surface.level(), scene_def(current.id, config).layout)
    {
        if let Err(e) = level.save(&config.data_dir.join(file)) {
            warn!("Save failed: {}", e);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// VISUALS
// ═══════════════════════════════════════════════════════════════════════

/// Asset-server path for a project-relative image path.
fn asset_path(path: &str) -> String {
    path.strip_prefix("assets/").unwrap_or(path).to_string()
}

fn refresh_tile_sprites(
    mut commands: Commands,
    config: Res<GameConfig>,
    current: Res<CurrentScene>,
    asset_server: Option<Res<AssetServer>>,
    mut overrides: ResMut<TileOverrideStore>,
    existing: Query<Entity, With<TileSprite>>,
) {
    for entity in &existing {
        commands.entity(entity).despawn();
    }
    if scene_def(current.id, &config).layout != SceneLayout::TileMap {
        return;
    }

    // Image lookups only fill the cache
    let overrides = overrides.bypass_change_detection();
    let size = Vec2::splat(config.tile_size);
    for row in 1..=config.map_rows {
        for col in 1..=config.map_cols {
            let image = overrides.image((row, col), |path| {
                let server = asset_server.as_ref()?;
                Path::new(path)
                    .exists()
                    .then(|| server.load(asset_path(path)))
            });
            let sprite = match image {
                Some(handle) => Sprite {
                    image: handle.clone(),
                    custom_size: Some(size),
                    ..default()
                },
                None => Sprite::from_color(checker_color(row, col), size),
            };
            let center = config.cell_center(row, col);
            commands.spawn((
                TileSprite { cell: (row, col) },
                sprite,
                Transform::from_xyz(center.x, -center.y, -10.0),
            ));
        }
    }
}

fn checker_color(row: i32, col: i32) -> Color {
    if (row + col) % 2 == 0 {
        Color::srgb(0.20, 0.23, 0.28)
    } else {
        Color::srgb(0.24, 0.27, 0.32)
    }
}

fn refresh_level_sprites(
    mut commands: Commands,
    surface: Res<SceneSurface>,
    existing: Query<Entity, With<LevelSprite>>,
) {
    for entity in &existing {
        commands.entity(entity).despawn();
    }
    let Some(level) = surface.level() else {
        return;
    };

    let mut spawn_rect = |rect: Rect, color: Color, z: f32| {
        let center = rect.center();
        commands.spawn((
            LevelSprite,
            Sprite::from_color(color, rect.size()),
            Transform::from_xyz(center.x, -center.y, z),
        ));
    };

    // Ground as one slab per segment, down to the bottom of the world
    for pair in level.ground_points().windows(2) {
        let top = pair[0].y.min(pair[1].y);
        let rect = Rect::new(pair[0].x, top, pair[1].x, level.world_size.y.max(top + 1.0));
        spawn_rect(rect, Color::srgb_u8(120, 110, 125), -5.0);
    }
    for rect in level.solid_rects() {
        spawn_rect(rect, Color::srgb_u8(90, 85, 98), -4.0);
    }
    for prop in level.props.iter().filter(|p| !p.solid) {
        spawn_rect(prop.rect, Color::srgba_u8(90, 85, 98, 120), -4.0);
    }
    for photo in &level.photos {
        spawn_rect(photo.rect, Color::srgb_u8(120, 120, 140), -3.0);
    }
}

/// Mirror map-space bodies (y down) into Bevy transforms (y up).
pub fn sync_body_transforms(mut query: Query<(&Body, &mut Transform), Changed<Body>>) {
    for (body, mut transform) in &mut query {
        let center = body.center();
        transform.translation.x = center.x;
        transform.translation.y = -center.y;
    }
}

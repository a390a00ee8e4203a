use bevy::prelude::*;
use crate::shared::*;
use crate::world::{SceneSurface, SupportSurface};
use super::CameraSnap;

/// Spawn the player entity with all necessary components.
/// Runs once when loading finishes; scene entry places it.
pub fn spawn_player(
    mut commands: Commands,
    config: Res<GameConfig>,
    existing: Query<Entity, With<Player>>,
) {
    // Guard: don't double-spawn.
    if !existing.is_empty() {
        return;
    }

    commands.spawn((
        Player,
        PlayerMotion::default(),
        Body::new(Vec2::ZERO, config.player_size()),
        // Placeholder sprite
        Sprite::from_color(Color::srgb_u8(70, 120, 210), config.player_size()),
        // Z = 10 so the player draws above tiles and props.
        Transform::from_translation(Vec3::new(0.0, 0.0, 10.0)),
        Visibility::default(),
    ));
}

/// Place the player at the spawn point of the new scene.
pub fn handle_map_transition(
    mut events: EventReader<MapTransitionEvent>,
    current: Res<CurrentScene>,
    surface: Res<SceneSurface>,
    mut snap: ResMut<CameraSnap>,
    mut query: Query<(&mut Body, &mut PlayerMotion), With<Player>>,
) {
    let Some(event) = events.read().last() else {
        return;
    };
    let Ok((mut body, mut motion)) = query.get_single_mut() else {
        return;
    };

    body.set_center(event.spawn);
    if current.view == ViewMode::Side {
        let ground = surface.ground_y(body.center().x);
        body.pos.y = ground - body.size.y;
    }
    motion.velocity = Vec2::ZERO;
    snap.frames_remaining = 2;
    info!("Player placed at ({:.0}, {:.0}) in {:?}", body.pos.x, body.pos.y, current.id);
}

mod camera;
pub mod movement;
mod spawn;

use bevy::prelude::*;
use crate::shared::*;

pub use camera::clamp_camera_center;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        // -- Local resources --
        app.init_resource::<CameraSnap>();

        // -- Spawn player once loading is over --
        app.add_systems(OnExit(GameState::Loading), spawn::spawn_player);

        // -- Scene entry runs regardless of state so no transition is missed --
        app.add_systems(
            Update,
            spawn::handle_map_transition.after(crate::world::handle_map_transition),
        );

        // -- Movement only while Playing; Dialogue and Editor freeze the player --
        app.add_systems(
            Update,
            movement::player_movement.run_if(in_state(GameState::Playing)),
        );

        app.add_systems(
            PostUpdate,
            camera::camera_follow_player
                .before(bevy::transform::TransformSystem::TransformPropagate),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Local resources (player-domain only)
// ═══════════════════════════════════════════════════════════════════════════

/// Frames left during which the camera jumps straight to the player.
#[derive(Resource, Debug, Default)]
pub struct CameraSnap {
    pub frames_remaining: u8,
}

use bevy::prelude::*;
use crate::shared::*;
use crate::world::{SceneSurface, SupportSurface};
use super::CameraSnap;

/// Clamp a map-space camera centre so the viewport never shows past the
/// world edge. Worlds smaller than the viewport are centred.
pub fn clamp_camera_center(target: Vec2, half_view: Vec2, world: Vec2) -> Vec2 {
    let axis = |t: f32, half: f32, size: f32| {
        if size <= half * 2.0 {
            size / 2.0
        } else {
            t.clamp(half, size - half)
        }
    };
    Vec2::new(
        axis(target.x, half_view.x, world.x),
        axis(target.y, half_view.y, world.y),
    )
}

/// Follow the player with a lerp. Snaps after a scene change.
pub fn camera_follow_player(
    time: Res<Time>,
    surface: Res<SceneSurface>,
    player_query: Query<&Body, (With<Player>, Without<Camera2d>)>,
    mut camera_query: Query<(&mut Transform, &OrthographicProjection), (With<Camera2d>, Without<Player>)>,
    mut snap: ResMut<CameraSnap>,
) {
    let Ok(body) = player_query.get_single() else {
        return;
    };
    let Ok((mut cam_tf, projection)) = camera_query.get_single_mut() else {
        return;
    };

    let half_view = Vec2::new(
        projection.area.width() / 2.0 * cam_tf.scale.x,
        projection.area.height() / 2.0 * cam_tf.scale.y,
    );
    let target = clamp_camera_center(body.center(), half_view, surface.world_size());
    // Map space is y-down; the camera lives in world space.
    let target = Vec2::new(target.x, -target.y);

    let current = cam_tf.translation.truncate();
    let next = if snap.frames_remaining > 0 {
        snap.frames_remaining -= 1;
        target
    } else {
        let t = (6.0 * time.delta_secs()).min(1.0);
        current + (target - current) * t
    };

    cam_tf.translation.x = next.x.round();
    cam_tf.translation.y = next.y.round();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_inside_world() {
        let half = Vec2::new(480.0, 270.0);
        let world = Vec2::new(4800.0, 540.0);
        assert_eq!(clamp_camera_center(Vec2::new(10.0, 300.0), half, world), Vec2::new(480.0, 270.0));
        assert_eq!(clamp_camera_center(Vec2::new(4790.0, 0.0), half, world), Vec2::new(4320.0, 270.0));
        assert_eq!(clamp_camera_center(Vec2::new(2000.0, 270.0), half, world), Vec2::new(2000.0, 270.0));
    }

    #[test]
    fn test_small_world_is_centred() {
        let half = Vec2::new(480.0, 270.0);
        let world = Vec2::new(600.0, 400.0);
        assert_eq!(clamp_camera_center(Vec2::new(10.0, 10.0), half, world), Vec2::new(300.0, 200.0));
    }
}

use bevy::prelude::*;
use crate::shared::*;
use crate::world::{BlockGrid, SceneSurface, SupportSurface};

/// Tuning for the side-view controller.
#[derive(Debug, Clone, Copy)]
pub struct SideViewTuning {
    pub accel: f32,
    pub friction: f32,
    pub max_speed: f32,
}

impl SideViewTuning {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            accel: config.player_accel,
            friction: config.player_friction,
            max_speed: config.player_max_speed,
        }
    }
}

/// One side-view step: accelerate or brake along x, stop at solid rects,
/// then stand on the ground line.
pub fn side_view_step(
    body: &mut Body,
    velocity_x: &mut f32,
    input_x: f32,
    dt: f32,
    tuning: SideViewTuning,
    surface: &impl SupportSurface,
) {
    let dir = if input_x > 0.0 {
        1.0
    } else if input_x < 0.0 {
        -1.0
    } else {
        0.0
    };
    if dir != 0.0 {
        *velocity_x += dir * tuning.accel * dt;
    } else if *velocity_x > 0.0 {
        *velocity_x = (*velocity_x - tuning.friction * dt).max(0.0);
    } else if *velocity_x < 0.0 {
        *velocity_x = (*velocity_x + tuning.friction * dt).min(0.0);
    }
    *velocity_x = velocity_x.clamp(-tuning.max_speed, tuning.max_speed);

    let old_x = body.pos.x;
    let world_w = surface.world_size().x;
    body.pos.x = (body.pos.x + *velocity_x * dt).clamp(0.0, (world_w - body.size.x).max(0.0));

    for solid in surface.solid_rects() {
        if !rects_overlap(body.rect(), solid) {
            continue;
        }
        if body.pos.x > old_x {
            body.pos.x = solid.min.x - body.size.x;
        } else if body.pos.x < old_x {
            body.pos.x = solid.max.x;
        }
        *velocity_x = 0.0;
    }

    body.pos.y = surface.ground_y(body.center().x) - body.size.y;
}

/// One top-down step, axis-separated so the player slides along walls.
pub fn top_down_step(
    body: &mut Body,
    dir: Vec2,
    speed: f32,
    dt: f32,
    solids: &[Rect],
    blocks: &BlockGrid,
    world: Vec2,
) -> Vec2 {
    let velocity = dir.normalize_or_zero() * speed;
    let delta = velocity * dt;

    let mut candidate = *body;
    candidate.pos.x = (body.pos.x + delta.x).clamp(0.0, (world.x - body.size.x).max(0.0));
    if !is_blocked(candidate.rect(), solids, blocks) {
        body.pos.x = candidate.pos.x;
    }

    let mut candidate = *body;
    candidate.pos.y = (body.pos.y + delta.y).clamp(0.0, (world.y - body.size.y).max(0.0));
    if !is_blocked(candidate.rect(), solids, blocks) {
        body.pos.y = candidate.pos.y;
    }

    velocity
}

fn is_blocked(rect: Rect, solids: &[Rect], blocks: &BlockGrid) -> bool {
    solids.iter().any(|solid| rects_overlap(rect, *solid)) || blocks.collides_rect(rect)
}

/// Core movement system. The controller is picked by the scene's view mode.
pub fn player_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    config: Res<GameConfig>,
    current: Res<CurrentScene>,
    surface: Res<SceneSurface>,
    blocks: Res<BlockGrid>,
    mut query: Query<(&mut Body, &mut PlayerMotion), With<Player>>,
) {
    let Ok((mut body, mut motion)) = query.get_single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    match current.view {
        ViewMode::Side => {
            let mut velocity_x = motion.velocity.x;
            side_view_step(
                &mut body,
                &mut velocity_x,
                input.move_axis.x,
                dt,
                SideViewTuning::from_config(&config),
                &*surface,
            );
            motion.velocity = Vec2::new(velocity_x, 0.0);
        }
        ViewMode::TopDown => {
            motion.velocity = top_down_step(
                &mut body,
                input.move_axis,
                config.topdown_speed,
                dt,
                &surface.solid_rects(),
                &blocks,
                surface.world_size(),
            );
        }
    }

    if input.move_axis != Vec2::ZERO {
        motion.facing = input.move_axis.normalize_or_zero();
    }
}

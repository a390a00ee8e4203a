//! Interaction gate: may the player talk to (or use) something?

use bevy::prelude::*;

use crate::shared::*;

/// Targets closer than this are treated as overlapping the player.
pub const OVERLAP_DISTANCE: f32 = 1.0;

/// Facing vectors shorter than this (squared) count as "no facing".
pub const MIN_FACING_LENGTH_SQ: f32 = 1e-6;

/// Squared-distance test between the centres of two bounds.
pub fn within_range(player: Rect, target: Rect, radius: f32) -> bool {
    player.center().distance_squared(target.center()) <= radius * radius
}

/// Top-down "is it in front of me" test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacingCone {
    pub range: f32,
    pub fov_cos: f32,
    /// Fraction of `range` usable when the player has no facing.
    pub idle_factor: f32,
}

impl FacingCone {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            range: config.topdown_interaction_range,
            fov_cos: config.facing_fov_deg.to_radians().cos(),
            idle_factor: config.idle_range_factor,
        }
    }

    /// `facing` is the direction the player last moved in.
    pub fn contains(&self, player_center: Vec2, facing: Vec2, target_center: Vec2) -> bool {
        let to_target = target_center - player_center;
        let dist = to_target.length();
        if dist > self.range {
            return false;
        }
        if dist < OVERLAP_DISTANCE {
            return true;
        }
        if facing.length_squared() < MIN_FACING_LENGTH_SQ {
            return dist <= self.range * self.idle_factor;
        }
        facing.normalize().dot(to_target / dist) >= self.fov_cos
    }
}

/// The gate used by a scene: plain radius in side view, facing cone top-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionGate {
    pub side_range: f32,
    pub cone: FacingCone,
}

impl InteractionGate {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            side_range: config.side_interaction_range,
            cone: FacingCone::from_config(config),
        }
    }

    pub fn allows(&self, view: ViewMode, player: Rect, facing: Vec2, target: Rect) -> bool {
        match view {
            ViewMode::Side => within_range(player, target, self.side_range),
            ViewMode::TopDown => self.cone.contains(player.center(), facing, target.center()),
        }
    }
}

/// Pick the candidate closest to `origin`, ignoring the rest.
pub fn closest<T>(origin: Vec2, candidates: impl IntoIterator<Item = (T, Vec2)>) -> Option<T> {
    candidates
        .into_iter()
        .map(|(item, pos)| (item, origin.distance_squared(pos)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cone() -> FacingCone {
        FacingCone {
            range: 70.0,
            fov_cos: 70f32.to_radians().cos(),
            idle_factor: 0.6,
        }
    }

    #[test]
    fn test_within_range_uses_centres() {
        let player = Rect::new(0.0, 0.0, 10.0, 10.0);
        let near = Rect::new(80.0, 0.0, 90.0, 10.0);
        let far = Rect::new(100.0, 0.0, 110.0, 10.0);
        assert!(within_range(player, near, 90.0));
        assert!(!within_range(player, far, 90.0));
    }

    #[test]
    fn test_within_range_boundary_is_inclusive() {
        let player = Rect::new(0.0, 0.0, 10.0, 10.0);
        let edge = Rect::new(90.0, 0.0, 100.0, 10.0);
        assert!(within_range(player, edge, 90.0));
    }

    #[test]
    fn test_cone_requires_facing_target() {
        let c = cone();
        let target = Vec2::new(50.0, 0.0);
        assert!(c.contains(Vec2::ZERO, Vec2::X, target));
        assert!(!c.contains(Vec2::ZERO, -Vec2::X, target));
        assert!(!c.contains(Vec2::ZERO, Vec2::X, Vec2::new(80.0, 0.0)));
    }

    #[test]
    fn test_idle_player_gets_shorter_reach() {
        let c = cone();
        assert!(c.contains(Vec2::ZERO, Vec2::ZERO, Vec2::new(0.0, 40.0)));
        assert!(!c.contains(Vec2::ZERO, Vec2::ZERO, Vec2::new(0.0, 50.0)));
    }

    #[test]
    fn test_overlap_always_qualifies() {
        let c = cone();
        assert!(c.contains(Vec2::ZERO, -Vec2::Y, Vec2::new(0.5, 0.0)));
    }

    #[test]
    fn test_idle_branch_needs_zero_facing() {
        let c = cone();
        // Facing the target reaches the full range, not the idle radius
        assert!(c.contains(Vec2::ZERO, Vec2::X, Vec2::new(60.0, 0.0)));
        // Behind the back is refused even up close
        assert!(!c.contains(Vec2::ZERO, Vec2::X, Vec2::new(-20.0, 0.0)));
    }

    #[test]
    fn test_gate_range_depends_on_view() {
        let gate = InteractionGate::from_config(&GameConfig::default());
        let player = Rect::new(0.0, 0.0, 10.0, 10.0);
        let target = Rect::new(80.0, 0.0, 90.0, 10.0);
        assert!(!gate.allows(ViewMode::TopDown, player, Vec2::X, target));
        assert!(gate.allows(ViewMode::Side, player, Vec2::X, target));
    }

    #[test]
    fn test_closest_wins() {
        let picked = closest(
            Vec2::ZERO,
            vec![("far", Vec2::new(60.0, 0.0)), ("near", Vec2::new(10.0, 5.0))],
        );
        assert_eq!(picked, Some("near"));
        assert_eq!(closest::<&str>(Vec2::ZERO, vec![]), None);
    }
}

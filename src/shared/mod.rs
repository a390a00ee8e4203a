//! Shared components, resources, events, and states for Skyisle.
//!
//! This is the type contract. Every domain plugin imports from here.
//! Scene geometry is the one thing other domains read from `world`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod config;
pub mod dialogue;

pub use config::*;
pub use dialogue::*;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Dialogue,
    Editor,
}

// ═══════════════════════════════════════════════════════════════════════
// SCENES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SceneId {
    #[default]
    City,
    Bank,
    Casino,
    Lab,
}

impl SceneId {
    /// Map key used in persisted file names (`map_overrides_{key}.json`).
    pub fn map_key(&self) -> &'static str {
        match self {
            SceneId::City => "city",
            SceneId::Bank => "bank",
            SceneId::Casino => "casino",
            SceneId::Lab => "lab",
        }
    }
}

/// Which player controller a scene uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ViewMode {
    #[default]
    TopDown,
    Side,
}

/// The scene currently loaded by the world domain.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CurrentScene {
    pub id: SceneId,
    pub view: ViewMode,
}

// ═══════════════════════════════════════════════════════════════════════
// BODIES: world-pixel space, origin top-left, y grows downward
// ═══════════════════════════════════════════════════════════════════════

/// Axis-aligned body in map coordinates. `pos` is the top-left corner.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.pos, self.pos + self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Place the body so that its centre sits on `center`.
    pub fn set_center(&mut self, center: Vec2) {
        self.pos = center - self.size / 2.0;
    }
}

/// True when the two rectangles overlap with positive area.
/// Touching edges do not count.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    !a.intersect(b).is_empty()
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component, Debug, Clone, Default)]
pub struct Player;

#[derive(Component, Debug, Clone, Copy)]
pub struct PlayerMotion {
    pub velocity: Vec2,
    /// Unit vector of the last movement direction. Starts facing right.
    pub facing: Vec2,
}

impl Default for PlayerMotion {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            facing: Vec2::X,
        }
    }
}

/// Per-frame game actions. Written by the input domain, read everywhere else.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    /// Movement intent, x right, y down (map space). Normalised or zero.
    pub move_axis: Vec2,
    /// Start or continue a conversation.
    pub talk: bool,
    /// Use a gate (door, exit).
    pub interact: bool,
    /// 0-based choice picked with the digit keys.
    pub choice: Option<usize>,
    pub cancel: bool,
    pub toggle_editor: bool,
    pub editor_save: bool,
    pub editor_reload: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// NPCs & GATES
// ═══════════════════════════════════════════════════════════════════════

pub type NpcId = String;

#[derive(Component, Debug, Clone)]
pub struct Npc {
    pub id: NpcId,
    pub name: String,
}

/// A door-like interactable that moves the player to another scene.
#[derive(Component, Debug, Clone)]
pub struct Gate {
    pub to: SceneId,
    pub spawn: Vec2,
}

/// Marker for every entity owned by the loaded scene (despawned on exit).
#[derive(Component, Debug, Clone, Copy)]
pub struct SceneEntity;

/// The NPC whose conversation is currently open, if any.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActiveConversation {
    pub npc: Option<Entity>,
}

// ═══════════════════════════════════════════════════════════════════════
// EDITOR
// ═══════════════════════════════════════════════════════════════════════

/// Map editing operations. The editor domain produces them, the world
/// domain applies them to the loaded stores.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    /// Override the image of a 1-based `(row, col)` cell. An empty path clears it.
    SetTileOverride { cell: (i32, i32), path: String },
    ClearTileOverride { cell: (i32, i32) },
    /// `set_to: None` toggles.
    ToggleBlock { world_pos: Vec2, set_to: Option<bool> },
    ToggleWallCell { col: i32, row: i32, set_to: Option<bool> },
    AddWall { rect: Rect },
    AddProp { rect: Rect, solid: bool, name: String },
    AddPhoto { rect: Rect, path: String },
    Save,
    Reload,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct DialogueStartEvent {
    pub npc_id: NpcId,
    pub visit_count: u32,
}

#[derive(Event, Debug, Clone)]
pub struct DialogueEndEvent {
    pub npc_id: NpcId,
}

#[derive(Event, Debug, Clone)]
pub struct MapTransitionEvent {
    pub to: SceneId,
    /// Player centre in the destination map.
    pub spawn: Vec2,
}

#[derive(Event, Debug, Clone)]
pub struct EditorCommandEvent(pub EditorCommand);

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 540.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_center_round_trips() {
        let mut body = Body::new(Vec2::new(10.0, 20.0), Vec2::new(32.0, 56.0));
        assert_eq!(body.center(), Vec2::new(26.0, 48.0));
        body.set_center(Vec2::new(100.0, 100.0));
        assert_eq!(body.pos, Vec2::new(84.0, 72.0));
    }

    #[test]
    fn test_touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(!rects_overlap(a, b));
        let c = Rect::new(9.0, 0.0, 20.0, 10.0);
        assert!(rects_overlap(a, c));
    }

    #[test]
    fn test_scene_map_keys() {
        assert_eq!(SceneId::City.map_key(), "city");
        assert_eq!(SceneId::Lab.map_key(), "lab");
    }
}

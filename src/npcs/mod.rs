//! NPC domain plugin for Skyisle.
//!
//! Spawns the NPCs of each scene, gates interaction by proximity and drives
//! the per-NPC conversation state machine. Communicates exclusively through
//! shared resources and events.

use bevy::prelude::*;
use crate::shared::*;

pub mod conversation;
mod interaction;
pub mod proximity;
pub mod selection;
mod spawning;

pub use conversation::Conversation;
pub use spawning::ConversationMemory;

use interaction::{
    close_conversation_for_editor, drive_conversation, handle_gate_interaction,
    handle_npc_interaction,
};
use spawning::{handle_map_transition, stand_on_surface};

pub struct NpcPlugin;

/// Ordering handle for systems that read conversation state after input.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum NpcSystems {
    Conversation,
}

impl Plugin for NpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ConversationMemory>();

        // Scene changes respawn NPCs in any state so no transition is missed
        app.add_systems(Update, (handle_map_transition, stand_on_surface));

        // Playing-state systems
        app.add_systems(
            Update,
            (
                // Space near an NPC opens its conversation
                handle_npc_interaction,
                // F near a gate changes scene
                handle_gate_interaction,
            )
                .run_if(in_state(GameState::Playing)),
        );

        // Dialogue-state systems
        app.add_systems(
            Update,
            drive_conversation
                .in_set(NpcSystems::Conversation)
                .run_if(in_state(GameState::Dialogue)),
        );

        app.add_systems(OnEnter(GameState::Editor), close_conversation_for_editor);
    }
}

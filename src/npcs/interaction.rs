//! Talking to NPCs and using gates.

use bevy::prelude::*;
use rand::thread_rng;

use crate::shared::*;

use super::conversation::Conversation;
use super::proximity::{closest, InteractionGate};

/// System: Space near an NPC opens its conversation and enters Dialogue.
pub fn handle_npc_interaction(
    input: Res<PlayerInput>,
    config: Res<GameConfig>,
    current: Res<CurrentScene>,
    registry: Res<DialogueRegistry>,
    player: Query<(&Body, &PlayerMotion), With<Player>>,
    mut npcs: Query<(Entity, &Npc, &Body, &mut Conversation), Without<Player>>,
    mut active: ResMut<ActiveConversation>,
    mut start_events: EventWriter<DialogueStartEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !input.talk {
        return;
    }
    let Ok((player_body, motion)) = player.get_single() else {
        return;
    };

    let reach = InteractionGate::from_config(&config);
    let player_rect = player_body.rect();
    let candidates = npcs.iter().filter_map(|(entity, _, body, _)| {
        reach.allows(current.view, player_rect, motion.facing, body.rect())
            .then(|| (entity, body.center()))
    });
    let Some(entity) = closest(player_body.center(), candidates) else {
        return;
    };
    let Ok((_, npc, _, mut conversation)) = npcs.get_mut(entity) else {
        return;
    };

    let def = registry.lookup(&npc.id);
    if !conversation.open(def, &mut thread_rng()) {
        return;
    }

    info!("Talking to {} (visit {})", npc.name, conversation.visit_count());
    active.npc = Some(entity);
    start_events.send(DialogueStartEvent {
        npc_id: npc.id.clone(),
        visit_count: conversation.visit_count(),
    });
    next_state.set(GameState::Dialogue);
}

/// System: F near a gate moves the player to the gate's scene.
pub fn handle_gate_interaction(
    input: Res<PlayerInput>,
    config: Res<GameConfig>,
    current: Res<CurrentScene>,
    player: Query<(&Body, &PlayerMotion), With<Player>>,
    gates: Query<(&Gate, &Body), Without<Player>>,
    mut transitions: EventWriter<MapTransitionEvent>,
) {
    if !input.interact {
        return;
    }
    let Ok((player_body, motion)) = player.get_single() else {
        return;
    };

    let reach = InteractionGate::from_config(&config);
    let player_rect = player_body.rect();
    let candidates = gates.iter().filter_map(|(gate, body)| {
        reach.allows(current.view, player_rect, motion.facing, body.rect())
            .then(|| (gate, body.center()))
    });
    let Some(gate) = closest(player_body.center(), candidates) else {
        return;
    };

    info!("Gate: {:?} -> {:?}", current.id, gate.to);
    transitions.send(MapTransitionEvent {
        to: gate.to,
        spawn: gate.spawn,
    });
}

/// System: while in Dialogue, Space advances, digits choose, Escape closes.
/// A closed session ends the dialogue and returns to Playing.
pub fn drive_conversation(
    input: Res<PlayerInput>,
    mut active: ResMut<ActiveConversation>,
    mut npcs: Query<(&Npc, &mut Conversation)>,
    mut end_events: EventWriter<DialogueEndEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(entity) = active.npc else {
        next_state.set(GameState::Playing);
        return;
    };
    let Ok((npc, mut conversation)) = npcs.get_mut(entity) else {
        active.npc = None;
        next_state.set(GameState::Playing);
        return;
    };

    if input.cancel {
        conversation.close();
    } else if let Some(index) = input.choice {
        conversation.choose(index);
    } else if input.talk {
        conversation.advance();
    }

    if !conversation.is_open() {
        info!("Conversation with {} ended", npc.name);
        active.npc = None;
        end_events.send(DialogueEndEvent {
            npc_id: npc.id.clone(),
        });
        next_state.set(GameState::Playing);
    }
}

/// System: entering the editor closes whatever conversation is open.
pub fn close_conversation_for_editor(
    mut active: ResMut<ActiveConversation>,
    mut npcs: Query<(&Npc, &mut Conversation)>,
    mut end_events: EventWriter<DialogueEndEvent>,
) {
    let Some(entity) = active.npc.take() else {
        return;
    };
    if let Ok((npc, mut conversation)) = npcs.get_mut(entity) {
        conversation.close();
        end_events.send(DialogueEndEvent {
            npc_id: npc.id.clone(),
        });
    }
}

//! NPC lifecycle: spawn per scene, keep visit counts across scene changes.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::shared::*;
use crate::world::{scene_def, SceneSurface, SupportSurface};

use super::conversation::Conversation;

/// Visit counts of NPCs that are not currently spawned.
#[derive(Resource, Debug, Clone, Default)]
pub struct ConversationMemory {
    visits: HashMap<NpcId, u32>,
}

impl ConversationMemory {
    pub fn remember(&mut self, npc_id: &str, visits: u32) {
        self.visits.insert(npc_id.to_string(), visits);
    }

    pub fn visits(&self, npc_id: &str) -> u32 {
        self.visits.get(npc_id).copied().unwrap_or(0)
    }
}

/// System: handle MapTransitionEvent. Despawn the old scene's NPCs
/// (remembering their visits) and spawn the new scene's.
pub fn handle_map_transition(
    mut commands: Commands,
    mut events: EventReader<MapTransitionEvent>,
    config: Res<GameConfig>,
    mut memory: ResMut<ConversationMemory>,
    mut active: ResMut<ActiveConversation>,
    npcs: Query<(Entity, &Npc, &Conversation)>,
) {
    let Some(event) = events.read().last() else {
        return;
    };

    for (entity, npc, conversation) in &npcs {
        memory.remember(&npc.id, conversation.visit_count());
        commands.entity(entity).despawn_recursive();
    }
    active.npc = None;

    let def = scene_def(event.to, &config);
    let size = config.npc_size();
    for placement in &def.npcs {
        let mut body = Body::new(Vec2::ZERO, size);
        body.set_center(placement.at);
        commands.spawn((
            Npc {
                id: placement.id.to_string(),
                name: placement.id.to_string(),
            },
            Conversation::with_visits(memory.visits(placement.id)),
            body,
            Sprite::from_color(Color::srgb(0.78, 0.47, 0.47), size),
            Transform::from_xyz(placement.at.x, -placement.at.y, 2.0),
        ));
    }
    info!("Spawned {} NPCs for {:?}", def.npcs.len(), def.id);
}

/// Side-view NPCs stand on whatever is under their centre.
pub fn stand_on_surface(
    current: Res<CurrentScene>,
    surface: Res<SceneSurface>,
    mut npcs: Query<&mut Body, With<Npc>>,
) {
    if current.view != ViewMode::Side {
        return;
    }
    for mut body in &mut npcs {
        let top = surface.support_y(body.center().x) - body.size.y;
        if body.pos.y != top {
            body.pos.y = top;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_defaults_to_zero() {
        let mut memory = ConversationMemory::default();
        assert_eq!(memory.visits("워니"), 0);
        memory.remember("워니", 3);
        memory.remember("워니", 4);
        assert_eq!(memory.visits("워니"), 4);
    }
}

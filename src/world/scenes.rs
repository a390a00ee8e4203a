//! Scene table: layout, spawn point, NPC placements and gates per scene.

use bevy::prelude::*;

use crate::shared::*;

/// Where a scene's geometry comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneLayout {
    /// A `rows x cols` tile grid with per-cell overrides and wall blocks.
    TileMap,
    /// A level JSON file under the data directory.
    Level { file: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NpcPlacement {
    pub id: &'static str,
    /// Centre of the NPC. Side-view scenes only use `x`; the NPC stands on
    /// the support surface.
    pub at: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatePlacement {
    pub at: Vec2,
    pub to: SceneId,
    /// Player centre in the destination scene.
    pub spawn: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneDef {
    pub id: SceneId,
    pub view: ViewMode,
    pub layout: SceneLayout,
    pub spawn: Vec2,
    pub npcs: Vec<NpcPlacement>,
    pub gates: Vec<GatePlacement>,
}

pub const CITY_BANK_DOOR: (i32, i32) = (6, 6);
pub const CITY_CASINO_DOOR: (i32, i32) = (4, 8);
pub const BANK_EXIT_DOOR: (i32, i32) = (6, 6);
pub const DOOR_SPAWN: (i32, i32) = (7, 6);

const CASINO_SPAWN_X: f32 = 300.0;
const LAB_SPAWN: Vec2 = Vec2::new(300.0, 300.0);

pub fn scene_def(id: SceneId, config: &GameConfig) -> SceneDef {
    let cell = |(r, c): (i32, i32)| config.cell_center(r, c);
    let map_center = config.map_pixel_size() / 2.0;
    let casino_from = |x: f32| Vec2::new(x, config.ground_y());

    match id {
        SceneId::City => SceneDef {
            id,
            view: ViewMode::TopDown,
            layout: SceneLayout::TileMap,
            spawn: map_center,
            npcs: vec![
                NpcPlacement {
                    id: "엘테리아 시민",
                    at: cell((5, 5)),
                },
                NpcPlacement {
                    id: "연맹 파수꾼",
                    at: map_center + Vec2::new(100.0, 0.0),
                },
                NpcPlacement {
                    id: "상인 로웰",
                    at: map_center + Vec2::new(-220.0, 180.0),
                },
            ],
            gates: vec![
                GatePlacement {
                    at: cell(CITY_BANK_DOOR),
                    to: SceneId::Bank,
                    spawn: cell(DOOR_SPAWN),
                },
                GatePlacement {
                    at: cell(CITY_CASINO_DOOR),
                    to: SceneId::Casino,
                    spawn: casino_from(CASINO_SPAWN_X),
                },
            ],
        },
        SceneId::Bank => SceneDef {
            id,
            view: ViewMode::TopDown,
            layout: SceneLayout::TileMap,
            spawn: cell(DOOR_SPAWN),
            npcs: Vec::new(),
            gates: vec![GatePlacement {
                at: cell(BANK_EXIT_DOOR),
                to: SceneId::City,
                spawn: cell(DOOR_SPAWN),
            }],
        },
        SceneId::Casino => SceneDef {
            id,
            view: ViewMode::Side,
            layout: SceneLayout::Level {
                file: "casino_map.json",
            },
            spawn: casino_from(CASINO_SPAWN_X),
            npcs: vec![
                NpcPlacement {
                    id: "워니",
                    at: casino_from(900.0),
                },
                NpcPlacement {
                    id: "상미니",
                    at: casino_from(1500.0),
                },
            ],
            gates: vec![
                GatePlacement {
                    at: casino_from(120.0),
                    to: SceneId::City,
                    spawn: cell((CITY_CASINO_DOOR.0 + 1, CITY_CASINO_DOOR.1)),
                },
                GatePlacement {
                    at: casino_from(config.world_width - 200.0),
                    to: SceneId::Lab,
                    spawn: LAB_SPAWN,
                },
            ],
        },
        SceneId::Lab => SceneDef {
            id,
            view: ViewMode::TopDown,
            layout: SceneLayout::Level {
                file: "map_lab.json",
            },
            spawn: LAB_SPAWN,
            npcs: Vec::new(),
            gates: vec![GatePlacement {
                at: Vec2::new(150.0, 300.0),
                to: SceneId::Casino,
                spawn: casino_from(config.world_width - 400.0),
            }],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_door_round_trip() {
        let config = GameConfig::default();
        let city = scene_def(SceneId::City, &config);
        let bank = scene_def(SceneId::Bank, &config);

        let to_bank = city.gates.iter().find(|g| g.to == SceneId::Bank).unwrap();
        assert_eq!(to_bank.at, config.cell_center(6, 6));
        assert_eq!(to_bank.spawn, config.cell_center(7, 6));
        assert_eq!(bank.spawn, to_bank.spawn);

        let to_city = &bank.gates[0];
        assert_eq!(to_city.to, SceneId::City);
        assert_eq!(to_city.spawn, config.cell_center(7, 6));
    }

    #[test]
    fn test_every_gate_leads_to_a_scene_with_a_way_back() {
        let config = GameConfig::default();
        for id in [SceneId::City, SceneId::Bank, SceneId::Casino, SceneId::Lab] {
            for gate in scene_def(id, &config).gates {
                let back = scene_def(gate.to, &config);
                assert!(back.gates.iter().any(|g| g.to == id), "{:?} -> {:?}", id, gate.to);
            }
        }
    }

    #[test]
    fn test_view_modes() {
        let config = GameConfig::default();
        assert_eq!(scene_def(SceneId::Casino, &config).view, ViewMode::Side);
        assert_eq!(scene_def(SceneId::Lab, &config).view, ViewMode::TopDown);
        assert_eq!(scene_def(SceneId::City, &config).layout, SceneLayout::TileMap);
    }

    #[test]
    fn test_spawn_points_are_away_from_their_gates() {
        let config = GameConfig::default();
        for id in [SceneId::City, SceneId::Bank, SceneId::Casino, SceneId::Lab] {
            let def = scene_def(id, &config);
            for gate in &def.gates {
                assert!(def.spawn.distance(gate.at) > config.side_interaction_range);
            }
        }
    }
}

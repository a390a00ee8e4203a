mod shared;
mod input;
mod data;
mod world;
mod player;
mod npcs;
mod editor;
mod ui;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

/// Optional RON overrides for `GameConfig`, read from the working directory.
const SETTINGS_PATH: &str = "settings.ron";

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Skyisle".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Config is read after DefaultPlugins so its log lines are kept
        .insert_resource(GameConfig::load_or_default(SETTINGS_PATH))
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<PlayerInput>()
        .init_resource::<CurrentScene>()
        .init_resource::<ActiveConversation>()
        .init_resource::<DialogueRegistry>()
        // Events
        .add_event::<DialogueStartEvent>()
        .add_event::<DialogueEndEvent>()
        .add_event::<MapTransitionEvent>()
        .add_event::<EditorCommandEvent>()
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(npcs::NpcPlugin)
        .add_plugins(editor::EditorPlugin)
        .add_plugins(ui::UiPlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

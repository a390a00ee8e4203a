mod dialogue_box;

use bevy::prelude::*;
use crate::shared::*;

pub use dialogue_box::{panel_content, PanelContent};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiFontHandle>();
        app.add_systems(Startup, load_ui_font);

        // ─── DIALOGUE BOX ───
        app.add_systems(OnEnter(GameState::Dialogue), dialogue_box::spawn_dialogue_box);
        app.add_systems(OnExit(GameState::Dialogue), dialogue_box::despawn_dialogue_box);
        app.add_systems(
            Update,
            dialogue_box::refresh_dialogue_box
                .after(crate::npcs::NpcSystems::Conversation)
                .run_if(in_state(GameState::Dialogue)),
        );
    }
}

/// Font used by every UI text. Stays on Bevy's built-in font unless a
/// Hangul-capable font is shipped under `assets/`.
#[derive(Resource, Default, Clone)]
pub struct UiFontHandle(pub Handle<Font>);

pub const UI_FONT_PATH: &str = "fonts/ui_font.ttf";

fn load_ui_font(asset_server: Option<Res<AssetServer>>, mut font: ResMut<UiFontHandle>) {
    let Some(asset_server) = asset_server else {
        return;
    };
    if std::path::Path::new("assets").join(UI_FONT_PATH).exists() {
        font.0 = asset_server.load(UI_FONT_PATH);
    } else {
        warn!("UI font {UI_FONT_PATH} not found, Korean text may not render");
    }
}

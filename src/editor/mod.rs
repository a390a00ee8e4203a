//! Map editor mode: toggling, save/reload shortcuts and the mode banner.
//! The edits themselves are `EditorCommandEvent`s applied by the world domain.

use bevy::prelude::*;
use crate::shared::*;

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            toggle_editor.run_if(
                in_state(GameState::Playing)
                    .or(in_state(GameState::Dialogue))
                    .or(in_state(GameState::Editor)),
            ),
        )
        .add_systems(Update, editor_shortcuts.run_if(in_state(GameState::Editor)))
        .add_systems(OnEnter(GameState::Editor), spawn_editor_banner)
        .add_systems(OnExit(GameState::Editor), despawn_editor_banner);
    }
}

#[derive(Component, Debug)]
pub struct EditorBanner;

/// E switches between play and edit mode.
fn toggle_editor(
    input: Res<PlayerInput>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !input.toggle_editor {
        return;
    }
    if *state.get() == GameState::Editor {
        info!("[editor] off");
        next_state.set(GameState::Playing);
    } else {
        info!("[editor] on");
        next_state.set(GameState::Editor);
    }
}

/// S saves, L reloads the current map.
fn editor_shortcuts(input: Res<PlayerInput>, mut commands: EventWriter<EditorCommandEvent>) {
    if input.editor_save {
        commands.send(EditorCommandEvent(EditorCommand::Save));
    }
    if input.editor_reload {
        commands.send(EditorCommandEvent(EditorCommand::Reload));
    }
}

fn spawn_editor_banner(mut commands: Commands) {
    commands
        .spawn((
            EditorBanner,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(12.0),
                top: Val::Px(4.0),
                padding: UiRect::axes(Val::Px(8.0), Val::Px(4.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.12, 0.14, 0.18, 0.85)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("[에디터 모드]  S 저장 · L 다시 불러오기 · E 종료"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.92)),
            ));
        });
}

fn despawn_editor_banner(mut commands: Commands, banners: Query<Entity, With<EditorBanner>>) {
    for entity in &banners {
        commands.entity(entity).despawn_recursive();
    }
}

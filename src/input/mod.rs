use bevy::prelude::*;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PreUpdate,
            reset_and_read_input.after(bevy::input::InputSystem),
        );
    }
}

const CHOICE_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    match state.get() {
        GameState::Loading => {}

        GameState::Playing => {
            let mut axis = Vec2::ZERO;
            if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
                axis.y -= 1.0;
            }
            if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
                axis.y += 1.0;
            }
            if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
                axis.x -= 1.0;
            }
            if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
                axis.x += 1.0;
            }
            input.move_axis = axis.normalize_or_zero();

            input.talk = keys.just_pressed(KeyCode::Space);
            input.interact = keys.just_pressed(KeyCode::KeyF);
            input.toggle_editor = keys.just_pressed(KeyCode::KeyE);
        }

        GameState::Dialogue => {
            input.talk = keys.just_pressed(KeyCode::Space);
            input.cancel = keys.just_pressed(KeyCode::Escape);
            input.choice = CHOICE_KEYS.iter().position(|key| keys.just_pressed(*key));
            input.toggle_editor = keys.just_pressed(KeyCode::KeyE);
        }

        GameState::Editor => {
            input.toggle_editor =
                keys.just_pressed(KeyCode::KeyE) || keys.just_pressed(KeyCode::Escape);
            input.editor_save = keys.just_pressed(KeyCode::KeyS);
            input.editor_reload = keys.just_pressed(KeyCode::KeyL);
        }
    }
}

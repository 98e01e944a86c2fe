//! Keyboard input handling
//!
//! Updated for Bevy 0.17

use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::WindowFocused;
use drive_shared::{DriveIntents, KeyStates};

use crate::systems::DemoConfig;

/// Client-side input state
#[derive(Resource, Default)]
pub struct InputState {
    /// Raw key id -> pressed, updated from key events
    pub keys: KeyStates,
    /// Intents sampled for the current frame
    pub intents: DriveIntents,
}

/// Raw identifier for a logical key: the text it produces, or its name for
/// keys without text (arrows, shift, ...).
pub fn key_id(key: &Key) -> String {
    match key {
        Key::Character(c) => c.to_string(),
        other => format!("{:?}", other),
    }
}

/// Track key down/up events and sample this frame's driving intents
pub fn handle_keyboard_input(
    mut keyboard_events: MessageReader<KeyboardInput>,
    mut input_state: ResMut<InputState>,
    config: Res<DemoConfig>,
) {
    for event in keyboard_events.read() {
        let id = key_id(&event.logical_key);
        match event.state {
            ButtonState::Pressed => input_state.keys.key_down(&id),
            ButtonState::Released => input_state.keys.key_up(&id),
        }
    }

    let intents = DriveIntents::from_keys(&input_state.keys, &config.0.bindings);
    input_state.intents = intents;
}

/// Key-up events are lost while the window is unfocused; drop everything held.
pub fn release_keys_on_focus_loss(
    mut focus_events: MessageReader<WindowFocused>,
    mut input_state: ResMut<InputState>,
) {
    if focus_events.read().any(|event| !event.focused) {
        debug!("Window lost focus, releasing all keys");
        input_state.keys.release_all();
        input_state.intents = DriveIntents::NONE;
    }
}

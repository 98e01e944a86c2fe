//! Key state and driving intents.
//!
//! Keys are tracked by their raw identifier (the text a key produces, e.g.
//! `"w"`), so the same map works for any input source.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Pressed/released state keyed by raw key identifier.
#[derive(Clone, Debug, Default)]
pub struct KeyStates {
    keys: HashMap<String, bool>,
}

impl KeyStates {
    pub fn key_down(&mut self, key: &str) {
        self.keys.insert(key.to_string(), true);
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys.insert(key.to_string(), false);
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    /// Forget every key (e.g. on focus loss, when key-up events never arrive).
    pub fn release_all(&mut self) {
        for pressed in self.keys.values_mut() {
            *pressed = false;
        }
    }
}

/// Which raw keys drive the car.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub turn_left: String,
    pub turn_right: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            turn_left: "a".to_string(),
            turn_right: "d".to_string(),
        }
    }
}

/// Turn direction for a left turn; right is the negation.
pub const TURN_LEFT: f32 = 1.0;
pub const TURN_RIGHT: f32 = -1.0;

/// Driving intents for one tick. Opposite intents are independent and may
/// both be active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriveIntents {
    pub accelerate: bool,
    pub brake: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl DriveIntents {
    pub const NONE: DriveIntents = DriveIntents {
        accelerate: false,
        brake: false,
        turn_left: false,
        turn_right: false,
    };

    pub fn from_keys(keys: &KeyStates, bindings: &KeyBindings) -> Self {
        Self {
            accelerate: keys.is_pressed(&bindings.forward),
            brake: keys.is_pressed(&bindings.backward),
            turn_left: keys.is_pressed(&bindings.turn_left),
            turn_right: keys.is_pressed(&bindings.turn_right),
        }
    }

    pub fn accelerate() -> Self {
        Self {
            accelerate: true,
            ..Self::NONE
        }
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::NONE
    }
}

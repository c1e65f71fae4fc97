//! Windowing-agnostic input handling
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::controller::SceneController;

/// Input events after translation from the windowing layer.
///
/// Key names use the physical key code spelling (`"KeyW"`, `"Tab"`).
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),

    CursorMoved { x: f32, y: f32 },
    MouseButton { button: MouseButton, pressed: bool },
    /// Positive scrolls away from the user, which dollies forward.
    MouseWheel { delta: f32 },

    ModifiersChanged { shift: bool },
    FocusLost,
}

impl InputEvent {
    /// Events that end a held state. They must reach the input state even
    /// when an overlay consumed them, or a drag or key stays held.
    pub fn is_release(&self) -> bool {
        matches!(
            self,
            InputEvent::KeyUp(_) | InputEvent::MouseButton { pressed: false, .. } | InputEvent::FocusLost
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Fly-mode translations that can be held down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKey {
    StrafeLeft,
    StrafeRight,
    Up,
    Down,
    DollyIn,
    DollyOut,
}

impl MovementKey {
    pub const ALL: [MovementKey; 6] = [
        MovementKey::StrafeLeft,
        MovementKey::StrafeRight,
        MovementKey::Up,
        MovementKey::Down,
        MovementKey::DollyIn,
        MovementKey::DollyOut,
    ];
}

/// Key mapping configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub strafe_left: String,
    pub strafe_right: String,
    pub up: String,
    pub down: String,
    pub dolly_in: String,
    pub dolly_out: String,
    pub toggle_mode: String,
    pub toggle_view_volume: String,
    pub reset_camera: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            strafe_left: "KeyA".to_string(),
            strafe_right: "KeyD".to_string(),
            up: "KeyE".to_string(),
            down: "KeyQ".to_string(),
            dolly_in: "KeyW".to_string(),
            dolly_out: "KeyS".to_string(),
            toggle_mode: "Tab".to_string(),
            toggle_view_volume: "KeyO".to_string(),
            reset_camera: "KeyR".to_string(),
        }
    }
}

impl KeyBindings {
    pub fn movement_for(&self, key: &str) -> Option<MovementKey> {
        MovementKey::ALL.into_iter().find(|m| self.movement_key_name(*m) == key)
    }

    fn movement_key_name(&self, key: MovementKey) -> &str {
        match key {
            MovementKey::StrafeLeft => &self.strafe_left,
            MovementKey::StrafeRight => &self.strafe_right,
            MovementKey::Up => &self.up,
            MovementKey::Down => &self.down,
            MovementKey::DollyIn => &self.dolly_in,
            MovementKey::DollyOut => &self.dolly_out,
        }
    }

    pub fn wants_to_toggle_mode(&self, key: &str) -> bool {
        key == self.toggle_mode
    }

    pub fn wants_to_toggle_view_volume(&self, key: &str) -> bool {
        key == self.toggle_view_volume
    }

    pub fn wants_to_reset_camera(&self, key: &str) -> bool {
        key == self.reset_camera
    }
}

/// Held keys, cursor and drag state between events.
#[derive(Debug, Default)]
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub cursor: Option<(f32, f32)>,
    pub dragging: bool,
    pub shift: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update state and forward gestures to the controller.
    ///
    /// Drags are reported as cursor deltas while the left button is held.
    /// Toggle keys fire on the first press only, not on auto-repeat.
    pub fn process_event(
        &mut self,
        event: &InputEvent,
        bindings: &KeyBindings,
        controller: &mut SceneController,
    ) {
        match event {
            InputEvent::KeyDown(key) => {
                if !self.pressed_keys.insert(key.clone()) {
                    return;
                }
                if bindings.wants_to_toggle_mode(key) {
                    controller.set_mode(controller.mode().toggled());
                } else if bindings.wants_to_toggle_view_volume(key) {
                    controller.set_projection_type(controller.projection_type().toggled());
                } else if bindings.wants_to_reset_camera(key) {
                    debug!("camera reset from keyboard");
                    controller.reset_camera();
                }
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(key.as_str());
            }
            InputEvent::CursorMoved { x, y } => {
                if let (true, Some((last_x, last_y))) = (self.dragging, self.cursor) {
                    controller.dispatch_drag(x - last_x, y - last_y, self.shift);
                }
                self.cursor = Some((*x, *y));
            }
            InputEvent::MouseButton { button: MouseButton::Left, pressed } => {
                self.dragging = *pressed;
            }
            InputEvent::MouseButton { .. } => {}
            InputEvent::MouseWheel { delta } => {
                controller.dispatch_wheel(*delta);
            }
            InputEvent::ModifiersChanged { shift } => {
                self.shift = *shift;
            }
            InputEvent::FocusLost => {
                self.clear_keys();
                self.dragging = false;
            }
        }
    }

    /// Movement keys currently held under `bindings`.
    pub fn movement_snapshot(&self, bindings: &KeyBindings) -> HashSet<MovementKey> {
        self.pressed_keys
            .iter()
            .filter_map(|key| bindings.movement_for(key))
            .collect()
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }
}

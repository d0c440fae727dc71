//! Input model: modifier keys, mouse buttons, held keys, and key bindings.
//!
//! The host layer forwards raw DOM events as [`InputEvent`]s (or calls the
//! matching `on_*` handlers on the engine directly). Key presses are not acted
//! on when they arrive; they only update a [`HeldKeys`] set that the camera
//! polls once per tick, so simultaneous keys combine predictably.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::{BTreeSet, HashMap};

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"w"`, `"Escape"`, `"PageUp"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// Single-character keys compare case-insensitively; named keys keep their case.
    #[must_use]
    pub fn normalized(&self) -> Self {
        if self.0.chars().count() == 1 {
            Self(self.0.to_lowercase())
        } else {
            self.clone()
        }
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape" || self.0 == "Esc"
    }

    #[must_use]
    pub fn is_control(&self) -> bool {
        self.0 == "Control"
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    #[serde(default)]
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Camera operations a held key can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraOp {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    YawLeft,
    YawRight,
    PitchUp,
    PitchDown,
    Rise,
    Sink,
    PanNorth,
    PanSouth,
    PanEast,
    PanWest,
}

/// Browser key name to camera operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings(pub HashMap<String, CameraOp>);

impl Default for KeyBindings {
    fn default() -> Self {
        let pairs = [
            ("w", CameraOp::Forward),
            ("s", CameraOp::Back),
            ("a", CameraOp::StrafeLeft),
            ("d", CameraOp::StrafeRight),
            ("q", CameraOp::YawLeft),
            ("e", CameraOp::YawRight),
            ("r", CameraOp::PitchUp),
            ("f", CameraOp::PitchDown),
            ("PageUp", CameraOp::Rise),
            ("+", CameraOp::Rise),
            ("PageDown", CameraOp::Sink),
            ("-", CameraOp::Sink),
            ("ArrowUp", CameraOp::PanNorth),
            ("ArrowDown", CameraOp::PanSouth),
            ("ArrowRight", CameraOp::PanEast),
            ("ArrowLeft", CameraOp::PanWest),
        ];
        Self(pairs.into_iter().map(|(k, op)| (k.to_owned(), op)).collect())
    }
}

impl KeyBindings {
    /// Look up the operation bound to `key`, if any.
    #[must_use]
    pub fn op_for(&self, key: &Key) -> Option<CameraOp> {
        self.0.get(&key.normalized().0).copied()
    }
}

/// The set of keys currently held down.
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    keys: BTreeSet<Key>,
}

impl HeldKeys {
    /// Record a key press. Returns `true` when the key was not already held.
    pub fn press(&mut self, key: &Key) -> bool {
        self.keys.insert(key.normalized())
    }

    /// Record a key release. Returns `true` when the key had been held.
    pub fn release(&mut self, key: &Key) -> bool {
        self.keys.remove(&key.normalized())
    }

    /// Drop every held key (e.g. when the window loses focus).
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    #[must_use]
    pub fn is_held(&self, key: &Key) -> bool {
        self.keys.contains(&key.normalized())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Operations bound to the currently held keys, in stable key order.
    #[must_use]
    pub fn active_ops(&self, bindings: &KeyBindings) -> Vec<CameraOp> {
        self.keys.iter().filter_map(|k| bindings.op_for(k)).collect()
    }
}

/// Which drawing surface a pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// The 3D scene canvas.
    #[default]
    Scene,
    /// The minimap canvas.
    Minimap,
}

/// A raw input event, in CSS pixels of the surface it landed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        #[serde(default)]
        surface: Surface,
        at: DVec2,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        #[serde(default)]
        surface: Surface,
        at: DVec2,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        #[serde(default)]
        surface: Surface,
        at: DVec2,
        #[serde(default)]
        button: Button,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Wheel {
        at: DVec2,
        delta: WheelDelta,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
        /// Set on auto-repeat events fired while the key stays held.
        #[serde(default)]
        repeat: bool,
    },
    KeyUp {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// The page lost focus; every held key is released.
    Blur,
}

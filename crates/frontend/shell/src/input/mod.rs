//! Input remapping tables
//!
//! Physical inputs ([`InputSource`]) are bound to core keys ([`KeyInfo`]) by a
//! [`KeyConfig`]. Each system publishes its keys grouped into categories so a
//! setup screen can list them per player.

pub mod tables;

use crate::system_info::SystemId;
use serde::{Deserialize, Serialize};
pub use tables::{layout, KeyLayout};

/// Types of input devices a key config can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputDeviceType {
    Keyboard,
    Gamepad,
    Joystick,
}

/// Source of an input (which device and which button/axis)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputSource {
    /// Keyboard key by name (e.g., "Z", "Enter", "LeftShift")
    KeyboardKey(String),
    /// Gamepad button by SDL2 button ID
    GamepadButton(u8),
    /// Gamepad axis by ID and direction (-1 for negative, 1 for positive)
    GamepadAxis { axis: u8, direction: i8 },
    JoystickButton(u8),
    JoystickAxis { axis: u8, direction: i8 },
    /// Joystick hat by ID and direction (bitmask: 1=up, 2=right, 4=down, 8=left)
    JoystickHat { hat: u8, direction: u8 },
}

impl InputSource {
    pub fn key(name: &str) -> Self {
        InputSource::KeyboardKey(name.to_string())
    }

    pub fn device_type(&self) -> InputDeviceType {
        match self {
            InputSource::KeyboardKey(_) => InputDeviceType::Keyboard,
            InputSource::GamepadButton(_) | InputSource::GamepadAxis { .. } => {
                InputDeviceType::Gamepad
            }
            InputSource::JoystickButton(_)
            | InputSource::JoystickAxis { .. }
            | InputSource::JoystickHat { .. } => InputDeviceType::Joystick,
        }
    }
}

/// A core key as seen by the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyInfo {
    pub code: u16,
    /// Zero-based player index
    pub player: u8,
    /// Auto-fire variant of `code`
    #[serde(default)]
    pub turbo: bool,
}

impl KeyInfo {
    pub const fn new(code: u16) -> Self {
        Self {
            code,
            player: 0,
            turbo: false,
        }
    }

    pub const fn turbo(self) -> Self {
        Self { turbo: true, ..self }
    }

    /// Same key for another player
    pub const fn transpose(self, player: u8) -> Self {
        Self { player, ..self }
    }
}

/// A named group of keys shown together in input setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCategory {
    pub name: String,
    pub keys: Vec<KeyInfo>,
    pub player: u8,
}

/// Key categories for every player of `system`: "Gamepad" and "Turbo" for
/// player 1, then "Gamepad N"/"Turbo N" for the others.
pub fn key_categories(system: SystemId) -> Vec<KeyCategory> {
    let layout = layout(system);
    let base: Vec<KeyInfo> = layout
        .dpad
        .iter()
        .chain(layout.center)
        .chain(layout.face)
        .chain(layout.triggers)
        .map(|&code| KeyInfo::new(code))
        .collect();
    let turbo: Vec<KeyInfo> = layout
        .face
        .iter()
        .map(|&code| KeyInfo::new(code).turbo())
        .collect();

    let mut categories = Vec::new();
    for player in 0..system.info().max_players {
        let suffix = if player == 0 {
            String::new()
        } else {
            format!(" {}", player + 1)
        };
        categories.push(KeyCategory {
            name: format!("Gamepad{}", suffix),
            keys: base.iter().map(|k| k.transpose(player)).collect(),
            player,
        });
        categories.push(KeyCategory {
            name: format!("Turbo{}", suffix),
            keys: turbo.iter().map(|k| k.transpose(player)).collect(),
            player,
        });
    }
    categories
}

/// Display name of a core key code, e.g. "Start"
pub fn key_name(system: SystemId, code: u16) -> Option<&'static str> {
    layout(system).key_name(code)
}

/// Display name including turbo and player decorations, e.g. "Turbo A (P2)"
pub fn key_display_name(system: SystemId, key: KeyInfo) -> String {
    let base = key_name(system, key.code).unwrap_or("Unknown");
    let mut name = if key.turbo {
        format!("Turbo {}", base)
    } else {
        base.to_string()
    };
    if key.player > 0 {
        name.push_str(&format!(" (P{})", key.player + 1));
    }
    name
}

const KEYBOARD_DPAD: [&str; 4] = ["Up", "Right", "Down", "Left"];
const KEYBOARD_FACE: [&str; 6] = ["Z", "X", "C", "A", "S", "D"];
const KEYBOARD_TURBO: [&str; 6] = ["V", "B", "N", "F", "G", "H"];
const KEYBOARD_TRIGGERS: [&str; 2] = ["Q", "W"];
const GAMEPAD_DPAD: [u8; 4] = [11, 14, 12, 13];
const GAMEPAD_CENTER: [u8; 2] = [4, 6];
const GAMEPAD_FACE: [u8; 6] = [0, 1, 2, 3, 9, 10];
const GAMEPAD_TRIGGER_AXES: [u8; 2] = [4, 5];

/// Binding of core keys to physical inputs for one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyConfig {
    pub name: String,
    pub device_type: InputDeviceType,
    pub mappings: Vec<(KeyInfo, InputSource)>,
}

impl KeyConfig {
    pub fn new(name: impl Into<String>, device_type: InputDeviceType) -> Self {
        Self {
            name: name.into(),
            device_type,
            mappings: Vec::new(),
        }
    }

    /// Add a mapping
    pub fn map(mut self, key: KeyInfo, source: InputSource) -> Self {
        self.set(key, source, false);
        self
    }

    /// Player 1 on the keyboard
    pub fn keyboard_default(system: SystemId) -> Self {
        let layout = layout(system);
        let center: &[&str] = if layout.center.len() == 1 {
            &["Enter"]
        } else {
            &["LeftShift", "Enter"]
        };

        let mut config = Self::new("Keyboard (Default)", InputDeviceType::Keyboard);
        let groups: [(&[u16], &[&str], bool); 5] = [
            (&layout.dpad, &KEYBOARD_DPAD, false),
            (layout.center, center, false),
            (layout.face, &KEYBOARD_FACE, false),
            (layout.triggers, &KEYBOARD_TRIGGERS, false),
            (layout.face, &KEYBOARD_TURBO, true),
        ];
        for (codes, names, turbo) in groups {
            for (&code, name) in codes.iter().zip(names) {
                let key = KeyInfo::new(code);
                let key = if turbo { key.turbo() } else { key };
                config.set(key, InputSource::key(name), false);
            }
        }
        config
    }

    /// Player 1 on an SDL-style gamepad
    pub fn gamepad_default(system: SystemId) -> Self {
        let layout = layout(system);
        let mut config = Self::new("Gamepad (Default)", InputDeviceType::Gamepad);
        let buttons: [(&[u16], &[u8]); 3] = [
            (&layout.dpad, &GAMEPAD_DPAD),
            (layout.center, &GAMEPAD_CENTER),
            (layout.face, &GAMEPAD_FACE),
        ];
        for (codes, ids) in buttons {
            for (&code, &id) in codes.iter().zip(ids) {
                config.set(KeyInfo::new(code), InputSource::GamepadButton(id), false);
            }
        }
        for (&code, &axis) in layout.triggers.iter().zip(&GAMEPAD_TRIGGER_AXES) {
            config.set(
                KeyInfo::new(code),
                InputSource::GamepadAxis { axis, direction: 1 },
                false,
            );
        }
        config
    }

    /// Default config for a device, if the device type has one
    pub fn default_for(system: SystemId, device_type: InputDeviceType) -> Option<Self> {
        match device_type {
            InputDeviceType::Keyboard => Some(Self::keyboard_default(system)),
            InputDeviceType::Gamepad => Some(Self::gamepad_default(system)),
            InputDeviceType::Joystick => None,
        }
    }

    /// Bind `key` to `source`, replacing its previous binding. With
    /// `unbind_conflicts`, other keys bound to `source` are unbound and returned.
    pub fn set(&mut self, key: KeyInfo, source: InputSource, unbind_conflicts: bool) -> Vec<KeyInfo> {
        let mut unbound = Vec::new();
        if unbind_conflicts {
            self.mappings.retain(|(k, s)| {
                if *k != key && *s == source {
                    unbound.push(*k);
                    false
                } else {
                    true
                }
            });
        }
        match self.mappings.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = source,
            None => self.mappings.push((key, source)),
        }
        unbound
    }

    pub fn unbind(&mut self, key: KeyInfo) -> bool {
        let before = self.mappings.len();
        self.mappings.retain(|(k, _)| *k != key);
        self.mappings.len() != before
    }

    pub fn source_for(&self, key: KeyInfo) -> Option<&InputSource> {
        self.mappings.iter().find(|(k, _)| *k == key).map(|(_, s)| s)
    }

    /// Every key bound to `source`
    pub fn keys_for<'a>(&'a self, source: &'a InputSource) -> impl Iterator<Item = KeyInfo> + 'a {
        self.mappings
            .iter()
            .filter(move |(_, s)| s == source)
            .map(|(k, _)| *k)
    }

    /// Same bindings, retargeted at `player`
    pub fn transposed(&self, player: u8, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            device_type: self.device_type,
            mappings: self
                .mappings
                .iter()
                .map(|(k, s)| (k.transpose(player), s.clone()))
                .collect(),
        }
    }

    /// Config file record payload
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(data: &[u8]) -> Option<Self> {
        serde_json::from_slice(data).ok()
    }
}

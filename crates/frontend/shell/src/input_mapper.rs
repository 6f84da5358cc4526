//! Routes physical input events to the core through the active key configs.

use crate::input::{InputDeviceType, InputSource, KeyConfig, KeyInfo};
use crate::system_info::SystemId;
use crate::turbo::TurboInput;
use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::System;

pub struct InputMapper {
    system: SystemId,
    /// At most one config per device type
    configs: Vec<KeyConfig>,
    /// Non-turbo keys currently pressed on the core
    held: Vec<KeyInfo>,
    turbo: TurboInput,
}

impl InputMapper {
    /// Mapper with the default keyboard and gamepad configs
    pub fn new(system: SystemId) -> Self {
        Self {
            system,
            configs: vec![
                KeyConfig::keyboard_default(system),
                KeyConfig::gamepad_default(system),
            ],
            held: Vec::new(),
            turbo: TurboInput::new(),
        }
    }

    pub fn system(&self) -> SystemId {
        self.system
    }

    pub fn config(&self, device_type: InputDeviceType) -> Option<&KeyConfig> {
        self.configs.iter().find(|c| c.device_type == device_type)
    }

    /// Make `config` the active one for its device type
    pub fn set_config(&mut self, config: KeyConfig) {
        log(LogCategory::Input, LogLevel::Info, || {
            format!("using key config \"{}\" for {:?}", config.name, config.device_type)
        });
        self.configs.retain(|c| c.device_type != config.device_type);
        self.configs.push(config);
    }

    /// Revert a device to its default config
    pub fn reset_config(&mut self, device_type: InputDeviceType) {
        match KeyConfig::default_for(self.system, device_type) {
            Some(config) => self.set_config(config),
            None => self.configs.retain(|c| c.device_type != device_type),
        }
    }

    /// Keys bound to `source` in the config for its device
    pub fn keys_for(&self, source: &InputSource) -> Vec<KeyInfo> {
        self.config(source.device_type())
            .map(|c| c.keys_for(source).collect())
            .unwrap_or_default()
    }

    /// Deliver one physical input transition. Returns how many keys it hit.
    pub fn handle_event<S: System + ?Sized>(
        &mut self,
        source: &InputSource,
        pressed: bool,
        system: &mut S,
    ) -> usize {
        let keys = self.keys_for(source);
        if keys.is_empty() {
            log(LogCategory::Input, LogLevel::Trace, || {
                format!("unbound input {:?}", source)
            });
        }
        for key in &keys {
            if key.turbo {
                if pressed {
                    self.turbo.add(*key);
                } else if self.turbo.remove(*key) {
                    system.handle_input(key.player, key.code, false);
                }
            } else {
                if pressed {
                    if !self.held.contains(key) {
                        self.held.push(*key);
                    }
                } else {
                    self.held.retain(|k| k != key);
                }
                system.handle_input(key.player, key.code, pressed);
            }
        }
        keys.len()
    }

    /// Per-frame turbo clock
    pub fn update_turbo<S: System + ?Sized>(&mut self, system: &mut S) {
        self.turbo
            .update(&mut |player, code, pressed| system.handle_input(player, code, pressed));
    }

    /// Release every held key and turbo action on the core
    pub fn release_all<S: System + ?Sized>(&mut self, system: &mut S) {
        for key in self.held.drain(..) {
            system.handle_input(key.player, key.code, false);
        }
        self.turbo
            .release_all(&mut |player, code, pressed| system.handle_input(player, code, pressed));
    }

    pub fn held_keys(&self) -> &[KeyInfo] {
        &self.held
    }

    /// Legacy controller bitmask for cores whose key codes are bit positions
    /// (NES-style 8-bit order, SNES 16-bit order).
    pub fn controller_bits(&self, pressed: &[InputSource], player: u8) -> u16 {
        let mut state = 0u16;
        for source in pressed {
            for key in self.keys_for(source) {
                if key.player == player && !key.turbo && key.code < 16 {
                    state |= 1 << key.code;
                }
            }
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::tables::{nes, snes};
    use crate::test_support::RecordingSystem;

    #[test]
    fn test_plain_key_goes_to_core() {
        let mut mapper = InputMapper::new(SystemId::Nes);
        let mut core = RecordingSystem::new(&["nes"]);
        assert_eq!(mapper.handle_event(&InputSource::key("Enter"), true, &mut core), 1);
        assert_eq!(mapper.handle_event(&InputSource::key("Enter"), false, &mut core), 1);
        assert_eq!(core.inputs, vec![(0, nes::START, true), (0, nes::START, false)]);
    }

    #[test]
    fn test_unbound_input_ignored() {
        let mut mapper = InputMapper::new(SystemId::Nes);
        let mut core = RecordingSystem::new(&["nes"]);
        assert_eq!(mapper.handle_event(&InputSource::key("F12"), true, &mut core), 0);
        assert!(core.inputs.is_empty());
    }

    #[test]
    fn test_turbo_key_fires_on_clock() {
        let mut mapper = InputMapper::new(SystemId::Nes);
        let mut core = RecordingSystem::new(&["nes"]);
        // "B" is turbo A on the default keyboard config
        mapper.handle_event(&InputSource::key("B"), true, &mut core);
        assert!(core.inputs.is_empty());

        for _ in 0..4 {
            mapper.update_turbo(&mut core);
        }
        assert_eq!(core.inputs, vec![(0, nes::A, true), (0, nes::A, false)]);

        core.inputs.clear();
        mapper.update_turbo(&mut core);
        mapper.handle_event(&InputSource::key("B"), false, &mut core);
        assert_eq!(core.inputs, vec![(0, nes::A, true), (0, nes::A, false)]);

        core.inputs.clear();
        for _ in 0..4 {
            mapper.update_turbo(&mut core);
        }
        assert!(core.inputs.is_empty());
    }

    #[test]
    fn test_release_all_held_keys() {
        let mut mapper = InputMapper::new(SystemId::Nes);
        let mut core = RecordingSystem::new(&["nes"]);
        mapper.handle_event(&InputSource::key("Enter"), true, &mut core);
        mapper.handle_event(&InputSource::key("Z"), true, &mut core);
        mapper.handle_event(&InputSource::key("Z"), false, &mut core);
        mapper.handle_event(&InputSource::key("B"), true, &mut core);
        assert_eq!(mapper.held_keys(), &[KeyInfo::new(nes::START)]);

        core.inputs.clear();
        mapper.release_all(&mut core);
        assert_eq!(core.inputs, vec![(0, nes::START, false), (0, nes::A, false)]);
        assert!(mapper.held_keys().is_empty());

        core.inputs.clear();
        for _ in 0..4 {
            mapper.update_turbo(&mut core);
        }
        assert!(core.inputs.is_empty());
    }

    #[test]
    fn test_gamepad_routed_by_device() {
        let mut mapper = InputMapper::new(SystemId::Snes);
        let mut core = RecordingSystem::new(&["sfc"]);
        mapper.handle_event(&InputSource::GamepadAxis { axis: 4, direction: 1 }, true, &mut core);
        assert_eq!(core.inputs, vec![(0, snes::L, true)]);
    }

    #[test]
    fn test_set_and_reset_config() {
        let mut mapper = InputMapper::new(SystemId::Nes);
        let custom = KeyConfig::new("Player 2", InputDeviceType::Keyboard)
            .map(KeyInfo::new(nes::A).transpose(1), InputSource::key("K"));
        mapper.set_config(custom);
        assert_eq!(mapper.keys_for(&InputSource::key("K")), vec![KeyInfo::new(nes::A).transpose(1)]);
        assert!(mapper.keys_for(&InputSource::key("Z")).is_empty());

        mapper.reset_config(InputDeviceType::Keyboard);
        assert_eq!(mapper.keys_for(&InputSource::key("Z")), vec![KeyInfo::new(nes::B)]);
    }

    #[test]
    fn test_nes_controller_bits() {
        let mapper = InputMapper::new(SystemId::Nes);
        let pressed = [InputSource::key("Z"), InputSource::key("Enter"), InputSource::key("B")];
        // B (bit 1) and Start (bit 3); turbo keys are not part of the latch
        assert_eq!(mapper.controller_bits(&pressed, 0), 0b1010);
        assert_eq!(mapper.controller_bits(&pressed, 1), 0);
    }

    #[test]
    fn test_snes_controller_bits() {
        let mapper = InputMapper::new(SystemId::Snes);
        let pressed = [InputSource::key("Z"), InputSource::key("Up")];
        assert_eq!(mapper.controller_bits(&pressed, 0), (1 << 15) | (1 << 11));
    }
}

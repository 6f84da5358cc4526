//! Typed option properties persisted as config records.

use crate::config_file::{keys::*, ConfigError, ConfigWriter};
use crate::system_info::SystemId;
use std::io::Write;

/// A value that can live in a config record payload
pub trait OptionValue: Clone + PartialEq + Sized {
    fn encode(&self) -> Vec<u8>;
    fn decode(data: &[u8]) -> Option<Self>;
}

macro_rules! le_option_value {
    ($($t:ty),*) => {$(
        impl OptionValue for $t {
            fn encode(&self) -> Vec<u8> {
                self.to_le_bytes().to_vec()
            }

            fn decode(data: &[u8]) -> Option<Self> {
                Some(<$t>::from_le_bytes(data.try_into().ok()?))
            }
        }
    )*};
}

le_option_value!(u8, i8, u16, i16, u32, i32, f32);

impl OptionValue for bool {
    fn encode(&self) -> Vec<u8> {
        vec![*self as u8]
    }

    fn decode(data: &[u8]) -> Option<Self> {
        match data {
            [0] => Some(false),
            [1] => Some(true),
            _ => None,
        }
    }
}

impl OptionValue for String {
    fn encode(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn decode(data: &[u8]) -> Option<Self> {
        String::from_utf8(data.to_vec()).ok()
    }
}

/// An option with a config key, a default, and an optional validity check
#[derive(Debug, Clone)]
pub struct Property<T: OptionValue> {
    key: u16,
    value: T,
    default: T,
    validator: Option<fn(&T) -> bool>,
}

impl<T: OptionValue> Property<T> {
    pub fn new(key: u16, default: T) -> Self {
        Self {
            key,
            value: default.clone(),
            default,
            validator: None,
        }
    }

    pub fn with_validator(key: u16, default: T, validator: fn(&T) -> bool) -> Self {
        debug_assert!(validator(&default));
        Self {
            validator: Some(validator),
            ..Self::new(key, default)
        }
    }

    pub fn key(&self) -> u16 {
        self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn is_valid(&self, v: &T) -> bool {
        self.validator.map_or(true, |f| f(v))
    }

    /// Returns false and keeps the current value if `v` fails validation
    pub fn set(&mut self, v: T) -> bool {
        if !self.is_valid(&v) {
            return false;
        }
        self.value = v;
        true
    }

    pub fn reset(&mut self) {
        self.value = self.default.clone();
    }

    pub fn is_default(&self) -> bool {
        self.value == self.default
    }

    /// Decode and apply a record payload
    pub fn read_record(&mut self, data: &[u8]) -> bool {
        match T::decode(data) {
            Some(v) => self.set(v),
            None => false,
        }
    }

    pub fn write_if_not_default<W: Write>(&self, w: &mut ConfigWriter<W>) -> Result<(), ConfigError> {
        if self.is_default() {
            return Ok(());
        }
        w.write(self.key, &self.value.encode())
    }
}

pub const FAST_MODE_SPEED_RANGE: std::ops::RangeInclusive<i16> = 105..=2000;
pub const SLOW_MODE_SPEED_RANGE: std::ops::RangeInclusive<i16> = 5..=95;
pub const SOUND_RATES: [u32; 3] = [22050, 44100, 48000];

/// Token stored as the save path to select the fallback save directory
pub const SAVE_PATH_DEFAULT_TOKEN: &str = "default";

/// Options shared by every system
#[derive(Debug, Clone)]
pub struct FrontendOptions {
    pub sound: Property<bool>,
    pub sound_rate: Property<u32>,
    pub frame_skip: Property<u8>,
    pub auto_save_state: Property<bool>,
    pub confirm_overwrite_state: Property<bool>,
    pub fast_mode_speed: Property<i16>,
    pub slow_mode_speed: Property<i16>,
    pub aspect_ratio: Property<u8>,
    pub image_zoom: Property<u8>,
    pub show_bundled_games: Property<bool>,
    pub save_path: Property<String>,
    pub firmware_path: Property<String>,
    pub save_slot: Property<i8>,
}

impl Default for FrontendOptions {
    fn default() -> Self {
        Self {
            sound: Property::new(CFGKEY_SOUND, true),
            sound_rate: Property::with_validator(CFGKEY_SOUND_RATE, 48000, |r| {
                SOUND_RATES.contains(r)
            }),
            frame_skip: Property::with_validator(CFGKEY_FRAME_SKIP, 0, |f| *f <= 4),
            auto_save_state: Property::new(CFGKEY_AUTO_SAVE_STATE, true),
            confirm_overwrite_state: Property::new(CFGKEY_CONFIRM_OVERWRITE_STATE, true),
            fast_mode_speed: Property::with_validator(CFGKEY_FAST_MODE_SPEED, 800, |s| {
                FAST_MODE_SPEED_RANGE.contains(s)
            }),
            slow_mode_speed: Property::with_validator(CFGKEY_SLOW_MODE_SPEED, 50, |s| {
                SLOW_MODE_SPEED_RANGE.contains(s)
            }),
            aspect_ratio: Property::new(CFGKEY_ASPECT_RATIO, 0),
            image_zoom: Property::with_validator(CFGKEY_IMAGE_ZOOM, 100, |z| {
                (10..=100).contains(z)
            }),
            show_bundled_games: Property::new(CFGKEY_SHOW_BUNDLED_GAMES, true),
            save_path: Property::new(CFGKEY_SAVE_PATH, String::new()),
            firmware_path: Property::new(CFGKEY_FIRMWARE_PATH, String::new()),
            save_slot: Property::with_validator(CFGKEY_SAVE_SLOT, 0, |s| (0..=9).contains(s)),
        }
    }
}

impl FrontendOptions {
    /// Apply a record if its key belongs to a frontend option.
    /// Returns false for unknown keys and rejected values.
    pub fn read_record(&mut self, key: u16, data: &[u8]) -> bool {
        match key {
            CFGKEY_SOUND => self.sound.read_record(data),
            CFGKEY_SOUND_RATE => self.sound_rate.read_record(data),
            CFGKEY_FRAME_SKIP => self.frame_skip.read_record(data),
            CFGKEY_AUTO_SAVE_STATE => self.auto_save_state.read_record(data),
            CFGKEY_CONFIRM_OVERWRITE_STATE => self.confirm_overwrite_state.read_record(data),
            CFGKEY_FAST_MODE_SPEED => self.fast_mode_speed.read_record(data),
            CFGKEY_SLOW_MODE_SPEED => self.slow_mode_speed.read_record(data),
            CFGKEY_ASPECT_RATIO => self.aspect_ratio.read_record(data),
            CFGKEY_IMAGE_ZOOM => self.image_zoom.read_record(data),
            CFGKEY_SHOW_BUNDLED_GAMES => self.show_bundled_games.read_record(data),
            CFGKEY_SAVE_PATH => self.save_path.read_record(data),
            CFGKEY_FIRMWARE_PATH => self.firmware_path.read_record(data),
            CFGKEY_SAVE_SLOT => self.save_slot.read_record(data),
            _ => false,
        }
    }

    pub fn write<W: Write>(&self, w: &mut ConfigWriter<W>) -> Result<(), ConfigError> {
        self.sound.write_if_not_default(w)?;
        self.sound_rate.write_if_not_default(w)?;
        self.frame_skip.write_if_not_default(w)?;
        self.auto_save_state.write_if_not_default(w)?;
        self.confirm_overwrite_state.write_if_not_default(w)?;
        self.fast_mode_speed.write_if_not_default(w)?;
        self.slow_mode_speed.write_if_not_default(w)?;
        self.aspect_ratio.write_if_not_default(w)?;
        self.image_zoom.write_if_not_default(w)?;
        self.show_bundled_games.write_if_not_default(w)?;
        self.save_path.write_if_not_default(w)?;
        self.firmware_path.write_if_not_default(w)?;
        self.save_slot.write_if_not_default(w)
    }

    /// Speed multiplier for fast-forward or slow motion
    pub fn alt_speed(&self, fast: bool) -> f64 {
        let percent = if fast {
            *self.fast_mode_speed.get()
        } else {
            *self.slow_mode_speed.get()
        };
        percent as f64 / 100.0
    }

    /// Set an option from its textual form, as used by the command line
    pub fn set_from_str(&mut self, key: u16, value: &str) -> Result<(), String> {
        fn parse<T: std::str::FromStr>(value: &str) -> Result<T, String> {
            value
                .parse()
                .map_err(|_| format!("invalid value '{}'", value))
        }
        fn apply<T: OptionValue>(p: &mut Property<T>, v: T) -> Result<(), String> {
            if p.set(v) {
                Ok(())
            } else {
                Err("value out of range".to_string())
            }
        }
        match key {
            CFGKEY_SOUND => apply(&mut self.sound, parse(value)?),
            CFGKEY_SOUND_RATE => apply(&mut self.sound_rate, parse(value)?),
            CFGKEY_FRAME_SKIP => apply(&mut self.frame_skip, parse(value)?),
            CFGKEY_AUTO_SAVE_STATE => apply(&mut self.auto_save_state, parse(value)?),
            CFGKEY_CONFIRM_OVERWRITE_STATE => {
                apply(&mut self.confirm_overwrite_state, parse(value)?)
            }
            CFGKEY_FAST_MODE_SPEED => apply(&mut self.fast_mode_speed, parse(value)?),
            CFGKEY_SLOW_MODE_SPEED => apply(&mut self.slow_mode_speed, parse(value)?),
            CFGKEY_ASPECT_RATIO => apply(&mut self.aspect_ratio, parse(value)?),
            CFGKEY_IMAGE_ZOOM => apply(&mut self.image_zoom, parse(value)?),
            CFGKEY_SHOW_BUNDLED_GAMES => apply(&mut self.show_bundled_games, parse(value)?),
            CFGKEY_SAVE_PATH => apply(&mut self.save_path, value.to_string()),
            CFGKEY_FIRMWARE_PATH => apply(&mut self.firmware_path, value.to_string()),
            CFGKEY_SAVE_SLOT => apply(&mut self.save_slot, parse(value)?),
            _ => Err(format!("unknown option key {}", key)),
        }
    }
}

/// A system-specific option value
#[derive(Debug, Clone)]
pub enum SystemOption {
    /// Small enumerated setting, valid in `0..=max`
    Byte { prop: Property<u8>, max: u8 },
    Path(Property<String>),
}

impl SystemOption {
    pub fn key(&self) -> u16 {
        match self {
            SystemOption::Byte { prop, .. } => prop.key(),
            SystemOption::Path(p) => p.key(),
        }
    }

    pub fn is_default(&self) -> bool {
        match self {
            SystemOption::Byte { prop, .. } => prop.is_default(),
            SystemOption::Path(p) => p.is_default(),
        }
    }

    fn set_byte(prop: &mut Property<u8>, max: u8, v: u8) -> bool {
        v <= max && prop.set(v)
    }

    fn read_record(&mut self, data: &[u8]) -> bool {
        match self {
            SystemOption::Byte { prop, max } => match u8::decode(data) {
                Some(v) => Self::set_byte(prop, *max, v),
                None => false,
            },
            SystemOption::Path(p) => p.read_record(data),
        }
    }

    fn write<W: Write>(&self, w: &mut ConfigWriter<W>) -> Result<(), ConfigError> {
        match self {
            SystemOption::Byte { prop, .. } => prop.write_if_not_default(w),
            SystemOption::Path(p) => p.write_if_not_default(w),
        }
    }

    pub fn display_value(&self) -> String {
        match self {
            SystemOption::Byte { prop, .. } => prop.get().to_string(),
            SystemOption::Path(p) => p.get().clone(),
        }
    }
}

/// Named extra options owned by a single system
#[derive(Debug, Clone)]
pub struct SystemOptions {
    entries: Vec<(&'static str, SystemOption)>,
}

fn byte(key: u16, default: u8, max: u8) -> SystemOption {
    SystemOption::Byte {
        prop: Property::new(key, default),
        max,
    }
}

fn path(key: u16) -> SystemOption {
    SystemOption::Path(Property::new(key, String::new()))
}

impl SystemOptions {
    pub fn for_system(system: SystemId) -> Self {
        let mut entries = match system {
            SystemId::NeoGeoPocket => vec![("language", byte(CFGKEY_NGPKEY_LANGUAGE, 1, 1))],
            SystemId::NeoGeo => vec![
                ("list-all-games", byte(CFGKEY_LIST_ALL_GAMES, 0, 1)),
                ("bios-type", byte(CFGKEY_BIOS_TYPE, 2, 3)),
                ("mvs-country", byte(CFGKEY_MVS_COUNTRY, 1, 3)),
                ("timer-int", byte(CFGKEY_TIMER_INT, 2, 2)),
                ("strict-rom-checking", byte(CFGKEY_STRICT_ROM_CHECKING, 0, 1)),
            ],
            SystemId::PcEngine => vec![
                ("arcade-card", byte(CFGKEY_ARCADE_CARD, 1, 1)),
                ("syscard-path", path(CFGKEY_SYSCARD_PATH)),
            ],
            SystemId::Nes => vec![("fds-bios-path", path(CFGKEY_FDS_BIOS_PATH))],
            SystemId::C64 => vec![("model", byte(CFGKEY_C64_MODEL, 0, 3))],
            SystemId::Msx => vec![("machine", byte(CFGKEY_MSX_MACHINE, 0, 3))],
            SystemId::MegaDrive => vec![("region", byte(CFGKEY_MD_REGION, 0, 3))],
            SystemId::GameBoyAdvance => vec![("rtc", byte(CFGKEY_GBA_RTC, 0, 2))],
            SystemId::GameBoyColor => vec![("palette", byte(CFGKEY_GB_PALETTE, 0, u8::MAX))],
            SystemId::Saturn => vec![("bios-path", path(CFGKEY_SATURN_BIOS_PATH))],
            SystemId::Snes => vec![("multitap", byte(CFGKEY_SNES_MULTITAP, 0, 1))],
            SystemId::Atari2600 => vec![("tv-phosphor", byte(CFGKEY_2600_TV_PHOSPHOR, 0, 1))],
        };
        if system.info().has_pal {
            entries.push(("pal-mode", byte(CFGKEY_PAL_MODE, 0, 1)));
        }
        Self { entries }
    }

    /// PAL timing requested; always false on NTSC-only systems
    pub fn pal_mode(&self) -> bool {
        self.byte(CFGKEY_PAL_MODE) == Some(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &SystemOption)> {
        self.entries.iter().map(|(name, opt)| (*name, opt))
    }

    pub fn by_name(&self, name: &str) -> Option<&SystemOption> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, opt)| opt)
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut SystemOption> {
        self.entries
            .iter_mut()
            .find(|(n, _)| *n == name)
            .map(|(_, opt)| opt)
    }

    pub fn byte(&self, key: u16) -> Option<u8> {
        self.entries.iter().find_map(|(_, opt)| match opt {
            SystemOption::Byte { prop, .. } if prop.key() == key => Some(*prop.get()),
            _ => None,
        })
    }

    pub fn read_record(&mut self, key: u16, data: &[u8]) -> bool {
        self.entries
            .iter_mut()
            .find(|(_, opt)| opt.key() == key)
            .map_or(false, |(_, opt)| opt.read_record(data))
    }

    pub fn write<W: Write>(&self, w: &mut ConfigWriter<W>) -> Result<(), ConfigError> {
        for (_, opt) in &self.entries {
            opt.write(w)?;
        }
        Ok(())
    }

    /// Set an option from text; byte options parse as integers
    pub fn set_from_str(&mut self, name: &str, value: &str) -> Result<(), String> {
        let opt = self
            .by_name_mut(name)
            .ok_or_else(|| format!("unknown option '{}'", name))?;
        let accepted = match opt {
            SystemOption::Byte { prop, max } => {
                let v: u8 = value
                    .parse()
                    .map_err(|_| format!("invalid value '{}'", value))?;
                SystemOption::set_byte(prop, *max, v)
            }
            SystemOption::Path(p) => p.set(value.to_string()),
        };
        if accepted {
            Ok(())
        } else {
            Err("value out of range".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_file::ConfigReader;

    #[test]
    fn property_rejects_invalid() {
        let mut p = Property::with_validator(CFGKEY_FAST_MODE_SPEED, 800i16, |s| {
            FAST_MODE_SPEED_RANGE.contains(s)
        });
        assert!(!p.set(100));
        assert_eq!(*p.get(), 800);
        assert!(p.set(200));
        assert!(!p.is_default());
        p.reset();
        assert!(p.is_default());
    }

    #[test]
    fn read_record_keeps_value_on_bad_payload() {
        let mut p = Property::new(CFGKEY_SOUND, true);
        assert!(!p.read_record(&[7]));
        assert!(!p.read_record(&[]));
        assert!(*p.get());
        assert!(p.read_record(&[0]));
        assert!(!*p.get());
    }

    #[test]
    fn only_changed_options_are_written() {
        let mut opts = FrontendOptions::default();
        opts.sound.set(false);
        opts.save_path.set("/sd/saves".to_string());

        let mut w = ConfigWriter::new(Vec::new()).unwrap();
        opts.write(&mut w).unwrap();
        assert_eq!(w.records_written(), 2);
        let bytes = w.finish().unwrap();

        let mut loaded = FrontendOptions::default();
        for rec in ConfigReader::new(&bytes).unwrap() {
            let rec = rec.unwrap();
            assert!(loaded.read_record(rec.key, &rec.data));
        }
        assert!(!*loaded.sound.get());
        assert_eq!(loaded.save_path.get(), "/sd/saves");
    }

    #[test]
    fn alt_speed_as_multiplier() {
        let opts = FrontendOptions::default();
        assert_eq!(opts.alt_speed(true), 8.0);
        assert_eq!(opts.alt_speed(false), 0.5);
    }

    #[test]
    fn set_from_str_validates() {
        let mut opts = FrontendOptions::default();
        assert!(opts.set_from_str(CFGKEY_SOUND_RATE, "44100").is_ok());
        assert_eq!(*opts.sound_rate.get(), 44100);
        assert!(opts.set_from_str(CFGKEY_SOUND_RATE, "1234").is_err());
        assert!(opts.set_from_str(CFGKEY_SOUND, "maybe").is_err());
        assert!(opts.set_from_str(999, "1").is_err());
    }

    #[test]
    fn system_options_by_key() {
        let mut opts = SystemOptions::for_system(SystemId::NeoGeoPocket);
        assert_eq!(opts.byte(CFGKEY_NGPKEY_LANGUAGE), Some(1));
        assert!(opts.read_record(CFGKEY_NGPKEY_LANGUAGE, &[0]));
        assert_eq!(opts.byte(CFGKEY_NGPKEY_LANGUAGE), Some(0));
        // Out of range for a two-state option
        assert!(!opts.read_record(CFGKEY_NGPKEY_LANGUAGE, &[5]));
        // Key owned by another system
        assert!(!opts.read_record(CFGKEY_BIOS_TYPE, &[0]));
    }

    #[test]
    fn system_options_from_text() {
        let mut opts = SystemOptions::for_system(SystemId::PcEngine);
        opts.set_from_str("syscard-path", "/bios/syscard3.pce").unwrap();
        assert_eq!(
            opts.by_name("syscard-path").unwrap().display_value(),
            "/bios/syscard3.pce"
        );
        assert!(opts.set_from_str("arcade-card", "2").is_err());
        assert!(opts.set_from_str("nope", "1").is_err());
    }

    #[test]
    fn pal_mode_only_on_pal_systems() {
        for id in SystemId::ALL {
            let opts = SystemOptions::for_system(id);
            assert_eq!(opts.by_name("pal-mode").is_some(), id.info().has_pal);
            assert!(!opts.pal_mode());
        }

        let mut nes = SystemOptions::for_system(SystemId::Nes);
        nes.set_from_str("pal-mode", "1").unwrap();
        assert!(nes.pal_mode());
        assert!(nes.set_from_str("pal-mode", "2").is_err());
    }
}

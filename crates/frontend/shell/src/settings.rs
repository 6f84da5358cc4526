use crate::config_file::{keys::*, read_all, ConfigError, ConfigRecord, ConfigWriter};
use crate::input::KeyConfig;
use crate::options::{FrontendOptions, SystemOptions};
use crate::recent::RecentContent;
use crate::system_info::SystemId;
use emu_core::logging::{log, LogCategory, LogLevel};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Custom key configs kept per system
pub const MAX_KEY_CONFIGS: usize = 10;

/// Everything persisted in a system's config file
#[derive(Debug, Clone)]
pub struct Settings {
    pub system: SystemId,
    pub options: FrontendOptions,
    pub system_options: SystemOptions,
    pub recent: RecentContent,
    pub key_configs: Vec<KeyConfig>,
}

impl Settings {
    pub fn new(system: SystemId) -> Self {
        Self {
            system,
            options: FrontendOptions::default(),
            system_options: SystemOptions::for_system(system),
            recent: RecentContent::new(),
            key_configs: Vec::new(),
        }
    }

    /// Directory next to the executable, or the working directory
    pub fn default_config_dir() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_path(config_dir: &Path, system: SystemId) -> PathBuf {
        config_dir.join(system.info().config_filename)
    }

    /// Load settings, falling back to defaults on error. A corrupt file keeps
    /// whatever records decoded before the damage.
    pub fn load(system: SystemId, config_dir: &Path) -> Self {
        let path = Self::config_path(config_dir, system);
        match fs::read(&path) {
            Ok(contents) => {
                let (settings, err) = Self::from_bytes(system, &contents);
                if let Some(e) = err {
                    log::warn!("Failed to read {}: {}. Keeping earlier records.", path.display(), e);
                }
                settings
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::new(system),
            Err(e) => {
                log::warn!("Failed to open {}: {}. Using defaults.", path.display(), e);
                Self::new(system)
            }
        }
    }

    /// Decode a config image, reporting the error that stopped decoding
    pub fn from_bytes(system: SystemId, data: &[u8]) -> (Self, Option<ConfigError>) {
        let mut settings = Self::new(system);
        match read_all(data) {
            Ok((records, err)) => {
                for record in &records {
                    settings.apply_record(record);
                }
                (settings, err)
            }
            Err(e) => (settings, Some(e)),
        }
    }

    /// Returns false for unknown keys and rejected values
    pub fn apply_record(&mut self, record: &ConfigRecord) -> bool {
        let applied = match record.key {
            CFGKEY_RECENT_CONTENT => self.recent.read_record(&record.data),
            CFGKEY_KEY_CONFIG => match KeyConfig::decode(&record.data) {
                Some(config) if self.key_configs.len() < MAX_KEY_CONFIGS => {
                    self.set_key_config(config);
                    true
                }
                _ => false,
            },
            key if SYSTEM_KEY_RANGE.contains(&key) => {
                self.system_options.read_record(key, &record.data)
            }
            key => self.options.read_record(key, &record.data),
        };
        if !applied {
            log(LogCategory::Config, LogLevel::Debug, || {
                format!("skipped config key {} ({} bytes)", record.key, record.data.len())
            });
        }
        applied
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        let mut w = ConfigWriter::new(Vec::new())?;
        self.options.write(&mut w)?;
        self.system_options.write(&mut w)?;
        for config in &self.key_configs {
            match config.encode() {
                Ok(data) => w.write(CFGKEY_KEY_CONFIG, &data)?,
                Err(e) => log::warn!("Skipping key config \"{}\": {}", config.name, e),
            }
        }
        self.recent.write(&mut w)?;
        log(LogCategory::Config, LogLevel::Debug, || {
            format!("{} config records", w.records_written())
        });
        w.finish()
    }

    /// Save settings to `<config dir>/<config file name>` immediately
    pub fn save(&self, config_dir: &Path) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path(config_dir, self.system);
        let contents = self.to_bytes()?;
        fs::create_dir_all(config_dir)?;
        fs::write(&path, contents)?;
        log(LogCategory::Config, LogLevel::Info, || {
            format!("wrote {}", path.display())
        });
        Ok(path)
    }

    pub fn key_config(&self, name: &str) -> Option<&KeyConfig> {
        self.key_configs.iter().find(|c| c.name == name)
    }

    /// Add a custom key config, replacing one with the same name
    pub fn set_key_config(&mut self, config: KeyConfig) {
        match self.key_configs.iter_mut().find(|c| c.name == config.name) {
            Some(existing) => *existing = config,
            None => self.key_configs.push(config),
        }
    }

    pub fn remove_key_config(&mut self, name: &str) -> bool {
        let before = self.key_configs.len();
        self.key_configs.retain(|c| c.name != name);
        self.key_configs.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputDeviceType, InputSource, KeyInfo};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(SystemId::Snes, dir.path());
        assert!(settings.options.sound.is_default());
        assert!(settings.recent.is_empty());
        assert!(settings.key_configs.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::new(SystemId::NeoGeoPocket);
        settings.options.sound.set(false);
        settings.options.fast_mode_speed.set(400);
        settings.system_options.set_from_str("language", "0").unwrap();
        settings.recent.add("/roms/sonic.ngc", "sonic");
        settings.set_key_config(
            KeyConfig::new("Arcade stick", InputDeviceType::Keyboard)
                .map(KeyInfo::new(4), InputSource::key("Space")),
        );

        let path = settings.save(dir.path()).unwrap();
        assert!(path.ends_with("NgpEmu.config"));

        let loaded = Settings::load(SystemId::NeoGeoPocket, dir.path());
        assert!(!*loaded.options.sound.get());
        assert_eq!(*loaded.options.fast_mode_speed.get(), 400);
        assert_eq!(loaded.system_options.byte(CFGKEY_NGPKEY_LANGUAGE), Some(0));
        assert_eq!(loaded.recent.get(0).unwrap().name, "sonic");
        assert_eq!(
            loaded.key_config("Arcade stick").unwrap().mappings,
            vec![(KeyInfo::new(4), InputSource::key("Space"))]
        );
    }

    #[test]
    fn test_defaults_are_not_written() {
        let bytes = Settings::new(SystemId::Nes).to_bytes().unwrap();
        assert_eq!(bytes, vec![1]);
    }

    #[test]
    fn test_corrupt_file_keeps_earlier_records() {
        let mut settings = Settings::new(SystemId::Snes);
        settings.options.frame_skip.set(2);
        let mut bytes = settings.to_bytes().unwrap();
        // a record claiming more bytes than remain
        bytes.extend_from_slice(&[40, 0, 1, 0, 0]);

        let (loaded, err) = Settings::from_bytes(SystemId::Snes, &bytes);
        assert!(matches!(err, Some(ConfigError::Truncated { .. })));
        assert_eq!(*loaded.options.frame_skip.get(), 2);
    }

    #[test]
    fn test_invalid_values_and_unknown_keys_skipped() {
        let mut w = ConfigWriter::new(Vec::new()).unwrap();
        w.write(CFGKEY_IMAGE_ZOOM, &[200]).unwrap();
        w.write(999, &[1, 2, 3]).unwrap();
        w.write(CFGKEY_ARCADE_CARD, &[0]).unwrap();
        let bytes = w.finish().unwrap();

        // arcade card belongs to PCE only
        let (loaded, err) = Settings::from_bytes(SystemId::Nes, &bytes);
        assert!(err.is_none());
        assert_eq!(*loaded.options.image_zoom.get(), 100);
        assert!(loaded.system_options.byte(CFGKEY_ARCADE_CARD).is_none());
    }

    #[test]
    fn test_bad_version_falls_back() {
        let (loaded, err) = Settings::from_bytes(SystemId::Msx, &[7, 3, 0, 1, 0, 0]);
        assert!(matches!(err, Some(ConfigError::UnsupportedVersion(7))));
        assert!(loaded.options.sound.is_default());
    }

    #[test]
    fn test_key_config_management() {
        let mut settings = Settings::new(SystemId::Nes);
        settings.set_key_config(KeyConfig::new("Mine", InputDeviceType::Gamepad));
        settings.set_key_config(KeyConfig::new("Mine", InputDeviceType::Keyboard));
        assert_eq!(settings.key_configs.len(), 1);
        assert_eq!(settings.key_config("Mine").unwrap().device_type, InputDeviceType::Keyboard);
        assert!(settings.remove_key_config("Mine"));
        assert!(!settings.remove_key_config("Mine"));
    }
}

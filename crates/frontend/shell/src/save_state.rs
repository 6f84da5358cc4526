use emu_core::logging::{log, LogCategory, LogLevel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Slot used for the automatic state written when content closes
pub const AUTO_SLOT: i8 = -1;
/// Highest manual slot
pub const MAX_SLOT: i8 = 9;

const STATE_FILE_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum SaveStateError {
    #[error("Invalid state slot {0}")]
    InvalidSlot(i8),
    #[error("No save data in slot {0}")]
    EmptySlot(char),
    #[error("ROM hash mismatch: save state was created with a different ROM")]
    RomMismatch,
    #[error("Save state version {0} is not supported")]
    UnsupportedVersion(u32),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed save state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Character identifying a slot in file names and menus
pub fn slot_char(slot: i8) -> Result<char, SaveStateError> {
    match slot {
        AUTO_SLOT => Ok('a'),
        0..=MAX_SLOT => Ok((b'0' + slot as u8) as char),
        _ => Err(SaveStateError::InvalidSlot(slot)),
    }
}

pub fn slot_char_upper(slot: i8) -> Result<char, SaveStateError> {
    slot_char(slot).map(|c| c.to_ascii_uppercase())
}

/// `<content name>.<slot char>.<extension>`
pub fn state_filename(content_name: &str, slot: i8, extension: &str) -> Result<String, SaveStateError> {
    Ok(format!("{}.{}.{}", content_name, slot_char(slot)?, extension))
}

/// Calculate SHA256 hash of ROM data
pub fn rom_hash(rom_data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(rom_data);
    format!("{:x}", hasher.finalize())
}

/// On-disk state file: frontend metadata around the core's serialized state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
    #[serde(default)]
    pub rom_hash: Option<String>,
    pub state: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStatus {
    pub slot: i8,
    pub label: char,
    pub path: PathBuf,
    /// Modification time formatted for display
    pub saved_at: Option<String>,
}

impl SlotStatus {
    pub fn exists(&self) -> bool {
        self.saved_at.is_some()
    }
}

/// State slot bookkeeping for one piece of content
#[derive(Debug, Clone)]
pub struct StateSlots {
    directory: PathBuf,
    content_name: String,
    extension: String,
    selected: i8,
}

impl StateSlots {
    pub fn new(directory: impl Into<PathBuf>, content_name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            content_name: content_name.into(),
            extension: extension.into(),
            selected: 0,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn state_path(&self, slot: i8) -> Result<PathBuf, SaveStateError> {
        Ok(self
            .directory
            .join(state_filename(&self.content_name, slot, &self.extension)?))
    }

    pub fn exists(&self, slot: i8) -> bool {
        self.state_path(slot).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Write the core's state into `slot`, creating the save directory if needed
    pub fn save(&self, slot: i8, state: Value, rom_hash: &str) -> Result<PathBuf, SaveStateError> {
        let path = self.state_path(slot)?;
        fs::create_dir_all(&self.directory)?;

        let file = StateFile {
            version: STATE_FILE_VERSION,
            timestamp: chrono::Utc::now().timestamp(),
            rom_hash: Some(rom_hash.to_string()),
            state,
        };
        fs::write(&path, serde_json::to_vec(&file)?)?;
        log(LogCategory::SaveState, LogLevel::Info, || {
            format!("saved state to {}", path.display())
        });
        Ok(path)
    }

    /// Read the state in `slot`, verifying the ROM hash when one was recorded
    pub fn load(&self, slot: i8, current_rom_hash: &str) -> Result<Value, SaveStateError> {
        let path = self.state_path(slot)?;
        let contents = match fs::read(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SaveStateError::EmptySlot(slot_char(slot)?))
            }
            Err(e) => return Err(e.into()),
        };
        let file: StateFile = serde_json::from_slice(&contents)?;
        if file.version != STATE_FILE_VERSION {
            return Err(SaveStateError::UnsupportedVersion(file.version));
        }
        if let Some(saved_hash) = file.rom_hash.as_deref() {
            if saved_hash != current_rom_hash {
                log(LogCategory::SaveState, LogLevel::Warn, || {
                    format!("refusing {}: ROM hash differs", path.display())
                });
                return Err(SaveStateError::RomMismatch);
            }
        }
        log(LogCategory::SaveState, LogLevel::Info, || {
            format!("loaded state from {}", path.display())
        });
        Ok(file.state)
    }

    pub fn delete(&self, slot: i8) -> Result<bool, SaveStateError> {
        let path = self.state_path(slot)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Status of the auto slot followed by slots 0-9
    pub fn list(&self) -> Vec<SlotStatus> {
        (AUTO_SLOT..=MAX_SLOT)
            .filter_map(|slot| {
                let path = self.state_path(slot).ok()?;
                let saved_at = fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .ok()
                    .map(|t| {
                        chrono::DateTime::<chrono::Local>::from(t)
                            .format("%Y-%m-%d %H:%M:%S")
                            .to_string()
                    });
                Some(SlotStatus {
                    slot,
                    label: slot_char_upper(slot).ok()?,
                    path,
                    saved_at,
                })
            })
            .collect()
    }

    pub fn selected(&self) -> i8 {
        self.selected
    }

    /// Select a manual slot; the auto slot cannot be selected
    pub fn select(&mut self, slot: i8) -> Result<(), SaveStateError> {
        if !(0..=MAX_SLOT).contains(&slot) {
            return Err(SaveStateError::InvalidSlot(slot));
        }
        self.selected = slot;
        Ok(())
    }

    pub fn select_next(&mut self) -> i8 {
        self.selected = if self.selected >= MAX_SLOT { 0 } else { self.selected + 1 };
        self.selected
    }

    pub fn select_prev(&mut self) -> i8 {
        self.selected = if self.selected <= 0 { MAX_SLOT } else { self.selected - 1 };
        self.selected
    }

    /// Whether saving into `slot` needs the user's confirmation first
    pub fn should_confirm_overwrite(&self, confirm_option: bool, slot: i8) -> bool {
        confirm_option && self.exists(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slots(dir: &Path) -> StateSlots {
        StateSlots::new(dir.join("saves"), "Super Game", "frz")
    }

    #[test]
    fn test_slot_chars() {
        assert_eq!(slot_char(AUTO_SLOT).unwrap(), 'a');
        assert_eq!(slot_char_upper(AUTO_SLOT).unwrap(), 'A');
        assert_eq!(slot_char(0).unwrap(), '0');
        assert_eq!(slot_char(9).unwrap(), '9');
        assert!(matches!(slot_char(10), Err(SaveStateError::InvalidSlot(10))));
        assert!(slot_char(-2).is_err());
    }

    #[test]
    fn test_state_filename() {
        assert_eq!(state_filename("Zelda", 3, "frz").unwrap(), "Zelda.3.frz");
        assert_eq!(state_filename("Zelda", AUTO_SLOT, "frz").unwrap(), "Zelda.a.frz");
    }

    #[test]
    fn test_rom_hash() {
        let hash = rom_hash(b"test rom data");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, rom_hash(b"test rom data"));
        assert_ne!(hash, rom_hash(b"other rom data"));
    }

    #[test]
    fn test_save_load_slot() {
        let dir = tempfile::tempdir().unwrap();
        let slots = slots(dir.path());
        let state = json!({"cpu": {"pc": 32768}, "ram": [1, 2, 3]});

        assert!(!slots.exists(2));
        let path = slots.save(2, state.clone(), "hash1").unwrap();
        assert!(path.ends_with("Super Game.2.frz"));
        assert!(slots.exists(2));

        assert_eq!(slots.load(2, "hash1").unwrap(), state);

        // metadata timestamp is Unix epoch seconds
        let file: StateFile = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        let now = chrono::Utc::now().timestamp();
        assert!((now - 5..=now).contains(&file.timestamp));
        assert_eq!(file.rom_hash.as_deref(), Some("hash1"));
    }

    #[test]
    fn test_empty_slot() {
        let dir = tempfile::tempdir().unwrap();
        let err = slots(dir.path()).load(4, "hash").unwrap_err();
        assert_eq!(err.to_string(), "No save data in slot 4");
    }

    #[test]
    fn test_rom_hash_verification() {
        let dir = tempfile::tempdir().unwrap();
        let slots = slots(dir.path());
        slots.save(1, json!({"a": 1}), "original").unwrap();

        assert!(matches!(
            slots.load(1, "different"),
            Err(SaveStateError::RomMismatch)
        ));
        assert!(slots.load(1, "original").is_ok());
    }

    #[test]
    fn test_state_without_hash_loads_anywhere() {
        let dir = tempfile::tempdir().unwrap();
        let slots = slots(dir.path());
        fs::create_dir_all(slots.directory()).unwrap();
        fs::write(
            slots.state_path(0).unwrap(),
            br#"{"version":1,"timestamp":0,"state":{"x":5}}"#,
        )
        .unwrap();
        assert_eq!(slots.load(0, "anything").unwrap(), json!({"x": 5}));
    }

    #[test]
    fn test_unsupported_version() {
        let dir = tempfile::tempdir().unwrap();
        let slots = slots(dir.path());
        fs::create_dir_all(slots.directory()).unwrap();
        fs::write(
            slots.state_path(0).unwrap(),
            br#"{"version":7,"timestamp":0,"state":null}"#,
        )
        .unwrap();
        assert!(matches!(
            slots.load(0, "h"),
            Err(SaveStateError::UnsupportedVersion(7))
        ));
    }

    #[test]
    fn test_list_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let slots = slots(dir.path());
        slots.save(AUTO_SLOT, json!(null), "h").unwrap();
        slots.save(5, json!(null), "h").unwrap();

        let list = slots.list();
        assert_eq!(list.len(), 11);
        assert_eq!(list[0].label, 'A');
        assert!(list[0].exists());
        assert!(list[6].exists());
        assert_eq!(list[6].slot, 5);
        assert!(!list[1].exists());

        assert!(slots.delete(5).unwrap());
        assert!(!slots.delete(5).unwrap());
        assert!(!slots.exists(5));
    }

    #[test]
    fn test_slot_selection_wraps() {
        let mut slots = StateSlots::new("/tmp", "x", "sta");
        assert_eq!(slots.select_prev(), 9);
        assert_eq!(slots.select_next(), 0);
        slots.select(8).unwrap();
        assert_eq!(slots.select_next(), 9);
        assert!(slots.select(AUTO_SLOT).is_err());
    }

    #[test]
    fn test_overwrite_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let slots = slots(dir.path());
        assert!(!slots.should_confirm_overwrite(true, 3));
        slots.save(3, json!(1), "h").unwrap();
        assert!(slots.should_confirm_overwrite(true, 3));
        assert!(!slots.should_confirm_overwrite(false, 3));
    }
}

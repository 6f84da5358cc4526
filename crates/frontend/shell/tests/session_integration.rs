//! End-to-end flow through the public API: load content, play with input,
//! save a state, close with auto-save and come back in a fresh session.

use emu_core::logging::{LogCategory, LogConfig, LogLevel};
use emu_core::types::Frame;
use emu_core::{MediaError, MountPointInfo, System};
use emu_shell::input::tables::snes;
use emu_shell::input::InputSource;
use emu_shell::menu::{MenuAction, SlotMenuMode};
use emu_shell::save_state::AUTO_SLOT;
use emu_shell::{Session, SessionError, SessionState, Settings, SystemId};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Counts frames and latches a 16-bit pad per player
#[derive(Default)]
struct PadCore {
    rom: Option<Vec<u8>>,
    frame: u64,
    pads: [u16; 5],
}

impl System for PadCore {
    type Error = MediaError;

    fn reset(&mut self) {
        self.frame = 0;
        self.pads = [0; 5];
    }

    fn step_frame(&mut self) -> Result<Frame, Self::Error> {
        if self.rom.is_none() {
            return Err(MediaError::NotMounted);
        }
        self.frame += 1;
        let mut frame = Frame::new(256, 224);
        frame.pixels[0] = self.pads[0] as u32;
        Ok(frame)
    }

    fn save_state(&self) -> Value {
        json!({ "frame": self.frame, "pads": self.pads })
    }

    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error> {
        self.frame = serde_json::from_value(v["frame"].clone())?;
        self.pads = serde_json::from_value(v["pads"].clone())?;
        Ok(())
    }

    fn supports_save_states(&self) -> bool {
        true
    }

    fn mount_points(&self) -> Vec<MountPointInfo> {
        vec![MountPointInfo {
            id: "Cartridge".to_string(),
            name: "Cartridge Slot".to_string(),
            extensions: vec!["sfc".to_string(), "smc".to_string()],
            required: true,
        }]
    }

    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error> {
        if mount_point_id != "Cartridge" {
            return Err(MediaError::UnknownMountPoint(mount_point_id.to_string()));
        }
        if data.len() < 0x8000 {
            return Err(MediaError::Rejected("ROM too small".to_string()));
        }
        self.rom = Some(data.to_vec());
        Ok(())
    }

    fn unmount(&mut self, _mount_point_id: &str) -> Result<(), Self::Error> {
        self.rom = None;
        Ok(())
    }

    fn is_mounted(&self, mount_point_id: &str) -> bool {
        mount_point_id == "Cartridge" && self.rom.is_some()
    }

    fn handle_input(&mut self, player: u8, key_code: u16, pressed: bool) {
        let pad = &mut self.pads[player as usize];
        if pressed {
            *pad |= 1 << key_code;
        } else {
            *pad &= !(1 << key_code);
        }
    }
}

fn write_rom(dir: &Path, name: &str, len: usize) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, vec![0xEAu8; len]).unwrap();
    path
}

#[test]
fn test_full_session_roundtrip() {
    LogConfig::global().set_level(LogCategory::SaveState, LogLevel::Info);

    let root = tempfile::tempdir().unwrap();
    let config_dir = root.path().join("config");
    let storage = root.path().join("storage");
    let roms = root.path().join("roms");
    fs::create_dir_all(&roms).unwrap();
    let rom = write_rom(&roms, "Space Pilot.sfc", 0x8000);

    let mut session = Session::new(SystemId::Snes, PadCore::default(), &config_dir, &storage);
    // keep saves out of the ROM directory
    session
        .settings_mut()
        .options
        .set_from_str(emu_shell::config_file::keys::CFGKEY_SAVE_PATH, "default")
        .unwrap();

    session.load_content(&rom).unwrap();
    session.start().unwrap();
    assert_eq!(session.state(), SessionState::Active);

    session.handle_input(&InputSource::key("Z"), true);
    let frame = session.run_frame().unwrap();
    assert_eq!(frame.pixels[0], 1 << snes::B);

    let saved = session.save_state_slot(2).unwrap();
    assert!(saved.starts_with(storage.join("EmuEx").join("SNES").join("saves")));
    assert!(saved.ends_with("Space Pilot.2.frz"));

    session.handle_input(&InputSource::key("Z"), false);
    session.run_frame().unwrap();
    session.load_state_slot(2).unwrap();
    assert_eq!(session.core().pads[0], 1 << snes::B);
    assert_eq!(session.core().frame, 1);

    for _ in 0..9 {
        session.run_frame().unwrap();
    }
    session.close(true);
    assert_eq!(session.state(), SessionState::Off);

    // A new session picks up the recent list and the auto-save state
    let settings = Settings::load(SystemId::Snes, &config_dir);
    assert_eq!(settings.recent.len(), 1);
    assert_eq!(*settings.options.save_path.get(), "default");

    let mut session = Session::new(SystemId::Snes, PadCore::default(), &config_dir, &storage);
    let mut recent = session.recent_menu();
    let path = match recent.menu.activate(0) {
        Some(MenuAction::LoadRecent(path)) => path,
        other => panic!("unexpected action {:?}", other),
    };
    session.load_content(Path::new(&path)).unwrap();
    assert_eq!(session.core().frame, 10);

    let menu = session.state_slot_menu(SlotMenuMode::Load).unwrap();
    let enabled: Vec<_> = menu
        .menu
        .items
        .iter()
        .filter(|i| i.enabled)
        .map(|i| i.action.clone())
        .collect();
    assert_eq!(
        enabled,
        vec![MenuAction::LoadState(AUTO_SLOT), MenuAction::LoadState(2)]
    );
}

#[test]
fn test_core_rejection_surfaces() {
    let root = tempfile::tempdir().unwrap();
    let rom = write_rom(root.path(), "tiny.smc", 64);
    let mut session = Session::new(
        SystemId::Snes,
        PadCore::default(),
        root.path().join("config"),
        root.path().join("storage"),
    );
    let err = session.load_content(&rom).unwrap_err();
    assert!(matches!(err, SessionError::Core(_)));
    assert_eq!(err.to_string(), "Core error: Media rejected: ROM too small");
    assert_eq!(session.state(), SessionState::Off);
    assert!(session.settings().recent.is_empty());
}

#[test]
fn test_missing_file() {
    let root = tempfile::tempdir().unwrap();
    let mut session = Session::new(
        SystemId::Snes,
        PadCore::default(),
        root.path().join("config"),
        root.path().join("storage"),
    );
    assert!(matches!(
        session.load_content(&root.path().join("nope.sfc")),
        Err(SessionError::Io(_))
    ));
}

//! Drives one core: content loading, run state, states, input and timing.

use crate::config_file::ConfigError;
use crate::content::ContentPaths;
use crate::input::{InputSource, KeyConfig};
use crate::input_mapper::InputMapper;
use crate::menu::{MainMenu, RecentMenu, SlotMenuMode, StateSlotMenu};
use crate::rom_detect::{detect_by_header, UnsupportedRomError};
use crate::save_state::{rom_hash, SaveStateError, StateSlots, AUTO_SLOT};
use crate::settings::Settings;
use crate::system_info::SystemId;
use crate::timing::FrameTiming;
use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::types::Frame;
use emu_core::System;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Frames run by [`Session::benchmark`]
pub const BENCHMARK_FRAMES: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No content loaded
    Off,
    Paused,
    Active,
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    UnsupportedRom(#[from] UnsupportedRomError),
    #[error("{file} looks like {detected} content, not {expected}")]
    WrongSystem {
        file: String,
        detected: &'static str,
        expected: &'static str,
    },
    #[error("{0} has no mount point for content")]
    NoMountPoint(&'static str),
    #[error("Core error: {0}")]
    Core(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    SaveState(#[from] SaveStateError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("State was rejected by the core: {0}")]
    StateRejected(#[source] serde_json::Error),
    #[error("This system does not support save states")]
    StatesUnsupported,
    #[error("No content loaded")]
    NoContent,
    #[error("Emulation is not running")]
    NotRunning,
    #[error("No key config named \"{0}\"")]
    UnknownKeyConfig(String),
}

fn core_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> SessionError {
    SessionError::Core(Box::new(e))
}

/// Per-content data kept while something is loaded
struct LoadedContent {
    paths: ContentPaths,
    rom_hash: String,
    mount_point: String,
    slots: StateSlots,
}

pub struct Session<S: System> {
    system_id: SystemId,
    core: S,
    settings: Settings,
    config_dir: PathBuf,
    storage_dir: PathBuf,
    input: InputMapper,
    timing: FrameTiming,
    state: SessionState,
    content: Option<LoadedContent>,
}

impl<S: System> Session<S> {
    /// Settings are read from `config_dir`; fallback save directories live
    /// under `storage_dir`.
    pub fn new(
        system_id: SystemId,
        core: S,
        config_dir: impl Into<PathBuf>,
        storage_dir: impl Into<PathBuf>,
    ) -> Self {
        let config_dir = config_dir.into();
        let settings = Settings::load(system_id, &config_dir);
        let mut timing = FrameTiming::for_system(system_id.info(), settings.system_options.pal_mode());
        timing.configure_audio(*settings.options.sound_rate.get());
        Self {
            system_id,
            core,
            settings,
            config_dir,
            storage_dir: storage_dir.into(),
            input: InputMapper::new(system_id),
            timing,
            state: SessionState::Off,
            content: None,
        }
    }

    pub fn system_id(&self) -> SystemId {
        self.system_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.content.is_some()
    }

    pub fn core(&self) -> &S {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut S {
        &mut self.core
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    pub fn timing_mut(&mut self) -> &mut FrameTiming {
        &mut self.timing
    }

    pub fn input_mapper(&self) -> &InputMapper {
        &self.input
    }

    pub fn content_paths(&self) -> Option<&ContentPaths> {
        self.content.as_ref().map(|c| &c.paths)
    }

    pub fn rom_hash(&self) -> Option<&str> {
        self.content.as_ref().map(|c| c.rom_hash.as_str())
    }

    pub fn state_slots(&self) -> Option<&StateSlots> {
        self.content.as_ref().map(|c| &c.slots)
    }

    pub fn save_settings(&self) -> Result<PathBuf, SessionError> {
        Ok(self.settings.save(&self.config_dir)?)
    }

    /// Load `path`, replacing any running content. Leaves the session paused.
    pub fn load_content(&mut self, path: &Path) -> Result<(), SessionError> {
        self.close(true);

        let data = fs::read(path)?;
        self.check_content(path, &data)?;

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let mount_points = self.core.mount_points();
        let mount_point = mount_points
            .iter()
            .filter(|m| m.required)
            .find(|m| m.accepts_extension(&ext))
            .or_else(|| mount_points.iter().find(|m| m.required))
            .ok_or(SessionError::NoMountPoint(self.system_id.info().name))?
            .id
            .clone();

        let mut paths = ContentPaths::for_file(path);
        let save_dir = paths
            .resolve_save_directory(
                self.settings.options.save_path.get(),
                &self.storage_dir,
                self.system_id,
            )?
            .to_path_buf();
        let mut slots = StateSlots::new(
            save_dir,
            paths.name(),
            self.system_id.info().state_extension,
        );
        slots.select(*self.settings.options.save_slot.get())?;

        self.core.mount(&mount_point, &data).map_err(core_error)?;

        self.settings
            .recent
            .add(paths.location().to_string_lossy(), paths.name());
        log(LogCategory::Content, LogLevel::Info, || {
            format!("loaded {} into {}", paths.location().display(), mount_point)
        });

        self.content = Some(LoadedContent {
            paths,
            rom_hash: rom_hash(&data),
            mount_point,
            slots,
        });
        self.state = SessionState::Paused;
        self.timing.configure_audio(*self.settings.options.sound_rate.get());
        self.load_auto_state();
        Ok(())
    }

    /// A recognizable header must name this system; header-less content is
    /// accepted on extension alone.
    fn check_content(&self, path: &Path, data: &[u8]) -> Result<(), SessionError> {
        let info = self.system_id.info();
        let mismatch = |detected: SystemId| SessionError::WrongSystem {
            file: path.display().to_string(),
            detected: detected.info().short_name,
            expected: info.short_name,
        };
        if data.len() < 16 {
            return Err(UnsupportedRomError {
                reason: "File too small to be a valid ROM".to_string(),
            }
            .into());
        }
        match detect_by_header(data) {
            Some(id) if id == self.system_id => Ok(()),
            Some(id) => Err(mismatch(id)),
            None => {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or_default();
                if info.accepts_extension(ext) {
                    Ok(())
                } else {
                    match SystemId::from_extension(ext) {
                        Some(id) => Err(mismatch(id)),
                        None => Err(UnsupportedRomError {
                            reason: format!("{} does not load .{} files", info.name, ext),
                        }
                        .into()),
                    }
                }
            }
        }
    }

    fn load_auto_state(&mut self) {
        if !*self.settings.options.auto_save_state.get() || !self.core.supports_save_states() {
            return;
        }
        let exists = self
            .content
            .as_ref()
            .map_or(false, |c| c.slots.exists(AUTO_SLOT));
        if exists {
            if let Err(e) = self.load_state_slot(AUTO_SLOT) {
                log::warn!("Could not restore auto-save state: {}", e);
            }
        }
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.content.is_none() {
            return Err(SessionError::NoContent);
        }
        self.state = SessionState::Active;
        Ok(())
    }

    /// Stop running and release every held key on the core; input is
    /// ignored until [`Session::start`].
    pub fn pause(&mut self) {
        if self.state == SessionState::Active {
            self.input.release_all(&mut self.core);
            self.state = SessionState::Paused;
        }
    }

    /// Run one emulated frame
    pub fn run_frame(&mut self) -> Result<Frame, SessionError> {
        if self.state != SessionState::Active {
            return Err(SessionError::NotRunning);
        }
        self.input.update_turbo(&mut self.core);
        self.core.step_frame().map_err(core_error)
    }

    /// Time to run [`BENCHMARK_FRAMES`] frames as fast as possible
    pub fn benchmark(&mut self) -> Result<Duration, SessionError> {
        if self.content.is_none() {
            return Err(SessionError::NoContent);
        }
        let start = Instant::now();
        for _ in 0..BENCHMARK_FRAMES {
            self.core.step_frame().map_err(core_error)?;
        }
        let elapsed = start.elapsed();
        log(LogCategory::Timing, LogLevel::Info, || {
            format!(
                "{} frames in {:?} ({:.2} fps)",
                BENCHMARK_FRAMES,
                elapsed,
                BENCHMARK_FRAMES as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
            )
        });
        Ok(elapsed)
    }

    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.content.is_none() {
            return Err(SessionError::NoContent);
        }
        self.input.release_all(&mut self.core);
        self.core.reset();
        Ok(())
    }

    fn loaded(&self) -> Result<&LoadedContent, SessionError> {
        let content = self.content.as_ref().ok_or(SessionError::NoContent)?;
        if !self.core.supports_save_states() {
            return Err(SessionError::StatesUnsupported);
        }
        Ok(content)
    }

    pub fn save_state_slot(&mut self, slot: i8) -> Result<PathBuf, SessionError> {
        let content = self.loaded()?;
        Ok(content
            .slots
            .save(slot, self.core.save_state(), &content.rom_hash)?)
    }

    pub fn load_state_slot(&mut self, slot: i8) -> Result<(), SessionError> {
        let content = self.loaded()?;
        let state = content.slots.load(slot, &content.rom_hash)?;
        self.core
            .load_state(&state)
            .map_err(SessionError::StateRejected)
    }

    /// Change the selected slot and remember it in the options
    pub fn select_slot(&mut self, slot: i8) -> Result<(), SessionError> {
        let content = self.content.as_mut().ok_or(SessionError::NoContent)?;
        content.slots.select(slot)?;
        self.settings.options.save_slot.set(slot);
        Ok(())
    }

    pub fn save_selected_state(&mut self) -> Result<PathBuf, SessionError> {
        let slot = self.loaded()?.slots.selected();
        self.save_state_slot(slot)
    }

    pub fn load_selected_state(&mut self) -> Result<(), SessionError> {
        let slot = self.loaded()?.slots.selected();
        self.load_state_slot(slot)
    }

    /// Close the running content. With `allow_auto_save`, the auto slot is
    /// written first when the option is on and the core supports states.
    pub fn close(&mut self, allow_auto_save: bool) {
        if self.content.is_none() {
            return;
        }
        if allow_auto_save
            && *self.settings.options.auto_save_state.get()
            && self.core.supports_save_states()
        {
            if let Err(e) = self.save_state_slot(AUTO_SLOT) {
                log::warn!("Auto-save state failed: {}", e);
            }
        }
        if let Err(e) = self.save_settings() {
            log::warn!("Failed to save settings: {}", e);
        }
        self.input.release_all(&mut self.core);
        if let Some(content) = self.content.take() {
            if let Err(e) = self.core.unmount(&content.mount_point) {
                log::warn!("Failed to unmount {}: {}", content.mount_point, e);
            }
            log(LogCategory::Content, LogLevel::Info, || {
                format!("closed {}", content.paths.name())
            });
        }
        self.state = SessionState::Off;
    }

    /// Route a physical input to the core. Ignored unless running.
    pub fn handle_input(&mut self, source: &InputSource, pressed: bool) -> usize {
        if self.state != SessionState::Active {
            return 0;
        }
        self.input.handle_event(source, pressed, &mut self.core)
    }

    /// Activate a saved custom key config
    pub fn use_key_config(&mut self, name: &str) -> Result<(), SessionError> {
        let config = self
            .settings
            .key_config(name)
            .cloned()
            .ok_or_else(|| SessionError::UnknownKeyConfig(name.to_string()))?;
        self.input.set_config(config);
        Ok(())
    }

    pub fn set_key_config(&mut self, config: KeyConfig) {
        self.input.set_config(config);
    }

    /// Fast-forward (`Some(true)`), slow motion (`Some(false)`) or normal speed
    pub fn set_alt_speed(&mut self, mode: Option<bool>) {
        let speed = mode.map_or(1.0, |fast| self.settings.options.alt_speed(fast));
        self.timing.set_speed(speed);
    }

    pub fn main_menu(&self) -> MainMenu {
        let mut menu = MainMenu::new(self.system_id.info().name);
        menu.update_menu_state(
            self.is_running(),
            !self.settings.recent.is_empty(),
            self.core.supports_save_states(),
        );
        menu
    }

    pub fn state_slot_menu(&self, mode: SlotMenuMode) -> Option<StateSlotMenu> {
        let slots = &self.content.as_ref()?.slots;
        Some(StateSlotMenu::new(mode, &slots.list(), slots.selected()))
    }

    pub fn recent_menu(&self) -> RecentMenu {
        RecentMenu::new(&self.settings.recent)
    }
}

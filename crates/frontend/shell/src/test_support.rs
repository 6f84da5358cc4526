use emu_core::types::Frame;
use emu_core::{MediaError, MountPointInfo, System};
use serde_json::{json, Value};

/// Minimal core that records everything the shell does to it
#[derive(Default)]
pub struct RecordingSystem {
    pub extensions: Vec<String>,
    pub mounted: Option<Vec<u8>>,
    pub inputs: Vec<(u8, u16, bool)>,
    pub frames: u32,
    pub resets: u32,
    pub states: bool,
}

impl RecordingSystem {
    pub fn new(extensions: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            states: true,
            ..Default::default()
        }
    }
}

impl System for RecordingSystem {
    type Error = MediaError;

    fn reset(&mut self) {
        self.resets += 1;
        self.frames = 0;
    }

    fn step_frame(&mut self) -> Result<Frame, Self::Error> {
        if self.mounted.is_none() {
            return Err(MediaError::NotMounted);
        }
        self.frames += 1;
        Ok(Frame::new(4, 3))
    }

    fn save_state(&self) -> Value {
        json!({ "frames": self.frames })
    }

    fn load_state(&mut self, v: &Value) -> Result<(), serde_json::Error> {
        #[derive(serde::Deserialize)]
        struct State {
            frames: u32,
        }
        let state: State = serde_json::from_value(v.clone())?;
        self.frames = state.frames;
        Ok(())
    }

    fn supports_save_states(&self) -> bool {
        self.states
    }

    fn mount_points(&self) -> Vec<MountPointInfo> {
        vec![MountPointInfo {
            id: "Cartridge".to_string(),
            name: "Cartridge Slot".to_string(),
            extensions: self.extensions.clone(),
            required: true,
        }]
    }

    fn mount(&mut self, mount_point_id: &str, data: &[u8]) -> Result<(), Self::Error> {
        if mount_point_id != "Cartridge" {
            return Err(MediaError::UnknownMountPoint(mount_point_id.to_string()));
        }
        self.mounted = Some(data.to_vec());
        Ok(())
    }

    fn unmount(&mut self, _mount_point_id: &str) -> Result<(), Self::Error> {
        self.mounted = None;
        Ok(())
    }

    fn is_mounted(&self, mount_point_id: &str) -> bool {
        mount_point_id == "Cartridge" && self.mounted.is_some()
    }

    fn handle_input(&mut self, player: u8, key_code: u16, pressed: bool) {
        self.inputs.push((player, key_code, pressed));
    }
}

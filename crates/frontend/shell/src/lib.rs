//! Frontend glue shared by every hosted system: configuration, content
//! handling, save-state slots, input remapping, menus and the session that
//! drives a core.

pub mod config_file;
pub mod content;
pub mod input;
pub mod input_mapper;
pub mod menu;
pub mod options;
pub mod recent;
pub mod rom_detect;
pub mod save_state;
pub mod session;
pub mod settings;
pub mod system_info;
pub mod timing;
pub mod turbo;

#[cfg(test)]
mod test_support;

pub use session::{Session, SessionError, SessionState};
pub use settings::Settings;
pub use system_info::SystemId;

//! Paths derived from the loaded content file.

use crate::options::SAVE_PATH_DEFAULT_TOKEN;
use crate::save_state::StateSlots;
use crate::system_info::SystemId;
use emu_core::logging::{log, LogCategory, LogLevel};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// `<storage>/EmuEx/<short name>/saves`
pub fn fallback_save_directory(storage: &Path, system: SystemId) -> PathBuf {
    storage
        .join("EmuEx")
        .join(system.info().short_name)
        .join("saves")
}

/// Firmware directory from the user option, `None` when unset
pub fn firmware_path(option: &str) -> Option<PathBuf> {
    if option.is_empty() {
        None
    } else {
        Some(PathBuf::from(option))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPaths {
    file_name: String,
    name: String,
    location: PathBuf,
    /// `None` for bare file names such as bundled content
    directory: Option<PathBuf>,
    save_directory: Option<PathBuf>,
}

impl ContentPaths {
    pub fn for_file(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match file_name.rfind('.') {
            Some(dot) if dot > 0 => file_name[..dot].to_string(),
            _ => file_name.clone(),
        };

        let (directory, location) = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                // resolve the directory alone in case the file is a symlink
                match fs::canonicalize(parent) {
                    Ok(real) => {
                        let location = real.join(&file_name);
                        (Some(real), location)
                    }
                    Err(e) => {
                        log(LogCategory::Content, LogLevel::Warn, || {
                            format!("could not resolve {}: {}", parent.display(), e)
                        });
                        (Some(parent.to_path_buf()), path.to_path_buf())
                    }
                }
            }
            _ => (None, path.to_path_buf()),
        };

        Self {
            file_name,
            name,
            location,
            directory,
            save_directory: None,
        }
    }

    /// File name including extension
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name without its extension
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }

    /// Pick where saves for this content go: the user save path, unless it
    /// is empty or the default token, then the content directory, then the
    /// fallback under `storage` (created on demand).
    pub fn resolve_save_directory(
        &mut self,
        user_save_path: &str,
        storage: &Path,
        system: SystemId,
    ) -> io::Result<&Path> {
        let dir = match (user_save_path, &self.directory) {
            (SAVE_PATH_DEFAULT_TOKEN, _) | ("", None) => {
                let dir = fallback_save_directory(storage, system);
                fs::create_dir_all(&dir)?;
                dir
            }
            ("", Some(content_dir)) => content_dir.clone(),
            (user, _) => PathBuf::from(user),
        };
        log(LogCategory::Content, LogLevel::Info, || {
            format!("content save path: {}", dir.display())
        });
        Ok(self.save_directory.insert(dir))
    }

    pub fn save_directory(&self) -> Option<&Path> {
        self.save_directory.as_deref()
    }

    /// `<save dir>/<content name><ext>`, e.g. ext = ".srm"
    pub fn save_file_path(&self, ext: &str) -> Option<PathBuf> {
        self.save_directory
            .as_ref()
            .map(|dir| dir.join(format!("{}{}", self.name, ext)))
    }

    pub fn state_slots(&self, system: SystemId) -> Option<StateSlots> {
        self.save_directory
            .as_ref()
            .map(|dir| StateSlots::new(dir, &self.name, system.info().state_extension))
    }
}

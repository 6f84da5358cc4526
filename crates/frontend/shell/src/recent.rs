//! Most-recently-used content list.

use crate::config_file::{keys::CFGKEY_RECENT_CONTENT, ConfigError, ConfigWriter};
use std::io::Write;
use std::path::Path;

/// Maximum number of entries kept
pub const MAX_RECENT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentEntry {
    pub path: String,
    pub name: String,
}

impl RecentEntry {
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + self.path.len() + self.name.len());
        out.extend_from_slice(&(self.path.len() as u16).to_le_bytes());
        out.extend_from_slice(self.path.as_bytes());
        out.extend_from_slice(self.name.as_bytes());
        out
    }

    fn decode(data: &[u8]) -> Option<Self> {
        let len = u16::from_le_bytes(data.get(..2)?.try_into().ok()?) as usize;
        let path = std::str::from_utf8(data.get(2..2 + len)?).ok()?;
        let name = std::str::from_utf8(&data[2 + len..]).ok()?;
        if path.is_empty() {
            return None;
        }
        Some(Self {
            path: path.to_string(),
            name: name.to_string(),
        })
    }
}

/// Newest first, unique by path, never longer than [`MAX_RECENT`]
#[derive(Debug, Clone, Default)]
pub struct RecentContent {
    entries: Vec<RecentEntry>,
}

impl RecentContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `path` to the front, inserting it if needed
    pub fn add(&mut self, path: impl Into<String>, name: impl Into<String>) {
        let path = path.into();
        self.entries.retain(|e| e.path != path);
        self.entries.insert(
            0,
            RecentEntry {
                path,
                name: name.into(),
            },
        );
        self.entries.truncate(MAX_RECENT);
    }

    pub fn remove(&mut self, path: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.path != path);
        self.entries.len() != before
    }

    /// Drop entries whose files are gone. Returns how many were removed.
    pub fn remove_missing(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| Path::new(&e.path).exists());
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecentEntry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&RecentEntry> {
        self.entries.get(index)
    }

    /// Append an entry read from the config file, oldest records last.
    /// Returns false for malformed or surplus records.
    pub fn read_record(&mut self, data: &[u8]) -> bool {
        if self.entries.len() >= MAX_RECENT {
            return false;
        }
        match RecentEntry::decode(data) {
            Some(entry) if !self.entries.iter().any(|e| e.path == entry.path) => {
                self.entries.push(entry);
                true
            }
            _ => false,
        }
    }

    pub fn write<W: Write>(&self, w: &mut ConfigWriter<W>) -> Result<(), ConfigError> {
        for entry in &self.entries {
            w.write(CFGKEY_RECENT_CONTENT, &entry.encode())?;
        }
        Ok(())
    }
}

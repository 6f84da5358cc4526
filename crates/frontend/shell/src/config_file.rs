//! Binary key/value configuration file.
//!
//! Layout: one version byte, then records of
//! `u16 LE size | u16 LE key | payload`, where `size` counts the key and the
//! payload (so it is never below 2).

use std::io::{self, Read, Write};

pub const CONFIG_VERSION: u8 = 1;

/// Frontend-wide option keys (1..=255)
pub mod keys {
    pub const CFGKEY_SOUND: u16 = 1;
    pub const CFGKEY_SOUND_RATE: u16 = 2;
    pub const CFGKEY_FRAME_SKIP: u16 = 3;
    pub const CFGKEY_AUTO_SAVE_STATE: u16 = 4;
    pub const CFGKEY_CONFIRM_OVERWRITE_STATE: u16 = 5;
    pub const CFGKEY_FAST_MODE_SPEED: u16 = 6;
    pub const CFGKEY_SLOW_MODE_SPEED: u16 = 7;
    pub const CFGKEY_ASPECT_RATIO: u16 = 8;
    pub const CFGKEY_IMAGE_ZOOM: u16 = 9;
    pub const CFGKEY_SHOW_BUNDLED_GAMES: u16 = 10;
    pub const CFGKEY_SAVE_PATH: u16 = 11;
    pub const CFGKEY_FIRMWARE_PATH: u16 = 12;
    pub const CFGKEY_SAVE_SLOT: u16 = 13;

    // System-specific options (256..=511)
    pub const CFGKEY_PAL_MODE: u16 = 260;
    pub const CFGKEY_NGPKEY_LANGUAGE: u16 = 270;
    pub const CFGKEY_LIST_ALL_GAMES: u16 = 275;
    pub const CFGKEY_BIOS_TYPE: u16 = 276;
    pub const CFGKEY_MVS_COUNTRY: u16 = 277;
    pub const CFGKEY_TIMER_INT: u16 = 278;
    pub const CFGKEY_STRICT_ROM_CHECKING: u16 = 281;
    pub const CFGKEY_ARCADE_CARD: u16 = 290;
    pub const CFGKEY_SYSCARD_PATH: u16 = 291;
    pub const CFGKEY_FDS_BIOS_PATH: u16 = 300;
    pub const CFGKEY_C64_MODEL: u16 = 310;
    pub const CFGKEY_MSX_MACHINE: u16 = 320;
    pub const CFGKEY_MD_REGION: u16 = 330;
    pub const CFGKEY_GBA_RTC: u16 = 340;
    pub const CFGKEY_GB_PALETTE: u16 = 350;
    pub const CFGKEY_SATURN_BIOS_PATH: u16 = 360;
    pub const CFGKEY_SNES_MULTITAP: u16 = 370;
    pub const CFGKEY_2600_TV_PHOSPHOR: u16 = 380;

    // Lists (512..)
    pub const CFGKEY_KEY_CONFIG: u16 = 512;
    pub const CFGKEY_RECENT_CONTENT: u16 = 513;

    pub const SYSTEM_KEY_RANGE: std::ops::RangeInclusive<u16> = 256..=511;
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Unsupported config version {0}")]
    UnsupportedVersion(u8),
    #[error("Truncated record at offset {offset}")]
    Truncated { offset: usize },
    #[error("Record payload for key {key} is too large ({len} bytes)")]
    RecordTooLarge { key: u16, len: usize },
}

/// A single decoded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    pub key: u16,
    pub data: Vec<u8>,
}

/// Writes the header on creation, then one record per call.
pub struct ConfigWriter<W: Write> {
    out: W,
    records: usize,
}

impl<W: Write> ConfigWriter<W> {
    pub fn new(mut out: W) -> Result<Self, ConfigError> {
        out.write_all(&[CONFIG_VERSION])?;
        Ok(Self { out, records: 0 })
    }

    pub fn write(&mut self, key: u16, payload: &[u8]) -> Result<(), ConfigError> {
        let size = payload
            .len()
            .checked_add(2)
            .and_then(|s| u16::try_from(s).ok())
            .ok_or(ConfigError::RecordTooLarge {
                key,
                len: payload.len(),
            })?;
        self.out.write_all(&size.to_le_bytes())?;
        self.out.write_all(&key.to_le_bytes())?;
        self.out.write_all(payload)?;
        self.records += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records
    }

    pub fn finish(mut self) -> Result<W, ConfigError> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Iterates the records of an in-memory config image.
///
/// The first malformed record ends iteration with an error; records before it
/// are still delivered.
pub struct ConfigReader<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> ConfigReader<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, ConfigError> {
        match data.first() {
            // An empty file reads as no records
            None => Ok(Self {
                data,
                pos: 0,
                failed: false,
            }),
            Some(&CONFIG_VERSION) => Ok(Self {
                data,
                pos: 1,
                failed: false,
            }),
            Some(&v) => Err(ConfigError::UnsupportedVersion(v)),
        }
    }
}

impl Iterator for ConfigReader<'_> {
    type Item = Result<ConfigRecord, ConfigError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }
        let offset = self.pos;
        let rest = &self.data[offset..];
        if rest.len() < 4 {
            self.failed = true;
            return Some(Err(ConfigError::Truncated { offset }));
        }
        let size = u16::from_le_bytes([rest[0], rest[1]]) as usize;
        let key = u16::from_le_bytes([rest[2], rest[3]]);
        if size < 2 || rest.len() < 2 + size {
            self.failed = true;
            return Some(Err(ConfigError::Truncated { offset }));
        }
        let data = rest[4..2 + size].to_vec();
        self.pos += 2 + size;
        Some(Ok(ConfigRecord { key, data }))
    }
}

/// Read a whole config stream into memory and decode it.
pub fn read_all<R: Read>(mut input: R) -> Result<(Vec<ConfigRecord>, Option<ConfigError>), ConfigError> {
    let mut buf = Vec::new();
    input.read_to_end(&mut buf)?;
    let mut records = Vec::new();
    for item in ConfigReader::new(&buf)? {
        match item {
            Ok(record) => records.push(record),
            Err(e) => return Ok((records, Some(e))),
        }
    }
    Ok((records, None))
}

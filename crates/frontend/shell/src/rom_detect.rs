/// Content detection and system selection
use crate::system_info::SystemId;
use std::path::Path;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported ROM: {reason}")]
pub struct UnsupportedRomError {
    pub reason: String,
}

impl UnsupportedRomError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

const GB_LOGO_START: [u8; 4] = [0xCE, 0xED, 0x66, 0x66];
const GBA_LOGO_START: [u8; 4] = [0x24, 0xFF, 0xAE, 0x51];

/// System identified by a header signature alone
pub fn detect_by_header(data: &[u8]) -> Option<SystemId> {
    // iNES / NES 2.0
    if data.starts_with(b"NES\x1A") {
        return Some(SystemId::Nes);
    }

    // Cartridge images with a textual signature
    if data.starts_with(b"C64 CARTRIDGE") {
        return Some(SystemId::C64);
    }
    if data.starts_with(b"COPYRIGHT BY SNK") || data.starts_with(b" LICENSED BY SNK") {
        return Some(SystemId::NeoGeoPocket);
    }

    // GBA: Nintendo logo at 0x04 and the fixed 0x96 byte at 0xB2
    if data.len() >= 0xC0 && data[0x04..0x08] == GBA_LOGO_START && data[0xB2] == 0x96 {
        return Some(SystemId::GameBoyAdvance);
    }

    // GB/GBC: Nintendo logo at 0x104
    if data.len() >= 0x150 && data[0x104..0x108] == GB_LOGO_START {
        return Some(SystemId::GameBoyColor);
    }

    // Mega Drive: "SEGA" at the start of the header block
    if data.len() >= 0x200 && &data[0x100..0x104] == b"SEGA" {
        return Some(SystemId::MegaDrive);
    }

    // MSX ROM cartridges start with "AB"
    if data.starts_with(b"AB") && data.len() >= 0x2000 && data.len() % 0x2000 == 0 {
        return Some(SystemId::Msx);
    }

    None
}

/// Detect the system for `data`, using the file extension from `path` when the
/// content has no recognizable header.
pub fn detect_rom_type(data: &[u8], path: Option<&Path>) -> Result<SystemId, UnsupportedRomError> {
    if data.len() < 16 {
        return Err(UnsupportedRomError::new("File too small to be a valid ROM"));
    }

    if let Some(system) = detect_by_header(data) {
        return Ok(system);
    }

    let ext = path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    if let Some(ext) = ext.as_deref() {
        if let Some(system) = SystemId::from_extension(ext) {
            return Ok(system);
        }
        let candidates = SystemId::candidates_for_extension(ext);
        if candidates.contains(&SystemId::Atari2600) && is_atari2600_size(data.len()) {
            return Ok(SystemId::Atari2600);
        }
        if !candidates.is_empty() {
            return Err(UnsupportedRomError::new(format!(
                ".{} is shared by {}; unable to tell which system this content is for",
                ext,
                candidates
                    .iter()
                    .map(|s| s.info().short_name)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
    }

    // Raw image with no usable extension hint
    if is_atari2600_size(data.len()) {
        return Ok(SystemId::Atari2600);
    }

    let supported = SystemId::ALL
        .iter()
        .map(|s| s.info().short_name)
        .collect::<Vec<_>>()
        .join(", ");
    Err(UnsupportedRomError::new(format!(
        "Unknown ROM format. Supported systems: {}",
        supported
    )))
}

fn is_atari2600_size(len: usize) -> bool {
    matches!(len, 2048 | 4096 | 8192 | 12288 | 16384 | 32768)
}

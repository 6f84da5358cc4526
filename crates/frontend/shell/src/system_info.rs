//! Per-system constants: names, controller shape, aspect ratios, content types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Every system the shell knows how to host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemId {
    Atari2600,
    C64,
    GameBoyAdvance,
    GameBoyColor,
    MegaDrive,
    Msx,
    NeoGeo,
    Nes,
    NeoGeoPocket,
    PcEngine,
    Saturn,
    Snes,
}

/// A selectable display aspect ratio. `x == 0` means square pixels, i.e. the
/// ratio follows whatever the core's framebuffer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub name: &'static str,
    pub x: u32,
    pub y: u32,
}

impl AspectRatio {
    pub const SQUARE_PIXELS: AspectRatio = AspectRatio {
        name: "Square Pixels",
        x: 0,
        y: 0,
    };

    const fn new(name: &'static str, x: u32, y: u32) -> Self {
        Self { name, x, y }
    }

    /// Width over height, `None` for square pixels
    pub fn ratio(&self) -> Option<f32> {
        if self.x == 0 || self.y == 0 {
            None
        } else {
            Some(self.x as f32 / self.y as f32)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemInfo {
    pub id: SystemId,
    pub short_name: &'static str,
    pub name: &'static str,
    pub config_filename: &'static str,
    pub state_extension: &'static str,
    pub max_players: u8,
    pub face_buttons: u8,
    pub center_buttons: u8,
    pub has_trigger_buttons: bool,
    pub has_pal: bool,
    /// Accepted content extensions, lower-case without the dot
    pub extensions: &'static [&'static str],
    /// The first entry is the default; the last is always square pixels
    pub aspect_ratios: &'static [AspectRatio],
}

pub const NTSC_FRAME_TIME: Duration = Duration::from_nanos(16_666_667);
pub const PAL_FRAME_TIME: Duration = Duration::from_millis(20);

const RATIO_4_3: AspectRatio = AspectRatio::new("4:3 (Original)", 4, 3);
const RATIO_8_7: AspectRatio = AspectRatio::new("8:7", 8, 7);

static SYSTEMS: [SystemInfo; 12] = [
    SystemInfo {
        id: SystemId::Atari2600,
        short_name: "2600",
        name: "Atari 2600",
        config_filename: "2600emu.config",
        state_extension: "sta",
        max_players: 2,
        face_buttons: 1,
        center_buttons: 2,
        has_trigger_buttons: false,
        has_pal: true,
        extensions: &["a26", "bin"],
        aspect_ratios: &[RATIO_4_3, AspectRatio::SQUARE_PIXELS],
    },
    SystemInfo {
        id: SystemId::C64,
        short_name: "C64",
        name: "Commodore 64",
        config_filename: "C64Emu.config",
        state_extension: "vsf",
        max_players: 2,
        face_buttons: 2,
        center_buttons: 2,
        has_trigger_buttons: false,
        has_pal: true,
        extensions: &["prg", "d64", "g64", "t64", "tap", "crt"],
        aspect_ratios: &[RATIO_4_3, AspectRatio::SQUARE_PIXELS],
    },
    SystemInfo {
        id: SystemId::GameBoyAdvance,
        short_name: "GBA",
        name: "Game Boy Advance",
        config_filename: "GbaEmu.config",
        state_extension: "sgm",
        max_players: 1,
        face_buttons: 2,
        center_buttons: 2,
        has_trigger_buttons: true,
        has_pal: false,
        extensions: &["gba"],
        aspect_ratios: &[
            AspectRatio::new("3:2 (Original)", 3, 2),
            AspectRatio::SQUARE_PIXELS,
        ],
    },
    SystemInfo {
        id: SystemId::GameBoyColor,
        short_name: "GBC",
        name: "Game Boy Color",
        config_filename: "GbcEmu.config",
        state_extension: "gqs",
        max_players: 1,
        face_buttons: 2,
        center_buttons: 2,
        has_trigger_buttons: false,
        has_pal: false,
        extensions: &["gb", "gbc", "dmg", "cgb"],
        aspect_ratios: &[
            AspectRatio::new("10:9 (Original)", 10, 9),
            AspectRatio::SQUARE_PIXELS,
        ],
    },
    SystemInfo {
        id: SystemId::MegaDrive,
        short_name: "MD-Genesis",
        name: "Mega Drive (Sega Genesis)",
        config_filename: "MdEmu.config",
        state_extension: "gp",
        max_players: 4,
        face_buttons: 6,
        center_buttons: 2,
        has_trigger_buttons: false,
        has_pal: true,
        extensions: &["md", "gen", "smd", "bin", "sms", "gg", "iso", "cue"],
        aspect_ratios: &[RATIO_4_3, AspectRatio::SQUARE_PIXELS],
    },
    SystemInfo {
        id: SystemId::Msx,
        short_name: "MSX",
        name: "MSX",
        config_filename: "MsxEmu.config",
        state_extension: "sta",
        max_players: 2,
        face_buttons: 2,
        center_buttons: 2,
        has_trigger_buttons: false,
        has_pal: true,
        extensions: &["rom", "mx1", "mx2", "dsk", "cas"],
        aspect_ratios: &[RATIO_4_3, AspectRatio::SQUARE_PIXELS],
    },
    SystemInfo {
        id: SystemId::NeoGeo,
        short_name: "NeoGeo",
        name: "Neo Geo",
        config_filename: "NeoEmu.config",
        state_extension: "sta",
        max_players: 2,
        face_buttons: 4,
        center_buttons: 2,
        has_trigger_buttons: false,
        has_pal: false,
        extensions: &["zip", "neo"],
        aspect_ratios: &[RATIO_4_3, AspectRatio::SQUARE_PIXELS],
    },
    SystemInfo {
        id: SystemId::Nes,
        short_name: "NES",
        name: "Famicom (Nintendo Entertainment System)",
        config_filename: "NesEmu.config",
        state_extension: "fcs",
        max_players: 4,
        face_buttons: 2,
        center_buttons: 2,
        has_trigger_buttons: false,
        has_pal: true,
        extensions: &["nes", "unf", "unif", "fds", "nsf"],
        aspect_ratios: &[RATIO_4_3, RATIO_8_7, AspectRatio::SQUARE_PIXELS],
    },
    SystemInfo {
        id: SystemId::NeoGeoPocket,
        short_name: "NGP",
        name: "Neo Geo Pocket",
        config_filename: "NgpEmu.config",
        state_extension: "ngs",
        max_players: 1,
        face_buttons: 2,
        center_buttons: 1,
        has_trigger_buttons: false,
        has_pal: false,
        extensions: &["ngp", "ngc", "npc"],
        aspect_ratios: &[
            AspectRatio::new("20:19 (Original)", 20, 19),
            AspectRatio::SQUARE_PIXELS,
        ],
    },
    SystemInfo {
        id: SystemId::PcEngine,
        short_name: "PCE-TG16",
        name: "PC Engine (TurboGrafx-16)",
        config_filename: "PceEmu.config",
        state_extension: "mca",
        max_players: 5,
        face_buttons: 6,
        center_buttons: 2,
        has_trigger_buttons: false,
        has_pal: false,
        extensions: &["pce", "sgx", "cue", "chd"],
        aspect_ratios: &[RATIO_4_3, RATIO_8_7, AspectRatio::SQUARE_PIXELS],
    },
    SystemInfo {
        id: SystemId::Saturn,
        short_name: "Saturn",
        name: "Sega Saturn",
        config_filename: "SaturnEmu.config",
        state_extension: "mcs",
        max_players: 2,
        face_buttons: 6,
        center_buttons: 1,
        has_trigger_buttons: true,
        has_pal: true,
        extensions: &["cue", "iso", "chd", "ccd"],
        aspect_ratios: &[RATIO_4_3, AspectRatio::SQUARE_PIXELS],
    },
    SystemInfo {
        id: SystemId::Snes,
        short_name: "SNES",
        name: "Super Famicom (SNES)",
        config_filename: "Snes9x.config",
        state_extension: "frz",
        max_players: 5,
        face_buttons: 4,
        center_buttons: 2,
        has_trigger_buttons: true,
        has_pal: true,
        extensions: &["smc", "sfc", "fig", "bs", "st"],
        aspect_ratios: &[RATIO_4_3, RATIO_8_7, AspectRatio::SQUARE_PIXELS],
    },
];

impl SystemId {
    pub const ALL: [SystemId; 12] = [
        SystemId::Atari2600,
        SystemId::C64,
        SystemId::GameBoyAdvance,
        SystemId::GameBoyColor,
        SystemId::MegaDrive,
        SystemId::Msx,
        SystemId::NeoGeo,
        SystemId::Nes,
        SystemId::NeoGeoPocket,
        SystemId::PcEngine,
        SystemId::Saturn,
        SystemId::Snes,
    ];

    pub fn info(self) -> &'static SystemInfo {
        &SYSTEMS[self as usize]
    }

    /// Look up a system by its short name, ignoring case
    pub fn from_short_name(name: &str) -> Option<SystemId> {
        Self::ALL
            .into_iter()
            .find(|id| id.info().short_name.eq_ignore_ascii_case(name))
    }

    /// All systems claiming a content extension
    pub fn candidates_for_extension(ext: &str) -> Vec<SystemId> {
        let ext = ext.trim_start_matches('.');
        Self::ALL
            .into_iter()
            .filter(|id| {
                id.info()
                    .extensions
                    .iter()
                    .any(|e| e.eq_ignore_ascii_case(ext))
            })
            .collect()
    }

    /// The system owning an extension, if exactly one claims it
    pub fn from_extension(ext: &str) -> Option<SystemId> {
        match Self::candidates_for_extension(ext).as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().name)
    }
}

impl SystemInfo {
    pub fn default_aspect_ratio(&self) -> &'static AspectRatio {
        &self.aspect_ratios[0]
    }

    /// Aspect ratio by option index, falling back to the default
    pub fn aspect_ratio(&self, index: usize) -> &'static AspectRatio {
        self.aspect_ratios
            .get(index)
            .unwrap_or_else(|| self.default_aspect_ratio())
    }

    pub fn default_frame_time(&self, pal: bool) -> Duration {
        if pal && self.has_pal {
            PAL_FRAME_TIME
        } else {
            NTSC_FRAME_TIME
        }
    }

    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_id() {
        for id in SystemId::ALL {
            assert_eq!(id.info().id, id);
        }
    }

    #[test]
    fn every_system_ends_with_square_pixels() {
        for id in SystemId::ALL {
            let ratios = id.info().aspect_ratios;
            assert!(ratios.len() >= 2, "{:?}", id);
            assert_eq!(*ratios.last().unwrap(), AspectRatio::SQUARE_PIXELS);
            assert!(ratios[0].ratio().is_some());
        }
    }

    #[test]
    fn pce_constants() {
        let info = SystemId::PcEngine.info();
        assert_eq!(info.short_name, "PCE-TG16");
        assert_eq!(info.config_filename, "PceEmu.config");
        assert_eq!(info.max_players, 5);
        assert_eq!(info.face_buttons, 6);
        assert_eq!(info.center_buttons, 2);
        assert!(!info.has_trigger_buttons);
    }

    #[test]
    fn short_name_lookup_ignores_case() {
        assert_eq!(SystemId::from_short_name("neogeo"), Some(SystemId::NeoGeo));
        assert_eq!(SystemId::from_short_name("md-genesis"), Some(SystemId::MegaDrive));
        assert_eq!(SystemId::from_short_name("n64"), None);
    }

    #[test]
    fn extension_lookup() {
        assert_eq!(SystemId::from_extension("NES"), Some(SystemId::Nes));
        assert_eq!(SystemId::from_extension(".sfc"), Some(SystemId::Snes));
        // Shared extensions are ambiguous
        assert_eq!(SystemId::from_extension("bin"), None);
        assert_eq!(
            SystemId::candidates_for_extension("cue"),
            vec![SystemId::MegaDrive, SystemId::PcEngine, SystemId::Saturn]
        );
    }

    #[test]
    fn aspect_ratio_index_falls_back() {
        let info = SystemId::Nes.info();
        assert_eq!(info.aspect_ratio(1).name, "8:7");
        assert_eq!(info.aspect_ratio(42).name, "4:3 (Original)");
        let r = info.default_aspect_ratio().ratio().unwrap();
        assert!((r - 4.0 / 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn pal_frame_time_only_when_supported() {
        assert_eq!(SystemId::Nes.info().default_frame_time(true), PAL_FRAME_TIME);
        assert_eq!(
            SystemId::GameBoyColor.info().default_frame_time(true),
            NTSC_FRAME_TIME
        );
    }
}

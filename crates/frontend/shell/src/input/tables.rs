//! Core key codes and controller layouts for each hosted system.
//!
//! Codes are whatever the core's own input handler expects; the frontend
//! only moves them around.

use crate::system_info::SystemId;

/// Physical arrangement of a system's controller, by core key code
pub struct KeyLayout {
    /// Up, Right, Down, Left
    pub dpad: [u16; 4],
    pub center: &'static [u16],
    pub face: &'static [u16],
    pub triggers: &'static [u16],
    pub names: &'static [(u16, &'static str)],
}

impl KeyLayout {
    pub fn key_name(&self, code: u16) -> Option<&'static str> {
        self.names.iter().find(|(c, _)| *c == code).map(|(_, n)| *n)
    }
}

pub mod nes {
    pub const A: u16 = 0;
    pub const B: u16 = 1;
    pub const SELECT: u16 = 2;
    pub const START: u16 = 3;
    pub const UP: u16 = 4;
    pub const DOWN: u16 = 5;
    pub const LEFT: u16 = 6;
    pub const RIGHT: u16 = 7;
}

pub mod snes {
    pub const UP: u16 = 11;
    pub const RIGHT: u16 = 8;
    pub const DOWN: u16 = 10;
    pub const LEFT: u16 = 9;
    pub const SELECT: u16 = 13;
    pub const START: u16 = 12;
    pub const A: u16 = 7;
    pub const B: u16 = 15;
    pub const X: u16 = 6;
    pub const Y: u16 = 14;
    pub const L: u16 = 5;
    pub const R: u16 = 4;
}

pub mod gb {
    pub const A: u16 = 0;
    pub const B: u16 = 1;
    pub const SELECT: u16 = 2;
    pub const START: u16 = 3;
    pub const RIGHT: u16 = 4;
    pub const LEFT: u16 = 5;
    pub const UP: u16 = 6;
    pub const DOWN: u16 = 7;
    /// GBA only
    pub const R: u16 = 8;
    /// GBA only
    pub const L: u16 = 9;
}

pub mod md {
    pub const UP: u16 = 0;
    pub const DOWN: u16 = 1;
    pub const LEFT: u16 = 2;
    pub const RIGHT: u16 = 3;
    pub const B: u16 = 4;
    pub const C: u16 = 5;
    pub const A: u16 = 6;
    pub const START: u16 = 7;
    pub const Z: u16 = 8;
    pub const Y: u16 = 9;
    pub const X: u16 = 10;
    pub const MODE: u16 = 11;
}

pub mod pce {
    pub const I: u16 = 0;
    pub const II: u16 = 1;
    pub const SELECT: u16 = 2;
    pub const RUN: u16 = 3;
    pub const UP: u16 = 4;
    pub const RIGHT: u16 = 5;
    pub const DOWN: u16 = 6;
    pub const LEFT: u16 = 7;
    pub const III: u16 = 8;
    pub const IV: u16 = 9;
    pub const V: u16 = 10;
    pub const VI: u16 = 11;
}

/// Shared by the Atari 2600, C64 and MSX joystick ports
pub mod joystick {
    pub const UP: u16 = 0;
    pub const RIGHT: u16 = 1;
    pub const DOWN: u16 = 2;
    pub const LEFT: u16 = 3;
    pub const FIRE: u16 = 4;
    pub const FIRE_2: u16 = 5;
    pub const CONSOLE_1: u16 = 6;
    pub const CONSOLE_2: u16 = 7;
}

pub mod neogeo {
    pub const UP: u16 = 0;
    pub const DOWN: u16 = 1;
    pub const LEFT: u16 = 2;
    pub const RIGHT: u16 = 3;
    pub const A: u16 = 4;
    pub const B: u16 = 5;
    pub const C: u16 = 6;
    pub const D: u16 = 7;
    pub const START: u16 = 8;
    pub const SELECT: u16 = 9;
}

pub mod ngp {
    pub const UP: u16 = 0;
    pub const DOWN: u16 = 1;
    pub const LEFT: u16 = 2;
    pub const RIGHT: u16 = 3;
    pub const A: u16 = 4;
    pub const B: u16 = 5;
    pub const OPTION: u16 = 6;
}

pub mod saturn {
    pub const UP: u16 = 0;
    pub const RIGHT: u16 = 1;
    pub const DOWN: u16 = 2;
    pub const LEFT: u16 = 3;
    pub const A: u16 = 4;
    pub const B: u16 = 5;
    pub const C: u16 = 6;
    pub const X: u16 = 7;
    pub const Y: u16 = 8;
    pub const Z: u16 = 9;
    pub const L: u16 = 10;
    pub const R: u16 = 11;
    pub const START: u16 = 12;
}

const DPAD_NAMES: [&str; 4] = ["Up", "Right", "Down", "Left"];

macro_rules! names {
    ($dpad:expr; $($code:expr => $name:expr),* $(,)?) => {
        &[
            ($dpad[0], DPAD_NAMES[0]),
            ($dpad[1], DPAD_NAMES[1]),
            ($dpad[2], DPAD_NAMES[2]),
            ($dpad[3], DPAD_NAMES[3]),
            $(($code, $name)),*
        ]
    };
}

static NES: KeyLayout = KeyLayout {
    dpad: [nes::UP, nes::RIGHT, nes::DOWN, nes::LEFT],
    center: &[nes::SELECT, nes::START],
    face: &[nes::B, nes::A],
    triggers: &[],
    names: names!([nes::UP, nes::RIGHT, nes::DOWN, nes::LEFT];
        nes::SELECT => "Select", nes::START => "Start", nes::A => "A", nes::B => "B"),
};

static SNES: KeyLayout = KeyLayout {
    dpad: [snes::UP, snes::RIGHT, snes::DOWN, snes::LEFT],
    center: &[snes::SELECT, snes::START],
    face: &[snes::B, snes::A, snes::Y, snes::X],
    triggers: &[snes::L, snes::R],
    names: names!([snes::UP, snes::RIGHT, snes::DOWN, snes::LEFT];
        snes::SELECT => "Select", snes::START => "Start",
        snes::A => "A", snes::B => "B", snes::X => "X", snes::Y => "Y",
        snes::L => "L", snes::R => "R"),
};

static GBC: KeyLayout = KeyLayout {
    dpad: [gb::UP, gb::RIGHT, gb::DOWN, gb::LEFT],
    center: &[gb::SELECT, gb::START],
    face: &[gb::B, gb::A],
    triggers: &[],
    names: names!([gb::UP, gb::RIGHT, gb::DOWN, gb::LEFT];
        gb::SELECT => "Select", gb::START => "Start", gb::A => "A", gb::B => "B"),
};

static GBA: KeyLayout = KeyLayout {
    dpad: [gb::UP, gb::RIGHT, gb::DOWN, gb::LEFT],
    center: &[gb::SELECT, gb::START],
    face: &[gb::B, gb::A],
    triggers: &[gb::L, gb::R],
    names: names!([gb::UP, gb::RIGHT, gb::DOWN, gb::LEFT];
        gb::SELECT => "Select", gb::START => "Start", gb::A => "A", gb::B => "B",
        gb::L => "L", gb::R => "R"),
};

static MD: KeyLayout = KeyLayout {
    dpad: [md::UP, md::RIGHT, md::DOWN, md::LEFT],
    center: &[md::MODE, md::START],
    face: &[md::A, md::B, md::C, md::X, md::Y, md::Z],
    triggers: &[],
    names: names!([md::UP, md::RIGHT, md::DOWN, md::LEFT];
        md::MODE => "Mode", md::START => "Start",
        md::A => "A", md::B => "B", md::C => "C", md::X => "X", md::Y => "Y", md::Z => "Z"),
};

static PCE: KeyLayout = KeyLayout {
    dpad: [pce::UP, pce::RIGHT, pce::DOWN, pce::LEFT],
    center: &[pce::SELECT, pce::RUN],
    face: &[pce::II, pce::I, pce::III, pce::IV, pce::V, pce::VI],
    triggers: &[],
    names: names!([pce::UP, pce::RIGHT, pce::DOWN, pce::LEFT];
        pce::SELECT => "Select", pce::RUN => "Run",
        pce::I => "I", pce::II => "II", pce::III => "III",
        pce::IV => "IV", pce::V => "V", pce::VI => "VI"),
};

static ATARI2600: KeyLayout = KeyLayout {
    dpad: [joystick::UP, joystick::RIGHT, joystick::DOWN, joystick::LEFT],
    center: &[joystick::CONSOLE_1, joystick::CONSOLE_2],
    face: &[joystick::FIRE],
    triggers: &[],
    names: names!([joystick::UP, joystick::RIGHT, joystick::DOWN, joystick::LEFT];
        joystick::CONSOLE_1 => "Select", joystick::CONSOLE_2 => "Reset",
        joystick::FIRE => "Fire"),
};

static C64: KeyLayout = KeyLayout {
    dpad: [joystick::UP, joystick::RIGHT, joystick::DOWN, joystick::LEFT],
    center: &[joystick::CONSOLE_1, joystick::CONSOLE_2],
    face: &[joystick::FIRE, joystick::FIRE_2],
    triggers: &[],
    names: names!([joystick::UP, joystick::RIGHT, joystick::DOWN, joystick::LEFT];
        joystick::CONSOLE_1 => "Run/Stop", joystick::CONSOLE_2 => "F1",
        joystick::FIRE => "Fire", joystick::FIRE_2 => "Space"),
};

static MSX: KeyLayout = KeyLayout {
    dpad: [joystick::UP, joystick::RIGHT, joystick::DOWN, joystick::LEFT],
    center: &[joystick::CONSOLE_1, joystick::CONSOLE_2],
    face: &[joystick::FIRE, joystick::FIRE_2],
    triggers: &[],
    names: names!([joystick::UP, joystick::RIGHT, joystick::DOWN, joystick::LEFT];
        joystick::CONSOLE_1 => "Space", joystick::CONSOLE_2 => "F1",
        joystick::FIRE => "A", joystick::FIRE_2 => "B"),
};

static NEOGEO: KeyLayout = KeyLayout {
    dpad: [neogeo::UP, neogeo::RIGHT, neogeo::DOWN, neogeo::LEFT],
    center: &[neogeo::SELECT, neogeo::START],
    face: &[neogeo::A, neogeo::B, neogeo::C, neogeo::D],
    triggers: &[],
    names: names!([neogeo::UP, neogeo::RIGHT, neogeo::DOWN, neogeo::LEFT];
        neogeo::SELECT => "Select", neogeo::START => "Start",
        neogeo::A => "A", neogeo::B => "B", neogeo::C => "C", neogeo::D => "D"),
};

static NGP: KeyLayout = KeyLayout {
    dpad: [ngp::UP, ngp::RIGHT, ngp::DOWN, ngp::LEFT],
    center: &[ngp::OPTION],
    face: &[ngp::B, ngp::A],
    triggers: &[],
    names: names!([ngp::UP, ngp::RIGHT, ngp::DOWN, ngp::LEFT];
        ngp::OPTION => "Option", ngp::A => "A", ngp::B => "B"),
};

static SATURN: KeyLayout = KeyLayout {
    dpad: [saturn::UP, saturn::RIGHT, saturn::DOWN, saturn::LEFT],
    center: &[saturn::START],
    face: &[saturn::A, saturn::B, saturn::C, saturn::X, saturn::Y, saturn::Z],
    triggers: &[saturn::L, saturn::R],
    names: names!([saturn::UP, saturn::RIGHT, saturn::DOWN, saturn::LEFT];
        saturn::START => "Start",
        saturn::A => "A", saturn::B => "B", saturn::C => "C",
        saturn::X => "X", saturn::Y => "Y", saturn::Z => "Z",
        saturn::L => "L", saturn::R => "R"),
};

pub fn layout(system: SystemId) -> &'static KeyLayout {
    match system {
        SystemId::Atari2600 => &ATARI2600,
        SystemId::C64 => &C64,
        SystemId::GameBoyAdvance => &GBA,
        SystemId::GameBoyColor => &GBC,
        SystemId::MegaDrive => &MD,
        SystemId::Msx => &MSX,
        SystemId::NeoGeo => &NEOGEO,
        SystemId::Nes => &NES,
        SystemId::NeoGeoPocket => &NGP,
        SystemId::PcEngine => &PCE,
        SystemId::Saturn => &SATURN,
        SystemId::Snes => &SNES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_system_constants() {
        for id in SystemId::ALL {
            let info = id.info();
            let layout = layout(id);
            assert_eq!(layout.face.len(), info.face_buttons as usize, "{:?}", id);
            assert_eq!(layout.center.len(), info.center_buttons as usize, "{:?}", id);
            assert_eq!(!layout.triggers.is_empty(), info.has_trigger_buttons, "{:?}", id);
        }
    }

    #[test]
    fn every_code_has_a_name() {
        for id in SystemId::ALL {
            let layout = layout(id);
            let codes = layout
                .dpad
                .iter()
                .chain(layout.center)
                .chain(layout.face)
                .chain(layout.triggers);
            for code in codes {
                assert!(layout.key_name(*code).is_some(), "{:?} code {}", id, code);
            }
        }
    }

    #[test]
    fn snes_codes() {
        assert_eq!(layout(SystemId::Snes).key_name(snes::B), Some("B"));
        assert_eq!(layout(SystemId::Snes).key_name(99), None);
    }
}

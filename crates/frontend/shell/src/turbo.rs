//! Auto-fire for held turbo keys.

use crate::input::KeyInfo;

pub const MAX_TURBO_ACTIONS: usize = 5;

/// Frames per press/release cycle
const TURBO_FRAMES: u8 = 4;

/// A held turbo key, stored without its turbo flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TurboAction {
    player: u8,
    code: u16,
}

#[derive(Debug, Default)]
pub struct TurboInput {
    actions: [Option<TurboAction>; MAX_TURBO_ACTIONS],
    clock: u8,
}

impl TurboInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start auto-firing `key`. Duplicates are ignored, as is a key added
    /// while every slot is taken.
    pub fn add(&mut self, key: KeyInfo) -> bool {
        let action = TurboAction {
            player: key.player,
            code: key.code,
        };
        if self.actions.contains(&Some(action)) {
            return false;
        }
        match self.actions.iter_mut().find(|a| a.is_none()) {
            Some(slot) => {
                *slot = Some(action);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: KeyInfo) -> bool {
        let action = Some(TurboAction {
            player: key.player,
            code: key.code,
        });
        match self.actions.iter_mut().find(|a| **a == action) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.actions = Default::default();
        self.clock = 0;
    }

    /// Send a release for every active action, then clear the table
    pub fn release_all(&mut self, send: &mut impl FnMut(u8, u16, bool)) {
        for action in self.actions.iter().flatten() {
            send(action.player, action.code, false);
        }
        self.clear();
    }

    pub fn active(&self) -> usize {
        self.actions.iter().flatten().count()
    }

    /// Advance one emulated frame, sending presses on clock 0 and releases
    /// half a cycle later to `send(player, code, pressed)`.
    pub fn update(&mut self, send: &mut impl FnMut(u8, u16, bool)) {
        let pressed = match self.clock {
            0 => Some(true),
            c if c == TURBO_FRAMES / 2 => Some(false),
            _ => None,
        };
        if let Some(pressed) = pressed {
            for action in self.actions.iter().flatten() {
                send(action.player, action.code, pressed);
            }
        }
        self.clock = (self.clock + 1) % TURBO_FRAMES;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(turbo: &mut TurboInput, frames: usize) -> Vec<(usize, u8, u16, bool)> {
        let mut events = Vec::new();
        for frame in 0..frames {
            turbo.update(&mut |player, code, pressed| events.push((frame, player, code, pressed)));
        }
        events
    }

    #[test]
    fn test_four_frame_cycle() {
        let mut turbo = TurboInput::new();
        turbo.add(KeyInfo::new(7).turbo());
        let events = run(&mut turbo, 8);
        assert_eq!(
            events,
            vec![
                (0, 0, 7, true),
                (2, 0, 7, false),
                (4, 0, 7, true),
                (6, 0, 7, false),
            ]
        );
    }

    #[test]
    fn test_duplicates_and_capacity() {
        let mut turbo = TurboInput::new();
        assert!(turbo.add(KeyInfo::new(1)));
        assert!(!turbo.add(KeyInfo::new(1).turbo()));
        assert!(turbo.add(KeyInfo::new(1).transpose(1)));
        for code in 2..5 {
            assert!(turbo.add(KeyInfo::new(code)));
        }
        assert_eq!(turbo.active(), MAX_TURBO_ACTIONS);
        assert!(!turbo.add(KeyInfo::new(9)));
    }

    #[test]
    fn test_remove_frees_slot() {
        let mut turbo = TurboInput::new();
        turbo.add(KeyInfo::new(3).transpose(2));
        assert!(!turbo.remove(KeyInfo::new(3)));
        assert!(turbo.remove(KeyInfo::new(3).transpose(2)));
        assert_eq!(turbo.active(), 0);
        assert!(run(&mut turbo, 4).is_empty());
    }

    #[test]
    fn test_clear_resets_clock() {
        let mut turbo = TurboInput::new();
        turbo.add(KeyInfo::new(0));
        run(&mut turbo, 1);
        turbo.clear();
        turbo.add(KeyInfo::new(0));
        assert_eq!(run(&mut turbo, 1), vec![(0, 0, 0, true)]);
    }

    #[test]
    fn test_release_all() {
        let mut turbo = TurboInput::new();
        turbo.add(KeyInfo::new(2));
        turbo.add(KeyInfo::new(5).transpose(1));
        let mut released = Vec::new();
        turbo.release_all(&mut |player, code, pressed| released.push((player, code, pressed)));
        assert_eq!(released, vec![(0, 2, false), (1, 5, false)]);
        assert_eq!(turbo.active(), 0);
    }
}

//! Menu item models. Rendering is up to the frontend.

use crate::recent::RecentContent;
use crate::save_state::{SlotStatus, AUTO_SLOT};

/// Menu actions that can be triggered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    // Main menu
    LoadGame,
    Reset,
    OpenLoadState,
    OpenSaveState,
    OpenRecent,
    Options,
    InputSetup,
    Benchmark,
    Exit,

    // State slot menu
    LoadState(i8),
    SaveState(i8),

    // Recent games menu
    LoadRecent(String),
    ClearRecent,
}

/// Menu item definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub action: MenuAction,
    pub enabled: bool,
}

impl MenuItem {
    fn new(label: impl Into<String>, action: MenuAction, enabled: bool) -> Self {
        Self {
            label: label.into(),
            action,
            enabled,
        }
    }
}

/// A titled list of items with a cursor
#[derive(Debug, Clone)]
pub struct Menu {
    pub title: String,
    pub items: Vec<MenuItem>,
    pub selected: usize,
}

impl Menu {
    fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            title: title.into(),
            items,
            selected: 0,
        }
    }

    /// Action of the item at `index`, if it exists and is enabled
    pub fn activate(&mut self, index: usize) -> Option<MenuAction> {
        let item = self.items.get(index)?;
        if !item.enabled {
            return None;
        }
        self.selected = index;
        Some(item.action.clone())
    }

    pub fn activate_selected(&mut self) -> Option<MenuAction> {
        self.activate(self.selected)
    }

    /// Move the cursor by `delta` items, wrapping around
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.items.len() as isize;
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
    }

    pub fn item(&self, action: &MenuAction) -> Option<&MenuItem> {
        self.items.iter().find(|i| &i.action == action)
    }

    fn set_enabled(&mut self, action: &MenuAction, enabled: bool) {
        if let Some(item) = self.items.iter_mut().find(|i| &i.action == action) {
            item.enabled = enabled;
        }
    }
}

/// The fixed top-level menu
#[derive(Debug, Clone)]
pub struct MainMenu {
    pub menu: Menu,
}

impl MainMenu {
    pub fn new(title: impl Into<String>) -> Self {
        let items = vec![
            MenuItem::new("Load Game", MenuAction::LoadGame, true),
            MenuItem::new("Reset", MenuAction::Reset, false),
            MenuItem::new("Load State", MenuAction::OpenLoadState, false),
            MenuItem::new("Save State", MenuAction::OpenSaveState, false),
            MenuItem::new("Recent Games", MenuAction::OpenRecent, false),
            MenuItem::new("Options", MenuAction::Options, true),
            MenuItem::new("Input Setup", MenuAction::InputSetup, true),
            MenuItem::new("Benchmark", MenuAction::Benchmark, true),
            MenuItem::new("Exit", MenuAction::Exit, true),
        ];
        Self {
            menu: Menu::new(title, items),
        }
    }

    /// Update item enablement based on system status
    pub fn update_menu_state(&mut self, running: bool, has_recent: bool, supports_save_states: bool) {
        let states = running && supports_save_states;
        self.menu.set_enabled(&MenuAction::Reset, running);
        self.menu.set_enabled(&MenuAction::OpenLoadState, states);
        self.menu.set_enabled(&MenuAction::OpenSaveState, states);
        self.menu.set_enabled(&MenuAction::OpenRecent, has_recent);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotMenuMode {
    Load,
    Save,
}

/// One item per state slot, auto slot first
#[derive(Debug, Clone)]
pub struct StateSlotMenu {
    pub mode: SlotMenuMode,
    pub menu: Menu,
}

impl StateSlotMenu {
    /// `slots` as returned by `StateSlots::list`. Empty slots cannot be
    /// loaded and the auto slot cannot be saved to by hand.
    pub fn new(mode: SlotMenuMode, slots: &[SlotStatus], selected: i8) -> Self {
        let items = slots
            .iter()
            .map(|status| {
                let name = if status.slot == AUTO_SLOT {
                    "Auto".to_string()
                } else {
                    status.label.to_string()
                };
                let label = match &status.saved_at {
                    Some(when) => format!("{}: {}", name, when),
                    None => format!("{}: Empty", name),
                };
                let (action, enabled) = match mode {
                    SlotMenuMode::Load => (MenuAction::LoadState(status.slot), status.exists()),
                    SlotMenuMode::Save => (MenuAction::SaveState(status.slot), status.slot != AUTO_SLOT),
                };
                MenuItem::new(label, action, enabled)
            })
            .collect();
        let title = match mode {
            SlotMenuMode::Load => "Load State",
            SlotMenuMode::Save => "Save State",
        };
        let mut menu = Menu::new(title, items);
        if let Some(index) = slots.iter().position(|s| s.slot == selected) {
            menu.selected = index;
        }
        Self { mode, menu }
    }
}

/// Recent content followed by "Clear List"
#[derive(Debug, Clone)]
pub struct RecentMenu {
    pub menu: Menu,
}

impl RecentMenu {
    pub fn new(recent: &RecentContent) -> Self {
        let mut items: Vec<MenuItem> = recent
            .iter()
            .map(|e| MenuItem::new(e.name.clone(), MenuAction::LoadRecent(e.path.clone()), true))
            .collect();
        items.push(MenuItem::new("Clear List", MenuAction::ClearRecent, !recent.is_empty()));
        Self {
            menu: Menu::new("Recent Games", items),
        }
    }
}

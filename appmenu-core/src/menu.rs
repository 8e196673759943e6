//! Platform-neutral menu model built from a tree snapshot.
//!
//! A renderer walks the [`MenuEntry`] list and turns it into native menu
//! items; activation goes back through a [`MenuActions`] handler so the
//! renderer never touches the store.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::item::{AppItem, Item};

const SECTION_HEADER: &str = "Applications";

/// Which optional entries a menu surface shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuOptions {
    pub include_section_headers: bool,
    pub include_utilities: bool,
    pub include_settings: bool,
    pub include_refresh: bool,
    pub include_quit: bool,
}

impl MenuOptions {
    pub fn status_bar() -> Self {
        Self {
            include_section_headers: false,
            include_utilities: true,
            include_settings: true,
            include_refresh: true,
            include_quit: true,
        }
    }

    /// The Dock supplies its own Quit, and refresh happens on open
    pub fn dock() -> Self {
        Self {
            include_section_headers: false,
            include_utilities: true,
            include_settings: true,
            include_refresh: false,
            include_quit: false,
        }
    }
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self::status_bar()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    OpenSettings,
    Refresh,
    Quit,
}

impl MenuAction {
    pub fn title(&self) -> &'static str {
        match self {
            MenuAction::OpenSettings => "Open Settings…",
            MenuAction::Refresh => "Refresh",
            MenuAction::Quit => "Quit",
        }
    }

    pub fn key_equivalent(&self) -> char {
        match self {
            MenuAction::OpenSettings => ',',
            MenuAction::Refresh => 'r',
            MenuAction::Quit => 'q',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// Disabled title line
    Header(String),
    Separator,
    App {
        id: Uuid,
        title: String,
        location: PathBuf,
    },
    Submenu {
        title: String,
        entries: Vec<MenuEntry>,
    },
    Action(MenuAction),
}

/// Callbacks a rendered menu triggers
pub trait MenuActions {
    fn launch(&self, app: &AppItem);
    fn open_settings(&self);
    fn refresh_menus(&self);
    fn quit(&self);
}

impl MenuEntry {
    /// Dispatch this entry to `handler`. Returns false for entries that do
    /// nothing when chosen (headers, separators, submenus).
    pub fn activate(&self, handler: &dyn MenuActions) -> bool {
        match self {
            MenuEntry::App { id, title, location } => {
                handler.launch(&AppItem {
                    id: *id,
                    name: title.clone(),
                    location: location.clone(),
                });
                true
            }
            MenuEntry::Action(MenuAction::OpenSettings) => {
                handler.open_settings();
                true
            }
            MenuEntry::Action(MenuAction::Refresh) => {
                handler.refresh_menus();
                true
            }
            MenuEntry::Action(MenuAction::Quit) => {
                handler.quit();
                true
            }
            MenuEntry::Header(_) | MenuEntry::Separator | MenuEntry::Submenu { .. } => false,
        }
    }
}

/// Mirror `items` into menu entries, folders becoming submenus
pub fn build_menu(items: &[Item], options: &MenuOptions) -> Vec<MenuEntry> {
    let mut menu = Vec::new();

    if options.include_section_headers && !items.is_empty() {
        menu.push(MenuEntry::Header(SECTION_HEADER.to_string()));
        menu.push(MenuEntry::Separator);
    }

    menu.extend(items.iter().map(entry_for));

    if options.include_utilities {
        if !menu.is_empty() {
            menu.push(MenuEntry::Separator);
        }
        if options.include_settings {
            menu.push(MenuEntry::Action(MenuAction::OpenSettings));
        }
        if options.include_refresh {
            menu.push(MenuEntry::Action(MenuAction::Refresh));
        }
        if options.include_quit {
            menu.push(MenuEntry::Action(MenuAction::Quit));
        }
    }

    menu
}

fn entry_for(item: &Item) -> MenuEntry {
    match item {
        Item::App(app) => MenuEntry::App {
            id: app.id,
            title: app.name.clone(),
            location: app.location.clone(),
        },
        Item::Folder(folder) => MenuEntry::Submenu {
            title: folder.name.clone(),
            entries: folder.children.iter().map(entry_for).collect(),
        },
    }
}

/// Locate the app entry for `id` anywhere in the menu
pub fn find_app(entries: &[MenuEntry], id: Uuid) -> Option<&MenuEntry> {
    entries.iter().find_map(|entry| match entry {
        MenuEntry::App { id: app_id, .. } if *app_id == id => Some(entry),
        MenuEntry::Submenu { entries, .. } => find_app(entries, id),
        _ => None,
    })
}

/// Indented plain-text rendering, two spaces per submenu level
pub fn render_text(entries: &[MenuEntry]) -> String {
    let mut out = String::new();
    render_into(&mut out, entries, 0);
    out
}

fn render_into(out: &mut String, entries: &[MenuEntry], depth: usize) {
    let indent = "  ".repeat(depth);
    for entry in entries {
        // Writing to a String cannot fail
        let _ = match entry {
            MenuEntry::Header(title) => writeln!(out, "{}[{}]", indent, title),
            MenuEntry::Separator => writeln!(out, "{}----", indent),
            MenuEntry::App { title, .. } => writeln!(out, "{}{}", indent, title),
            MenuEntry::Submenu { title, entries } => {
                let _ = writeln!(out, "{}{} >", indent, title);
                render_into(out, entries, depth + 1);
                Ok(())
            }
            MenuEntry::Action(action) => writeln!(
                out,
                "{}{}  (Cmd-{})",
                indent,
                action.title(),
                action.key_equivalent()
            ),
        };
    }
}

pub mod config;
pub mod debounce;
pub mod error;
pub mod item;
pub mod launch;
pub mod menu;
pub mod persist;
pub mod scan;
pub mod store;
pub mod tree;

pub use config::AppMenuConfig;
pub use debounce::{DebouncedSaver, DEFAULT_DEBOUNCE};
pub use error::{AppMenuError, Result};
pub use item::{AppItem, FolderItem, Item};
pub use launch::{Launcher, SystemLauncher};
pub use menu::{build_menu, render_text, MenuAction, MenuActions, MenuEntry, MenuOptions};
pub use persist::{InMemoryPersistence, JsonFilePersistence, Persistence};
pub use scan::{scan_applications, AppCandidate, ScanReport};
pub use store::{SeedState, Snapshot, StoreOptions, TreeStore, APPLICATIONS_FOLDER};

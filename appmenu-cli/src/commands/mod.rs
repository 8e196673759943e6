//! Command implementations for the appmenu CLI

pub mod apps;
pub mod tree;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use appmenu_core::store::SeedState;
use appmenu_core::{tree as item_tree, AppMenuConfig, Item, JsonFilePersistence, TreeStore};
use tracing::debug;
use uuid::Uuid;

use crate::ui;

pub use apps::{run_import, run_menu, run_open, run_scan};
pub use tree::{run_add_app, run_add_folder, run_delete, run_list, run_move, run_rename};

/// Shared state for one CLI invocation
pub struct Session {
    pub config: AppMenuConfig,
    pub store: TreeStore,
}

impl Session {
    /// Open the on-disk store, applying first-run seeding before any command runs
    pub async fn open(no_seed: bool) -> Result<Self> {
        let config = AppMenuConfig::load();
        let dir = config.data_dir().context("Failed to resolve data directory")?;
        let persistence = JsonFilePersistence::new(&dir)
            .with_context(|| format!("Failed to open data directory {}", dir.display()))?;
        debug!("Using data directory {}", dir.display());

        let mut options = config.store_options();
        if no_seed {
            options.seed = false;
        }

        let mut store = TreeStore::open(Arc::new(persistence), options);
        if store.seed_state() == SeedState::Seeding {
            let pb = ui::spinner("First run: looking for installed applications...");
            let seeded = store.finish_seeding().await;
            ui::finish_success(pb, format!("Seeded {} application(s)", seeded));
        }

        Ok(Self { config, store })
    }

    /// Flush pending writes; every command ends here
    pub async fn close(self) {
        self.store.close().await;
    }

    pub fn resolve(&self, text: &str) -> Result<Uuid> {
        item_tree::resolve_id(&self.store.snapshot(), text)
            .ok_or_else(|| anyhow!("No item matches '{}' (use a full id or a unique prefix)", text))
    }

    pub fn resolve_folder(&self, text: &str) -> Result<Uuid> {
        let id = self.resolve(text)?;
        match item_tree::find(&self.store.snapshot(), id) {
            Some(Item::Folder(_)) => Ok(id),
            Some(item) => Err(anyhow!("'{}' is an app, not a folder", item.name())),
            None => Err(anyhow!("No item matches '{}'", text)),
        }
    }

    pub fn resolve_parent(&self, text: Option<&str>) -> Result<Option<Uuid>> {
        text.map(|text| self.resolve_folder(text)).transpose()
    }
}

/// Absolute, lexically normalized form of a user-supplied path
pub fn absolute_location(path: &Path) -> Result<PathBuf> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to read current directory")?
            .join(path)
    };
    Ok(item_tree::normalize_location(&path))
}

/// First eight hex digits; enough to address an item from the command line
pub fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

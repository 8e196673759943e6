//! Persistence adapter: the whole tree in, the whole tree out.
//!
//! File layout inside the data directory:
//! - `items.json`  pretty-printed array of items
//! - `state.json`  `{ "did_seed_apps": true }` once the first-run seeding decision was made

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{AppMenuError, Result};
use crate::item::Item;
use crate::tree;

pub const ITEMS_FILE: &str = "items.json";
pub const STATE_FILE: &str = "state.json";

/// Durable storage for the item tree and the one-shot seeded flag
pub trait Persistence: Send + Sync {
    /// Previously saved tree, or `None` when nothing usable was saved
    fn load(&self) -> Option<Vec<Item>>;

    fn save(&self, items: &[Item]) -> Result<()>;

    fn is_seeded(&self) -> bool;

    fn mark_seeded(&self) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    did_seed_apps: bool,
}

/// JSON files in a per-user data directory, written atomically
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    dir: PathBuf,
}

impl JsonFilePersistence {
    /// Use `dir` as the data directory, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn items_path(&self) -> PathBuf {
        self.dir.join(ITEMS_FILE)
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    /// Like [`Persistence::load`] but surfaces read and parse failures
    pub fn load_checked(&self) -> Result<Option<Vec<Item>>> {
        let path = self.items_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let items: Vec<Item> = serde_json::from_slice(&bytes)
            .map_err(|e| AppMenuError::json(path.display().to_string(), e))?;
        if let Some(id) = tree::duplicate_id(&items) {
            let reason = format!("item id {} appears more than once", id);
            return Err(AppMenuError::json(
                path.display().to_string(),
                serde_json::Error::custom(reason),
            ));
        }
        Ok(Some(items))
    }

    fn read_state(&self) -> Result<StoreState> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(StoreState::default());
        }
        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AppMenuError::json(path.display().to_string(), e))
    }

    /// Write to a sibling temp file, fsync, then rename over the target
    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| AppMenuError::from(e.error))?;
        Ok(())
    }
}

impl Persistence for JsonFilePersistence {
    fn load(&self) -> Option<Vec<Item>> {
        match self.load_checked() {
            Ok(items) => items,
            Err(e) => {
                warn!("Ignoring unreadable item store {}: {}", self.items_path().display(), e);
                None
            }
        }
    }

    fn save(&self, items: &[Item]) -> Result<()> {
        let path = self.items_path();
        let json = serde_json::to_vec_pretty(items)
            .map_err(|e| AppMenuError::json("serializing items", e))?;
        self.write_atomic(&path, &json)?;
        debug!("Saved {} root items to {}", items.len(), path.display());
        Ok(())
    }

    fn is_seeded(&self) -> bool {
        match self.read_state() {
            Ok(state) => state.did_seed_apps,
            Err(e) => {
                warn!("Ignoring unreadable store state {}: {}", self.state_path().display(), e);
                false
            }
        }
    }

    fn mark_seeded(&self) -> Result<()> {
        let state = StoreState { did_seed_apps: true };
        let json = serde_json::to_vec_pretty(&state)
            .map_err(|e| AppMenuError::json("serializing store state", e))?;
        self.write_atomic(&self.state_path(), &json)
    }
}

/// No backing store: saves vanish, loads find nothing
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    seeded: AtomicBool,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for InMemoryPersistence {
    fn load(&self) -> Option<Vec<Item>> {
        None
    }

    fn save(&self, _items: &[Item]) -> Result<()> {
        Ok(())
    }

    fn is_seeded(&self) -> bool {
        self.seeded.load(Ordering::SeqCst)
    }

    fn mark_seeded(&self) -> Result<()> {
        self.seeded.store(true, Ordering::SeqCst);
        Ok(())
    }
}

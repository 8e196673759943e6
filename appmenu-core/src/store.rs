//! The Tree Store: single owner of the item hierarchy.
//!
//! The root lives behind an `Arc` and is never edited in place. Every
//! mutation clones the current root, edits the clone with the functions in
//! [`crate::tree`], and swaps the `Arc` only when something actually changed.
//! Readers holding an older [`Snapshot`] keep seeing a complete, consistent
//! tree.
//!
//! Committed changes are handed to a [`DebouncedSaver`], which persists the
//! settled state and then publishes it on a `watch` channel for menu builders.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::debounce::{DebouncedSaver, DEFAULT_DEBOUNCE};
use crate::item::{AppItem, FolderItem, Item};
use crate::persist::{InMemoryPersistence, Persistence};
use crate::scan::{self, AppCandidate, ScanReport};
use crate::tree;

/// An immutable view of the root sequence
pub type Snapshot = Arc<Vec<Item>>;

/// Name of the root folder created by first-run seeding
pub const APPLICATIONS_FOLDER: &str = "Applications";

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub debounce: Duration,
    pub scan_roots: Vec<PathBuf>,
    /// Run the first-run seeding decision when the store opens
    pub seed: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            scan_roots: scan::default_roots(),
            seed: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedState {
    NotSeeded,
    Seeding,
    Seeded,
}

/// Built-in content for a store with nothing persisted
pub fn sample_items() -> Vec<Item> {
    vec![Item::folder("Browsers"), Item::folder("Editors")]
}

pub struct TreeStore {
    items: Snapshot,
    persistence: Arc<dyn Persistence>,
    saver: DebouncedSaver,
    changes: Arc<watch::Sender<Snapshot>>,
    seed_state: SeedState,
    seed_task: Option<JoinHandle<ScanReport>>,
}

impl TreeStore {
    /// Load the persisted tree (falling back to the sample folders) and make
    /// the first-run seeding decision. Must be called inside a tokio runtime.
    pub fn open(persistence: Arc<dyn Persistence>, options: StoreOptions) -> Self {
        let items = match persistence.load() {
            Some(items) => {
                debug!("Loaded {} items from persistence", tree::count(&items));
                items
            }
            None => {
                debug!("No persisted items, starting from sample data");
                sample_items()
            }
        };
        Self::with_items(persistence, items, options)
    }

    /// Start from an explicit tree instead of loading one
    pub fn with_items(
        persistence: Arc<dyn Persistence>,
        items: Vec<Item>,
        options: StoreOptions,
    ) -> Self {
        let items: Snapshot = Arc::new(items);
        let (changes, _) = watch::channel(items.clone());
        let changes = Arc::new(changes);
        let saver = DebouncedSaver::spawn(persistence.clone(), options.debounce, changes.clone());

        let mut store = Self {
            items,
            persistence,
            saver,
            changes,
            seed_state: SeedState::NotSeeded,
            seed_task: None,
        };
        if options.seed {
            store.begin_seeding(options.scan_roots);
        } else if store.persistence.is_seeded() {
            store.seed_state = SeedState::Seeded;
        }
        store
    }

    /// Volatile store with the sample folders and seeding disabled
    pub fn in_memory() -> Self {
        Self::open(
            Arc::new(InMemoryPersistence::new()),
            StoreOptions {
                seed: false,
                ..StoreOptions::default()
            },
        )
    }

    pub fn snapshot(&self) -> Snapshot {
        self.items.clone()
    }

    /// Receives every settled state, and every [`TreeStore::refresh`]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.changes.subscribe()
    }

    pub fn seed_state(&self) -> SeedState {
        self.seed_state
    }

    /// Create an empty folder under `parent`, or at the root when the parent
    /// is absent or is not a folder
    pub fn add_folder(&mut self, name: impl Into<String>, parent: Option<Uuid>) -> Uuid {
        let item = Item::folder(name);
        let id = item.id();
        debug!("Adding folder {:?} ({})", item.name(), id);
        let mut next = self.working_copy();
        insert_or_append(&mut next, item, parent, None);
        self.commit(next);
        id
    }

    pub fn add_app(
        &mut self,
        location: impl Into<PathBuf>,
        display_name: Option<String>,
        parent: Option<Uuid>,
        index: Option<usize>,
    ) -> Uuid {
        let item = Item::app(location, display_name);
        let id = item.id();
        debug!("Adding app {:?} ({})", item.name(), id);
        let mut next = self.working_copy();
        insert_or_append(&mut next, item, parent, index);
        self.commit(next);
        id
    }

    pub fn rename(&mut self, id: Uuid, name: &str) -> bool {
        let mut next = self.working_copy();
        if !tree::rename(&mut next, id, name) {
            debug!("Rename of unknown item {} ignored", id);
            return false;
        }
        self.commit(next)
    }

    /// Remove an item together with its whole subtree
    pub fn delete(&mut self, id: Uuid) -> bool {
        let mut next = self.working_copy();
        if !tree::remove(&mut next, id) {
            debug!("Delete of unknown item {} ignored", id);
            return false;
        }
        self.commit(next)
    }

    /// Reparent an item, rejecting moves into itself or its own subtree
    pub fn move_item(&mut self, id: Uuid, new_parent: Option<Uuid>, index: Option<usize>) -> bool {
        let current = &self.items;
        if !tree::contains_id(current, id) {
            debug!("Move of unknown item {} ignored", id);
            return false;
        }
        if let Some(parent) = new_parent {
            if tree::find_folder(current, parent).is_none() {
                debug!("Move of {} into non-folder {} ignored", id, parent);
                return false;
            }
        }
        if !tree::is_valid_move(current, id, new_parent) {
            debug!("Move of {} into its own subtree rejected", id);
            return false;
        }

        let mut next = self.working_copy();
        let Some(item) = tree::extract(&mut next, id) else {
            return false;
        };
        if tree::insert(&mut next, item, new_parent, index).is_err() {
            return false;
        }
        self.commit(next)
    }

    /// Re-announce the current tree without changing it
    pub fn refresh(&self) {
        debug!("Refresh requested");
        self.changes.send_replace(self.items.clone());
    }

    /// Where an import lands: `preferred` if it is a folder, else the root
    /// "Applications" folder, else the root itself
    pub fn import_target(&self, preferred: Option<Uuid>) -> Option<Uuid> {
        preferred
            .filter(|id| tree::find_folder(&self.items, *id).is_some())
            .or_else(|| tree::root_folder_named(&self.items, APPLICATIONS_FOLDER))
    }

    /// Candidates that an import into `target` would add: those whose
    /// location is not already an app directly inside it. Locations that
    /// cannot be written to the record are left out.
    pub fn pending_import<'a>(
        &self,
        candidates: &'a [AppCandidate],
        target: Option<Uuid>,
    ) -> Vec<&'a AppCandidate> {
        let mut seen: HashSet<PathBuf> = tree::app_locations_in(&self.items, target)
            .into_iter()
            .collect();
        candidates
            .iter()
            .filter(|candidate| is_storable(candidate))
            .filter(|candidate| seen.insert(tree::normalize_location(&candidate.location)))
            .collect()
    }

    /// Add every new candidate to the import target as one change.
    /// Returns how many apps were added.
    pub fn import_apps(&mut self, candidates: &[AppCandidate], parent: Option<Uuid>) -> usize {
        let target = self.import_target(parent);
        let fresh: Vec<Item> = self
            .pending_import(candidates, target)
            .into_iter()
            .map(|candidate| Item::App(AppItem::new(&candidate.name, &candidate.location)))
            .collect();
        if fresh.is_empty() {
            debug!("Import found nothing new");
            return 0;
        }

        let added = fresh.len();
        let mut next = self.working_copy();
        for item in fresh {
            insert_or_append(&mut next, item, target, None);
        }
        self.commit(next);
        info!("Imported {} application(s)", added);
        added
    }

    /// Wait for a first-run scan in flight and apply its result. Returns the
    /// number of apps seeded; zero when no scan was running.
    pub async fn finish_seeding(&mut self) -> usize {
        let Some(task) = self.seed_task.take() else {
            return 0;
        };
        let report = match task.await {
            Ok(report) => report,
            Err(e) => {
                warn!("Application scan did not complete: {}", e);
                ScanReport::default()
            }
        };
        self.apply_seed(report)
    }

    /// Flush any pending write and stop the saver
    pub async fn close(self) {
        if self.seed_task.is_some() {
            debug!("Abandoning unfinished application scan");
        }
        self.saver.shutdown().await;
    }

    fn begin_seeding(&mut self, roots: Vec<PathBuf>) {
        if self.persistence.is_seeded() {
            self.seed_state = SeedState::Seeded;
            return;
        }

        if tree::contains_any_apps(&self.items)
            || tree::root_folder_named(&self.items, APPLICATIONS_FOLDER).is_some()
        {
            info!("Existing content found, skipping application seeding");
            self.mark_seeded();
            return;
        }

        info!("First run: scanning {} location(s) for applications", roots.len());
        self.seed_state = SeedState::Seeding;
        self.seed_task = Some(tokio::task::spawn_blocking(move || {
            scan::scan_applications(&roots)
        }));
    }

    fn apply_seed(&mut self, report: ScanReport) -> usize {
        for error in &report.errors {
            warn!("Seeding scan: {}", error);
        }

        let seeded = report.apps.len();
        if seeded > 0 {
            let children = report
                .apps
                .into_iter()
                .filter(is_storable)
                .map(|candidate| Item::App(AppItem::new(candidate.name, candidate.location)))
                .collect();
            let mut next = self.working_copy();
            next.insert(
                0,
                Item::Folder(FolderItem::with_children(APPLICATIONS_FOLDER, children)),
            );
            self.commit(next);
            info!("Seeded {} application(s)", seeded);
        } else {
            info!("No applications found, nothing seeded");
        }

        self.mark_seeded();
        seeded
    }

    fn mark_seeded(&mut self) {
        if let Err(e) = self.persistence.mark_seeded() {
            warn!("Failed to record seeded flag: {}", e);
        }
        self.seed_state = SeedState::Seeded;
    }

    fn working_copy(&self) -> Vec<Item> {
        self.items.as_ref().clone()
    }

    /// Publish `next` as the current root if it differs from it
    fn commit(&mut self, next: Vec<Item>) -> bool {
        if next == *self.items {
            return false;
        }
        self.items = Arc::new(next);
        self.saver.schedule(self.items.clone());
        true
    }
}

fn is_storable(candidate: &AppCandidate) -> bool {
    if candidate.location.to_str().is_some() {
        return true;
    }
    warn!("Skipping {} with a non UTF-8 location", candidate.name);
    false
}

fn insert_or_append(items: &mut Vec<Item>, item: Item, parent: Option<Uuid>, index: Option<usize>) {
    if let Err(item) = tree::insert(items, item, parent, index) {
        debug!("Parent {:?} is not a folder, appending at root", parent);
        items.push(item);
    }
}

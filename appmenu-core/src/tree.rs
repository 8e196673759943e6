//! Recursive algorithms over an ordered forest of [`Item`]s.
//!
//! Everything here works on a plain `[Item]` root so the store can run it
//! against a private copy and publish the result in one step. Lookups that
//! miss return `None`/`false`; nothing in this module fails loudly.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::item::{FolderItem, Item};

/// Find an item anywhere in the forest
pub fn find(items: &[Item], id: Uuid) -> Option<&Item> {
    for item in items {
        if item.id() == id {
            return Some(item);
        }
        if let Some(found) = item.children().and_then(|children| find(children, id)) {
            return Some(found);
        }
    }
    None
}

fn find_mut(items: &mut [Item], id: Uuid) -> Option<&mut Item> {
    for item in items.iter_mut() {
        if item.id() == id {
            return Some(item);
        }
        if let Some(children) = item.children_mut() {
            if let Some(found) = find_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn find_folder(items: &[Item], id: Uuid) -> Option<&FolderItem> {
    find(items, id).and_then(Item::as_folder)
}

pub fn contains_id(items: &[Item], id: Uuid) -> bool {
    find(items, id).is_some()
}

/// Whether `id` lives strictly below `ancestor`
pub fn subtree_contains(items: &[Item], ancestor: Uuid, id: Uuid) -> bool {
    match find(items, ancestor).and_then(Item::children) {
        Some(children) => contains_id(children, id),
        None => false,
    }
}

/// A move is valid unless the destination is the item itself or one of its descendants
pub fn is_valid_move(items: &[Item], item_id: Uuid, new_parent: Option<Uuid>) -> bool {
    match new_parent {
        None => true,
        Some(parent) if parent == item_id => false,
        Some(parent) => !subtree_contains(items, item_id, parent),
    }
}

/// Parent id (`None` for root) and index of an item
pub fn location_of(items: &[Item], id: Uuid) -> Option<(Option<Uuid>, usize)> {
    fn search(items: &[Item], id: Uuid, parent: Option<Uuid>) -> Option<(Option<Uuid>, usize)> {
        for (index, item) in items.iter().enumerate() {
            if item.id() == id {
                return Some((parent, index));
            }
            if let Item::Folder(folder) = item {
                if let Some(found) = search(&folder.children, id, Some(folder.id)) {
                    return Some(found);
                }
            }
        }
        None
    }
    search(items, id, None)
}

fn insert_at(sequence: &mut Vec<Item>, item: Item, index: Option<usize>) {
    match index {
        Some(index) if index <= sequence.len() => sequence.insert(index, item),
        _ => sequence.push(item),
    }
}

/// Insert under `parent` (root when `None`) at `index`, appending when the
/// index is absent or out of range. Hands the item back if `parent` is not a
/// folder in the forest.
pub fn insert(
    items: &mut Vec<Item>,
    item: Item,
    parent: Option<Uuid>,
    index: Option<usize>,
) -> Result<(), Item> {
    let Some(parent) = parent else {
        insert_at(items, item, index);
        return Ok(());
    };
    match find_mut(items, parent).and_then(Item::children_mut) {
        Some(children) => {
            insert_at(children, item, index);
            Ok(())
        }
        None => Err(item),
    }
}

/// Detach an item (with its subtree) from wherever it is
pub fn extract(items: &mut Vec<Item>, id: Uuid) -> Option<Item> {
    if let Some(position) = items.iter().position(|item| item.id() == id) {
        return Some(items.remove(position));
    }
    for item in items.iter_mut() {
        if let Some(children) = item.children_mut() {
            if let Some(found) = extract(children, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn remove(items: &mut Vec<Item>, id: Uuid) -> bool {
    extract(items, id).is_some()
}

pub fn rename(items: &mut [Item], id: Uuid, name: &str) -> bool {
    match find_mut(items, id) {
        Some(item) => {
            item.set_name(name);
            true
        }
        None => false,
    }
}

/// Total number of items, folders included
pub fn count(items: &[Item]) -> usize {
    items
        .iter()
        .map(|item| 1 + item.children().map(count).unwrap_or(0))
        .sum()
}

/// All ids in pre-order
pub fn ids(items: &[Item]) -> Vec<Uuid> {
    flatten(items).into_iter().map(|(_, item)| item.id()).collect()
}

/// The first id that appears more than once, in pre-order
pub fn duplicate_id(items: &[Item]) -> Option<Uuid> {
    let mut seen = HashSet::new();
    ids(items).into_iter().find(|id| !seen.insert(*id))
}

/// Pre-order walk paired with nesting depth (root items are depth 0)
pub fn flatten(items: &[Item]) -> Vec<(usize, &Item)> {
    fn walk<'a>(items: &'a [Item], depth: usize, out: &mut Vec<(usize, &'a Item)>) {
        for item in items {
            out.push((depth, item));
            if let Some(children) = item.children() {
                walk(children, depth + 1, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(items, 0, &mut out);
    out
}

pub fn contains_any_apps(items: &[Item]) -> bool {
    items.iter().any(|item| match item {
        Item::App(_) => true,
        Item::Folder(folder) => contains_any_apps(&folder.children),
    })
}

/// Id of the first root-level folder with exactly this name
pub fn root_folder_named(items: &[Item], name: &str) -> Option<Uuid> {
    items
        .iter()
        .filter_map(Item::as_folder)
        .find(|folder| folder.name == name)
        .map(|folder| folder.id)
}

/// Normalized locations of the apps directly inside `parent` (root when `None`)
pub fn app_locations_in(items: &[Item], parent: Option<Uuid>) -> Vec<PathBuf> {
    let children: &[Item] = match parent {
        None => items,
        Some(parent) => match find_folder(items, parent) {
            Some(folder) => &folder.children,
            None => return Vec::new(),
        },
    };
    children
        .iter()
        .filter_map(Item::as_app)
        .map(|app| normalize_location(&app.location))
        .collect()
}

/// Lexical normalization: drops `.` segments and folds `..` into the parent
pub fn normalize_location(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolve user input to an id: a full UUID, or a unique prefix of one
pub fn resolve_id(items: &[Item], text: &str) -> Option<Uuid> {
    let text = text.trim().to_ascii_lowercase();
    if let Ok(id) = Uuid::parse_str(&text) {
        return contains_id(items, id).then_some(id);
    }
    if text.is_empty() {
        return None;
    }
    let mut matches = ids(items)
        .into_iter()
        .filter(|id| id.hyphenated().to_string().starts_with(&text));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Some(id),
        _ => None,
    }
}

//! Launch items: the nodes of the hierarchy.
//!
//! An [`Item`] is either an [`AppItem`] leaf pointing at something launchable
//! or a [`FolderItem`] that exclusively owns an ordered list of children.
//!
//! The on-disk shape is an explicit discriminant plus exactly one payload:
//!
//! ```json
//! {"type": "app", "app": {"id": "…", "name": "Safari", "location": "/Applications/Safari.app"}}
//! {"type": "folder", "folder": {"id": "…", "name": "Browsers", "children": [ … ]}}
//! ```

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// A launchable application entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppItem {
    pub id: Uuid,
    pub name: String,
    #[serde(alias = "url", deserialize_with = "deserialize_location")]
    pub location: PathBuf,
}

impl AppItem {
    /// `file://` URLs are decoded and non-UTF-8 paths are converted lossily,
    /// so the item always survives a save and load unchanged
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            location: storable_location(location.into()),
        }
    }
}

/// A folder; `children` order is display and menu order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FolderItem {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub children: Vec<Item>,
}

impl FolderItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_children(name, Vec::new())
    }

    pub fn with_children(name: impl Into<String>, children: Vec<Item>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "ItemRecord")]
pub enum Item {
    App(AppItem),
    Folder(FolderItem),
}

impl Item {
    /// New app item; the name defaults to the location's base name
    pub fn app(location: impl Into<PathBuf>, display_name: Option<String>) -> Self {
        let location = storable_location(location.into());
        let name = display_name.unwrap_or_else(|| default_app_name(&location));
        Item::App(AppItem::new(name, location))
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Item::Folder(FolderItem::new(name))
    }

    pub fn id(&self) -> Uuid {
        match self {
            Item::App(app) => app.id,
            Item::Folder(folder) => folder.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Item::App(app) => &app.name,
            Item::Folder(folder) => &folder.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        match self {
            Item::App(app) => app.name = name.into(),
            Item::Folder(folder) => folder.name = name.into(),
        }
    }

    /// Children of a folder, `None` for apps
    pub fn children(&self) -> Option<&[Item]> {
        match self {
            Item::App(_) => None,
            Item::Folder(folder) => Some(&folder.children),
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Item>> {
        match self {
            Item::App(_) => None,
            Item::Folder(folder) => Some(&mut folder.children),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Item::Folder(_))
    }

    pub fn as_app(&self) -> Option<&AppItem> {
        match self {
            Item::App(app) => Some(app),
            Item::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderItem> {
        match self {
            Item::App(_) => None,
            Item::Folder(folder) => Some(folder),
        }
    }
}

/// Base name of a location with its extension removed (`Safari.app` -> `Safari`)
pub fn default_app_name(location: &Path) -> String {
    location
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| location.display().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ItemKind {
    App,
    Folder,
}

/// Wire form used for decoding: discriminant plus optional payloads
#[derive(Deserialize)]
struct ItemRecord {
    #[serde(rename = "type")]
    kind: ItemKind,
    #[serde(default)]
    app: Option<AppItem>,
    #[serde(default)]
    folder: Option<FolderItem>,
}

impl TryFrom<ItemRecord> for Item {
    type Error = String;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        match (record.kind, record.app, record.folder) {
            (ItemKind::App, Some(app), None) => Ok(Item::App(app)),
            (ItemKind::Folder, None, Some(folder)) => Ok(Item::Folder(folder)),
            (ItemKind::App, None, _) => Err("item of type \"app\" has no app payload".into()),
            (ItemKind::Folder, _, None) => {
                Err("item of type \"folder\" has no folder payload".into())
            }
            (kind, _, _) => Err(format!(
                "item of type {:?} carries more than one payload",
                kind
            )),
        }
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("Item", 2)?;
        match self {
            Item::App(app) => {
                record.serialize_field("type", &ItemKind::App)?;
                record.serialize_field("app", app)?;
            }
            Item::Folder(folder) => {
                record.serialize_field("type", &ItemKind::Folder)?;
                record.serialize_field("folder", folder)?;
            }
        }
        record.end()
    }
}

/// Accepts plain paths and `file://` URLs (percent-encoded, trailing slash)
fn deserialize_location<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PathBuf, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(location_from_str(&raw))
}

/// A location in the form it takes after a round trip through the record
pub fn storable_location(location: PathBuf) -> PathBuf {
    match location.to_str() {
        Some(raw) if raw.starts_with("file://") => location_from_str(raw),
        Some(_) => location,
        None => PathBuf::from(location.to_string_lossy().into_owned()),
    }
}

fn location_from_str(raw: &str) -> PathBuf {
    match raw.strip_prefix("file://") {
        Some(rest) => {
            let decoded = percent_decode_str(rest).decode_utf8_lossy();
            let trimmed = decoded.trim_end_matches('/');
            if trimmed.is_empty() {
                PathBuf::from("/")
            } else {
                PathBuf::from(trimmed)
            }
        }
        None => PathBuf::from(raw),
    }
}

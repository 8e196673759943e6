//! Viewing and editing the item tree
//!
//! Commands: list, add-folder, add-app, rename, delete, move

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use appmenu_core::{scan, tree as item_tree, Item};
use clap::Parser;
use tracing::warn;

use super::{absolute_location, short_id, Session};

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Print the stored JSON instead of the indented outline
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct AddFolderArgs {
    /// Folder name
    pub name: String,

    /// Parent folder id or id prefix (default: root)
    #[arg(long, short)]
    pub parent: Option<String>,
}

#[derive(Parser, Debug)]
pub struct AddAppArgs {
    /// Path to the application bundle
    pub path: PathBuf,

    /// Display name (default: bundle name, then file name)
    #[arg(long, short)]
    pub name: Option<String>,

    /// Parent folder id or id prefix (default: root)
    #[arg(long, short)]
    pub parent: Option<String>,

    /// Position among the parent's children (default: append)
    #[arg(long, short)]
    pub index: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct RenameArgs {
    /// Item id or id prefix
    pub id: String,
    /// New name
    pub name: String,
}

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Item id or id prefix; folders are deleted with everything inside
    pub id: String,
}

#[derive(Parser, Debug)]
pub struct MoveArgs {
    /// Item id or id prefix
    pub id: String,

    /// Destination folder id or id prefix (default: root)
    #[arg(long, short)]
    pub parent: Option<String>,

    /// Position in the destination (default: append)
    #[arg(long, short)]
    pub index: Option<usize>,
}

pub fn run_list(session: &Session, args: ListArgs) -> Result<()> {
    let snapshot = session.store.snapshot();
    if args.json {
        let json = serde_json::to_string_pretty(&*snapshot).context("Failed to serialize items")?;
        println!("{}", json);
        return Ok(());
    }

    if snapshot.is_empty() {
        println!("(no items)");
        return Ok(());
    }
    print!("{}", outline(&snapshot));
    Ok(())
}

fn outline(items: &[Item]) -> String {
    item_tree::flatten(items)
        .into_iter()
        .map(|(depth, item)| {
            let indent = "  ".repeat(depth);
            match item {
                Item::Folder(folder) => {
                    format!("{}{}/  [{}]\n", indent, folder.name, short_id(folder.id))
                }
                Item::App(app) => format!(
                    "{}{}  [{}]  {}\n",
                    indent,
                    app.name,
                    short_id(app.id),
                    app.location.display()
                ),
            }
        })
        .collect()
}

pub fn run_add_folder(session: &mut Session, args: AddFolderArgs) -> Result<()> {
    let parent = session.resolve_parent(args.parent.as_deref())?;
    let id = session.store.add_folder(args.name.as_str(), parent);
    println!("Added folder '{}' [{}]", args.name, short_id(id));
    Ok(())
}

pub fn run_add_app(session: &mut Session, args: AddAppArgs) -> Result<()> {
    let parent = session.resolve_parent(args.parent.as_deref())?;
    let location = absolute_location(&args.path)?;
    if !location.exists() {
        warn!("{} does not exist; adding it anyway", location.display());
    }

    let name = args.name.unwrap_or_else(|| scan::display_name(&location));
    let id = session
        .store
        .add_app(location.clone(), Some(name.clone()), parent, args.index);
    println!("Added app '{}' [{}] -> {}", name, short_id(id), location.display());
    Ok(())
}

pub fn run_rename(session: &mut Session, args: RenameArgs) -> Result<()> {
    let id = session.resolve(&args.id)?;
    if session.store.rename(id, &args.name) {
        println!("Renamed [{}] to '{}'", short_id(id), args.name);
    } else {
        println!("[{}] is already named '{}'", short_id(id), args.name);
    }
    Ok(())
}

pub fn run_delete(session: &mut Session, args: DeleteArgs) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let snapshot = session.store.snapshot();
    let (name, removed) = item_tree::find(&snapshot, id)
        .map(|item| (item.name().to_string(), item_tree::count(std::slice::from_ref(item))))
        .ok_or_else(|| anyhow!("No item matches '{}'", args.id))?;

    session.store.delete(id);
    println!("Deleted '{}' ({} item(s))", name, removed);
    Ok(())
}

pub fn run_move(session: &mut Session, args: MoveArgs) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let parent = session.resolve_parent(args.parent.as_deref())?;

    if !item_tree::is_valid_move(&session.store.snapshot(), id, parent) {
        return Err(anyhow!("Cannot move an item into itself or one of its own folders"));
    }
    if session.store.move_item(id, parent, args.index) {
        println!("Moved [{}]", short_id(id));
    } else {
        println!("Nothing to move: [{}] is already there", short_id(id));
    }
    Ok(())
}

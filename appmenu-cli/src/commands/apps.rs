//! Discovering, importing and launching applications
//!
//! Commands: scan, import, menu, open

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use appmenu_core::menu::find_app;
use appmenu_core::{
    build_menu, render_text, scan_applications, AppCandidate, AppItem, AppMenuConfig, Launcher,
    MenuActions, MenuOptions, ScanReport, SystemLauncher,
};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use super::{short_id, Session};
use crate::ui;

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// Print candidates as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Target folder id or id prefix (default: "Applications" folder, else root)
    #[arg(long, short)]
    pub parent: Option<String>,

    /// Show what would be added without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Only candidates whose name or file name contains this text
    #[arg(long, short)]
    pub filter: Option<String>,

    /// Only the candidate with this exact name (repeatable)
    #[arg(long, value_name = "NAME")]
    pub only: Vec<String>,
}

impl ImportArgs {
    /// Narrow scan results to the requested subset, keeping scan order
    fn select(&self, apps: Vec<AppCandidate>) -> Vec<AppCandidate> {
        apps.into_iter()
            .filter(|app| self.filter.as_deref().map_or(true, |query| app.matches(query)))
            .filter(|app| {
                self.only.is_empty()
                    || self.only.iter().any(|name| name.eq_ignore_ascii_case(&app.name))
            })
            .collect()
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Status,
    Dock,
}

#[derive(Parser, Debug)]
pub struct MenuArgs {
    /// Which menu to render
    #[arg(long, value_enum, default_value = "status")]
    pub surface: Surface,
}

#[derive(Parser, Debug)]
pub struct OpenArgs {
    /// App id or id prefix
    pub id: String,
}

fn options_for(config: &AppMenuConfig, surface: Surface) -> MenuOptions {
    match surface {
        Surface::Status => config.status_menu,
        Surface::Dock => config.dock_menu,
    }
}

/// Scan the configured roots off the async runtime
async fn scan_roots(roots: Vec<PathBuf>) -> Result<ScanReport> {
    let report = ui::with_spinner_async(
        "Scanning for applications...",
        "Scan complete",
        async {
            tokio::task::spawn_blocking(move || scan_applications(&roots))
                .await
                .context("Application scan did not complete")
        },
    )
    .await?;

    for error in &report.errors {
        warn!("{}", error);
    }
    Ok(report)
}

pub async fn run_scan(session: &Session, args: ScanArgs) -> Result<()> {
    let report = scan_roots(session.config.store_options().scan_roots).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&report.apps).context("Failed to serialize scan")?;
        println!("{}", json);
        return Ok(());
    }
    for app in &report.apps {
        println!("{}\t{}", app.name, app.location.display());
    }
    info!("Found {} application(s)", report.apps.len());
    Ok(())
}

pub async fn run_import(session: &mut Session, args: ImportArgs) -> Result<()> {
    let parent = session.resolve_parent(args.parent.as_deref())?;
    let report = scan_roots(session.config.store_options().scan_roots).await?;
    if report.is_empty() {
        println!("No applications found");
        return Ok(());
    }

    let candidates = args.select(report.apps);
    if candidates.is_empty() {
        println!("No applications match the selection");
        return Ok(());
    }

    let target = session.store.import_target(parent);
    if args.dry_run {
        let pending = session.store.pending_import(&candidates, target);
        for app in &pending {
            println!("would add {}\t{}", app.name, app.location.display());
        }
        println!("{} application(s) would be imported", pending.len());
        return Ok(());
    }

    let added = session.store.import_apps(&candidates, parent);
    println!("Imported {} application(s)", added);
    Ok(())
}

pub fn run_menu(session: &Session, args: MenuArgs) -> Result<()> {
    let options = options_for(&session.config, args.surface);
    let entries = build_menu(&session.store.snapshot(), &options);
    print!("{}", render_text(&entries));
    Ok(())
}

/// Menu callbacks for a terminal session
struct TerminalActions<L: Launcher> {
    launcher: L,
}

impl<L: Launcher> MenuActions for TerminalActions<L> {
    fn launch(&self, app: &AppItem) {
        info!("Opening {} ({})", app.name, app.location.display());
        self.launcher.launch(&app.location);
    }

    fn open_settings(&self) {
        println!("{}", AppMenuConfig::config_path().display());
    }

    fn refresh_menus(&self) {}

    fn quit(&self) {}
}

pub fn run_open(session: &Session, args: OpenArgs) -> Result<()> {
    let id = session.resolve(&args.id)?;
    let entries = build_menu(&session.store.snapshot(), &MenuOptions::status_bar());
    let entry = find_app(&entries, id)
        .ok_or_else(|| anyhow!("[{}] is a folder; only apps can be opened", short_id(id)))?;

    let actions = TerminalActions {
        launcher: SystemLauncher,
    };
    entry.activate(&actions);
    Ok(())
}

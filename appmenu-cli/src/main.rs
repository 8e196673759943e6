//! appmenu CLI - organize applications into a nested launcher menu
//!
//! The tree lives in a JSON file in the per-user data directory. Every
//! command opens it, runs, and flushes pending changes before exiting:
//! - Tree editing (`list`, `add-folder`, `add-app`, `rename`, `delete`, `move`)
//! - Application discovery (`scan`, `import`)
//! - Menu preview and launching (`menu`, `open`)

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;
mod tracing_setup;
mod ui;

use commands::Session;

#[derive(Parser, Debug)]
#[command(
    name = "appmenu",
    author,
    version,
    about = "Organize applications into folders for a menu-bar and Dock launcher",
    long_about = "Keeps an ordered tree of applications and folders, seeds it from the \
                  installed applications on first run, and renders it as launcher menus."
)]
struct Cli {
    /// Suppress progress spinners (for script consumption)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Skip first-run seeding from installed applications
    #[arg(long, global = true, env = "APPMENU_NO_SEED")]
    no_seed: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the item tree
    List(commands::tree::ListArgs),
    /// Create a folder
    AddFolder(commands::tree::AddFolderArgs),
    /// Add an application
    AddApp(commands::tree::AddAppArgs),
    /// Rename an app or folder
    Rename(commands::tree::RenameArgs),
    /// Delete an app or folder (with its contents)
    Delete(commands::tree::DeleteArgs),
    /// Move an item to another folder or position
    Move(commands::tree::MoveArgs),
    /// List installed applications without changing anything
    Scan(commands::apps::ScanArgs),
    /// Add installed applications to the tree
    Import(commands::apps::ImportArgs),
    /// Preview a menu surface
    Menu(commands::apps::MenuArgs),
    /// Launch an application from the tree
    Open(commands::apps::OpenArgs),
    /// Manage appmenu configuration (path, show, init)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    ui::init_quiet_mode(cli.quiet);

    match cli.command {
        Commands::Config(args) => config::run_config(args),
        Commands::Completions(args) => run_completions(args),
        command => {
            let mut session = Session::open(cli.no_seed).await?;
            let result = run_store_command(&mut session, command).await;
            session.close().await;
            result
        }
    }
}

async fn run_store_command(session: &mut Session, command: Commands) -> Result<()> {
    match command {
        Commands::List(args) => commands::run_list(session, args),
        Commands::AddFolder(args) => commands::run_add_folder(session, args),
        Commands::AddApp(args) => commands::run_add_app(session, args),
        Commands::Rename(args) => commands::run_rename(session, args),
        Commands::Delete(args) => commands::run_delete(session, args),
        Commands::Move(args) => commands::run_move(session, args),
        Commands::Scan(args) => commands::run_scan(session, args).await,
        Commands::Import(args) => commands::run_import(session, args).await,
        Commands::Menu(args) => commands::run_menu(session, args),
        Commands::Open(args) => commands::run_open(session, args),
        Commands::Config(_) | Commands::Completions(_) => Ok(()),
    }
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}

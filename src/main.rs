//! `envman` — manage named environment profiles (`KEY=value` files) from the terminal.
//!
//! ## Reading guide (high level architecture)
//! - **`main()` / `run()`**: parses the command line, loads the config and dispatches.
//! - **`config::Config`**: where profiles live; loaded once and passed to every command.
//! - **`envfile`**: the profile line format (entries, comments, blanks), duplicate detection and
//!   the sort transforms. Everything that needs to know what an "entry" is goes through it.
//! - **`buffer::Buffer`**: the document model (a `Vec<String>` of lines) and the low-level editing
//!   operations (insert/delete/replace ranges).
//! - **`editor::Editor`**: the interactive profile editor: session state machine, key handling,
//!   rendering, and the backup-then-save protocol.
//! - **`viewer`**: the read-only variant of the editor screen.
//! - **`profiles`**: create/delete/list, plus `init` shell integration.
//! - **`terminal::TerminalGuard`**: switches the terminal into "raw mode" + an alternate screen, then
//!   reliably restores it on exit (even on panic unwind).

mod buffer;
mod config;
mod editor;
mod envfile;
mod logging;
mod profiles;
mod terminal;
mod types;
mod utils;
mod viewer;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use config::Config;
use crossterm::style::Stylize;
use envfile::SortMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "envman", version, about = "Manage named environment profiles")]
struct Args {
    /// Config file to use instead of `<config_dir>/envman/config.toml`
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Create, edit, view, delete or list profiles
    #[command(subcommand)]
    Profile(ProfileCmd),
    /// Install the `envman load <profile>` shell function
    ///
    /// `envman init - [shell]` prints the function for `eval`; plain `envman init` offers to
    /// append it to your shell rc file or copy it to the clipboard.
    Init {
        /// `-` to print the shell function to stdout
        #[arg(value_name = "-")]
        print: Option<String>,
        /// bash, zsh or fish (detected from $SHELL when omitted)
        shell: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCmd {
    /// Create a new, empty profile
    Create { name: String },
    /// Delete a profile (asks for confirmation)
    Delete { name: String },
    /// List all profiles
    List,
    /// Open a profile in the interactive editor
    Edit {
        name: String,
        /// Sort applied on open (overrides `default_sort`)
        #[arg(long, value_enum)]
        sort: Option<SortMode>,
    },
    /// Show a profile read-only
    View { name: String },
}

/// Program entry point.
fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "✗ Error:".red().bold());
        std::process::exit(1);
    }
}

/// Parses arguments, sets up logging and config, then runs one command.
fn run() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = logging::default_log_path() {
        // Logging is best effort; the tool works without it.
        let _ = logging::init(path);
    }

    let config_path = match args.config {
        Some(p) => p,
        None => config::default_config_path()?,
    };
    Config::ensure(&config_path)?;
    let config = Config::load(&config_path)?;
    tracing::debug!(config = %config_path.display(), command = ?args.command, "starting");

    match args.command {
        Cmd::Profile(cmd) => match cmd {
            ProfileCmd::Create { name } => profiles::create(&config, &name),
            ProfileCmd::Delete { name } => profiles::delete(&config, &name),
            ProfileCmd::List => profiles::list(&config),
            ProfileCmd::Edit { name, sort } => editor::edit_profile(&config, &name, sort),
            ProfileCmd::View { name } => viewer::view_profile(&config, &name),
        },
        Cmd::Init { print, shell } => {
            let print_only = match print.as_deref() {
                None => false,
                Some("-") => true,
                Some(other) => bail!("unexpected argument '{other}' (use `envman init - [shell]`)"),
            };
            profiles::shell::init(&config, print_only, shell)
        }
    }
}

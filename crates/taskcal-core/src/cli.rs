use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskcal",
    version,
    about = "Import a project-management JSON export and view it as a calendar",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Config file to read instead of ~/.taskcalrc
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Data directory holding the state snapshot
    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Load a task export (a file, or '-' for stdin), replacing tasks and sections
    Import {
        /// Path to the exported JSON, or '-' to read pasted text from stdin
        file: PathBuf,
    },

    /// Show the calendar event feed derived from the current state
    Events {
        /// Emit the raw JSON feed for the calendar widget instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List all loaded tasks
    Tasks,

    /// List tasks without a due date, grouped by section
    Undated,

    /// List sections with their colors and visibility
    Sections,

    /// Flip a section's visibility on the calendar
    Toggle { section: String },

    /// Set a section's display color
    Color { section: String, color: String },

    /// Flip whether completed tasks are shown
    Completed,

    /// Rename the project
    Rename { name: String },

    /// Clear tasks, sections, and filters; the project name is kept
    Reset,

    /// Summarize the current state
    Show,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

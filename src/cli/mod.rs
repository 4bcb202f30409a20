//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Overrides;

pub mod commands;

/// Quotebook CLI - categorised quotes, reconciled with a remote source
#[derive(Parser, Debug)]
#[command(name = "qb", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: <data-dir>/quotebook.db)
    #[arg(long, global = true, env = "QB_DB")]
    pub db: Option<PathBuf>,

    /// Data directory (default: ~/.quotebook)
    #[arg(long, global = true, env = "QB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Remote quote source base URL
    #[arg(long, global = true, env = "QB_REMOTE_URL")]
    pub remote: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Configuration values given on the command line.
    #[must_use]
    pub fn overrides(&self) -> Overrides<'_> {
        Overrides {
            data_dir: self.data_dir.as_deref(),
            db_path: self.db.as_deref(),
            remote_url: self.remote.as_deref(),
            sync_interval_secs: None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show a random quote from the current filter
    Show,

    /// Show the last quote viewed in this terminal session
    Last {
        /// Forget the last viewed quote instead
        #[arg(long)]
        clear: bool,
    },

    /// Add a quote and post it to the remote
    Add {
        /// Quote text
        text: String,

        /// Category
        category: String,

        /// Keep the quote local, do not post it
        #[arg(long)]
        no_post: bool,
    },

    /// List quotes
    List {
        /// Show this category instead of the saved filter (`all` for everything)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List categories
    Categories,

    /// Set the category filter (`all` to clear)
    Filter {
        /// Category name or `all`
        selection: String,
    },

    /// Reconcile once with the remote source
    Sync,

    /// Reconcile periodically until interrupted
    Watch {
        /// Seconds between cycles (default: from config, 30)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Export all quotes as a JSON document
    Export {
        /// Output file (default: stdout; bare flag: quotes.json)
        #[arg(short, long, num_args = 0..=1, default_missing_value = crate::sync::DEFAULT_EXPORT_FILE)]
        output: Option<PathBuf>,
    },

    /// Import quotes from JSON or JSONL (additive)
    Import {
        /// File to import
        file: PathBuf,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show,

    /// Store settings in config.json
    Set {
        /// Remote quote source base URL
        #[arg(long)]
        remote_url: Option<String>,

        /// Seconds between periodic sync cycles
        #[arg(long)]
        sync_interval: Option<u64>,

        /// HTTP request timeout in seconds
        #[arg(long)]
        request_timeout: Option<u64>,
    },
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

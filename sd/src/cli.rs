//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// siftdaemon - guided search dialogs over a line corpus
#[derive(Parser)]
#[command(
    name = "sd",
    about = "Per-user guided search dialogs over a static line corpus",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Corpus file (overrides the config)
    #[arg(short = 'f', long, global = true)]
    pub corpus: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read JSON-line events from stdin, write JSON-line directives to stdout
    Serve,

    /// Run one interactive session in the terminal
    Console {
        /// Session key for this terminal
        #[arg(short, long, default_value = "console")]
        user: String,

        /// Name used in the greeting
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Load the corpus and site list, print what was found, and exit
    Check,
}

/// Location of the daemon log file
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("siftdaemon")
        .join("logs")
        .join("siftdaemon.log")
}

//! CLI argument parsing for corpusstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cs")]
#[command(author, version, about = "Capped line filters over a text corpus", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Corpus file (overrides the config)
    #[arg(short = 'f', long)]
    pub corpus: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show statistics for the corpus
    Stats,

    /// Lines containing a site name (the part before the first dot)
    Filter {
        /// Site name or domain, e.g. `example` or `example.com`
        #[arg(required = true)]
        site: String,

        /// Maximum results to return (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,
    },

    /// Lines containing one of the configured sites on a token boundary
    Common {
        /// Extra domains on top of the configured list
        #[arg(short, long)]
        site: Vec<String>,

        /// Maximum results to return (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,
    },

    /// Lines containing free text
    Search {
        /// Text to look for (case-insensitive)
        #[arg(required = true)]
        term: String,

        /// Maximum results to return (0 = all)
        #[arg(short, long, default_value = "0")]
        limit: usize,
    },
}

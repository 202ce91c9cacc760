//! CLI argument definitions using clap
//!
//! Commands:
//! - docstore init --config <path>
//! - docstore create --config <path> <name> [--schema <json>]
//! - docstore read --config <path> <name>
//! - docstore update --config <path> <name> [--new-name <new>] [--schema <json>]
//! - docstore delete --config <path> <name>
//! - docstore list --config <path> [--limit <n>] [--offset <n>]
//!
//! A `--schema` value of `-` reads the schema JSON from stdin.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docstore - collection catalog of a minimal document store
#[derive(Parser, Debug)]
#[command(name = "docstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Initialize a new data directory with an empty catalog
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./docstore.json")]
        config: PathBuf,
    },

    /// Create a collection
    Create {
        /// Path to configuration file
        #[arg(long, default_value = "./docstore.json")]
        config: PathBuf,

        /// Collection name
        name: String,

        /// Attribute schema as JSON
        #[arg(long)]
        schema: Option<String>,
    },

    /// Show a collection and its schema
    Read {
        /// Path to configuration file
        #[arg(long, default_value = "./docstore.json")]
        config: PathBuf,

        /// Collection name
        name: String,
    },

    /// Rename a collection and/or replace its schema
    Update {
        /// Path to configuration file
        #[arg(long, default_value = "./docstore.json")]
        config: PathBuf,

        /// Current collection name
        name: String,

        /// New collection name
        #[arg(long)]
        new_name: Option<String>,

        /// Replacement attribute schema as JSON
        #[arg(long)]
        schema: Option<String>,
    },

    /// Delete a collection and its artifacts
    Delete {
        /// Path to configuration file
        #[arg(long, default_value = "./docstore.json")]
        config: PathBuf,

        /// Collection name
        name: String,
    },

    /// List collections in creation order
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./docstore.json")]
        config: PathBuf,

        /// Page size (defaults to the configured page limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Number of collections to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

//! CLI argument definitions using clap
//!
//! - cir validate form.json --answers answers.json
//! - cir resolve form.json
//! - cir catalog [--item-type MENU]
//! - cir config show|init

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cir")]
#[command(about = "Validate clinical intake documents against an item-type catalog")]
#[command(version)]
pub struct Cli {
    /// Catalog file to use instead of the built-in catalog
    #[arg(long, global = true, env = "CIR_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Node evaluations allowed per SCRIPT validator run
    #[arg(long, global = true, env = "CIR_MAX_SCRIPT_STEPS")]
    pub max_script_steps: Option<u32>,

    /// Path to the config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate a document against submitted answers and print the report.
    /// Exits 0 when every item passes, 1 when any fails, 2 when the
    /// document itself is rejected.
    #[command(verbatim_doc_comment)]
    Validate {
        /// Document JSON file
        document: PathBuf,

        /// Answers JSON file (object keyed by item id); none when omitted
        #[arg(long)]
        answers: Option<PathBuf>,
    },

    /// Print each item's effective hints and flag
    Resolve {
        /// Document JSON file
        document: PathBuf,
    },

    /// Print the active catalog, or one item type's rule
    Catalog {
        #[arg(long)]
        item_type: Option<String>,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// src/cli/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::application::{ImportStrategy, ReviewOutcome, SortMode};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to the JSON store (overrides the config file)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub store: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render a note with its question references resolved
    Render {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        /// Wrap the body in a standalone HTML page
        #[arg(long)]
        page: bool,

        /// Write the page to a temp file and open it in the browser
        #[arg(long, requires = "page")]
        open: bool,
    },

    /// Print the folder tree of all notes
    Tree {
        /// Note order inside a folder (default from config)
        #[arg(long, value_enum)]
        sort: Option<SortMode>,

        /// Only keep notes and folders matching this text
        #[arg(short, long, value_name = "QUERY")]
        query: Option<String>,
    },

    /// List questions due for review, most overdue first
    Due,

    /// Rate a question after reviewing it
    Rate {
        #[arg(value_name = "QUESTION_ID")]
        question_id: String,

        #[arg(value_enum)]
        outcome: ReviewOutcome,
    },

    /// Declare a folder and its ancestors
    Folder {
        /// Slash-delimited path, e.g. Math/Algebra
        #[arg(value_name = "PATH")]
        path: String,
    },

    /// List saved versions of a note, newest first
    Versions {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,
    },

    /// Restore a note to a saved version
    Restore {
        #[arg(value_name = "NOTE_ID")]
        note_id: String,

        #[arg(value_name = "VERSION_ID")]
        version_id: String,
    },

    /// Import a backup document
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// How to combine with existing records
        #[arg(long, value_enum, default_value_t = ImportStrategy::Merge)]
        strategy: ImportStrategy,

        /// Only print what the import would do
        #[arg(long)]
        dry_run: bool,
    },

    /// Export everything as a backup document
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

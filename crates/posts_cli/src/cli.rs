//! Command-line surface for the `posts` binary.
//!
//! Flags fall back to `POSTS_*` environment variables.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Manage posts stored in a local SQLite database.
#[derive(Debug, Parser)]
#[command(name = "posts", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// SQLite database file; created and migrated on first use.
    #[arg(long, env = "POSTS_DB", default_value = "posts.sqlite3", global = true)]
    pub db: PathBuf,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, env = "POSTS_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "POSTS_LOG_DIR", global = true)]
    pub log_dir: Option<String>,

    /// Print JSON instead of text lines.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a post.
    Add {
        title: String,

        #[arg(long, default_value = "")]
        content: String,

        #[arg(long)]
        author: Option<String>,
    },

    /// Show one post.
    Get { id: i64 },

    /// List posts, newest first.
    #[command(alias = "ls")]
    List {
        /// Oldest first.
        #[arg(long)]
        asc: bool,
    },

    /// Change fields of an existing post.
    Update {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long, conflicts_with = "clear_author")]
        author: Option<String>,

        /// Remove the author.
        #[arg(long)]
        clear_author: bool,
    },

    /// Delete a post.
    #[command(alias = "rm")]
    Delete { id: i64 },

    /// Print the number of posts.
    Count,

    /// Open the database and print core and schema versions.
    Ping,
}

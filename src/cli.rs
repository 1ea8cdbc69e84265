//! Command-line interface definitions for dupfind.
//!
//! This module defines all CLI arguments using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Find duplicates under two directories
//! dupfind ~/Downloads ~/Documents
//!
//! # Only files at least one level below the roots, at most 3 levels deep
//! dupfind --mindepth 1 --maxdepth 3 ~/Downloads
//!
//! # Only files of at most 1 KiB, as JSON
//! dupfind --size -1k --output json ~/Downloads
//!
//! # Verbose mode for debugging
//! dupfind -v ~/Downloads
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Find groups of byte-identical files.
///
/// Files are first bucketed by size; only files whose size collides with
/// another file are read and digested, and files sharing a digest are
/// reported together.
#[derive(Debug, Parser)]
#[command(name = "dupfind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to search
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Ignore files shallower than this depth (roots are depth 0)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub mindepth: usize,

    /// Do not descend deeper than this depth
    #[arg(long, value_name = "N")]
    pub maxdepth: Option<usize>,

    /// Size filter: [+|-]N[c|w|b|k|M|G]
    ///
    /// `+N` keeps files of at least N, `-N` files of at most N, `N` files of
    /// exactly N. Units: c (bytes, default), w (2 bytes), b (512 bytes),
    /// k (KiB), M (MiB), G (GiB).
    ///
    /// Unlike find(1), a number without a unit counts bytes, not 512-byte
    /// blocks: `--size +100` means at least 100 bytes.
    #[arg(long, value_name = "EXPR", allow_hyphen_values = true)]
    pub size: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Number of threads used to digest files (1 = fully streaming)
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Read buffer size in bytes used while digesting
    #[arg(long, value_name = "BYTES")]
    pub buffer_size: Option<usize>,

    /// Settings file to load instead of the platform default
    #[arg(long, value_name = "PATH", env = "DUPFIND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and results
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Do not show progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One path per line, groups separated by blank lines
    #[default]
    Text,
    /// JSON document for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

//! Command-line interface definitions.
//!
//! Defined with the clap derive API. Positional arguments are glob patterns;
//! everything else tunes the grouping or its presentation.
//!
//! # Example
//!
//! ```bash
//! # Group everything in the current directory with the default algorithm
//! dupegroup
//!
//! # Pick files with patterns and a cheaper checksum
//! dupegroup -a crc32 'photos/*.jpg' 'backup/*.jpg'
//!
//! # Include unique files and emit JSON
//! dupegroup --show-all --output json 'data/*'
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scanner::Algorithm;

/// Find groups of byte-identical files.
///
/// Files are first grouped by size; only files that share a size are hashed.
#[derive(Debug, Parser)]
#[command(name = "dupegroup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Glob patterns selecting the files to compare [default: ./*]
    #[arg(value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// The algorithm to use for file content reduction [default: sha256]
    ///
    /// One of: adler32, crc32, crc64, fnv1a, md5, sha1, sha256, sha512
    /// (case-insensitive).
    #[arg(short, long, value_name = "ALGORITHM", value_parser = parse_algorithm)]
    pub algorithm: Option<Algorithm>,

    /// Show all files, even the unique ones
    #[arg(short, long)]
    pub show_all: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Number of I/O threads for hashing (1 = sequential) [default: 4]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Path to a TOML config file
    ///
    /// If not specified, the platform-specific default location is used when it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// List the supported algorithms and exit
    #[arg(long)]
    pub list_algorithms: bool,

    /// Increase verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for grouping results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON output for scripting
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

/// Parse an algorithm identifier, suggesting a close match on failure.
///
/// # Examples
///
/// ```
/// use dupegroup::cli::parse_algorithm;
/// use dupegroup::scanner::Algorithm;
///
/// assert_eq!(parse_algorithm("MD5").unwrap(), Algorithm::Md5);
/// assert!(parse_algorithm("sha3000").is_err());
/// ```
///
/// # Errors
///
/// Returns the registry's error message listing every valid identifier.
pub fn parse_algorithm(s: &str) -> Result<Algorithm, String> {
    Algorithm::resolve(s).map_err(|e| match Algorithm::suggest(s) {
        Some(hint) => format!("{e} (did you mean '{hint}'?)"),
        None => e.to_string(),
    })
}

//! JSON output formatter for grouping results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "algorithm": { "identifier": "sha256", "name": "SHA-256", "digest_bits": 256 },
//!   "groups": [
//!     {
//!       "size": 4,
//!       "digest": "63c1dd95...",
//!       "count": 2,
//!       "files": ["./a.txt", "./b.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 4,
//!     "hashed_files": 3,
//!     "duplicate_groups": 1,
//!     "reclaimable_space": 4,
//!     "exit_code": 0,
//!     "exit_code_name": "DG000"
//!   }
//! }
//! ```
//!
//! Singleton groups have `"digest": null` when their size was unique.

use std::io::Write;

use serde::Serialize;

use super::select_groups;
use crate::duplicates::{FileGroups, GroupingStats};
use crate::error::ExitCode;
use crate::scanner::Algorithm;

/// The algorithm block of the report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonAlgorithm {
    /// Registry token (e.g. "sha256")
    pub identifier: &'static str,
    /// Display name (e.g. "SHA-256")
    pub name: &'static str,
    /// Digest width in bits
    pub digest_bits: usize,
}

impl From<Algorithm> for JsonAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        Self {
            identifier: algorithm.identifier(),
            name: algorithm.name(),
            digest_bits: algorithm.output_len() * 8,
        }
    }
}

/// A single group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// File size in bytes
    pub size: u64,
    /// Hex digest, or null for a group settled by size alone
    pub digest: Option<String>,
    /// Number of member files
    pub count: usize,
    /// Member paths, sorted
    pub files: Vec<String>,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Counters from the grouping run
    #[serde(flatten)]
    pub stats: GroupingStats,
    /// Percentage of files that never needed hashing
    pub elimination_rate: f64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DG000")
    pub exit_code_name: String,
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Algorithm used to refine size collisions
    pub algorithm: JsonAlgorithm,
    /// Selected groups, ordered by size then digest
    pub groups: Vec<JsonGroup>,
    /// Run summary
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the report from a finished grouping.
    #[must_use]
    pub fn new(
        algorithm: Algorithm,
        groups: &FileGroups,
        stats: &GroupingStats,
        show_all: bool,
        exit_code: ExitCode,
    ) -> Self {
        let groups = select_groups(groups, show_all)
            .into_iter()
            .map(|group| JsonGroup {
                size: group.key.size,
                digest: group.key.digest.clone(),
                count: group.files.len(),
                files: group
                    .files
                    .iter()
                    .map(|p| p.to_string_lossy().into_owned())
                    .collect(),
            })
            .collect();

        Self {
            algorithm: algorithm.into(),
            groups,
            summary: JsonSummary {
                stats: stats.clone(),
                elimination_rate: stats.elimination_rate(),
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        writer.flush()
    }
}

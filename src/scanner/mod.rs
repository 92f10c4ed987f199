//! Scanner module for candidate discovery and content digests.
//!
//! This module provides functionality for:
//! - Expanding glob patterns into a candidate list
//! - Selecting a digest algorithm by identifier
//! - Streaming file content through the selected digest
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`patterns`]: Glob expansion and de-duplication
//! - [`algorithm`]: The closed registry of digest algorithms
//! - [`hasher`]: Streaming file hashing
//!
//! # Example
//!
//! ```no_run
//! use dupegroup::scanner::{expand_patterns, Algorithm, FileHasher};
//!
//! let algorithm = Algorithm::resolve("crc64").unwrap();
//! let hasher = FileHasher::new(algorithm);
//!
//! for path in expand_patterns(&["./*".to_string()]).unwrap() {
//!     if path.is_file() {
//!         println!("{}  {}", hasher.digest_file(&path).unwrap(), path.display());
//!     }
//! }
//! ```

pub mod algorithm;
pub mod hasher;
pub mod patterns;

use std::path::PathBuf;

// Re-export main types
pub use algorithm::{render_digest, Algorithm, AlgorithmError, ContentHasher};
pub use hasher::{digest_of, Digester, FileHasher, CHUNK_SIZE};
pub use patterns::{expand_patterns, DEFAULT_PATTERN};

/// Errors that can occur while expanding input patterns.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The pattern is not valid glob syntax.
    #[error("Invalid pattern '{pattern}'")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Parser error from the glob crate
        #[source]
        source: glob::PatternError,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file could not be opened for reading.
    #[error("Failed to open {path}")]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading failed part-way through the file.
    #[error("Failed to read {path}")]
    Read {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Hashing stopped because shutdown was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),
}

impl HashError {
    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } | Self::Interrupted(path) => path,
        }
    }
}

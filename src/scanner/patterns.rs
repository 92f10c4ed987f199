//! Glob pattern expansion into a candidate file list.
//!
//! Patterns are expanded with the `glob` crate. Matches from all patterns are
//! merged into a set, so a file named by two overlapping patterns is only
//! considered once. Entries that cannot be read during expansion are skipped
//! with a warning; a malformed pattern is an error.

use std::collections::BTreeSet;
use std::path::PathBuf;

use super::ScanError;

/// Pattern used when no patterns are given.
pub const DEFAULT_PATTERN: &str = "./*";

/// Expand glob patterns into a sorted, de-duplicated list of paths.
///
/// Directories are included if they match; the size partitioner skips them.
///
/// # Errors
///
/// Returns [`ScanError::InvalidPattern`] for a syntactically invalid pattern.
///
/// # Example
///
/// ```no_run
/// use dupegroup::scanner::expand_patterns;
///
/// let files = expand_patterns(&["*.txt".to_string(), "docs/*".to_string()]).unwrap();
/// println!("{} candidates", files.len());
/// ```
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = BTreeSet::new();

    for pattern in patterns {
        let matches = glob::glob(pattern).map_err(|source| ScanError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;

        let before = files.len();
        for entry in matches {
            match entry {
                Ok(path) => {
                    files.insert(path);
                }
                Err(e) => {
                    log::warn!("Skipping unreadable entry {}: {}", e.path().display(), e);
                }
            }
        }
        log::debug!(
            "Pattern '{}' added {} path(s)",
            pattern,
            files.len() - before
        );
    }

    Ok(files.into_iter().collect())
}

//! Group keys and size-based partitioning.
//!
//! # Overview
//!
//! Files are grouped under a [`GroupKey`] of `(size, digest)`. Size
//! partitioning (Phase 1) produces keys with no digest. The hash phase in
//! [`crate::duplicates::finder`] replaces every bucket holding two or more
//! files with buckets keyed by size and digest; singleton buckets are never
//! touched, so their key never gains a digest.
//!
//! Files with different sizes cannot be duplicates, so this phase alone
//! settles most files without reading a single byte of content.
//!
//! # Example
//!
//! ```no_run
//! use dupegroup::duplicates::{partition_by_size, GroupKey};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")];
//! let (groups, stats) = partition_by_size(&paths).unwrap();
//!
//! for (key, files) in &groups {
//!     println!("{}: {} file(s)", key, files.len());
//! }
//! println!("{} size collision bucket(s)", stats.size_collisions);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::FinderError;

/// Identifies a group of files considered equal at the current stage.
///
/// Ordering is by size, then digest, with the size-only key first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    /// File size in bytes (shared by every member)
    pub size: u64,
    /// Hex content digest, present once the group has been refined
    pub digest: Option<String>,
}

impl GroupKey {
    /// Key for a bucket that has only been partitioned by size.
    #[must_use]
    pub fn by_size(size: u64) -> Self {
        Self { size, digest: None }
    }

    /// Key for a bucket refined by content digest.
    #[must_use]
    pub fn with_digest(size: u64, digest: impl Into<String>) -> Self {
        Self {
            size,
            digest: Some(digest.into()),
        }
    }

    /// Whether this key carries a content digest.
    #[must_use]
    pub fn is_refined(&self) -> bool {
        self.digest.is_some()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_size(self.size))?;
        if let Some(ref digest) = self.digest {
            write!(f, " ({digest})")?;
        }
        Ok(())
    }
}

const IEC_PREFIXES: [&str; 7] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];

/// Format a byte count with binary IEC prefixes and 4 significant digits.
///
/// Trailing zeros are dropped, so `1024` is `"1 KiB"` and `1025` is
/// `"1.001 KiB"`. Distinct sizes below 1 KiB always render distinctly.
///
/// ```
/// use dupegroup::duplicates::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1075), "1.05 KiB");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    let mut prefix = 0;
    while prefix + 1 < IEC_PREFIXES.len() && bytes >= 1u64 << (10 * (prefix + 1)) {
        prefix += 1;
    }
    let value = bytes as f64 / (1u64 << (10 * prefix)) as f64;
    format!("{} {}B", significant_digits(value, 4), IEC_PREFIXES[prefix])
}

/// Render `value` (non-negative) with at most `digits` significant digits.
fn significant_digits(value: f64, digits: i32) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.log10().floor() as i32;
    let decimals = (digits - 1 - magnitude).max(0) as usize;
    let rendered = format!("{value:.decimals$}");
    if rendered.contains('.') {
        rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        rendered
    }
}

/// Files grouped by key. Insertion order within a group is preserved.
pub type FileGroups = HashMap<GroupKey, Vec<PathBuf>>;

/// Statistics from a grouping run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Number of input paths
    pub total_paths: usize,
    /// Directories skipped during size partitioning
    pub directories_skipped: usize,
    /// Files placed into groups
    pub total_files: usize,
    /// Total size of all grouped files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Size buckets with 2+ files (the ones that get hashed)
    pub size_collisions: usize,
    /// Files whose content was hashed
    pub hashed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Number of final groups
    pub groups: usize,
    /// Final groups with 2+ files
    pub duplicate_groups: usize,
    /// Files beyond the first in each duplicate group
    pub duplicate_files: usize,
    /// Bytes that could be reclaimed by keeping one copy per group
    pub reclaimable_space: u64,
}

impl GroupingStats {
    /// Percentage of files settled by size alone (never hashed).
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            ((self.total_files - self.hashed_files) as f64 / self.total_files as f64) * 100.0
        }
    }

    /// Fill in the final-group counters from a finished grouping.
    pub fn record_groups(&mut self, groups: &FileGroups) {
        self.groups = groups.len();
        self.duplicate_groups = 0;
        self.duplicate_files = 0;
        self.reclaimable_space = 0;
        for (key, files) in groups {
            if files.len() > 1 {
                let copies = files.len() - 1;
                self.duplicate_groups += 1;
                self.duplicate_files += copies;
                self.reclaimable_space += key.size * copies as u64;
            }
        }
    }
}

/// Group paths by exact file size (Phase 1).
///
/// Metadata follows symlinks. Directories are skipped. Any metadata failure
/// aborts the whole operation: an incomplete size census would silently hide
/// duplicates.
///
/// # Errors
///
/// Returns [`FinderError::Metadata`] naming the first path that could not be
/// inspected.
pub fn partition_by_size<P: AsRef<Path>>(
    paths: &[P],
) -> Result<(FileGroups, GroupingStats), FinderError> {
    let mut groups = FileGroups::new();
    let mut stats = GroupingStats {
        total_paths: paths.len(),
        ..Default::default()
    };

    for path in paths {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|source| FinderError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;

        if metadata.is_dir() {
            stats.directories_skipped += 1;
            log::debug!("Skipping directory: {}", path.display());
            continue;
        }

        let size = metadata.len();
        stats.total_files += 1;
        stats.total_size += size;
        groups
            .entry(GroupKey::by_size(size))
            .or_default()
            .push(path.to_path_buf());
    }

    stats.unique_sizes = groups.len();
    stats.size_collisions = groups.values().filter(|files| files.len() > 1).count();

    log::info!(
        "Phase 1 complete: {} files in {} size bucket(s), {} collision(s)",
        stats.total_files,
        stats.unique_sizes,
        stats.size_collisions
    );

    Ok((groups, stats))
}

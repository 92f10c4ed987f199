//! Report formatters for grouping results.
//!
//! - Text for terminals
//! - JSON for automation and scripting
//!
//! Both formatters present the same selection: groups ordered by key,
//! members ordered by path, and singletons dropped unless `show_all` is set.
//!
//! # Example
//!
//! ```no_run
//! use dupegroup::duplicates::DuplicateFinder;
//! use dupegroup::output::TextOutput;
//! use dupegroup::scanner::Algorithm;
//!
//! let finder = DuplicateFinder::with_defaults(Algorithm::Sha256);
//! let (groups, _stats) = finder.find_duplicates(&["a.txt", "b.txt"]).unwrap();
//!
//! let output = TextOutput::new(Algorithm::Sha256, &groups, false).with_color(true);
//! output.write_to(&mut std::io::stdout()).unwrap();
//! ```

pub mod json;
pub mod text;

use std::path::PathBuf;

use crate::duplicates::{FileGroups, GroupKey};

pub use json::JsonOutput;
pub use text::TextOutput;

/// A group selected for presentation, with members in path order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportGroup<'a> {
    /// The group's key
    pub key: &'a GroupKey,
    /// Sorted member paths
    pub files: Vec<&'a PathBuf>,
}

/// Select and order the groups to present.
///
/// Groups come back sorted by key (size, then digest). Single-member groups
/// are included only when `show_all` is true.
#[must_use]
pub fn select_groups(groups: &FileGroups, show_all: bool) -> Vec<ReportGroup<'_>> {
    let mut selected: Vec<ReportGroup<'_>> = groups
        .iter()
        .filter(|(_, files)| show_all || files.len() > 1)
        .map(|(key, files)| {
            let mut files: Vec<&PathBuf> = files.iter().collect();
            files.sort();
            ReportGroup { key, files }
        })
        .collect();
    selected.sort_by(|a, b| a.key.cmp(b.key));
    selected
}

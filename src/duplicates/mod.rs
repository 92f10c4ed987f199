//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Content-hash refinement of size collisions (Phase 2)
//! - Group keys and run statistics

pub mod finder;
pub mod groups;

pub use finder::{
    compute_groups, refine_by_hash, refine_with, DuplicateFinder, FinderConfig, FinderError,
};
pub use groups::{format_size, partition_by_size, FileGroups, GroupKey, GroupingStats};

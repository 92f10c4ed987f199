//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the grouping pipeline:
//! 1. **Phase 1 - Size grouping**: Bucket files by exact size (see
//!    [`crate::duplicates::groups`])
//! 2. **Phase 2 - Content hash**: Re-bucket only the size collisions by full
//!    content digest
//!
//! A file whose size is unique is never opened. Hashing cost is paid only for
//! files that already collide on size.
//!
//! # Example
//!
//! ```no_run
//! use dupegroup::duplicates::{DuplicateFinder, FinderConfig};
//! use dupegroup::scanner::Algorithm;
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a.bin"), PathBuf::from("b.bin")];
//! let finder = DuplicateFinder::new(Algorithm::Sha256, FinderConfig::default());
//! let (groups, stats) = finder.find_duplicates(&paths).unwrap();
//!
//! println!("{} group(s), {} duplicate(s)", stats.groups, stats.duplicate_files);
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{partition_by_size, FileGroups, GroupKey, GroupingStats};
use crate::progress::ProgressCallback;
use crate::scanner::{Algorithm, Digester, FileHasher, HashError};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for hashing.
    /// 1 hashes sequentially; the default of 4 limits open handles and disk thrashing.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The run was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// File metadata could not be read during size partitioning.
    #[error("Failed to get file size of {path}")]
    Metadata {
        /// Path that could not be inspected
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be hashed during refinement.
    #[error(transparent)]
    Hash(HashError),
}

impl From<HashError> for FinderError {
    fn from(err: HashError) -> Self {
        match err {
            HashError::Interrupted(_) => Self::Interrupted,
            other => Self::Hash(other),
        }
    }
}

/// Refine size buckets by content digest (Phase 2), sequentially.
///
/// Buckets with a single file are carried over untouched. Every other bucket
/// is replaced by buckets keyed by `(size, digest)`.
///
/// # Errors
///
/// The first file that cannot be hashed aborts the whole operation.
///
/// # Example
///
/// ```no_run
/// use dupegroup::duplicates::{partition_by_size, refine_by_hash};
/// use dupegroup::scanner::Algorithm;
/// use std::path::PathBuf;
///
/// let paths = vec![PathBuf::from("a"), PathBuf::from("b")];
/// let (size_groups, _) = partition_by_size(&paths).unwrap();
/// let groups = refine_by_hash(size_groups, Algorithm::Crc32).unwrap();
/// ```
pub fn refine_by_hash(groups: FileGroups, algorithm: Algorithm) -> Result<FileGroups, FinderError> {
    let config = FinderConfig::default().with_io_threads(1);
    let mut stats = GroupingStats::default();
    refine_with(groups, &FileHasher::new(algorithm), &config, &mut stats)
}

/// Refine size buckets by content digest using any [`Digester`].
///
/// Builds a fresh map rather than mutating `groups` in place. With
/// `io_threads > 1`, files are hashed on a dedicated pool of that many
/// workers. The first failure cancels the remaining work and is the error
/// returned. Bucket contents follow input order regardless of which file
/// finishes first.
///
/// Updates `hashed_files` and `bytes_hashed` in `stats`.
///
/// # Errors
///
/// Returns [`FinderError::Hash`] for the first file that could not be hashed,
/// or [`FinderError::Interrupted`] if shutdown was requested.
pub fn refine_with<D: Digester + ?Sized>(
    groups: FileGroups,
    digester: &D,
    config: &FinderConfig,
    stats: &mut GroupingStats,
) -> Result<FileGroups, FinderError> {
    let mut refined = FileGroups::with_capacity(groups.len());
    let mut collisions: Vec<(u64, Vec<PathBuf>)> = Vec::new();

    for (key, files) in groups {
        if files.len() <= 1 {
            refined.insert(key, files);
        } else {
            log::debug!("Size bucket {} bytes: {} files to hash", key.size, files.len());
            collisions.push((key.size, files));
        }
    }

    // Visit buckets in a stable order so progress and logs are reproducible.
    collisions.sort_by_key(|(size, _)| *size);
    let jobs: Vec<(u64, PathBuf)> = collisions
        .into_iter()
        .flat_map(|(size, files)| files.into_iter().map(move |f| (size, f)))
        .collect();

    if jobs.is_empty() {
        log::debug!("Phase 2: No size collisions, nothing to hash");
        return Ok(refined);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("hashing", jobs.len());
    }
    log::info!("Phase 2: Hashing {} files", jobs.len());

    let hashed = if config.io_threads <= 1 {
        hash_sequential(&jobs, digester, config)
    } else {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.io_threads)
            .build()
        {
            Ok(pool) => pool.install(|| hash_parallel(&jobs, digester, config)),
            Err(e) => {
                log::warn!("Failed to create hashing thread pool, hashing sequentially: {}", e);
                hash_sequential(&jobs, digester, config)
            }
        }
    };

    // End the phase on failure too.
    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("hashing");
    }
    let digests = hashed?;

    for ((size, path), digest) in jobs.into_iter().zip(digests) {
        stats.hashed_files += 1;
        stats.bytes_hashed += size;
        refined
            .entry(GroupKey::with_digest(size, digest))
            .or_default()
            .push(path);
    }

    log::info!(
        "Phase 2 complete: {} files hashed, {} read",
        stats.hashed_files,
        ByteSize::b(stats.bytes_hashed)
    );

    Ok(refined)
}

fn before_hash(config: &FinderConfig, idx: usize, size: u64, path: &Path) {
    if size > LARGE_FILE_THRESHOLD {
        log::debug!(
            "Hashing large file ({} MB): {}",
            size / (1024 * 1024),
            path.display()
        );
    }
    if let Some(ref callback) = config.progress_callback {
        callback.on_progress(idx, path.to_string_lossy().as_ref());
    }
}

fn hash_sequential<D: Digester + ?Sized>(
    jobs: &[(u64, PathBuf)],
    digester: &D,
    config: &FinderConfig,
) -> Result<Vec<String>, FinderError> {
    let never = AtomicBool::new(false);
    let mut digests = Vec::with_capacity(jobs.len());

    for (idx, (size, path)) in jobs.iter().enumerate() {
        if config.is_shutdown_requested() {
            log::info!("Phase 2: Interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }
        before_hash(config, idx + 1, *size, path);
        let digest = digester.digest_until(path, &never)?;
        if let Some(ref callback) = config.progress_callback {
            callback.on_item_completed(*size);
        }
        digests.push(digest);
    }

    Ok(digests)
}

fn hash_parallel<D: Digester + ?Sized>(
    jobs: &[(u64, PathBuf)],
    digester: &D,
    config: &FinderConfig,
) -> Result<Vec<String>, FinderError> {
    let abort = AtomicBool::new(false);
    let first_error: Mutex<Option<HashError>> = Mutex::new(None);
    let started = AtomicUsize::new(0);

    let results: Vec<Option<String>> = jobs
        .par_iter()
        .map(|(size, path)| {
            if abort.load(Ordering::SeqCst) {
                return None;
            }
            if config.is_shutdown_requested() {
                abort.store(true, Ordering::SeqCst);
                return None;
            }

            let idx = started.fetch_add(1, Ordering::SeqCst) + 1;
            before_hash(config, idx, *size, path);

            match digester.digest_until(path, &abort) {
                Ok(digest) => {
                    if let Some(ref callback) = config.progress_callback {
                        callback.on_item_completed(*size);
                    }
                    Some(digest)
                }
                Err(e) => {
                    // Siblings cancelled by the abort flag must not overwrite
                    // the failure that set it.
                    if !abort.swap(true, Ordering::SeqCst) {
                        log::debug!("Hashing failed, cancelling siblings: {}", e);
                        if let Ok(mut slot) = first_error.lock() {
                            *slot = Some(e);
                        }
                    }
                    None
                }
            }
        })
        .collect();

    let first_error = first_error
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(e) = first_error {
        return Err(e.into());
    }
    if config.is_shutdown_requested() {
        log::info!("Phase 2: Interrupted by shutdown signal");
        return Err(FinderError::Interrupted);
    }

    results
        .into_iter()
        .collect::<Option<Vec<String>>>()
        .ok_or(FinderError::Interrupted)
}

/// Run both phases sequentially with a fresh hasher for `algorithm`.
///
/// # Errors
///
/// See [`partition_by_size`] and [`refine_by_hash`].
pub fn compute_groups<P: AsRef<Path>>(
    paths: &[P],
    algorithm: Algorithm,
) -> Result<FileGroups, FinderError> {
    let (size_groups, _) = partition_by_size(paths)?;
    refine_by_hash(size_groups, algorithm)
}

/// Duplicate finder that orchestrates the two-phase pipeline.
///
/// The selected algorithm is part of the finder, never process-wide state.
#[derive(Debug, Clone)]
pub struct DuplicateFinder {
    algorithm: Algorithm,
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder.
    #[must_use]
    pub fn new(algorithm: Algorithm, config: FinderConfig) -> Self {
        Self { algorithm, config }
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults(algorithm: Algorithm) -> Self {
        Self::new(algorithm, FinderConfig::default())
    }

    /// The algorithm used for content digests.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The finder configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    fn hasher(&self) -> FileHasher {
        let hasher = FileHasher::new(self.algorithm);
        match self.config.shutdown_flag {
            Some(ref flag) => hasher.with_shutdown_flag(Arc::clone(flag)),
            None => hasher,
        }
    }

    /// Group `paths` into sets of byte-identical files.
    ///
    /// Every non-directory path appears in exactly one returned group,
    /// singletons included.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if any path cannot be inspected or hashed, or
    /// if shutdown was requested.
    pub fn find_duplicates<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<(FileGroups, GroupingStats), FinderError> {
        self.find_duplicates_with(paths, &self.hasher())
    }

    /// Like [`DuplicateFinder::find_duplicates`] with a custom digester.
    ///
    /// # Errors
    ///
    /// See [`DuplicateFinder::find_duplicates`].
    pub fn find_duplicates_with<P: AsRef<Path>, D: Digester + ?Sized>(
        &self,
        paths: &[P],
        digester: &D,
    ) -> Result<(FileGroups, GroupingStats), FinderError> {
        let start_time = std::time::Instant::now();

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        log::info!(
            "Grouping {} path(s) using {}",
            paths.len(),
            self.algorithm.name()
        );

        let (size_groups, mut stats) = partition_by_size(paths)?;
        let groups = refine_with(size_groups, digester, &self.config, &mut stats)?;
        stats.record_groups(&groups);

        log::info!(
            "Done in {:.2?}: {} group(s), {} duplicate group(s), {} duplicate file(s), {} reclaimable",
            start_time.elapsed(),
            stats.groups,
            stats.duplicate_groups,
            stats.duplicate_files,
            ByteSize::b(stats.reclaimable_space)
        );

        Ok((groups, stats))
    }
}

//! Streaming file digests.
//!
//! # Overview
//!
//! [`FileHasher`] opens a file, streams it through a fresh
//! [`ContentHasher`](super::ContentHasher) in bounded chunks and renders the
//! result as hex. Memory use is constant regardless of file size.
//!
//! The [`Digester`] trait is the seam the hash phase calls through, so the
//! finder can be driven by something other than the filesystem hasher.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Algorithm, HashError};

/// Read buffer size for streaming (64KB).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Computes a content digest for a file.
pub trait Digester: Send + Sync {
    /// Digest the full content of `path`, rendered as lowercase hex.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    fn digest(&self, path: &Path) -> Result<String, HashError>;

    /// Like [`Digester::digest`], but gives up once `cancel` is set.
    ///
    /// Implementations that stream should check `cancel` between reads. The
    /// default ignores it.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Interrupted`] if cancelled, otherwise as `digest`.
    fn digest_until(&self, path: &Path, cancel: &AtomicBool) -> Result<String, HashError> {
        let _ = cancel;
        self.digest(path)
    }
}

/// Filesystem hasher for a single algorithm.
#[derive(Debug, Clone)]
pub struct FileHasher {
    algorithm: Algorithm,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl FileHasher {
    /// Create a hasher for the given algorithm.
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            shutdown_flag: None,
        }
    }

    /// Stop reading between chunks once this flag is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// The algorithm in use.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    fn is_shutdown_requested(&self, cancel: Option<&AtomicBool>) -> bool {
        cancel.is_some_and(|c| c.load(Ordering::SeqCst))
            || self
                .shutdown_flag
                .as_ref()
                .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Digest the full content of a file.
    ///
    /// # Errors
    ///
    /// - [`HashError::Open`] if the file cannot be opened
    /// - [`HashError::Read`] if reading fails part-way
    /// - [`HashError::Interrupted`] if shutdown was requested
    pub fn digest_file(&self, path: &Path) -> Result<String, HashError> {
        self.stream(path, None)
    }

    fn stream(&self, path: &Path, cancel: Option<&AtomicBool>) -> Result<String, HashError> {
        let mut file = File::open(path).map_err(|source| HashError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut hasher = self.algorithm.create();
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            if self.is_shutdown_requested(cancel) {
                return Err(HashError::Interrupted(path.to_path_buf()));
            }
            let n = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(HashError::Read {
                        path: path.to_path_buf(),
                        source,
                    })
                }
            };
            hasher.update(&buffer[..n]);
        }

        let digest = hasher.finalize_hex();
        log::trace!(
            "{} {} {}",
            self.algorithm.identifier(),
            digest,
            path.display()
        );
        Ok(digest)
    }
}

impl Digester for FileHasher {
    fn digest(&self, path: &Path) -> Result<String, HashError> {
        self.stream(path, None)
    }

    fn digest_until(&self, path: &Path, cancel: &AtomicBool) -> Result<String, HashError> {
        self.stream(path, Some(cancel))
    }
}

/// Digest a file with a one-off hasher.
///
/// # Errors
///
/// See [`FileHasher::digest_file`].
pub fn digest_of(path: &Path, algorithm: Algorithm) -> Result<String, HashError> {
    FileHasher::new(algorithm).digest_file(path)
}

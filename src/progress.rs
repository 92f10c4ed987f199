//! Progress reporting using indicatif.
//!
//! The finder reports through the [`ProgressCallback`] trait; [`Progress`]
//! renders that as a terminal progress bar for the hashing phase. Size
//! partitioning only reads metadata and finishes too quickly to need one.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress callback for grouping phases.
///
/// Implement this trait to receive progress updates during
/// the duplicate detection pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "hashing")
    /// * `total` - Total number of items to process
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called before each item is processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Current item number (1-based)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been processed, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter for the hashing phase.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bar will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupegroup::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        pb.set_style(Self::style());
        pb.set_message(phase.to_string());
        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(pb);
        }
    }

    fn on_progress(&self, _current: usize, path: &str) {
        if self.quiet {
            return;
        }
        if let Ok(slot) = self.bar.lock() {
            if let Some(ref pb) = *slot {
                pb.set_message(truncate_path(path, 30));
            }
        }
    }

    fn on_item_completed(&self, _bytes: u64) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(ref pb) = *slot {
                pb.inc(1);
            }
        }
    }

    fn on_phase_end(&self, _phase: &str) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name
            .chars()
            .skip(name_len.saturating_sub(max_len - 3))
            .collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}

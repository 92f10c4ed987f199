//! dupegroup - group byte-identical files
//!
//! Files are partitioned by size first; only files that share a size are read
//! and hashed with a selectable digest algorithm. The result maps each
//! `(size, digest)` key to the files that produced it.
//!
//! # Example
//!
//! ```no_run
//! use dupegroup::duplicates::compute_groups;
//! use dupegroup::scanner::Algorithm;
//!
//! let groups = compute_groups(&["a.txt", "b.txt", "c.txt"], Algorithm::Crc64).unwrap();
//! for (key, files) in &groups {
//!     println!("{key}: {files:?}");
//! }
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{IsTerminal, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::{expand_patterns, Algorithm, DEFAULT_PATTERN};

/// Run the application with report output on stdout.
///
/// Color is used for text output when stdout is a terminal and `--no-color`
/// (or `NO_COLOR`) is not set.
///
/// # Errors
///
/// Returns an error if configuration, pattern expansion, grouping, or
/// writing the report fails.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let stdout = std::io::stdout();
    let color = !cli.no_color && stdout.is_terminal();
    let mut handle = stdout.lock();
    run_with_output(&cli, &mut handle, color)
}

/// Run the application, writing the report to `out`.
///
/// Returns [`ExitCode::Success`] when at least one duplicate group exists and
/// [`ExitCode::NoDuplicates`] otherwise.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_with_output<W: Write>(cli: &Cli, out: &mut W, color: bool) -> Result<ExitCode> {
    if cli.list_algorithms {
        write_algorithm_list(out).context("Failed to write algorithm list")?;
        return Ok(ExitCode::Success);
    }

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(cli);
    log::debug!("Effective configuration: {config:?}");

    let shutdown = signal::install_handler()?;

    let patterns = if cli.patterns.is_empty() {
        vec![DEFAULT_PATTERN.to_string()]
    } else {
        cli.patterns.clone()
    };
    let paths = expand_patterns(&patterns).context("Failed to expand file patterns")?;
    log::info!("{} path(s) matched {} pattern(s)", paths.len(), patterns.len());

    let mut finder_config = FinderConfig::default()
        .with_io_threads(config.io_threads)
        .with_shutdown_flag(shutdown.get_flag());
    if config.output == OutputFormat::Text && !cli.quiet {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let finder = DuplicateFinder::new(config.algorithm, finder_config);
    let (groups, stats) = finder
        .find_duplicates(&paths)
        .context("Failed to group files")?;

    let exit_code = if stats.duplicate_groups > 0 {
        ExitCode::Success
    } else {
        ExitCode::NoDuplicates
    };

    match config.output {
        OutputFormat::Text => TextOutput::new(config.algorithm, &groups, config.show_all)
            .with_color(color)
            .write_to(out),
        OutputFormat::Json => {
            JsonOutput::new(config.algorithm, &groups, &stats, config.show_all, exit_code)
                .write_to(out)
        }
    }
    .context("Failed to write report")?;

    Ok(exit_code)
}

/// Write one line per supported algorithm, sorted by identifier.
fn write_algorithm_list<W: Write>(out: &mut W) -> std::io::Result<()> {
    let mut all = Algorithm::ALL;
    all.sort_by_key(|a| a.identifier());
    for algorithm in all {
        writeln!(
            out,
            "{:<8} {} ({}-bit{})",
            algorithm.identifier(),
            algorithm.name(),
            algorithm.output_len() * 8,
            if algorithm.is_cryptographic() {
                ", cryptographic"
            } else {
                ""
            }
        )?;
    }
    out.flush()
}

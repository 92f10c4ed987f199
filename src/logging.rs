//! Logging setup using the `log` facade and `env_logger` backend.
//!
//! The grouping report goes to stdout; logs go to stderr. The level is chosen
//! in priority order:
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. `--quiet` (errors only)
//! 3. `-v` count: none = warn, `-v` = info, `-vv` = debug, `-vvv` = trace
//!
//! Debug builds add a timestamp and, from `-vv` up, the module path.
//!
//! ```rust,no_run
//! use dupegroup::logging::init_logging;
//!
//! init_logging(1, false);
//! log::info!("Phase summaries are visible now");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize logging from CLI verbosity flags.
///
/// Must be called at most once per process.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }
    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        // A logger is already installed (tests calling run_app repeatedly).
        return;
    }

    log::debug!(
        "Logging initialized at level {}",
        if from_env {
            "from RUST_LOG"
        } else {
            current_level_name()
        }
    );
}

/// Map CLI flags to a level filter.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let level = record.level();
            let style = buf.default_level_style(level);
            if verbose >= 2 {
                writeln!(
                    buf,
                    "{} {style}{:<5}{style:#} [{}] {}",
                    buf.timestamp_seconds(),
                    level,
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{} {style}{:<5}{style:#} {}",
                    buf.timestamp_seconds(),
                    level,
                    record.args()
                )
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let style = buf.default_level_style(level);
            writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
        });
    }
}

/// Name of the current maximum log level.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

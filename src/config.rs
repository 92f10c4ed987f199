//! Application configuration management.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: the `--config` path, or `config.toml` in the
//!    platform-specific config directory when present
//! 3. `DUPEGROUP_*` environment variables (e.g. `DUPEGROUP_ALGORITHM=md5`)
//! 4. Command-line flags ([`Config::apply_cli`])
//!
//! ```toml
//! algorithm = "crc64"
//! show_all = false
//! io_threads = 8
//! output = "text"
//! ```

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{Cli, OutputFormat};
use crate::scanner::Algorithm;

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "DUPEGROUP_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Digest algorithm used to refine size collisions.
    pub algorithm: Algorithm,
    /// Include single-member groups in the report.
    pub show_all: bool,
    /// Number of worker threads for hashing (1 = sequential).
    pub io_threads: usize,
    /// Report format.
    pub output: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            show_all: false,
            io_threads: 4,
            output: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// An explicit `config_path` must exist; the default location is optional.
    ///
    /// # Errors
    ///
    /// Fails if an explicit file is missing, a file is not valid TOML, or a
    /// value (such as an unknown algorithm) does not deserialize.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => {
                if !path.is_file() {
                    bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::default_path().filter(|p| p.is_file()),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(ref path) = file {
            log::debug!("Loading config from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        let config: Self = figment
            .extract()
            .map_err(|e| anyhow::anyhow!(e.to_string()))
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Override loaded values with the flags given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if cli.show_all {
            self.show_all = true;
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = usize::from(threads);
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.io_threads == 0 {
            bail!("io_threads must be at least 1");
        }
        Ok(())
    }

    /// Default platform-specific configuration file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupegroup", "dupegroup")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

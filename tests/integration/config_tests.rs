use clap::Parser;
use dupegroup::cli::{Cli, OutputFormat};
use dupegroup::config::Config;
use dupegroup::scanner::Algorithm;
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

use crate::{clear_env, ENV_MUTEX};

#[test]
fn test_config_defaults_via_figment() {
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.algorithm, Algorithm::Sha256);
}

#[test]
fn test_config_load_from_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
algorithm = "CRC64"
show_all = true
io_threads = 8
output = "json"
"#,
    )
    .unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert_eq!(config.algorithm, Algorithm::Crc64);
    assert!(config.show_all);
    assert_eq!(config.io_threads, 8);
    assert_eq!(config.output, OutputFormat::Json);
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 2\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert_eq!(config.io_threads, 2);
    assert_eq!(config.algorithm, Algorithm::Sha256);
    assert!(!config.show_all);
}

#[test]
fn test_env_overrides_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "algorithm = \"sha1\"\nio_threads = 8\n").unwrap();

    std::env::set_var("DUPEGROUP_ALGORITHM", "fnv1a");
    std::env::set_var("DUPEGROUP_SHOW_ALL", "true");
    let result = Config::load(Some(&config_path));
    clear_env();

    let config = result.unwrap();
    assert_eq!(config.algorithm, Algorithm::Fnv1a);
    assert!(config.show_all);
    assert_eq!(config.io_threads, 8);
}

#[test]
fn test_cli_overrides_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    std::env::set_var("DUPEGROUP_ALGORITHM", "md5");
    std::env::set_var("DUPEGROUP_IO_THREADS", "3");
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("empty.toml");
    fs::write(&config_path, "").unwrap();
    let result = Config::load(Some(&config_path));
    clear_env();

    let mut config = result.unwrap();
    assert_eq!(config.algorithm, Algorithm::Md5);
    assert_eq!(config.io_threads, 3);

    let cli = Cli::try_parse_from(["dupegroup", "-a", "sha512"]).unwrap();
    config.apply_cli(&cli);
    assert_eq!(config.algorithm, Algorithm::Sha512);
    assert_eq!(config.io_threads, 3);
}

#[test]
fn test_invalid_toml_syntax() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "algorithm = [unterminated").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let result: Result<Config, _> = figment.extract();
    assert!(result.is_err());
}

#[test]
fn test_unknown_algorithm_in_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "algorithm = \"whirlpool\"\n").unwrap();

    let err = Config::load(Some(&config_path)).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("Invalid configuration"));
    assert!(message.contains("try one of: adler32, crc32"));
}

#[test]
fn test_zero_io_threads_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 0\n").unwrap();

    let err = Config::load(Some(&config_path)).unwrap_err();
    assert!(err.to_string().contains("io_threads"));
}

use clap::Parser;
use dupegroup::cli::Cli;
use dupegroup::error::ExitCode;
use dupegroup::run_with_output;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::{clear_env, ENV_MUTEX};

fn pattern(dir: &Path) -> String {
    format!("{}/*", dir.display())
}

fn run(args: &[&str]) -> anyhow::Result<(ExitCode, String)> {
    let mut argv = vec!["dupegroup"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv)?;
    let mut out = Vec::new();
    let code = run_with_output(&cli, &mut out, false)?;
    Ok((code, String::from_utf8(out)?))
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), b"AAAA").unwrap();
    fs::write(dir.path().join("b.txt"), b"AAAA").unwrap();
    fs::write(dir.path().join("c.txt"), b"BBBB").unwrap();
    fs::write(dir.path().join("d.txt"), b"0123456789").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    dir
}

#[test]
fn test_text_report_lists_duplicates() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = fixture();
    let pat = pattern(dir.path());

    let (code, out) = run(&["-q", "-a", "crc32", &pat]).unwrap();
    assert_eq!(code, ExitCode::Success);

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Algorithm: CRC-32 (Castagnoli)");
    assert_eq!(lines[1], "");
    assert!(lines[2].starts_with("2 files, 4 B ("));
    assert!(lines[3].ends_with("a.txt"));
    assert!(lines[4].ends_with("b.txt"));
    assert!(lines[3].starts_with("   "));
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_show_all_includes_unique_files() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = fixture();
    let pat = pattern(dir.path());

    let (_, out) = run(&["-q", "--show-all", &pat]).unwrap();
    assert!(out.starts_with("Algorithm: SHA-256\n"));
    assert!(out.contains("1 file, 10 B:\n"));
    assert!(out.contains("c.txt"));
    assert!(!out.contains("nested"));
}

#[test]
fn test_no_duplicates_exit_code() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("x"), b"x").unwrap();
    fs::write(dir.path().join("y"), b"yy").unwrap();
    let pat = pattern(dir.path());

    let (code, out) = run(&["-q", &pat]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
    assert!(out.ends_with("No duplicates found.\n"));
}

#[test]
fn test_json_report() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = fixture();
    let pat = pattern(dir.path());

    let (code, out) = run(&["-o", "json", "-a", "md5", &pat]).unwrap();
    assert_eq!(code, ExitCode::Success);

    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["algorithm"]["identifier"], "md5");
    assert_eq!(value["algorithm"]["digest_bits"], 128);
    let groups = value["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["count"], 2);
    // "AAAA"
    assert_eq!(groups[0]["digest"], "098890dde069e9abad63f19a0d9e1f32");
    assert_eq!(value["summary"]["total_files"], 4);
    assert_eq!(value["summary"]["directories_skipped"], 1);
    assert_eq!(value["summary"]["hashed_files"], 3);
}

#[test]
fn test_overlapping_patterns_deduplicated() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = fixture();
    let all = pattern(dir.path());
    let txt = format!("{}/*.txt", dir.path().display());

    let (_, out) = run(&["-q", "-o", "json", &all, &txt]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["summary"]["total_files"], 4);
    assert_eq!(value["groups"][0]["count"], 2);
}

#[test]
fn test_unknown_algorithm_rejected_by_cli() {
    let err = Cli::try_parse_from(["dupegroup", "--algorithm", "sha3000"]).unwrap_err();
    assert!(err
        .to_string()
        .contains("unknown algorithm 'sha3000'; try one of: adler32, crc32, crc64, fnv1a, md5, sha1, sha256, sha512"));
}

#[test]
fn test_config_file_selects_algorithm() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = fixture();
    let config_dir = TempDir::new().unwrap();
    let config_path = config_dir.path().join("config.toml");
    fs::write(&config_path, "algorithm = \"sha1\"\nshow_all = true\n").unwrap();
    let pat = pattern(dir.path());
    let config_arg = config_path.display().to_string();

    let (_, out) = run(&["-q", "--config", &config_arg, &pat]).unwrap();
    assert!(out.starts_with("Algorithm: SHA-1\n"));
    assert!(out.contains("1 file, 10 B:"));

    let (_, out) = run(&["-q", "--config", &config_arg, "-a", "adler32", &pat]).unwrap();
    assert!(out.starts_with("Algorithm: Adler-32\n"));
}

#[test]
fn test_invalid_config_algorithm_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = fixture();
    let config_dir = TempDir::new().unwrap();
    let config_path = config_dir.path().join("config.toml");
    fs::write(&config_path, "algorithm = \"sha3000\"\n").unwrap();
    let pat = pattern(dir.path());
    let config_arg = config_path.display().to_string();

    let err = run(&["-q", "--config", &config_arg, &pat]).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("unknown algorithm 'sha3000'"));
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_invalid_pattern_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let err = run(&["-q", "[unclosed"]).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to expand file patterns"));
}

#[test]
fn test_list_algorithms() {
    let (code, out) = run(&["--list-algorithms"]).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert_eq!(out.lines().count(), 8);
    assert!(out.lines().next().unwrap().starts_with("adler32"));
}

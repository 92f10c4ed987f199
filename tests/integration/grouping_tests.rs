use dupegroup::duplicates::{
    compute_groups, partition_by_size, refine_by_hash, DuplicateFinder, FinderConfig,
    FinderError, GroupKey,
};
use dupegroup::scanner::{Algorithm, Digester, FileHasher, HashError};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Records every path it is asked to digest.
struct RecordingDigester {
    inner: FileHasher,
    seen: Mutex<Vec<PathBuf>>,
}

impl RecordingDigester {
    fn new(algorithm: Algorithm) -> Self {
        Self {
            inner: FileHasher::new(algorithm),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

impl Digester for RecordingDigester {
    fn digest(&self, path: &Path) -> Result<String, HashError> {
        self.seen.lock().unwrap().push(path.to_path_buf());
        self.inner.digest(path)
    }
}

fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Files "a" and "b" hold "AAAA", "c" holds "BBBB".
fn abc_fixture() -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write(&dir, "a", b"AAAA"),
        write(&dir, "b", b"AAAA"),
        write(&dir, "c", b"BBBB"),
    ];
    (dir, paths)
}

fn sorted_members(groups: &dupegroup::duplicates::FileGroups) -> Vec<Vec<PathBuf>> {
    let mut members: Vec<Vec<PathBuf>> = groups
        .values()
        .map(|files| {
            let mut files = files.clone();
            files.sort();
            files
        })
        .collect();
    members.sort();
    members
}

#[test]
fn test_pair_and_singleton_under_every_algorithm() {
    let (_dir, paths) = abc_fixture();

    for algorithm in Algorithm::ALL {
        let groups = compute_groups(&paths, algorithm).unwrap();
        assert_eq!(groups.len(), 2, "{algorithm}");

        let pair = groups
            .iter()
            .find(|(_, files)| files.len() == 2)
            .map(|(key, _)| key.clone())
            .unwrap();
        assert_eq!(pair.size, 4);
        assert_eq!(
            pair.digest.as_ref().map(String::len),
            Some(algorithm.output_len() * 2)
        );

        let mut pair_files = groups[&pair].clone();
        pair_files.sort();
        assert_eq!(pair_files, vec![paths[0].clone(), paths[1].clone()]);

        let single = groups
            .iter()
            .find(|(_, files)| files.len() == 1)
            .map(|(key, files)| (key.clone(), files.clone()))
            .unwrap();
        assert_eq!(single.1, vec![paths[2].clone()]);
        assert!(single.0.is_refined());
        assert_ne!(single.0.digest, pair.digest);
    }
}

#[test]
fn test_unique_size_never_hashed() {
    let dir = TempDir::new().unwrap();
    let d = write(&dir, "d", b"0123456789");

    let digester = RecordingDigester::new(Algorithm::Sha1);
    let finder = DuplicateFinder::with_defaults(Algorithm::Sha1);
    let (groups, stats) = finder.find_duplicates_with(&[d.clone()], &digester).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[&GroupKey::by_size(10)], vec![d]);
    assert!(digester.seen().is_empty());
    assert_eq!(stats.hashed_files, 0);
    assert_eq!(stats.duplicate_groups, 0);
}

#[test]
fn test_only_collisions_are_hashed() {
    let (dir, mut paths) = abc_fixture();
    let lone = write(&dir, "lone", b"a different length");
    paths.push(lone.clone());

    let digester = RecordingDigester::new(Algorithm::Md5);
    let finder = DuplicateFinder::with_defaults(Algorithm::Md5);
    finder.find_duplicates_with(&paths, &digester).unwrap();

    let seen: HashSet<PathBuf> = digester.seen().into_iter().collect();
    assert_eq!(seen.len(), 3);
    assert!(!seen.contains(&lone));
}

#[test]
fn test_directories_are_excluded() {
    let (dir, mut paths) = abc_fixture();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    paths.push(sub.clone());

    let finder = DuplicateFinder::with_defaults(Algorithm::Crc32);
    let (groups, stats) = finder.find_duplicates(&paths).unwrap();

    let all: Vec<&PathBuf> = groups.values().flatten().collect();
    assert_eq!(all.len(), 3);
    assert!(!all.contains(&&sub));
    assert_eq!(stats.directories_skipped, 1);
    assert_eq!(stats.total_paths, 4);
}

#[test]
fn test_empty_input() {
    let paths: Vec<PathBuf> = Vec::new();
    let groups = compute_groups(&paths, Algorithm::Sha256).unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_empty_files_collide_and_are_hashed() {
    let dir = TempDir::new().unwrap();
    let paths = vec![write(&dir, "e1", b""), write(&dir, "e2", b"")];

    let groups = compute_groups(&paths, Algorithm::Sha256).unwrap();
    assert_eq!(groups.len(), 1);
    let key = groups.keys().next().unwrap();
    assert_eq!(key.size, 0);
    assert_eq!(
        key.digest.as_deref(),
        Some("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
    );
}

#[test]
fn test_missing_file_aborts_with_metadata_error() {
    let (dir, mut paths) = abc_fixture();
    paths.push(dir.path().join("vanished"));

    let err = compute_groups(&paths, Algorithm::Crc64).unwrap_err();
    match err {
        FinderError::Metadata { path, .. } => assert!(path.ends_with("vanished")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_idempotent_membership() {
    let (_dir, paths) = abc_fixture();
    let first = compute_groups(&paths, Algorithm::Fnv1a).unwrap();
    let second = compute_groups(&paths, Algorithm::Fnv1a).unwrap();
    assert_eq!(sorted_members(&first), sorted_members(&second));
    assert_eq!(first, second);
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = TempDir::new().unwrap();
    let mut paths = Vec::new();
    for i in 0..24 {
        let content = format!("content-{:02}", i % 6);
        paths.push(write(&dir, &format!("f{i:02}"), content.as_bytes()));
    }

    let sequential = DuplicateFinder::new(
        Algorithm::Sha512,
        FinderConfig::default().with_io_threads(1),
    )
    .find_duplicates(&paths)
    .unwrap();
    let parallel = DuplicateFinder::new(
        Algorithm::Sha512,
        FinderConfig::default().with_io_threads(8),
    )
    .find_duplicates(&paths)
    .unwrap();

    assert_eq!(sequential.0, parallel.0);
    assert_eq!(sequential.1, parallel.1);
    assert_eq!(parallel.1.duplicate_groups, 6);
    assert_eq!(parallel.1.duplicate_files, 18);
}

#[test]
fn test_two_phase_building_blocks() {
    let (_dir, paths) = abc_fixture();
    let (size_groups, stats) = partition_by_size(&paths).unwrap();
    assert_eq!(size_groups.len(), 1);
    assert_eq!(stats.size_collisions, 1);
    assert!(size_groups.keys().all(|k| !k.is_refined()));

    let refined = refine_by_hash(size_groups, Algorithm::Adler32).unwrap();
    assert_eq!(refined.len(), 2);
    assert!(refined.keys().all(GroupKey::is_refined));
}

#[test]
fn test_shutdown_flag_interrupts() {
    let (_dir, paths) = abc_fixture();
    let flag = Arc::new(AtomicBool::new(false));
    flag.store(true, Ordering::SeqCst);

    let finder = DuplicateFinder::new(
        Algorithm::Sha256,
        FinderConfig::default().with_shutdown_flag(flag),
    );
    assert!(matches!(
        finder.find_duplicates(&paths),
        Err(FinderError::Interrupted)
    ));
}

mod common;
use crate::common::{at, init_tracing};

use std::error::Error;
use std::io::Write;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use yamlwatch::cache::{
    decode_archive, encode_archive, ArchiveCacheStore, CacheStore, FingerprintCache,
    FingerprintRecord, MemoryCacheStore,
};
use yamlwatch::errors::YamlwatchError;
use yamlwatch::fs::mock::MockFileSystem;
use yamlwatch::fs::FileSystem;
use yamlwatch::watch::Fingerprint;

type TestResult = Result<(), Box<dyn Error>>;

fn sample_cache() -> FingerprintCache {
    let mut cache = FingerprintCache::new();
    cache.insert(
        "deploy/a.yaml",
        FingerprintRecord::new(Fingerprint::from("aaaa"), at(0)),
    );
    let mut rec = FingerprintRecord::new(Fingerprint::from("bbbb"), at(10));
    rec = rec.seen_at(at(20));
    cache.insert("deploy/b.yaml", rec);
    cache
}

#[test]
fn archive_round_trips_exactly() -> TestResult {
    init_tracing();

    let cache = sample_cache();
    let bytes = encode_archive(&cache)?;
    let back = decode_archive(&bytes)?;
    assert_eq!(back, cache);
    Ok(())
}

#[test]
fn equal_caches_encode_to_equal_bytes() -> TestResult {
    assert_eq!(encode_archive(&sample_cache())?, encode_archive(&sample_cache())?);
    Ok(())
}

#[test]
fn garbage_is_reported_as_corrupt() {
    let err = decode_archive(b"definitely not a tarball").unwrap_err();
    assert!(matches!(err, YamlwatchError::CacheFormat(_)), "got {err:?}");
}

fn tar_gz_with(entry: &str, body: &[u8]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mut header = tar::Header::new_gnu();
    header.set_size(body.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, entry, body).unwrap();
    let mut encoder = builder.into_inner().unwrap();
    encoder.flush().unwrap();
    encoder.finish().unwrap()
}

#[test]
fn archive_without_cache_entry_is_corrupt() {
    let bytes = tar_gz_with("other.txt", b"hello");
    assert!(matches!(
        decode_archive(&bytes),
        Err(YamlwatchError::CacheFormat(_))
    ));
}

#[test]
fn dot_slash_entry_name_is_accepted() -> TestResult {
    let body = serde_yaml::to_string(&sample_cache())?;
    let bytes = tar_gz_with("./cache.yaml", body.as_bytes());
    assert_eq!(decode_archive(&bytes)?, sample_cache());
    Ok(())
}

#[test]
fn unknown_version_is_corrupt() {
    let bytes = tar_gz_with("cache.yaml", b"version: 99\ntargets: {}\n");
    assert!(matches!(
        decode_archive(&bytes),
        Err(YamlwatchError::CacheFormat(_))
    ));
}

#[test]
fn missing_archive_loads_as_empty() {
    init_tracing();

    let fs = MockFileSystem::new();
    let store = ArchiveCacheStore::new(&fs, "state/cache.tar.gz");
    assert!(store.load().is_empty());
}

#[test]
fn corrupt_archive_loads_as_empty() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("cache.tar.gz", b"\x1f\x8b garbage".to_vec());
    let store = ArchiveCacheStore::new(&fs, "cache.tar.gz");
    assert!(store.load().is_empty());
}

#[test]
fn store_then_load_round_trips_through_the_filesystem() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    let mut store = ArchiveCacheStore::new(&fs, "state/cache.tar.gz");
    store.store(&sample_cache())?;

    assert!(fs.is_file(Path::new("state/cache.tar.gz")));
    assert!(!fs.exists(Path::new("state/cache.tar.gz.tmp")));
    assert_eq!(store.load(), sample_cache());
    Ok(())
}

#[test]
fn store_replaces_rather_than_merges() -> TestResult {
    let fs = MockFileSystem::new();
    let mut store = ArchiveCacheStore::new(&fs, "cache.tar.gz");
    store.store(&sample_cache())?;

    let mut smaller = FingerprintCache::new();
    smaller.insert("only.yaml", FingerprintRecord::new(Fingerprint::from("cc"), at(5)));
    store.store(&smaller)?;

    assert_eq!(store.load(), smaller);
    Ok(())
}

#[test]
fn failed_write_is_fatal_and_keeps_previous_archive() -> TestResult {
    init_tracing();

    let fs = MockFileSystem::new();
    let mut store = ArchiveCacheStore::new(&fs, "cache.tar.gz");
    store.store(&sample_cache())?;
    let before = fs.contents("cache.tar.gz");

    fs.set_read_only(true);
    let err = store.store(&FingerprintCache::new()).unwrap_err();
    assert!(matches!(err, YamlwatchError::CacheWrite { .. }), "got {err:?}");

    assert_eq!(fs.contents("cache.tar.gz"), before);
    fs.set_read_only(false);
    assert_eq!(store.load(), sample_cache());
    Ok(())
}

#[test]
fn cache_path_that_is_a_directory_cannot_be_written() {
    let fs = MockFileSystem::new();
    fs.add_dir("cache.tar.gz");
    let mut store = ArchiveCacheStore::new(&fs, "cache.tar.gz");
    assert!(matches!(
        store.store(&sample_cache()),
        Err(YamlwatchError::CacheWrite { .. })
    ));
}

#[test]
fn real_filesystem_store_uses_rename_and_creates_parents() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested/dir/cache.tar.gz");
    let fs = yamlwatch::fs::RealFileSystem;
    let mut store = ArchiveCacheStore::new(&fs, &path);

    store.store(&sample_cache())?;
    assert!(path.is_file());
    assert!(!dir.path().join("nested/dir/cache.tar.gz.tmp").exists());
    assert_eq!(common::read_cache(&path), sample_cache());
    Ok(())
}

#[test]
fn unwritable_location_on_real_filesystem_is_fatal() -> TestResult {
    let dir = tempfile::tempdir()?;
    // A regular file where a parent directory should be.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x")?;
    let fs = yamlwatch::fs::RealFileSystem;
    let mut store = ArchiveCacheStore::new(&fs, blocker.join("cache.tar.gz"));

    assert!(matches!(
        store.store(&sample_cache()),
        Err(YamlwatchError::CacheWrite { .. })
    ));
    Ok(())
}

#[test]
fn memory_store_counts_writes() -> TestResult {
    let mut store = MemoryCacheStore::seeded(sample_cache());
    assert_eq!(store.load(), sample_cache());
    store.store(&FingerprintCache::new())?;
    assert_eq!(store.writes(), 1);
    assert!(store.cache().is_empty());
    Ok(())
}

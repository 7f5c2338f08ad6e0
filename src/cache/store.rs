// src/cache/store.rs

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cache::archive::{decode_archive, encode_archive};
use crate::cache::model::FingerprintCache;
use crate::errors::{Result, YamlwatchError};
use crate::fs::FileSystem;

/// Where the fingerprint cache lives between runs.
pub trait CacheStore {
    /// Load the previous cache.
    ///
    /// Never fails: a missing or unusable cache is an empty one, which is
    /// exactly what a first run looks like.
    fn load(&self) -> FingerprintCache;

    /// Replace the stored cache with `cache`.
    fn store(&mut self, cache: &FingerprintCache) -> Result<()>;
}

/// Stores the cache as a tar.gz archive at a fixed path.
#[derive(Debug)]
pub struct ArchiveCacheStore<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
}

impl<'a> ArchiveCacheStore<'a> {
    pub fn new(fs: &'a dyn FileSystem, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_error(&self, reason: impl ToString) -> YamlwatchError {
        YamlwatchError::CacheWrite {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl CacheStore for ArchiveCacheStore<'_> {
    fn load(&self) -> FingerprintCache {
        if !self.fs.exists(&self.path) {
            info!(path = ?self.path, "no cache archive yet; starting with an empty cache");
            return FingerprintCache::new();
        }

        let bytes = match self.fs.read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                info!(path = ?self.path, error = %format!("{e:#}"), "cache archive unreadable; starting with an empty cache");
                return FingerprintCache::new();
            }
        };

        match decode_archive(&bytes) {
            Ok(cache) => {
                debug!(path = ?self.path, entries = cache.len(), "loaded cache archive");
                cache
            }
            Err(e) => {
                info!(path = ?self.path, error = %e, "cache archive corrupt; starting with an empty cache");
                FingerprintCache::new()
            }
        }
    }

    /// Write to `<path>.tmp` first and rename it over `<path>`, so an
    /// interrupted run leaves the previous archive intact.
    fn store(&mut self, cache: &FingerprintCache) -> Result<()> {
        if self.path.file_name().is_none() {
            return Err(self.write_error("cache path has no file name"));
        }
        if self.fs.is_dir(&self.path) {
            return Err(self.write_error("cache path is a directory"));
        }

        let bytes = encode_archive(cache).map_err(|e| self.write_error(e))?;
        let tmp = self.temp_path();

        self.fs
            .write(&tmp, &bytes)
            .map_err(|e| self.write_error(format!("{e:#}")))?;

        if let Err(e) = self.fs.rename(&tmp, &self.path) {
            if let Err(cleanup) = self.fs.remove_file(&tmp) {
                warn!(path = ?tmp, error = %cleanup, "could not remove temporary cache file");
            }
            return Err(self.write_error(format!("{e:#}")));
        }

        info!(path = ?self.path, entries = cache.len(), bytes = bytes.len(), "stored cache archive");
        Ok(())
    }
}

/// Keeps the cache in memory only (dry runs, tests).
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    cache: FingerprintCache,
    writes: usize,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing cache, e.g. one loaded from an archive.
    pub fn seeded(cache: FingerprintCache) -> Self {
        Self { cache, writes: 0 }
    }

    pub fn cache(&self) -> &FingerprintCache {
        &self.cache
    }

    /// How many times `store` has been called.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self) -> FingerprintCache {
        self.cache.clone()
    }

    fn store(&mut self, cache: &FingerprintCache) -> Result<()> {
        self.cache = cache.clone();
        self.writes += 1;
        debug!(entries = cache.len(), "stored cache (memory)");
        Ok(())
    }
}

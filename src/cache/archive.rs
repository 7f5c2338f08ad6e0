// src/cache/archive.rs

//! tar.gz codec for the fingerprint cache.
//!
//! The archive holds a single `cache.yaml` entry. Header metadata is fixed
//! (mtime 0, mode 0644) so equal caches encode to equal bytes.

use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Archive, Builder, Header};

use crate::cache::model::{FingerprintCache, CACHE_FORMAT_VERSION};
use crate::errors::{Result, YamlwatchError};

/// Name of the entry inside the archive.
pub const CACHE_ENTRY: &str = "cache.yaml";

pub fn encode_archive(cache: &FingerprintCache) -> Result<Vec<u8>> {
    let body = serde_yaml::to_string(cache)
        .map_err(|e| YamlwatchError::CacheFormat(format!("serializing cache: {e}")))?;

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = Builder::new(encoder);

    let mut header = Header::new_gnu();
    header.set_size(body.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(0);
    header.set_cksum();
    builder.append_data(&mut header, CACHE_ENTRY, body.as_bytes())?;

    let encoder = builder.into_inner()?;
    Ok(encoder.finish()?)
}

pub fn decode_archive(bytes: &[u8]) -> Result<FingerprintCache> {
    let mut archive = Archive::new(GzDecoder::new(Cursor::new(bytes)));
    let entries = archive
        .entries()
        .map_err(|e| YamlwatchError::CacheFormat(format!("reading archive: {e}")))?;

    for entry in entries {
        let mut entry =
            entry.map_err(|e| YamlwatchError::CacheFormat(format!("reading entry: {e}")))?;
        let path = entry
            .path()
            .map_err(|e| YamlwatchError::CacheFormat(format!("entry path: {e}")))?
            .into_owned();
        if !is_cache_entry(&path) {
            continue;
        }

        let mut body = String::new();
        entry
            .read_to_string(&mut body)
            .map_err(|e| YamlwatchError::CacheFormat(format!("reading {CACHE_ENTRY}: {e}")))?;
        return parse_cache(&body);
    }

    Err(YamlwatchError::CacheFormat(format!(
        "archive has no {CACHE_ENTRY} entry"
    )))
}

fn parse_cache(body: &str) -> Result<FingerprintCache> {
    let cache: FingerprintCache = serde_yaml::from_str(body)
        .map_err(|e| YamlwatchError::CacheFormat(format!("parsing {CACHE_ENTRY}: {e}")))?;
    if cache.version != CACHE_FORMAT_VERSION {
        return Err(YamlwatchError::CacheFormat(format!(
            "unsupported cache version {} (expected {})",
            cache.version, CACHE_FORMAT_VERSION
        )));
    }
    Ok(cache)
}

/// Accepts `cache.yaml` as well as `./cache.yaml`, which is what
/// `tar -C dir -czf out .` produces.
fn is_cache_entry(path: &Path) -> bool {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    cleaned == Path::new(CACHE_ENTRY)
}

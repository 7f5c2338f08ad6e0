// src/cache/model.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::watch::fingerprint::Fingerprint;

/// Current on-disk format version of `cache.yaml`.
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// What is remembered about one target between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    pub fingerprint: Fingerprint,
    /// When this fingerprint was first recorded.
    pub last_changed: DateTime<Utc>,
    /// Last run that read the target successfully.
    pub last_seen: DateTime<Utc>,
}

impl FingerprintRecord {
    pub fn new(fingerprint: Fingerprint, now: DateTime<Utc>) -> Self {
        Self {
            fingerprint,
            last_changed: now,
            last_seen: now,
        }
    }

    /// Same fingerprint observed again.
    pub fn seen_at(&self, now: DateTime<Utc>) -> Self {
        Self {
            last_seen: now,
            ..self.clone()
        }
    }

    /// A different fingerprint observed.
    pub fn changed_to(&self, fingerprint: Fingerprint, now: DateTime<Utc>) -> Self {
        Self::new(fingerprint, now)
    }
}

/// All fingerprint records, keyed by target id.
///
/// Kept in a `BTreeMap` so that serialization order, and therefore the
/// archive bytes, only depend on content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintCache {
    pub version: u32,
    #[serde(default)]
    pub targets: BTreeMap<String, FingerprintRecord>,
}

impl Default for FingerprintCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self {
            version: CACHE_FORMAT_VERSION,
            targets: BTreeMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&FingerprintRecord> {
        self.targets.get(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, record: FingerprintRecord) {
        self.targets.insert(id.into(), record);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.targets.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Id → fingerprint view, ignoring timestamps.
    pub fn fingerprints(&self) -> BTreeMap<&str, &Fingerprint> {
        self.targets
            .iter()
            .map(|(id, rec)| (id.as_str(), &rec.fingerprint))
            .collect()
    }
}

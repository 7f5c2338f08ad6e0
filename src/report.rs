// src/report.rs

//! The change report of one run and its renderings.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::cache::FingerprintCache;
use crate::types::OutputFormat;
use crate::watch::Fingerprint;

/// Targets classified by how they differ from the previous run.
///
/// `added`, `changed` and `removed` are pairwise disjoint. `unreadable`
/// holds targets that were found but could not be fingerprinted, with the
/// reason; they never appear in the other three sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReport {
    pub added: BTreeSet<String>,
    pub changed: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub unreadable: BTreeMap<String, String>,
}

impl ChangeReport {
    /// True when nothing was added, changed or removed.
    ///
    /// Unreadable targets are not changes: a manifest that stays broken
    /// shows up in every run.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    pub fn has_unreadable(&self) -> bool {
        !self.unreadable.is_empty()
    }

    /// Copy with every target id replaced by its BLAKE3 digest.
    pub fn redacted(&self) -> ChangeReport {
        let hide = |ids: &BTreeSet<String>| -> BTreeSet<String> {
            ids.iter().map(|id| redact_id(id)).collect()
        };
        ChangeReport {
            added: hide(&self.added),
            changed: hide(&self.changed),
            removed: hide(&self.removed),
            unreadable: self
                .unreadable
                .iter()
                .map(|(id, reason)| (redact_id(id), reason.replace(id.as_str(), "<redacted>")))
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Line-per-entry rendering. With `fingerprints`, added and changed
    /// lines carry the new fingerprint taken from `cache`.
    pub fn to_text(&self, fingerprints: Option<&FingerprintCache>) -> String {
        let mut out = String::new();
        for id in &self.added {
            let _ = match fingerprint_of(fingerprints, id) {
                Some(f) => writeln!(out, "+ {id} {f}"),
                None => writeln!(out, "+ {id}"),
            };
        }
        for id in &self.changed {
            let _ = match fingerprint_of(fingerprints, id) {
                Some(f) => writeln!(out, "~ {id} {f}"),
                None => writeln!(out, "~ {id}"),
            };
        }
        for id in &self.removed {
            let _ = writeln!(out, "- {id}");
        }
        for (id, reason) in &self.unreadable {
            let _ = writeln!(out, "! {id}: {reason}");
        }
        out
    }

    pub fn render(
        &self,
        format: OutputFormat,
        fingerprints: Option<&FingerprintCache>,
    ) -> serde_json::Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text(fingerprints)),
            OutputFormat::Json => self.to_json().map(|mut s| {
                s.push('\n');
                s
            }),
        }
    }
}

fn fingerprint_of<'c>(cache: Option<&'c FingerprintCache>, id: &str) -> Option<&'c Fingerprint> {
    cache.and_then(|c| c.get(id)).map(|r| &r.fingerprint)
}

/// Digest used in place of a target id when output is redacted.
pub fn redact_id(id: &str) -> String {
    Fingerprint::of_bytes(id.as_bytes()).to_string()
}

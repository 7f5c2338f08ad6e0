// src/engine/core.rs

//! Pure diff core.
//!
//! Takes the previous cache and this run's observations and produces the
//! change report together with the next cache. No filesystem, no clock:
//! the caller passes `now`, which makes the core easy to test exhaustively.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::{FingerprintCache, FingerprintRecord};
use crate::engine::{Observation, WatchOutcome};
use crate::report::ChangeReport;

/// Classify `observations` against `prior`.
///
/// - fingerprinted and unknown before → `added`
/// - fingerprinted and different from before → `changed`
/// - in `prior` but not observed → `removed`, and dropped from the cache
/// - observed but not fingerprintable → `unreadable`; a previous record is
///   carried over unchanged so a transient failure does not look like a
///   removal followed by an addition
///
/// If the same id is observed more than once, the first observation wins.
pub fn diff(
    prior: &FingerprintCache,
    observations: Vec<Observation>,
    now: DateTime<Utc>,
) -> WatchOutcome {
    let mut report = ChangeReport::default();
    let mut next = FingerprintCache::new();
    let mut observed: BTreeSet<String> = BTreeSet::new();

    for obs in observations {
        if !observed.insert(obs.target.clone()) {
            debug!(manifest = %obs.target, "duplicate observation ignored");
            continue;
        }

        match obs.outcome {
            Ok(fingerprint) => match prior.get(&obs.target) {
                None => {
                    debug!(manifest = %obs.target, %fingerprint, "added");
                    report.added.insert(obs.target.clone());
                    next.insert(obs.target, FingerprintRecord::new(fingerprint, now));
                }
                Some(prev) if prev.fingerprint == fingerprint => {
                    next.insert(obs.target, prev.seen_at(now));
                }
                Some(prev) => {
                    debug!(
                        manifest = %obs.target,
                        old = %prev.fingerprint,
                        new = %fingerprint,
                        "changed"
                    );
                    report.changed.insert(obs.target.clone());
                    next.insert(obs.target, prev.changed_to(fingerprint, now));
                }
            },
            Err(reason) => {
                debug!(manifest = %obs.target, %reason, "unreadable");
                if let Some(prev) = prior.get(&obs.target) {
                    next.insert(obs.target.clone(), prev.clone());
                }
                report.unreadable.insert(obs.target, reason);
            }
        }
    }

    for id in prior.ids() {
        if !observed.contains(id) {
            debug!(manifest = %id, "removed");
            report.removed.insert(id.to_string());
        }
    }

    WatchOutcome {
        report,
        cache: next,
    }
}

// src/engine/runtime.rs

//! IO shell around the diff core.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::cache::CacheStore;
use crate::engine::core::diff;
use crate::engine::{Observation, WatchOutcome};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::watch::{Fingerprinter, TargetEnumerator, WatchTarget};

/// One watcher run, wired to its collaborators.
///
/// Each collaborator is a trait object so tests can swap in an in-memory
/// filesystem, a fixed target list or a memory-backed store.
pub struct Runtime<'a> {
    fs: &'a dyn FileSystem,
    enumerator: &'a dyn TargetEnumerator,
    store: &'a mut dyn CacheStore,
    fingerprinter: Fingerprinter,
}

impl<'a> Runtime<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        enumerator: &'a dyn TargetEnumerator,
        store: &'a mut dyn CacheStore,
        fingerprinter: Fingerprinter,
    ) -> Self {
        Self {
            fs,
            enumerator,
            store,
            fingerprinter,
        }
    }

    /// Load, observe, classify, persist.
    ///
    /// Only enumeration setup and the final cache write can fail; problems
    /// with individual manifests end up in the report.
    pub fn run_once(&mut self, now: DateTime<Utc>) -> Result<WatchOutcome> {
        let outcome = self.evaluate(now)?;
        self.commit(&outcome)?;
        Ok(outcome)
    }

    /// Load, observe and classify without touching the stored cache.
    pub fn evaluate(&self, now: DateTime<Utc>) -> Result<WatchOutcome> {
        let prior = self.store.load();
        let targets = self.enumerator.enumerate()?;
        info!(
            targets = targets.len(),
            cached = prior.len(),
            "starting watch run"
        );

        let observations: Vec<Observation> =
            targets.iter().map(|t| self.observe(t)).collect();

        Ok(diff(&prior, observations, now))
    }

    /// Persist the cache of an evaluated run.
    ///
    /// Callers that publish the report call this only once publishing has
    /// succeeded, so a lost report is produced again by the next run.
    pub fn commit(&mut self, outcome: &WatchOutcome) -> Result<()> {
        self.store.store(&outcome.cache)?;

        let report = &outcome.report;
        info!(
            added = report.added.len(),
            changed = report.changed.len(),
            removed = report.removed.len(),
            unreadable = report.unreadable.len(),
            "watch run complete"
        );
        Ok(())
    }

    fn observe(&self, target: &WatchTarget) -> Observation {
        match self.fingerprinter.fingerprint_file(self.fs, &target.path) {
            Ok(fp) => Observation::fingerprinted(target.id.clone(), fp),
            Err(e) => {
                let reason = reason_for(target, &format!("{e:#}"));
                warn!(manifest = %target.id, %reason, "manifest unreadable");
                Observation::unreadable(target.id.clone(), reason)
            }
        }
    }
}

/// One-line reason in which the target's path is spelled exactly as its id.
fn reason_for(target: &WatchTarget, error: &str) -> String {
    let shown = target.path.display().to_string();
    if shown.is_empty() {
        return collapse_whitespace(error).trim().to_string();
    }
    let joined = error
        .split(shown.as_str())
        .map(collapse_whitespace)
        .collect::<Vec<_>>()
        .join(&target.id);
    joined.trim().to_string()
}

/// Replace every run of whitespace, newlines included, with one space.
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

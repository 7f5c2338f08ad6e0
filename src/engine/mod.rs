// src/engine/mod.rs

//! Run engine.
//!
//! - `core`: pure classification of observations against the prior cache.
//! - `runtime`: the IO shell that loads the cache, enumerates and reads
//!   targets, calls the core and persists the result.

pub mod core;
pub mod runtime;

pub use self::core::diff;
pub use runtime::Runtime;

use crate::cache::FingerprintCache;
use crate::report::ChangeReport;
use crate::watch::Fingerprint;

/// Result of trying to fingerprint one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub target: String,
    /// The fingerprint, or a one-line reason it could not be computed.
    pub outcome: Result<Fingerprint, String>,
}

impl Observation {
    pub fn fingerprinted(target: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            target: target.into(),
            outcome: Ok(fingerprint),
        }
    }

    pub fn unreadable(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            outcome: Err(reason.into()),
        }
    }
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOutcome {
    pub report: ChangeReport,
    /// The cache to persist for the next run.
    pub cache: FingerprintCache,
}

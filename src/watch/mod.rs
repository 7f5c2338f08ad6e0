// src/watch/mod.rs

//! Target discovery and change detection inputs.
//!
//! This module is responsible for:
//! - Classifying `INPUT` arguments into literal paths and globs.
//! - Enumerating the watch targets of a run (`TargetEnumerator`).
//! - Normalizing manifests and computing their fingerprints.
//!
//! It does **not** know about the cache or the report; it only turns the
//! filesystem into (target, fingerprint) observations.

pub mod enumerator;
pub mod fingerprint;
pub mod path_utils;
pub mod patterns;

pub use enumerator::{FixedTargets, GlobEnumerator, TargetEnumerator, WatchTarget};
pub use fingerprint::{Fingerprint, Fingerprinter};
pub use patterns::{compile_glob, ExcludeSet, InputPattern};

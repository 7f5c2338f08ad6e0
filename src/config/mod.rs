// src/config/mod.rs

//! Configuration loading and validation for yamlwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate patterns and variables (`validate.rs`).
//! - Merge config and CLI flags into run settings (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_optional};
pub use model::{ConfigFile, OutputSection, RawConfigFile, WatchSection};
pub use settings::WatchSettings;

// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum YamlwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid pattern: {0}")]
    PatternError(String),

    #[error("Corrupt cache archive: {0}")]
    CacheFormat(String),

    #[error("Failed to write cache archive {path:?}: {reason}")]
    CacheWrite { path: PathBuf, reason: String },

    #[error("Failed to write report {path:?}: {reason}")]
    ReportWrite { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, YamlwatchError>;

// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, YamlwatchError};
use crate::watch::patterns::compile_glob;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::YamlwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.watch, raw.output, raw.variables))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_cache_path(cfg)?;
    validate_patterns(&cfg.watch.inputs, "inputs")?;
    validate_patterns(&cfg.watch.exclude, "exclude")?;
    validate_variables(cfg)?;
    Ok(())
}

fn validate_cache_path(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.cache.trim().is_empty() {
        return Err(YamlwatchError::ConfigError(
            "[watch].cache must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Every entry must compile as a glob, even literal paths, so that typos
/// like an unbalanced `[` are caught before any file is read.
pub fn validate_patterns(patterns: &[String], field: &str) -> Result<()> {
    for pat in patterns {
        if pat.trim().is_empty() {
            return Err(YamlwatchError::ConfigError(format!(
                "[watch].{field} contains an empty pattern"
            )));
        }
        compile_glob(pat).map_err(|e| {
            YamlwatchError::PatternError(format!("[watch].{field}: {e}"))
        })?;
    }
    Ok(())
}

fn validate_variables(cfg: &RawConfigFile) -> Result<()> {
    for name in cfg.variables.keys() {
        if name.is_empty() || name.contains(['{', '}', '$']) {
            return Err(YamlwatchError::ConfigError(format!(
                "invalid variable name '{name}' in [variables]"
            )));
        }
    }
    Ok(())
}

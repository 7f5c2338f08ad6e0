// src/config/settings.rs

//! Effective settings for one run: the config file merged with CLI flags.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::CliArgs;
use crate::config::model::ConfigFile;
use crate::config::validate::validate_patterns;
use crate::errors::{Result, YamlwatchError};
use crate::types::{NormalizeMode, OutputFormat};

#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub inputs: Vec<String>,
    pub exclude: Vec<String>,
    pub cache: PathBuf,
    pub normalize: NormalizeMode,
    pub expand_variables: bool,
    pub variables: BTreeMap<String, String>,
    pub format: OutputFormat,
    pub report: Option<PathBuf>,
    pub redact: bool,
    pub verbose: bool,
    pub dry_run: bool,
    pub exit_code: bool,
}

impl WatchSettings {
    /// Merge CLI arguments over a loaded config.
    ///
    /// Scalars from the CLI win, CLI excludes are appended to the config's,
    /// and boolean switches are enabled if either side enables them.
    pub fn resolve(args: &CliArgs, cfg: ConfigFile) -> Result<Self> {
        let inputs = if args.inputs.is_empty() {
            cfg.watch.inputs
        } else {
            args.inputs.clone()
        };

        if inputs.is_empty() {
            return Err(YamlwatchError::ConfigError(
                "no inputs given: pass manifest paths/globs or set [watch].inputs"
                    .to_string(),
            ));
        }

        let mut exclude = cfg.watch.exclude;
        exclude.extend(args.exclude.iter().cloned());

        // Config patterns were checked on load; CLI ones have not been yet.
        validate_patterns(&args.inputs, "inputs")?;
        validate_patterns(&args.exclude, "exclude")?;

        let cache = args
            .cache
            .clone()
            .unwrap_or(cfg.watch.cache);
        if cache.trim().is_empty() {
            return Err(YamlwatchError::ConfigError(
                "cache path must not be empty".to_string(),
            ));
        }

        Ok(Self {
            inputs,
            exclude,
            cache: PathBuf::from(cache),
            normalize: args.normalize.unwrap_or(cfg.watch.normalize),
            expand_variables: args.expand_vars || cfg.watch.expand_variables,
            variables: cfg.variables,
            format: args.format.unwrap_or(cfg.output.format),
            report: args
                .report
                .clone()
                .or(cfg.output.report)
                .map(PathBuf::from),
            redact: args.redact || cfg.output.redact,
            verbose: args.verbose,
            dry_run: args.dry_run,
            exit_code: args.exit_code,
        })
    }
}

// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{NormalizeMode, OutputFormat};

/// Default path of the cache archive when neither the CLI nor the config
/// names one.
pub const DEFAULT_CACHE_PATH: &str = "cache.tar.gz";

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// inputs = ["manifests/**/*.yaml"]
/// exclude = ["**/tmp/**"]
/// cache = "cache.tar.gz"
///
/// [output]
/// format = "json"
///
/// [variables]
/// REGION = "eu-west-1"
/// ```
///
/// All sections are optional and have reasonable defaults. This is the raw
/// deserialized form; convert it with `ConfigFile::try_from` to validate it.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub output: OutputSection,

    /// Values for `${NAME}` expansion, consulted after a manifest's own
    /// `variables:` block and before the environment.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`)
/// or the `Default` impl, which is trivially valid.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub watch: WatchSection,
    pub output: OutputSection,
    pub variables: BTreeMap<String, String>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        watch: WatchSection,
        output: OutputSection,
        variables: BTreeMap<String, String>,
    ) -> Self {
        Self {
            watch,
            output,
            variables,
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Manifest paths, directories or glob patterns.
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Globs matched against target ids; matches are not watched.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Cache archive path.
    #[serde(default = "default_cache_path")]
    pub cache: String,

    #[serde(default)]
    pub normalize: NormalizeMode,

    #[serde(default)]
    pub expand_variables: bool,
}

fn default_cache_path() -> String {
    DEFAULT_CACHE_PATH.to_string()
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            exclude: Vec::new(),
            cache: default_cache_path(),
            normalize: NormalizeMode::default(),
            expand_variables: false,
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,

    /// Optional file that receives the JSON report.
    #[serde(default)]
    pub report: Option<String>,

    #[serde(default)]
    pub redact: bool,
}

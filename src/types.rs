use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// How a manifest's bytes are turned into the input of the fingerprint.
///
/// - `Canonical`: parse the YAML and hash a canonical encoding, so that
///   comments, key order, quoting and indentation do not count as changes
///   (default behaviour).
/// - `Raw`: hash the file bytes as they are. The YAML still has to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    Canonical,
    Raw,
}

impl Default for NormalizeMode {
    fn default() -> Self {
        NormalizeMode::Canonical
    }
}

impl FromStr for NormalizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "canonical" => Ok(NormalizeMode::Canonical),
            "raw" => Ok(NormalizeMode::Raw),
            other => Err(format!(
                "invalid normalize mode: {other} (expected \"canonical\" or \"raw\")"
            )),
        }
    }
}

/// Output format for the change report on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per entry: `+ added`, `~ changed`, `- removed`, `! unreadable`.
    Text,
    /// A single JSON object.
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Text
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "invalid output format: {other} (expected \"text\" or \"json\")"
            )),
        }
    }
}

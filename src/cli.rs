// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::{NormalizeMode, OutputFormat};

/// Command-line arguments for `yamlwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "yamlwatch",
    version,
    about = "Report YAML manifests that were added, changed or removed since the last run.",
    long_about = None
)]
pub struct CliArgs {
    /// Manifest paths, directories or glob patterns (e.g. `deploy/**/*.yaml`).
    ///
    /// Overrides `[watch].inputs` from the config file when given.
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<String>,

    /// Path to the fingerprint cache archive (tar.gz).
    ///
    /// Default: `[watch].cache` from the config, else `cache.tar.gz`.
    #[arg(short, long, value_name = "PATH")]
    pub cache: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// If omitted, `Yamlwatch.toml` is used when it exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Glob of targets to ignore. May be repeated; appended to the config's
    /// `[watch].exclude`.
    #[arg(short, long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// How manifests are normalized before fingerprinting.
    #[arg(long, value_enum, value_name = "MODE")]
    pub normalize: Option<NormalizeMode>,

    /// Substitute `${NAME}` references before parsing manifests.
    #[arg(long)]
    pub expand_vars: bool,

    /// Output format for the report on stdout.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Also write the report as JSON to this file.
    #[arg(long, value_name = "PATH")]
    pub report: Option<String>,

    /// Print digests of target ids instead of the ids themselves.
    #[arg(long)]
    pub redact: bool,

    /// Include fingerprints in text output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Read the cache but never write it back.
    #[arg(short = 't', long, alias = "test")]
    pub dry_run: bool,

    /// Exit with status 2 when anything was added, changed or removed.
    #[arg(long)]
    pub exit_code: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `YAMLWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

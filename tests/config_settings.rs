mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::init_tracing;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tempfile::NamedTempFile;
use yamlwatch::cli::CliArgs;
use yamlwatch::config::{load_and_validate, ConfigFile, WatchSettings};
use yamlwatch::errors::YamlwatchError;
use yamlwatch::types::{NormalizeMode, OutputFormat};

fn args(argv: &[&str]) -> CliArgs {
    let mut full = vec!["yamlwatch"];
    full.extend_from_slice(argv);
    CliArgs::try_parse_from(full).expect("valid CLI arguments")
}

#[test]
fn full_config_file_loads() {
    init_tracing();

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[watch]
inputs = ["manifests/**/*.yaml"]
exclude = ["**/drafts/**"]
cache = "out/cache.tar.gz"
normalize = "raw"
expand_variables = true

[output]
format = "json"
report = "report.json"
redact = true

[variables]
REGION = "eu-west-1"
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.watch.inputs, vec!["manifests/**/*.yaml"]);
    assert_eq!(cfg.watch.cache, "out/cache.tar.gz");
    assert_eq!(cfg.watch.normalize, NormalizeMode::Raw);
    assert!(cfg.watch.expand_variables);
    assert_eq!(cfg.output.format, OutputFormat::Json);
    assert_eq!(cfg.output.report.as_deref(), Some("report.json"));
    assert!(cfg.output.redact);
    assert_eq!(cfg.variables["REGION"], "eu-west-1");
}

#[test]
fn empty_config_uses_defaults() {
    let file = NamedTempFile::new().unwrap();
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.watch.cache, "cache.tar.gz");
    assert_eq!(cfg.watch.normalize, NormalizeMode::Canonical);
    assert_eq!(cfg.output.format, OutputFormat::Text);
    assert!(cfg.watch.inputs.is_empty());
}

#[test]
fn unknown_keys_and_bad_enums_are_toml_errors() {
    for body in [
        "[watch]\nwatchh = []\n",
        "[watch]\nnormalize = \"semantic\"\n",
        "[output]\nformat = \"xml\"\n",
    ] {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{body}").unwrap();
        match load_and_validate(file.path()) {
            Err(YamlwatchError::TomlError(_)) => {}
            other => panic!("expected TomlError for {body:?}, got {other:?}"),
        }
    }
}

#[test]
fn invalid_glob_in_config_is_a_pattern_error() {
    let raw = ConfigFileBuilder::new().with_input("deploy/[oops").raw();
    match ConfigFile::try_from(raw) {
        Err(YamlwatchError::PatternError(msg)) => assert!(msg.contains("inputs")),
        other => panic!("expected PatternError, got {other:?}"),
    }
}

#[test]
fn empty_cache_path_is_a_config_error() {
    let raw = ConfigFileBuilder::new().with_cache("  ").raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(YamlwatchError::ConfigError(_))
    ));
}

#[test]
fn bad_variable_name_is_a_config_error() {
    let raw = ConfigFileBuilder::new().with_variable("A}B", "x").raw();
    match ConfigFile::try_from(raw) {
        Err(YamlwatchError::ConfigError(msg)) => assert!(msg.contains("A}B")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn missing_explicit_config_is_an_io_error() {
    let result = yamlwatch::config::load_optional(Some(std::path::Path::new(
        "/definitely/not/here/Yamlwatch.toml",
    )));
    assert!(matches!(result, Err(YamlwatchError::IoError(_))));
}

#[test]
fn cli_overrides_config_and_appends_excludes() {
    let cfg = ConfigFileBuilder::new()
        .with_input("from-config/*.yaml")
        .with_exclude("**/a/**")
        .with_cache("config-cache.tar.gz")
        .with_format(OutputFormat::Json)
        .build();

    let a = args(&[
        "--cache",
        "cli-cache.tar.gz",
        "-e",
        "**/b/**",
        "--normalize",
        "raw",
        "--exit-code",
        "cli/*.yaml",
    ]);
    let s = WatchSettings::resolve(&a, cfg).unwrap();

    assert_eq!(s.inputs, vec!["cli/*.yaml"]);
    assert_eq!(s.exclude, vec!["**/a/**", "**/b/**"]);
    assert_eq!(s.cache, PathBuf::from("cli-cache.tar.gz"));
    assert_eq!(s.normalize, NormalizeMode::Raw);
    assert_eq!(s.format, OutputFormat::Json);
    assert!(s.exit_code);
    assert!(!s.dry_run);
}

#[test]
fn config_inputs_used_when_cli_has_none() {
    let cfg = ConfigFileBuilder::new()
        .with_input("from-config/*.yaml")
        .with_report("report.json")
        .build();
    let s = WatchSettings::resolve(&args(&["--test"]), cfg).unwrap();
    assert_eq!(s.inputs, vec!["from-config/*.yaml"]);
    assert_eq!(s.cache, PathBuf::from("cache.tar.gz"));
    assert_eq!(s.report, Some(PathBuf::from("report.json")));
    assert!(s.dry_run);
}

#[test]
fn no_inputs_anywhere_is_a_config_error() {
    let result = WatchSettings::resolve(&args(&[]), ConfigFile::default());
    assert!(matches!(result, Err(YamlwatchError::ConfigError(_))));
}

#[test]
fn invalid_cli_glob_is_a_pattern_error() {
    let result = WatchSettings::resolve(&args(&["deploy/{a,b"]), ConfigFile::default());
    assert!(matches!(result, Err(YamlwatchError::PatternError(_))));
}

#[test]
fn variables_enable_expansion_from_config() {
    let cfg = ConfigFileBuilder::new()
        .with_input("*.yaml")
        .with_variable("REGION", "eu")
        .build();
    let s = WatchSettings::resolve(&args(&[]), cfg).unwrap();
    assert!(s.expand_variables);
    assert_eq!(s.variables["REGION"], "eu");
}

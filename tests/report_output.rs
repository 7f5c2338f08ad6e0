mod common;
use crate::common::builders::ManifestDir;
use crate::common::{at, init_tracing};

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;

use yamlwatch::cache::{FingerprintCache, FingerprintRecord};
use yamlwatch::engine::WatchOutcome;
use yamlwatch::errors::YamlwatchError;
use yamlwatch::fs::mock::MockFileSystem;
use yamlwatch::fs::RealFileSystem;
use yamlwatch::report::{redact_id, ChangeReport};
use yamlwatch::types::OutputFormat;
use yamlwatch::watch::Fingerprint;
use yamlwatch::{emit_report, exit_status, watch_with, EXIT_CHANGES};

type TestResult = Result<(), Box<dyn Error>>;

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn sample_report() -> ChangeReport {
    let mut unreadable = BTreeMap::new();
    unreadable.insert(
        "deploy/bad.yaml".to_string(),
        "deploy/bad.yaml: did not find expected ',' or ']'".to_string(),
    );
    ChangeReport {
        added: set(&["deploy/new.yaml"]),
        changed: set(&["deploy/web.yaml"]),
        removed: set(&["deploy/old.yaml"]),
        unreadable,
    }
}

fn sample_outcome() -> WatchOutcome {
    let mut cache = FingerprintCache::new();
    cache.insert(
        "deploy/new.yaml",
        FingerprintRecord::new(Fingerprint::from("f00d"), at(0)),
    );
    cache.insert(
        "deploy/web.yaml",
        FingerprintRecord::new(Fingerprint::from("beef"), at(0)),
    );
    WatchOutcome {
        report: sample_report(),
        cache,
    }
}

#[test]
fn text_lines_are_grouped_and_prefixed() {
    let text = sample_report().to_text(None);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "+ deploy/new.yaml",
            "~ deploy/web.yaml",
            "- deploy/old.yaml",
            "! deploy/bad.yaml: deploy/bad.yaml: did not find expected ',' or ']'",
        ]
    );
}

#[test]
fn empty_report_renders_nothing() {
    assert_eq!(ChangeReport::default().to_text(None), "");
    assert!(ChangeReport::default().is_empty());
}

#[test]
fn unreadable_alone_is_not_a_change() {
    let mut report = ChangeReport::default();
    report
        .unreadable
        .insert("x.yaml".to_string(), "boom".to_string());
    assert!(report.is_empty());
    assert!(report.has_unreadable());
}

#[test]
fn verbose_text_carries_new_fingerprints() {
    let outcome = sample_outcome();
    let text = outcome.report.to_text(Some(&outcome.cache));
    assert!(text.contains("+ deploy/new.yaml f00d\n"));
    assert!(text.contains("~ deploy/web.yaml beef\n"));
    assert!(text.contains("- deploy/old.yaml\n"));
}

#[test]
fn json_has_all_four_keys() -> TestResult {
    let json = sample_report().render(OutputFormat::Json, None)?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["added"], serde_json::json!(["deploy/new.yaml"]));
    assert_eq!(value["changed"], serde_json::json!(["deploy/web.yaml"]));
    assert_eq!(value["removed"], serde_json::json!(["deploy/old.yaml"]));
    assert!(value["unreadable"]["deploy/bad.yaml"].is_string());
    assert!(json.ends_with('\n'));
    Ok(())
}

#[test]
fn redaction_hides_ids_everywhere() {
    let redacted = sample_report().redacted();
    let text = redacted.to_text(None);
    assert!(!text.contains("deploy/"));
    assert!(redacted.added.contains(&redact_id("deploy/new.yaml")));
    let reason = &redacted.unreadable[&redact_id("deploy/bad.yaml")];
    assert!(reason.starts_with("<redacted>:"));
    assert_eq!(redact_id("a"), redact_id("a"));
    assert_ne!(redact_id("a"), redact_id("b"));
}

#[test]
fn emit_report_writes_stdout_and_report_file() -> TestResult {
    init_tracing();

    let dir = ManifestDir::new();
    let fs = MockFileSystem::new();
    let mut settings = dir.settings(&["*.yaml"]);
    settings.format = OutputFormat::Json;
    settings.report = Some("out/report.json".into());

    let mut stdout = Vec::new();
    emit_report(&fs, &settings, &sample_outcome(), &mut stdout)?;

    let printed: ChangeReport = serde_json::from_slice(&stdout)?;
    assert_eq!(printed, sample_report());
    let file: ChangeReport = serde_json::from_slice(&fs.contents("out/report.json").unwrap())?;
    assert_eq!(file, sample_report());
    Ok(())
}

#[test]
fn redacted_verbose_output_drops_fingerprints() -> TestResult {
    let dir = ManifestDir::new();
    let fs = MockFileSystem::new();
    let mut settings = dir.settings(&["*.yaml"]);
    settings.verbose = true;
    settings.redact = true;

    let mut stdout = Vec::new();
    emit_report(&fs, &settings, &sample_outcome(), &mut stdout)?;
    let text = String::from_utf8(stdout)?;
    assert!(!text.contains("f00d"));
    assert!(text.contains(&format!("+ {}\n", redact_id("deploy/new.yaml"))));
    Ok(())
}

#[test]
fn report_file_failure_is_a_report_write_error() {
    let dir = ManifestDir::new();
    let fs = MockFileSystem::new();
    fs.set_read_only(true);
    let mut settings = dir.settings(&["*.yaml"]);
    settings.report = Some("report.json".into());

    let mut stdout = Vec::new();
    let err = emit_report(&fs, &settings, &sample_outcome(), &mut stdout).unwrap_err();
    assert!(matches!(err, YamlwatchError::ReportWrite { .. }), "got {err:?}");
}

#[test]
fn end_to_end_text_output_on_real_files() -> TestResult {
    init_tracing();

    let dir = ManifestDir::new();
    dir.write("a.yaml", "a: 1\n");
    let settings = dir.settings(&["*.yaml"]);

    let outcome = watch_with(&RealFileSystem, &settings)?;
    let mut stdout = Vec::new();
    emit_report(&RealFileSystem, &settings, &outcome, &mut stdout)?;
    assert_eq!(String::from_utf8(stdout)?, format!("+ {}\n", dir.id("a.yaml")));
    Ok(())
}

#[test]
fn exit_status_signals_changes_only_when_asked() {
    let dir = ManifestDir::new();
    let mut settings = dir.settings(&["*.yaml"]);

    // Flag off: always 0.
    assert_eq!(exit_status(&settings, &sample_report()), 0);

    settings.exit_code = true;
    assert_eq!(exit_status(&settings, &sample_report()), EXIT_CHANGES);
    assert_eq!(exit_status(&settings, &ChangeReport::default()), 0);

    for kind in ["added", "changed", "removed"] {
        let mut report = ChangeReport::default();
        let bucket = match kind {
            "added" => &mut report.added,
            "changed" => &mut report.changed,
            _ => &mut report.removed,
        };
        bucket.insert("x.yaml".to_string());
        assert_eq!(exit_status(&settings, &report), EXIT_CHANGES, "{kind}");
    }

    let mut unreadable_only = ChangeReport::default();
    unreadable_only
        .unreadable
        .insert("x.yaml".to_string(), "boom".to_string());
    assert_eq!(exit_status(&settings, &unreadable_only), 0);
}

#[test]
fn exit_status_after_real_runs() -> TestResult {
    let dir = ManifestDir::new();
    dir.write("a.yaml", "a: 1\n");
    let mut settings = dir.settings(&["*.yaml"]);
    settings.exit_code = true;

    let first = watch_with(&RealFileSystem, &settings)?;
    assert_eq!(exit_status(&settings, &first.report), EXIT_CHANGES);

    let second = watch_with(&RealFileSystem, &settings)?;
    assert_eq!(exit_status(&settings, &second.report), 0);

    dir.write("b.yaml", "b: [\n");
    let broken_only = watch_with(&RealFileSystem, &settings)?;
    assert!(broken_only.report.has_unreadable());
    assert_eq!(exit_status(&settings, &broken_only.report), 0);
    Ok(())
}

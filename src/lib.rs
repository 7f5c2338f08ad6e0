// src/lib.rs

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod report;
pub mod types;
pub mod watch;

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info};

use crate::cache::{ArchiveCacheStore, CacheStore, MemoryCacheStore};
use crate::cli::CliArgs;
use crate::config::{load_optional, WatchSettings};
use crate::engine::{Runtime, WatchOutcome};
use crate::errors::YamlwatchError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::report::ChangeReport;
use crate::watch::{Fingerprinter, GlobEnumerator};

/// Exit status when `--exit-code` is set and something changed.
pub const EXIT_CHANGES: i32 = 2;

/// What `run` hands back to `main.rs`.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: ChangeReport,
    pub exit_code: i32,
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI merge
/// - target enumeration over the real filesystem
/// - the cache store (archive, or memory for dry runs)
/// - one engine run
/// - report output on stdout and optionally to a file
pub fn run(args: CliArgs) -> Result<RunSummary> {
    let cfg = load_optional(args.config.as_deref().map(Path::new))?;
    let settings = WatchSettings::resolve(&args, cfg)?;
    debug!(?settings, "resolved settings");

    let fs = RealFileSystem;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = watch_and_report(&fs, &settings, &mut out)?;

    let exit_code = exit_status(&settings, &outcome.report);
    Ok(RunSummary {
        report: outcome.report,
        exit_code,
    })
}

/// Process exit status for a successful run.
///
/// `EXIT_CHANGES` only when `--exit-code` is set and something was added,
/// changed or removed; unreadable targets alone do not count.
pub fn exit_status(settings: &WatchSettings, report: &ChangeReport) -> i32 {
    if settings.exit_code && !report.is_empty() {
        EXIT_CHANGES
    } else {
        0
    }
}

/// Run one watch cycle against `fs` with resolved settings and persist the
/// new cache, without printing anything.
///
/// In dry-run mode the archive is read but the new cache only goes to a
/// memory store.
pub fn watch_with(fs: &dyn FileSystem, settings: &WatchSettings) -> crate::errors::Result<WatchOutcome> {
    watch_then(fs, settings, |_| Ok(()))
}

/// Run one watch cycle and publish its report to `out` (and the report
/// file, if configured) before the cache is persisted.
///
/// If publishing fails the stored cache is left as it was, so the next run
/// reports the same changes again.
pub fn watch_and_report(
    fs: &dyn FileSystem,
    settings: &WatchSettings,
    out: &mut dyn Write,
) -> crate::errors::Result<WatchOutcome> {
    watch_then(fs, settings, |outcome| emit_report(fs, settings, outcome, out))
}

fn watch_then<F>(
    fs: &dyn FileSystem,
    settings: &WatchSettings,
    publish: F,
) -> crate::errors::Result<WatchOutcome>
where
    F: FnOnce(&WatchOutcome) -> crate::errors::Result<()>,
{
    let enumerator = GlobEnumerator::new(fs, &settings.inputs, &settings.exclude)
        .map_err(|e| YamlwatchError::PatternError(format!("{e:#}")))?;
    let fingerprinter = fingerprinter_for(settings);

    let mut archive_store = ArchiveCacheStore::new(fs, settings.cache.clone());
    let mut memory_store;
    let store: &mut dyn CacheStore = if settings.dry_run {
        info!(path = ?settings.cache, "dry run: cache archive will not be written");
        memory_store = MemoryCacheStore::seeded(archive_store.load());
        &mut memory_store
    } else {
        &mut archive_store
    };

    let mut runtime = Runtime::new(fs, &enumerator, store, fingerprinter);
    let outcome = runtime.evaluate(Utc::now())?;
    publish(&outcome)?;
    runtime.commit(&outcome)?;
    Ok(outcome)
}

fn fingerprinter_for(settings: &WatchSettings) -> Fingerprinter {
    let fingerprinter = Fingerprinter::new(settings.normalize);
    if settings.expand_variables {
        fingerprinter.with_variables(settings.variables.clone())
    } else {
        fingerprinter
    }
}

/// Print the report to `out` and write the JSON report file if configured.
pub fn emit_report(
    fs: &dyn FileSystem,
    settings: &WatchSettings,
    outcome: &WatchOutcome,
    out: &mut dyn Write,
) -> crate::errors::Result<()> {
    let report = if settings.redact {
        outcome.report.redacted()
    } else {
        outcome.report.clone()
    };

    // Redacted ids no longer match cache keys, so fingerprints are only
    // shown for plain output.
    let fingerprints = (settings.verbose && !settings.redact).then_some(&outcome.cache);
    let rendered = report
        .render(settings.format, fingerprints)
        .map_err(anyhow::Error::from)?;
    out.write_all(rendered.as_bytes())?;
    out.flush()?;

    if let Some(path) = &settings.report {
        write_report_file(fs, path, &report)?;
    }
    Ok(())
}

fn write_report_file(
    fs: &dyn FileSystem,
    path: &Path,
    report: &ChangeReport,
) -> crate::errors::Result<()> {
    let err = |reason: String| YamlwatchError::ReportWrite {
        path: path.to_path_buf(),
        reason,
    };
    let mut json = report.to_json().map_err(|e| err(e.to_string()))?;
    json.push('\n');
    fs.write(path, json.as_bytes())
        .map_err(|e| err(format!("{e:#}")))?;
    info!(path = ?path, "wrote report file");
    Ok(())
}

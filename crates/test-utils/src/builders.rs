#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use yamlwatch::config::{ConfigFile, RawConfigFile, WatchSettings};
use yamlwatch::types::{NormalizeMode, OutputFormat};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_input(mut self, pattern: &str) -> Self {
        self.config.watch.inputs.push(pattern.to_string());
        self
    }

    pub fn with_exclude(mut self, pattern: &str) -> Self {
        self.config.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn with_cache(mut self, path: &str) -> Self {
        self.config.watch.cache = path.to_string();
        self
    }

    pub fn with_normalize(mut self, mode: NormalizeMode) -> Self {
        self.config.watch.normalize = mode;
        self
    }

    pub fn with_variable(mut self, name: &str, value: &str) -> Self {
        self.config.watch.expand_variables = true;
        self.config
            .variables
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    pub fn with_report(mut self, path: &str) -> Self {
        self.config.output.report = Some(path.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A temporary directory of manifests plus a cache path inside it.
pub struct ManifestDir {
    dir: TempDir,
}

impl ManifestDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("creating temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Absolute path as a forward-slash string, usable in globs and as the
    /// expected target id.
    pub fn id(&self, rel: &str) -> String {
        self.path(rel).to_string_lossy().replace('\\', "/")
    }

    /// Glob rooted in this directory.
    pub fn glob(&self, pattern: &str) -> String {
        format!("{}/{}", self.root().to_string_lossy().replace('\\', "/"), pattern)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.path("state/cache.tar.gz")
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("creating manifest dir");
        }
        fs::write(&path, content).expect("writing manifest");
        path
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.path(rel)).expect("removing manifest");
    }

    /// Settings that watch `inputs` (globs relative to this directory) with
    /// the cache at `cache_path()`.
    pub fn settings(&self, inputs: &[&str]) -> WatchSettings {
        WatchSettings {
            inputs: inputs.iter().map(|p| self.glob(p)).collect(),
            exclude: Vec::new(),
            cache: self.cache_path(),
            normalize: NormalizeMode::Canonical,
            expand_variables: false,
            variables: Default::default(),
            format: OutputFormat::Text,
            report: None,
            redact: false,
            verbose: false,
            dry_run: false,
            exit_code: false,
        }
    }
}

impl Default for ManifestDir {
    fn default() -> Self {
        Self::new()
    }
}

// src/watch/enumerator.rs

//! Resolving `INPUT` arguments into the set of watch targets for a run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::fs::FileSystem;
use crate::watch::path_utils::{has_yaml_extension, is_hidden, slash_str, target_id};
use crate::watch::patterns::{ExcludeSet, InputPattern};

/// A manifest to fingerprint in this run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct WatchTarget {
    /// Stable identifier used as the cache key and in reports.
    pub id: String,
    /// Where to read the manifest from.
    pub path: PathBuf,
}

impl WatchTarget {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: target_id(&path),
            path,
        }
    }
}

/// Produces the current set of targets.
///
/// The engine only depends on this trait, so tests can hand it a fixed
/// list instead of globbing a real directory tree.
pub trait TargetEnumerator {
    /// Targets sorted and deduplicated by id.
    fn enumerate(&self) -> Result<Vec<WatchTarget>>;
}

/// A fixed list of targets.
#[derive(Debug, Clone, Default)]
pub struct FixedTargets {
    targets: Vec<WatchTarget>,
}

impl FixedTargets {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            targets: paths.into_iter().map(WatchTarget::from_path).collect(),
        }
    }
}

impl TargetEnumerator for FixedTargets {
    fn enumerate(&self) -> Result<Vec<WatchTarget>> {
        Ok(dedup_sorted(self.targets.iter().cloned()))
    }
}

/// Resolves literal paths, directories and globs against a `FileSystem`.
#[derive(Debug)]
pub struct GlobEnumerator<'a> {
    fs: &'a dyn FileSystem,
    inputs: Vec<InputPattern>,
    exclude: ExcludeSet,
}

impl<'a> GlobEnumerator<'a> {
    pub fn new(fs: &'a dyn FileSystem, inputs: &[String], exclude: &[String]) -> Result<Self> {
        let inputs = inputs
            .iter()
            .map(|i| InputPattern::parse(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            fs,
            inputs,
            exclude: ExcludeSet::new(exclude)?,
        })
    }

    fn resolve(&self, input: &InputPattern, out: &mut Vec<WatchTarget>) {
        match input {
            InputPattern::Literal(path) => {
                if self.fs.is_file(path) {
                    out.push(WatchTarget::from_path(path));
                } else if self.fs.is_dir(path) {
                    for file in self.walk(path) {
                        if has_yaml_extension(&file) {
                            out.push(WatchTarget::from_path(file));
                        }
                    }
                } else {
                    warn!(path = ?path, "input does not exist; nothing to watch there");
                }
            }
            InputPattern::Glob {
                pattern,
                base,
                relative_to_cwd,
                matcher,
            } => {
                if !self.fs.is_dir(base) {
                    debug!(%pattern, base = ?base, "glob base is not a directory");
                    return;
                }
                let before = out.len();
                for file in self.walk(base) {
                    let candidate = if *relative_to_cwd {
                        target_id(&file)
                    } else {
                        slash_str(&file)
                    };
                    if matcher.is_match(&candidate) {
                        out.push(WatchTarget::from_path(file));
                    }
                }
                debug!(%pattern, matched = out.len() - before, "resolved glob");
            }
        }
    }

    /// All non-hidden files beneath `root`. Symlinked files are included,
    /// symlinked directories are not followed.
    fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let mut stack = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            let entries = match self.fs.read_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = ?dir, error = %e, "skipping unreadable directory");
                    continue;
                }
            };
            for path in entries {
                if is_hidden(&path) {
                    continue;
                }
                if self.fs.is_dir(&path) {
                    // Linked directories can point back up the tree.
                    if self.fs.is_symlink(&path) {
                        debug!(dir = ?path, "not descending into symlinked directory");
                        continue;
                    }
                    stack.push(path);
                } else if self.fs.is_file(&path) {
                    files.push(path);
                }
            }
        }

        files
    }
}

impl TargetEnumerator for GlobEnumerator<'_> {
    fn enumerate(&self) -> Result<Vec<WatchTarget>> {
        let mut found = Vec::new();
        for input in &self.inputs {
            self.resolve(input, &mut found);
        }

        let targets: Vec<WatchTarget> = dedup_sorted(found.into_iter())
            .into_iter()
            .filter(|t| {
                let excluded = self.exclude.is_excluded(&t.id);
                if excluded {
                    debug!(manifest = %t.id, "excluded");
                }
                !excluded
            })
            .collect();

        debug!(count = targets.len(), "enumerated watch targets");
        Ok(targets)
    }
}

fn dedup_sorted(targets: impl Iterator<Item = WatchTarget>) -> Vec<WatchTarget> {
    let mut by_id: BTreeMap<String, WatchTarget> = BTreeMap::new();
    for t in targets {
        by_id.entry(t.id.clone()).or_insert(t);
    }
    by_id.into_values().collect()
}

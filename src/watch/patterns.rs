// src/watch/patterns.rs

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};

/// Characters that make an input a glob rather than a literal path.
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Compile a single glob the way inputs and excludes are interpreted:
/// `*` stops at `/`, `**` crosses directories.
pub fn compile_glob(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))
}

pub fn is_glob(input: &str) -> bool {
    input.contains(GLOB_META)
}

/// One `INPUT` argument, classified.
#[derive(Clone)]
pub enum InputPattern {
    /// A file or directory named literally.
    Literal(PathBuf),
    /// A glob, with the directory to start walking from.
    Glob {
        pattern: String,
        base: PathBuf,
        /// True when the pattern has no literal leading directory, so
        /// walked paths must be compared without the `./` prefix.
        relative_to_cwd: bool,
        matcher: GlobMatcher,
    },
}

impl fmt::Debug for InputPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputPattern::Literal(path) => f.debug_tuple("Literal").field(path).finish(),
            InputPattern::Glob { pattern, base, .. } => f
                .debug_struct("Glob")
                .field("pattern", pattern)
                .field("base", base)
                .finish_non_exhaustive(),
        }
    }
}

impl InputPattern {
    pub fn parse(input: &str) -> Result<Self> {
        if !is_glob(input) {
            return Ok(InputPattern::Literal(PathBuf::from(input)));
        }

        let matcher = compile_glob(input)?.compile_matcher();
        let (base, relative_to_cwd) = glob_base(input);
        Ok(InputPattern::Glob {
            pattern: input.to_string(),
            base,
            relative_to_cwd,
            matcher,
        })
    }
}

/// Split off the literal leading directories of a glob.
///
/// `deploy/*/app.yaml` walks from `deploy`, `/etc/k8s/**/*.yml` from
/// `/etc/k8s`, and `*.yaml` from `.`.
fn glob_base(pattern: &str) -> (PathBuf, bool) {
    let segments: Vec<&str> = pattern.split('/').collect();
    // The last segment names files, never the base directory.
    let literal: Vec<&str> = segments[..segments.len().saturating_sub(1)]
        .iter()
        .take_while(|seg| !is_glob(seg))
        .copied()
        .collect();

    if literal.is_empty() {
        return (PathBuf::from("."), true);
    }
    let joined = literal.join("/");
    if joined.is_empty() {
        // Pattern started with `/` followed directly by a glob segment.
        return (PathBuf::from("/"), false);
    }
    (PathBuf::from(joined), false)
}

/// Compiled `exclude` patterns, matched against target ids.
#[derive(Clone)]
pub struct ExcludeSet {
    set: Option<GlobSet>,
}

impl fmt::Debug for ExcludeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeSet")
            .field("len", &self.set.as_ref().map(|s| s.len()).unwrap_or(0))
            .finish()
    }
}

impl ExcludeSet {
    pub fn new(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self { set: None });
        }
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            builder.add(compile_glob(pat)?);
        }
        let set = builder.build().context("building exclude globset")?;
        Ok(Self { set: Some(set) })
    }

    pub fn is_excluded(&self, id: &str) -> bool {
        self.set.as_ref().map(|s| s.is_match(id)).unwrap_or(false)
    }
}

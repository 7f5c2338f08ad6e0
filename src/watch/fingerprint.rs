// src/watch/fingerprint.rs

//! Manifest normalization and fingerprinting.
//!
//! A fingerprint is the BLAKE3 digest of a manifest's normalized bytes. In
//! canonical mode the YAML is parsed and re-encoded with mapping keys in a
//! fixed order, so edits that only touch comments, whitespace, quoting or
//! key order leave the fingerprint unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use blake3::Hasher;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::fs::FileSystem;
use crate::types::NormalizeMode;

/// Separator placed between documents of a multi-document stream.
const DOCUMENT_SEPARATOR: &str = "\n---\n";

static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid"));

/// Hex-encoded BLAKE3 digest of a manifest's normalized content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(bytes);
        Fingerprint(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fingerprint {
    fn from(s: &str) -> Self {
        Fingerprint(s.to_string())
    }
}

/// Turns manifest text into fingerprints according to the run settings.
#[derive(Debug, Clone, Default)]
pub struct Fingerprinter {
    mode: NormalizeMode,
    expand_variables: bool,
    variables: BTreeMap<String, String>,
}

impl Fingerprinter {
    pub fn new(mode: NormalizeMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Enable `${NAME}` expansion with `variables` as the config-level
    /// fallback values.
    pub fn with_variables(mut self, variables: BTreeMap<String, String>) -> Self {
        self.expand_variables = true;
        self.variables = variables;
        self
    }

    /// Read and fingerprint one manifest.
    pub fn fingerprint_file(&self, fs: &dyn FileSystem, path: &Path) -> Result<Fingerprint> {
        let text = fs.read_to_string(path)?;
        self.fingerprint_str(&text)
            .with_context(|| format!("fingerprinting {}", path.display()))
    }

    pub fn fingerprint_str(&self, text: &str) -> Result<Fingerprint> {
        let bytes = self.normalize(text)?;
        Ok(Fingerprint::of_bytes(&bytes))
    }

    /// The exact bytes that get hashed.
    pub fn normalize(&self, text: &str) -> Result<Vec<u8>> {
        let expanded;
        let text = if self.expand_variables {
            expanded = expand_variables(text, &self.variables)?;
            expanded.as_str()
        } else {
            text
        };

        let documents = parse_documents(text)?;
        match self.mode {
            NormalizeMode::Raw => Ok(text.as_bytes().to_vec()),
            NormalizeMode::Canonical => {
                let encoded: Vec<String> = documents.iter().map(canonical_encode).collect();
                Ok(encoded.join(DOCUMENT_SEPARATOR).into_bytes())
            }
        }
    }
}

/// Parse every document of a YAML stream, resolving `<<` merge keys.
pub fn parse_documents(text: &str) -> Result<Vec<Value>> {
    let mut documents = Vec::new();
    for (index, de) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let mut value = Value::deserialize(de)
            .with_context(|| format!("invalid YAML in document {}", index + 1))?;
        value
            .apply_merge()
            .with_context(|| format!("invalid merge key in document {}", index + 1))?;
        documents.push(value);
    }
    Ok(documents)
}

/// Substitute `${NAME}` references.
///
/// Lookup order: the manifest's own top-level `variables:` mapping, then
/// `fallback`, then the process environment. Unknown names are replaced by
/// the bare name.
pub fn expand_variables(text: &str, fallback: &BTreeMap<String, String>) -> Result<String> {
    if !VARIABLE_RE.is_match(text) {
        return Ok(text.to_string());
    }
    let local = manifest_variables(text)?;

    let expanded = VARIABLE_RE.replace_all(text, |caps: &Captures<'_>| {
        let name = &caps[1];
        local
            .get(name)
            .or_else(|| fallback.get(name))
            .cloned()
            .or_else(|| std::env::var(name).ok())
            .unwrap_or_else(|| name.to_string())
    });
    Ok(expanded.into_owned())
}

/// String-valued entries of the first document's `variables:` mapping.
fn manifest_variables(text: &str) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();
    let Some(de) = serde_yaml::Deserializer::from_str(text).next() else {
        return Ok(vars);
    };
    let doc = Value::deserialize(de).context("invalid YAML in document 1")?;
    if let Some(Value::Mapping(map)) = doc.get("variables") {
        for (k, v) in map {
            if let (Some(k), Some(v)) = (k.as_str(), scalar_string(v)) {
                vars.insert(k.to_string(), v);
            }
        }
    }
    Ok(vars)
}

fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deterministic text encoding of a YAML value.
///
/// Mapping entries are ordered by their encoded key so that source key
/// order does not matter; strings are JSON-quoted so that `1` and `"1"`
/// stay distinct.
pub fn canonical_encode(value: &Value) -> String {
    let mut out = String::new();
    encode_into(value, &mut out);
    out
}

fn encode_into(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&quote(s)),
        Value::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                encode_into(item, out);
            }
            out.push(']');
        }
        Value::Mapping(map) => {
            let mut entries: Vec<(String, String)> = map
                .iter()
                .map(|(k, v)| (canonical_encode(k), canonical_encode(v)))
                .collect();
            entries.sort();
            out.push('{');
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(k);
                out.push(':');
                out.push_str(v);
            }
            out.push('}');
        }
        Value::Tagged(tagged) => {
            out.push_str(&tagged.tag.to_string());
            out.push(' ');
            encode_into(&tagged.value, out);
        }
    }
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}"))
}

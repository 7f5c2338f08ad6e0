// src/watch/path_utils.rs

//! Utility functions for turning paths into stable target ids.

use std::path::Path;

/// Render a path with forward slashes.
pub fn slash_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Stable id for a target path: forward slashes, no leading `./`.
///
/// `./deploy/app.yaml`, `deploy/app.yaml` and `deploy\app.yaml` all map to
/// `deploy/app.yaml`. Absolute paths stay absolute.
pub fn target_id(path: &Path) -> String {
    let mut s = slash_str(path);
    while let Some(rest) = s.strip_prefix("./") {
        s = rest.to_string();
    }
    s
}

/// True for dotfiles and dot-directories (`.git`, `.cache.yaml`).
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.') && n != "." && n != "..")
        .unwrap_or(false)
}

/// True when the file has a `.yaml` or `.yml` extension (any case).
pub fn has_yaml_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

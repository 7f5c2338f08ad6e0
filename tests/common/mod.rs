#![allow(dead_code)]

pub use yamlwatch_test_utils::builders;
pub use yamlwatch_test_utils::{at, init_tracing};

use std::path::Path;

use yamlwatch::cache::{decode_archive, FingerprintCache};

/// Read and decode the archive at `path`, panicking on any problem.
pub fn read_cache(path: &Path) -> FingerprintCache {
    let bytes = std::fs::read(path).expect("cache archive exists");
    decode_archive(&bytes).expect("cache archive decodes")
}

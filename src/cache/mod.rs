// src/cache/mod.rs

//! The fingerprint cache: the value carried between runs, its archive
//! encoding, and the stores that persist it.

pub mod archive;
pub mod model;
pub mod store;

pub use archive::{decode_archive, encode_archive, CACHE_ENTRY};
pub use model::{FingerprintCache, FingerprintRecord, CACHE_FORMAT_VERSION};
pub use store::{ArchiveCacheStore, CacheStore, MemoryCacheStore};

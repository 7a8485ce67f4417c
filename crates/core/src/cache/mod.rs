//! Session-scoped result cache.
//!
//! This module provides a memoization layer for search results:
//!
//! - Canonical SHA-256 fingerprints as cache keys
//! - Lazy TTL expiry (no background sweep)
//! - Whole-table persistence to a pluggable session store
//! - In-memory and SQLite session stores

pub mod hash;
pub mod migrations;
pub mod result;
pub mod sqlite;
pub mod store;

pub use crate::Error;

pub use hash::fingerprint;
pub use result::{CacheStats, DEFAULT_TTL, ResultCache, STORAGE_KEY};
pub use sqlite::SqliteStore;
pub use store::{MemoryStore, SessionStore};

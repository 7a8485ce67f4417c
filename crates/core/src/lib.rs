//! Core types and shared functionality for good-first-issues.
//!
//! This crate provides:
//! - The `SearchFilters` model and its shareable token codec
//! - A session-scoped result cache keyed by canonical fingerprints
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod filters;

pub use cache::{CacheStats, MemoryStore, ResultCache, SessionStore, SqliteStore, fingerprint};
pub use config::AppConfig;
pub use error::Error;
pub use filters::{DatePreset, DateRange, SearchFilters, SortBy, SortOrder, SortPreset};

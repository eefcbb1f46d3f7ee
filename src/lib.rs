//! Query-execution layer for a repository full-text index.
//!
//! Wraps a tantivy index with query sanitization, a version-checked cached
//! index handle, sorted and windowed execution, and collection/community
//! scoping. Indexing documents into the index is a separate pipeline.

pub mod config;
pub mod search;

// src/crawl/mod.rs
// =============================================================================
// This module handles walking the documentation tree.
//
// Features:
// - A cache of parsed documents, keyed by absolute path
// - Breadth-first walk starting from the seed documents
// - Documents are only read when something links to them
//
// Rust concepts:
// - Ownership: The walker borrows the cache mutably for the whole run
// - Collections: HashMap for lookups, VecDeque for the work queue
// =============================================================================

mod cache;
mod queue;

pub use cache::{read_lossy, DocumentCache};
pub use queue::{compile_ignore, validate};

//! Cache implementations
//!
//! Provides caching adapters for the application layer:
//! - `MemoryCache`: process-local map that keeps every entry until overwritten

mod memory_cache;

pub use memory_cache::MemoryCache;

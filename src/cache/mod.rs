//! Cache module for storing API responses on disk
//!
//! Entries carry a time-to-live; expired entries remain readable so stale
//! data can be shown when an API is unavailable.

mod manager;

pub use manager::{CacheManager, CachedData};

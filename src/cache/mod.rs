//! Cache module for storing API responses to disk
//!
//! This module provides a cache manager that persists API responses to the
//! filesystem with a fixed TTL (time-to-live) per manager. Entries past their
//! TTL read as absent, so providers transparently refetch stale data.

mod manager;

pub use manager::{CacheError, CacheManager, DEFAULT_TTL_SECS};

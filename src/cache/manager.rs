//! Cache manager for persisting provider responses to disk
//!
//! Provides a `CacheManager` that stores serializable payloads to JSON files
//! with a write timestamp. Each manager owns one provider's cache directory
//! and a fixed TTL; entries whose age has reached the TTL read as absent.

use chrono::Utc;
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Default time-to-live for cache entries in seconds (7 days)
pub const DEFAULT_TTL_SECS: i64 = 604_800;

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// Unix timestamp (seconds) of when the data was written
    timestamp: i64,
    /// The cached payload, exactly as decoded from the provider
    data: T,
}

/// Errors that can occur when reading or writing cache entries
///
/// A missing or expired entry is not an error; it reads as `None`. Errors are
/// reserved for I/O failures and entries that exist but cannot be decoded.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem read/write failed
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),

    /// An entry exists on disk but its contents could not be decoded
    #[error("malformed cache entry for key '{key}': {message}")]
    Malformed { key: String, message: String },
}

/// Manages reading and writing cached payloads for one provider
///
/// Payloads are stored as JSON files under an XDG-compliant cache directory
/// (`~/.cache/tsuki/<provider>/` on Linux), one file per cache key. Keys may
/// contain `/` separators, which map to subdirectories. The TTL is fixed at
/// construction; an entry whose age has reached the TTL is treated as absent,
/// and the next successful fetch overwrites it in place.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    /// Maximum entry age in seconds before it reads as absent
    ttl_secs: i64,
}

impl CacheManager {
    /// Creates a CacheManager for a provider using the XDG cache directory
    ///
    /// Uses `~/.cache/tsuki/<provider>/` on Linux, or the equivalent XDG path
    /// on other platforms, with the default 7-day TTL. Returns `None` if the
    /// cache directory cannot be determined (e.g., no home directory).
    pub fn for_provider(provider: &str) -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "tsuki")?;
        let cache_dir = project_dirs.cache_dir().join(provider);
        Some(Self {
            cache_dir,
            ttl_secs: DEFAULT_TTL_SECS,
        })
    }

    /// Creates a CacheManager with a custom directory and TTL
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_dir(cache_dir: PathBuf, ttl_secs: i64) -> Self {
        Self {
            cache_dir,
            ttl_secs,
        }
    }

    /// Overrides the TTL, in seconds
    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Returns the path to the cache file for the given key
    ///
    /// `/` separators in the key become path components, so a key like
    /// `discord/1234` lands in a per-platform subdirectory.
    fn entry_path(&self, key: &str) -> PathBuf {
        let mut path = self.cache_dir.clone();
        for segment in key.split('/') {
            path.push(segment);
        }
        path.set_extension("json");
        path
    }

    /// Writes a payload to the cache under the given key
    ///
    /// The entry is stamped with the current time and fully overwrites any
    /// previous entry for the key. Parent directories are created as needed.
    /// Concurrent writers to the same key race; last write wins.
    pub fn write<T: Serialize>(&self, key: &str, data: &T) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entry = CacheEntry {
            timestamp: Utc::now().timestamp(),
            data,
        };

        let json = serde_json::to_string(&entry).map_err(|e| CacheError::Malformed {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        fs::write(path, json)?;
        Ok(())
    }

    /// Reads a payload from the cache
    ///
    /// Returns `Ok(None)` if no entry exists for the key, or if the entry's
    /// age has reached the TTL (the stale file is left in place and will be
    /// overwritten by the next write). An entry that exists but cannot be
    /// decoded propagates a `CacheError::Malformed`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let path = self.entry_path(key);
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(e)),
        };

        let entry: CacheEntry<T> =
            serde_json::from_str(&content).map_err(|e| CacheError::Malformed {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let age = Utc::now().timestamp() - entry.timestamp;
        if age >= self.ttl_secs {
            return Ok(None);
        }

        Ok(Some(entry.data))
    }
}

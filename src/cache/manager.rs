//! Disk cache for API responses
//!
//! Stores serializable values as JSON files with an expiry timestamp. Expired
//! entries are still readable so callers can fall back to them when the API
//! is down.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk envelope around a cached value
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// A value read back from the cache together with its freshness
#[derive(Debug)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
    /// Whether the entry is past its time-to-live
    pub is_expired: bool,
}

/// Reads and writes cache entries under a single directory
///
/// The default location is the XDG cache directory for the application
/// (`~/.cache/weathernews/` on Linux).
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager in the platform cache directory
    ///
    /// Returns `None` when no home directory can be determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "weathernews")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a CacheManager rooted at a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory holding the cache files
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Writes `data` under `key`, fresh for `ttl_hours`
    pub fn write<T: Serialize>(&self, key: &str, data: &T, ttl_hours: u64) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let now = Utc::now();
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now + Duration::hours(ttl_hours as i64),
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)
    }

    /// Reads the entry stored under `key`
    ///
    /// Returns `None` if the entry is missing or unreadable. Expired entries
    /// are returned with `is_expired = true`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let content = fs::read_to_string(self.cache_path(key)).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        Some(CachedData {
            data: entry.data,
            cached_at: entry.cached_at,
            is_expired: Utc::now() > entry.expires_at,
        })
    }
}

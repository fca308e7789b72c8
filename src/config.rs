use serde::{Deserialize, Serialize};

use crate::CacheError;

/// Default maximum number of cached entries.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Default maximum aggregate estimated size in bytes (50 MiB).
pub const DEFAULT_MAX_SIZE_BYTES: usize = 50 * 1024 * 1024;

/// Capacity configuration for a [`ComputeCache`](crate::ComputeCache).
///
/// Both caps are enforced simultaneously: eviction runs until the entry count
/// is below `max_entries` *and* the running size estimate fits within
/// `max_size_bytes`. The configuration is fixed at construction time.
///
/// The struct is serde-deserializable so hosts can load it from whatever
/// configuration source they already use; missing fields fall back to the
/// defaults.
///
/// # Examples
///
/// ```
/// use aggcache::CacheConfig;
///
/// let config = CacheConfig::default()
///     .with_max_entries(100)
///     .with_max_size_bytes(8 * 1024 * 1024);
/// assert_eq!(config.max_entries, 100);
/// ```
///
/// ```
/// use aggcache::CacheConfig;
///
/// let config: CacheConfig = serde_json::from_str(r#"{"max_entries": 10}"#).unwrap();
/// assert_eq!(config.max_entries, 10);
/// assert_eq!(config.max_size_bytes, 50 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries held at once.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Maximum aggregate estimated size in bytes.
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: usize,
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_max_size_bytes() -> usize {
    DEFAULT_MAX_SIZE_BYTES
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
        }
    }
}

impl CacheConfig {
    /// Returns a copy with `max_entries` replaced.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Returns a copy with `max_size_bytes` replaced.
    pub fn with_max_size_bytes(mut self, max_size_bytes: usize) -> Self {
        self.max_size_bytes = max_size_bytes;
        self
    }

    /// Validates the configuration.
    ///
    /// A zero cap would make the cache permanently unable to hold anything,
    /// so it is rejected at construction time rather than silently accepted.
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfig(
                "max_entries must be positive".into(),
            ));
        }
        if self.max_size_bytes == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size_bytes must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 50);
        assert_eq!(config.max_size_bytes, 50 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = CacheConfig::default()
            .with_max_entries(2)
            .with_max_size_bytes(1000);
        assert_eq!(config.max_entries, 2);
        assert_eq!(config.max_size_bytes, 1000);
    }

    #[test]
    fn test_zero_max_entries_rejected() {
        let config = CacheConfig::default().with_max_entries(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_size_rejected() {
        let config = CacheConfig::default().with_max_size_bytes(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CacheConfig = serde_json::from_str(r#"{"max_size_bytes": 4096}"#).unwrap();
        assert_eq!(config.max_entries, DEFAULT_MAX_ENTRIES);
        assert_eq!(config.max_size_bytes, 4096);
    }
}

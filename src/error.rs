use thiserror::Error;

/// Errors produced by cache construction.
///
/// Normal cache operation never fails: a miss is an expected outcome signaled
/// through `Option`, not an error. The only fatal condition is a configuration
/// that would leave the cache permanently unable to hold anything.
///
/// # Examples
///
/// ```
/// use aggcache::{CacheConfig, CacheError, ComputeCache};
///
/// let config = CacheConfig::default().with_max_entries(0);
/// let result: Result<ComputeCache<i32>, CacheError> = ComputeCache::new(config);
/// assert!(result.is_err());
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    /// The supplied configuration is unusable (e.g., a zero capacity).
    #[error("invalid cache configuration: {0}")]
    InvalidConfig(String),
}

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Cache access counters for monitoring hit/miss rates and eviction pressure.
///
/// Counters are monotonically increasing and are reset only by an explicit
/// cache [`clear`](crate::ComputeCache::clear). All operations use atomics
/// with `Relaxed` ordering: the counters are observational, nothing
/// synchronizes through them.
///
/// # Examples
///
/// ```
/// use aggcache::CacheStats;
///
/// let stats = CacheStats::new();
/// stats.record_hit();
/// stats.record_hit();
/// stats.record_miss();
///
/// assert_eq!(stats.hits(), 2);
/// assert_eq!(stats.misses(), 1);
/// assert!((stats.hit_rate() - 0.6666).abs() < 0.001);
/// ```
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    /// Creates a new counter set at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful lookup.
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed lookup.
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a capacity eviction.
    #[inline]
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Total number of cache hits.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Total number of cache misses.
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Total number of entries evicted under capacity pressure.
    #[inline]
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Total number of lookups (hits + misses).
    #[inline]
    pub fn total_accesses(&self) -> u64 {
        self.hits() + self.misses()
    }

    /// Fraction of lookups that were hits, in `0.0..=1.0`.
    ///
    /// Returns 0.0 when there have been no lookups at all.
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }

    /// Resets every counter to zero.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time view of a cache's counters and occupancy.
///
/// Returned by [`ComputeCache::stats`](crate::ComputeCache::stats).
/// Serializable so hosts can export it to whatever monitoring surface they
/// already have.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Number of entries currently stored.
    pub entries: usize,
    /// Configured entry-count cap.
    pub max_entries: usize,
    /// Lookups that returned a stored value.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries removed under capacity pressure.
    pub evictions: u64,
    /// `hits / (hits + misses)`, 0.0 when there have been no lookups.
    pub hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats_are_zero() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.misses(), 0);
        assert_eq!(stats.evictions(), 0);
        assert_eq!(stats.total_accesses(), 0);
    }

    #[test]
    fn test_record_counters() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_eviction();
        assert_eq!(stats.hits(), 2);
        assert_eq!(stats.misses(), 1);
        assert_eq!(stats.evictions(), 1);
        assert_eq!(stats.total_accesses(), 3);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert!((stats.hit_rate() - 0.6666).abs() < 0.001);
    }

    #[test]
    fn test_hit_rate_no_accesses() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_reset() {
        let stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_eviction();
        stats.reset();
        assert_eq!(stats.hits(), 0);
        assert_eq!(stats.misses(), 0);
        assert_eq!(stats.evictions(), 0);
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let stats = Arc::new(CacheStats::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    stats.record_hit();
                }
                for _ in 0..50 {
                    stats.record_miss();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.hits(), 1000);
        assert_eq!(stats.misses(), 500);
        assert!((stats.hit_rate() - 0.6666).abs() < 0.001);
    }
}

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use tracing::debug;

use crate::{CacheConfig, CacheEntry, CacheError, CacheStats, EstimateSize, StatsSnapshot};

/// A size-bounded LRU memoization cache for expensive aggregate computations.
///
/// The cache maps string keys (typically built with
/// [`derive_key`](crate::derive_key)) to opaque computed values. On a miss
/// the caller recomputes and [`set`](Self::set)s the result; on a hit the
/// stored value is returned and the entry becomes most recently used.
///
/// Two capacity caps are enforced together: a maximum entry count and a
/// maximum aggregate estimated byte size. When either is exceeded, least
/// recently used entries are evicted until both are satisfied. A single
/// entry larger than the byte cap is still admitted (after the store has
/// been emptied) rather than refused — the cache transiently exceeds its cap
/// instead of dropping a computed result.
///
/// # Type Parameters
///
/// * `V` - The cached value type. `Clone` for retrieval, [`EstimateSize`]
///   for capacity accounting. The cache never inspects values beyond their
///   byte estimate.
///
/// # Concurrency
///
/// The entry map, the recency order, and the running size total are mutated
/// together by eviction, so they live under one `parking_lot::Mutex`; no
/// finer-grained locking would preserve their consistency. Counters are
/// lock-free atomics. The cache is `Send + Sync` and is meant to be
/// constructed once by the composition root and handed to the subsystems
/// that need it — there is deliberately no global instance.
///
/// # Examples
///
/// ```
/// use aggcache::{ComputeCache, derive_key};
/// use serde_json::json;
///
/// let cache: ComputeCache<Vec<u64>> = ComputeCache::default();
/// let key = derive_key("aggregation", &json!({"field": "region"}), None);
///
/// assert_eq!(cache.get(&key), None); // miss: caller computes
/// cache.set(&key, vec![10, 20, 30]);
/// assert_eq!(cache.get(&key), Some(vec![10, 20, 30]));
///
/// let stats = cache.stats();
/// assert_eq!(stats.hits, 1);
/// assert_eq!(stats.misses, 1);
/// ```
pub struct ComputeCache<V> {
    inner: Mutex<Inner<V>>,
    stats: CacheStats,
    config: CacheConfig,
}

/// State guarded by the cache lock.
///
/// Invariants: every key in `entries` appears exactly once in `order` and
/// vice versa (oldest first), and `current_size` equals the sum of all
/// entries' `estimated_size`.
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    order: VecDeque<String>,
    current_size: usize,
}

impl<V> ComputeCache<V> {
    /// Creates a cache with the given capacity configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidConfig`] when either cap is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use aggcache::{CacheConfig, ComputeCache};
    ///
    /// let config = CacheConfig::default().with_max_entries(100);
    /// let cache: ComputeCache<String> = ComputeCache::new(config).unwrap();
    /// assert_eq!(cache.len(), 0);
    /// ```
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
                current_size: 0,
            }),
            stats: CacheStats::new(),
            config,
        }
    }

    /// The capacity configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns `true` when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Running sum of all entries' estimated sizes, in bytes.
    pub fn current_size_bytes(&self) -> usize {
        self.inner.lock().current_size
    }

    /// Current estimated memory usage in mebibytes.
    pub fn memory_usage_mb(&self) -> f64 {
        self.current_size_bytes() as f64 / (1024.0 * 1024.0)
    }

    /// Membership test. Does not touch recency order or counters.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Removes an entry if present; a no-op for absent keys.
    pub fn remove(&self, key: &str) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        if let Some(entry) = inner.entries.remove(key) {
            inner.current_size -= entry.estimated_size;
            remove_from_order(&mut inner.order, key);
        }
    }

    /// Empties the cache and resets every counter to zero.
    ///
    /// This is a reset, not a terminal state: the cache stays usable.
    pub fn clear(&self) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.entries.clear();
        inner.order.clear();
        inner.current_size = 0;
        self.stats.reset();
    }

    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Used to invalidate a whole operation family (e.g., all
    /// `"aggregation:"` keys after the underlying records change) without
    /// flushing unrelated results. Counters are unaffected; a prefix that
    /// matches nothing is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use aggcache::ComputeCache;
    ///
    /// let cache: ComputeCache<i64> = ComputeCache::default();
    /// cache.set("aggregation:a:", 1);
    /// cache.set("grouping:b:", 2);
    ///
    /// cache.clear_prefix("aggregation:");
    /// assert!(!cache.contains("aggregation:a:"));
    /// assert!(cache.contains("grouping:b:"));
    /// ```
    pub fn clear_prefix(&self, prefix: &str) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let doomed: Vec<String> = inner
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        if doomed.is_empty() {
            return;
        }
        for key in &doomed {
            if let Some(entry) = inner.entries.remove(key) {
                inner.current_size -= entry.estimated_size;
            }
        }
        inner.order.retain(|key| !key.starts_with(prefix));
        debug!(prefix, removed = doomed.len(), "cleared entries by prefix");
    }

    /// Point-in-time counters and occupancy.
    pub fn stats(&self) -> StatsSnapshot {
        let entries = self.len();
        StatsSnapshot {
            entries,
            max_entries: self.config.max_entries,
            hits: self.stats.hits(),
            misses: self.stats.misses(),
            evictions: self.stats.evictions(),
            hit_rate: self.stats.hit_rate(),
        }
    }
}

impl<V: Clone> ComputeCache<V> {
    /// Looks up a previously computed value.
    ///
    /// On a hit the entry is moved to the most-recently-used end of the
    /// recency order, its access count is bumped, and a clone of the value
    /// is returned. On a miss `None` is returned and the caller is expected
    /// to compute the value itself and [`set`](Self::set) it.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.touch();
                let value = entry.value.clone();
                move_to_end(&mut inner.order, key);
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }
}

impl<V: EstimateSize> ComputeCache<V> {
    /// Stores a computed value under `key`, evicting as needed.
    ///
    /// The value's byte cost is estimated once, here. If the key already
    /// exists its old entry is removed first — old size subtracted, old
    /// order slot dropped — *before* eviction accounting runs, so replacing
    /// a large entry with a small one never triggers spurious eviction.
    /// The entry then lands at the most-recently-used end of the order.
    pub fn set(&self, key: &str, value: V) {
        let estimated_size = value.estimate_size();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if let Some(old) = inner.entries.remove(key) {
            inner.current_size -= old.estimated_size;
            remove_from_order(&mut inner.order, key);
        }

        self.make_room(inner, estimated_size);

        inner.current_size += estimated_size;
        inner.order.push_back(key.to_string());
        inner
            .entries
            .insert(key.to_string(), CacheEntry::new(value, estimated_size));
    }

    /// Evicts least-recently-used entries until both caps can accommodate an
    /// incoming entry of `incoming_size` bytes.
    ///
    /// The incoming entry is not yet stored while this runs, so it can never
    /// be its own victim. If the byte cap cannot be satisfied even with the
    /// store empty (a single oversized entry), eviction stops and the insert
    /// proceeds anyway.
    fn make_room(&self, inner: &mut Inner<V>, incoming_size: usize) {
        while inner.entries.len() >= self.config.max_entries {
            if !self.evict_lru(inner) {
                break;
            }
        }
        while inner.current_size + incoming_size > self.config.max_size_bytes
            && !inner.entries.is_empty()
        {
            if !self.evict_lru(inner) {
                break;
            }
        }
    }

    /// Removes the least-recently-used entry. Returns `false` when there is
    /// nothing left to evict.
    fn evict_lru(&self, inner: &mut Inner<V>) -> bool {
        match inner.order.pop_front() {
            Some(victim) => {
                if let Some(entry) = inner.entries.remove(&victim) {
                    inner.current_size -= entry.estimated_size;
                }
                self.stats.record_eviction();
                debug!(key = %victim, "evicted least recently used entry");
                true
            }
            None => false,
        }
    }
}

impl<V> Default for ComputeCache<V> {
    fn default() -> Self {
        Self::build(CacheConfig::default())
    }
}

/// Moves `key` to the most-recently-used end of the order queue.
fn move_to_end(order: &mut VecDeque<String>, key: &str) {
    if let Some(pos) = order.iter().position(|k| k == key) {
        order.remove(pos);
        order.push_back(key.to_string());
    }
}

/// Drops `key` from the order queue if present.
fn remove_from_order(order: &mut VecDeque<String>, key: &str) {
    if let Some(pos) = order.iter().position(|k| k == key) {
        order.remove(pos);
    }
}

use std::time::Instant;

/// Internal wrapper around a cached value with its bookkeeping fields.
///
/// Each stored value records when it was created, how often it has been
/// returned by a cache hit, and its byte-cost estimate. The estimate is
/// computed exactly once, at insertion, and is immutable afterwards: updating
/// a key replaces the whole entry, never patches it in place.
///
/// The creation timestamp is informational only — nothing expires by age,
/// eviction is driven purely by capacity pressure.
///
/// # Type Parameters
///
/// * `V` - The type of the cached value
///
/// # Examples
///
/// ```
/// use aggcache::CacheEntry;
///
/// let mut entry = CacheEntry::new(vec![1u64, 2, 3], 124);
/// assert_eq!(entry.access_count, 0);
/// assert_eq!(entry.estimated_size, 124);
///
/// entry.touch();
/// assert_eq!(entry.access_count, 1);
/// ```
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached value, treated as an opaque, read-only payload.
    pub value: V,
    /// When the entry was created.
    pub created_at: Instant,
    /// Number of cache hits this entry has served.
    pub access_count: u64,
    /// Approximate byte cost, fixed at insertion.
    pub estimated_size: usize,
}

impl<V> CacheEntry<V> {
    /// Creates a new entry with the current timestamp and a zero hit count.
    pub fn new(value: V, estimated_size: usize) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            access_count: 0,
            estimated_size,
        }
    }

    /// Records a cache hit against this entry.
    pub fn touch(&mut self) {
        self.access_count = self.access_count.saturating_add(1);
    }
}

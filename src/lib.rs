//! # aggcache
//!
//! A process-local, size-bounded memoization cache for expensive, repeatable
//! aggregate computations (grouping, summarization, filtering,
//! cross-tabulation) over large in-memory record sets.
//!
//! Given a computation identity — an operation name plus a structural hash of
//! its inputs — the cache returns a previously computed result if present, or
//! signals a miss so the caller recomputes and stores the result. Cached
//! values are opaque: the cache never inspects them beyond estimating their
//! byte cost.
//!
//! ## Features
//!
//! - **Structural key derivation**: deterministic string fingerprints from
//!   arbitrary nested input, with sampling shortcuts that keep hashing
//!   sub-linear for huge collections
//! - **Dual capacity caps**: entry-count and estimated-byte-size limits,
//!   enforced simultaneously with least-recently-used eviction
//! - **Byte-cost accounting**: a simple, total size model used only for
//!   capacity decisions, never for correctness
//! - **Instrumentation**: atomic hit/miss/eviction counters and a
//!   serializable stats snapshot
//! - **Prefix invalidation**: drop an entire operation family (e.g. all
//!   `"aggregation:"` keys) without flushing unrelated results
//!
//! ## Quick Start
//!
//! ```
//! use aggcache::{CacheConfig, ComputeCache, derive_key};
//! use serde_json::json;
//!
//! let cache: ComputeCache<Vec<f64>> =
//!     ComputeCache::new(CacheConfig::default().with_max_entries(100)).unwrap();
//!
//! let records = json!([{"region": "north", "amount": 12.5}]);
//! let key = derive_key("aggregation", &records, Some(&json!({"by": "region"})));
//!
//! let totals = match cache.get(&key) {
//!     Some(cached) => cached,
//!     None => {
//!         let computed = vec![12.5]; // expensive aggregation goes here
//!         cache.set(&key, computed.clone());
//!         computed
//!     }
//! };
//! assert_eq!(totals, vec![12.5]);
//! ```
//!
//! ## Crate Organization
//!
//! - [`ComputeCache`] - the cache itself: entry store, recency tracking,
//!   eviction, and the stats/prefix-clear facade
//! - [`CacheEntry`] - entry wrapper with access and size bookkeeping
//! - [`CacheConfig`] - capacity configuration with serde support
//! - [`KeyHasher`] / [`StructuralHasher`] / [`derive_key`] - structural key
//!   hashing behind a pluggable trait
//! - [`EstimateSize`] / [`estimate_via_json`] - byte-cost estimation for
//!   capacity accounting
//! - [`CacheStats`] / [`StatsSnapshot`] - atomic counters and snapshots
//!
//! ## Ownership
//!
//! There is no global cache instance. Construct a [`ComputeCache`] at your
//! composition root and pass it to the subsystems that need it; tests get
//! isolated instances for free. Stored values are treated as immutable by
//! the cache, and callers must not rely on post-`set` mutation being
//! reflected by a later `get`.

mod cache;
mod cache_entry;
mod config;
mod error;
mod keys;
mod size;
mod stats;

pub use cache::ComputeCache;
pub use cache_entry::CacheEntry;
pub use config::{CacheConfig, DEFAULT_MAX_ENTRIES, DEFAULT_MAX_SIZE_BYTES};
pub use error::CacheError;
pub use keys::{derive_key, KeyHasher, StructuralHasher, MAP_SAMPLE_THRESHOLD, SEQ_SAMPLE_THRESHOLD};
pub use size::{estimate_via_json, EstimateSize, COLLECTION_OVERHEAD, FALLBACK_MIN_SIZE};
pub use stats::{CacheStats, StatsSnapshot};

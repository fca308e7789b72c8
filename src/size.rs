use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;

/// Fixed per-collection overhead charged for sequences and maps, in bytes.
pub const COLLECTION_OVERHEAD: usize = 100;

/// Conservative floor returned when a value cannot be measured at all.
pub const FALLBACK_MIN_SIZE: usize = 64;

/// Trait for estimating the byte cost of cached values.
///
/// The estimate feeds capacity accounting only — it is never used for
/// correctness, so exactness does not matter. What matters is that the
/// relative ordering of estimates tracks the relative memory cost of values,
/// and that estimation is total: it never fails and never returns a value
/// the eviction accounting cannot swallow.
///
/// The cost model is deliberately simple:
///
/// - unit / `None` → 0 bytes
/// - numbers → 8 bytes
/// - booleans → 4 bytes
/// - strings → `2 × length` (two bytes per code unit as a simplification)
/// - sequences → element sum + [`COLLECTION_OVERHEAD`]
/// - string-keyed maps → Σ(`2 × key length` + value estimate) + overhead
///
/// For types outside this set, implement the trait directly or delegate to
/// [`estimate_via_json`] for a serialized-length approximation.
///
/// # Examples
///
/// ```
/// use aggcache::EstimateSize;
///
/// assert_eq!(42u64.estimate_size(), 8);
/// assert_eq!(true.estimate_size(), 4);
/// assert_eq!("abc".to_string().estimate_size(), 6);
/// assert_eq!(vec![1i32, 2, 3].estimate_size(), 3 * 8 + 100);
/// ```
///
/// ## Custom types
///
/// ```
/// use aggcache::EstimateSize;
///
/// struct GroupResult {
///     label: String,
///     totals: Vec<f64>,
/// }
///
/// impl EstimateSize for GroupResult {
///     fn estimate_size(&self) -> usize {
///         self.label.estimate_size() + self.totals.estimate_size()
///     }
/// }
/// ```
pub trait EstimateSize {
    /// Returns the approximate byte cost of this value.
    fn estimate_size(&self) -> usize;
}

macro_rules! impl_estimate_number {
    ($($t:ty),*) => {
        $(impl EstimateSize for $t {
            fn estimate_size(&self) -> usize {
                8
            }
        })*
    };
}

impl_estimate_number!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl EstimateSize for bool {
    fn estimate_size(&self) -> usize {
        4
    }
}

impl EstimateSize for () {
    fn estimate_size(&self) -> usize {
        0
    }
}

impl EstimateSize for str {
    fn estimate_size(&self) -> usize {
        2 * self.len()
    }
}

impl EstimateSize for String {
    fn estimate_size(&self) -> usize {
        2 * self.len()
    }
}

impl<T: EstimateSize> EstimateSize for Option<T> {
    fn estimate_size(&self) -> usize {
        match self {
            Some(value) => value.estimate_size(),
            None => 0,
        }
    }
}

impl<T: EstimateSize> EstimateSize for Vec<T> {
    fn estimate_size(&self) -> usize {
        let elements: usize = self.iter().map(EstimateSize::estimate_size).sum();
        elements + COLLECTION_OVERHEAD
    }
}

impl<T: EstimateSize> EstimateSize for Box<T> {
    fn estimate_size(&self) -> usize {
        (**self).estimate_size()
    }
}

impl<A: EstimateSize, B: EstimateSize> EstimateSize for (A, B) {
    fn estimate_size(&self) -> usize {
        self.0.estimate_size() + self.1.estimate_size()
    }
}

impl<A: EstimateSize, B: EstimateSize, C: EstimateSize> EstimateSize for (A, B, C) {
    fn estimate_size(&self) -> usize {
        self.0.estimate_size() + self.1.estimate_size() + self.2.estimate_size()
    }
}

impl<V: EstimateSize> EstimateSize for HashMap<String, V> {
    fn estimate_size(&self) -> usize {
        let entries: usize = self
            .iter()
            .map(|(key, value)| 2 * key.len() + value.estimate_size())
            .sum();
        entries + COLLECTION_OVERHEAD
    }
}

impl<V: EstimateSize> EstimateSize for BTreeMap<String, V> {
    fn estimate_size(&self) -> usize {
        let entries: usize = self
            .iter()
            .map(|(key, value)| 2 * key.len() + value.estimate_size())
            .sum();
        entries + COLLECTION_OVERHEAD
    }
}

/// Structural estimate for arbitrary JSON-shaped values.
///
/// Applies the trait's cost model recursively: nulls are free, scalars cost
/// their fixed width, containers cost their contents plus the collection
/// overhead.
impl EstimateSize for Value {
    fn estimate_size(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 4,
            Value::Number(_) => 8,
            Value::String(s) => 2 * s.len(),
            Value::Array(items) => {
                let elements: usize = items.iter().map(EstimateSize::estimate_size).sum();
                elements + COLLECTION_OVERHEAD
            }
            Value::Object(map) => {
                let entries: usize = map
                    .iter()
                    .map(|(key, value)| 2 * key.len() + value.estimate_size())
                    .sum();
                entries + COLLECTION_OVERHEAD
            }
        }
    }
}

/// Serialized-length fallback for values outside the structural cost model.
///
/// Returns `2 × length` of the JSON form, or [`FALLBACK_MIN_SIZE`] when the
/// value cannot be serialized (e.g., a map with non-string keys). A sizing
/// failure must never block a computed result from being cached, so this
/// function is total.
///
/// # Examples
///
/// ```
/// use aggcache::estimate_via_json;
///
/// // "[1,2,3]" is 7 characters
/// assert_eq!(estimate_via_json(&[1, 2, 3]), 14);
/// ```
pub fn estimate_via_json<T: Serialize>(value: &T) -> usize {
    match serde_json::to_string(value) {
        Ok(serialized) => 2 * serialized.len(),
        Err(_) => FALLBACK_MIN_SIZE,
    }
}

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde_json::Value;

/// Sequences longer than this are hashed by sampling instead of element by
/// element.
pub const SEQ_SAMPLE_THRESHOLD: usize = 1000;

/// Objects with more keys than this are hashed from a small sample of their
/// leading entries.
pub const MAP_SAMPLE_THRESHOLD: usize = 20;

/// How many leading key/value pairs a sampled object contributes.
const MAP_SAMPLE_KEYS: usize = 3;

/// Trait for deriving cache keys from structured input.
///
/// The hasher turns an arbitrary nested value into a short, deterministic
/// string fingerprint. It does not have to be collision-proof — the key is
/// only an index, and callers own correctness — but collisions must be rare
/// enough not to matter in practice.
///
/// The default implementation, [`StructuralHasher`], trades a small collision
/// risk for sub-linear hashing of huge inputs by sampling large collections.
/// Callers for whom that risk matters more than speed can plug in a stricter
/// (slower) implementation at this seam.
pub trait KeyHasher {
    /// Produces a deterministic string fingerprint for `value`.
    fn hash_value(&self, value: &Value) -> String;

    /// Builds a full cache key from an operation name and its inputs.
    ///
    /// The key is the concatenation `operation:hash(data):hash(params)`,
    /// where absent params contribute the empty string. Keys for the same
    /// operation family therefore share a `"{operation}:"` prefix, which is
    /// what [`clear_prefix`](crate::ComputeCache::clear_prefix) invalidates
    /// against.
    fn derive_key(&self, operation: &str, data: &Value, params: Option<&Value>) -> String {
        let params_hash = params.map(|p| self.hash_value(p)).unwrap_or_default();
        format!("{}:{}:{}", operation, self.hash_value(data), params_hash)
    }
}

/// Default structural hasher with large-collection sampling.
///
/// - Primitives hash to their literal string form; `null` to a sentinel.
/// - Empty containers hash to constants.
/// - Sequences longer than [`SEQ_SAMPLE_THRESHOLD`] hash to a summary of
///   `{length, hash(first), hash(last)}` instead of every element.
/// - Objects with more than [`MAP_SAMPLE_THRESHOLD`] keys hash to
///   `{key count, first 3 key:value hashes}`.
/// - Smaller containers hash all their contents, with object keys taken in
///   natural enumeration order (not sorted). Two structurally equal objects
///   built in different key orders therefore produce different keys — an
///   accepted limitation, callers must pass equivalently-ordered inputs for
///   reliable hits.
///
/// The sampling shortcut means collections that differ only in elements
/// beyond the sampled positions collide. That is a deliberate approximation:
/// a false hit returns a stale-but-plausible result, and callers who cannot
/// tolerate it supply their own [`KeyHasher`].
///
/// # Examples
///
/// ```
/// use aggcache::{KeyHasher, StructuralHasher};
/// use serde_json::json;
///
/// let hasher = StructuralHasher;
/// let key = hasher.derive_key("aggregation", &json!({"field": "region"}), None);
/// assert!(key.starts_with("aggregation:"));
///
/// // Deterministic: same inputs, same key.
/// let again = hasher.derive_key("aggregation", &json!({"field": "region"}), None);
/// assert_eq!(key, again);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralHasher;

impl KeyHasher for StructuralHasher {
    fn hash_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(items) => self.hash_array(items),
            Value::Object(map) => self.hash_object(map),
        }
    }
}

impl StructuralHasher {
    fn hash_array(&self, items: &[Value]) -> String {
        if items.is_empty() {
            return "[]".to_string();
        }
        if items.len() > SEQ_SAMPLE_THRESHOLD {
            // Summary of length plus first/last element only; interior
            // elements are deliberately not inspected.
            return format!(
                "arr{}[{}~{}]",
                items.len(),
                self.hash_value(&items[0]),
                self.hash_value(&items[items.len() - 1])
            );
        }
        let composed: String = items
            .iter()
            .map(|item| self.hash_value(item))
            .collect::<Vec<_>>()
            .join(",");
        format!("arr{}#{:016x}", items.len(), digest(&composed))
    }

    fn hash_object(&self, map: &serde_json::Map<String, Value>) -> String {
        if map.is_empty() {
            return "{}".to_string();
        }
        if map.len() > MAP_SAMPLE_THRESHOLD {
            let sample: String = map
                .iter()
                .take(MAP_SAMPLE_KEYS)
                .map(|(key, value)| format!("{}={}", key, self.hash_value(value)))
                .collect::<Vec<_>>()
                .join(",");
            return format!("obj{}[{:016x}]", map.len(), digest(&sample));
        }
        // Natural enumeration order, not sorted.
        let composed: String = map
            .iter()
            .map(|(key, value)| format!("{}={}", key, self.hash_value(value)))
            .collect::<Vec<_>>()
            .join(",");
        format!("obj{}#{:016x}", map.len(), digest(&composed))
    }
}

/// Collapses a composed fingerprint into a fixed-width 64-bit digest so keys
/// stay short regardless of how much content went into them.
fn digest(composed: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    composed.hash(&mut hasher);
    hasher.finish()
}

/// Derives a cache key with the default [`StructuralHasher`].
///
/// # Examples
///
/// ```
/// use aggcache::derive_key;
/// use serde_json::json;
///
/// let key = derive_key("grouping", &json!([1, 2, 3]), Some(&json!({"by": "month"})));
/// assert!(key.starts_with("grouping:"));
/// ```
pub fn derive_key(operation: &str, data: &Value, params: Option<&Value>) -> String {
    StructuralHasher.derive_key(operation, data, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives_hash_to_literal_form() {
        let hasher = StructuralHasher;
        assert_eq!(hasher.hash_value(&json!(null)), "null");
        assert_eq!(hasher.hash_value(&json!(true)), "true");
        assert_eq!(hasher.hash_value(&json!(42)), "42");
        assert_eq!(hasher.hash_value(&json!(1.5)), "1.5");
        assert_eq!(hasher.hash_value(&json!("rows")), "rows");
    }

    #[test]
    fn test_empty_containers_hash_to_constants() {
        let hasher = StructuralHasher;
        assert_eq!(hasher.hash_value(&json!([])), "[]");
        assert_eq!(hasher.hash_value(&json!({})), "{}");
    }

    #[test]
    fn test_derive_key_shape() {
        let key = derive_key("summary", &json!([1, 2]), None);
        let parts: Vec<&str> = key.splitn(3, ':').collect();
        assert_eq!(parts[0], "summary");
        assert_eq!(parts[2], "");
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        let data = json!({"rows": [1, 2, 3], "field": "region"});
        let params = json!({"limit": 10});
        let a = derive_key("aggregation", &data, Some(&params));
        let b = derive_key("aggregation", &data, Some(&params));
        assert_eq!(a, b);
    }

    #[test]
    fn test_params_presence_changes_key() {
        let data = json!([1, 2, 3]);
        let with = derive_key("filter", &data, Some(&json!({"min": 1})));
        let without = derive_key("filter", &data, None);
        assert_ne!(with, without);
    }

    #[test]
    fn test_small_array_contents_matter() {
        let a = derive_key("agg", &json!([1, 2, 3]), None);
        let b = derive_key("agg", &json!([1, 9, 3]), None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_large_array_uses_sampling() {
        let mut items: Vec<Value> = (0..1500i64).map(Value::from).collect();
        let baseline = derive_key("agg", &Value::Array(items.clone()), None);

        // Interior change beyond the sampled positions: accepted collision.
        items[700] = json!(-1);
        let interior = derive_key("agg", &Value::Array(items.clone()), None);
        assert_eq!(baseline, interior);

        // Changing the last element is visible to the summary.
        items[1499] = json!(-1);
        let tail = derive_key("agg", &Value::Array(items), None);
        assert_ne!(baseline, tail);
    }

    #[test]
    fn test_large_array_length_matters() {
        let a: Vec<Value> = (0..1200i64).map(Value::from).collect();
        let b: Vec<Value> = (0..1300i64).map(|i| Value::from(i.min(1199))).collect();
        let key_a = derive_key("agg", &Value::Array(a), None);
        let key_b = derive_key("agg", &Value::Array(b), None);
        assert_ne!(key_a, key_b);
    }

    #[test]
    fn test_wide_object_uses_sampling() {
        let mut map = serde_json::Map::new();
        for i in 0..25 {
            map.insert(format!("col{i:02}"), json!(i));
        }
        let baseline = derive_key("xtab", &Value::Object(map.clone()), None);

        // A change past the first three sampled keys: accepted collision.
        map.insert("col19".to_string(), json!(-1));
        let deep = derive_key("xtab", &Value::Object(map.clone()), None);
        assert_eq!(baseline, deep);

        // A change within the sample is visible.
        map.insert("col01".to_string(), json!(-1));
        let shallow = derive_key("xtab", &Value::Object(map), None);
        assert_ne!(baseline, shallow);
    }

    #[test]
    fn test_object_key_order_is_significant() {
        // Natural enumeration order is hashed as-is, so the same pairs in a
        // different insertion order produce a different key.
        let mut ab = serde_json::Map::new();
        ab.insert("a".to_string(), json!(1));
        ab.insert("b".to_string(), json!(2));

        let mut ba = serde_json::Map::new();
        ba.insert("b".to_string(), json!(2));
        ba.insert("a".to_string(), json!(1));

        let key_ab = derive_key("agg", &Value::Object(ab), None);
        let key_ba = derive_key("agg", &Value::Object(ba), None);
        assert_ne!(key_ab, key_ba);
    }

    #[test]
    fn test_nested_structures() {
        let a = derive_key("agg", &json!({"rows": [[1, 2], [3, 4]]}), None);
        let b = derive_key("agg", &json!({"rows": [[1, 2], [3, 5]]}), None);
        assert_ne!(a, b);
    }
}

//! Deep merge over JSON values.
//!
//! Objects present on both sides merge key by key. Every other value type,
//! arrays included, is replaced wholesale by the incoming side. A partial
//! update therefore cannot append to an array: it replaces it.

use serde_json::Value;

/// Merge `incoming` onto `base` in place.
pub fn deep_merge(base: &mut Value, incoming: Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value);
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, incoming) => *base = incoming,
    }
}

/// Merge `incoming` onto a copy of `base`.
pub fn merged(base: &Value, incoming: Value) -> Value {
    let mut out = base.clone();
    deep_merge(&mut out, incoming);
    out
}

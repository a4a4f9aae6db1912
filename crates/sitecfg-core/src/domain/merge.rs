//! Deep merge of configuration trees.
//!
//! [`merge_deep`] overlays a `source` tree onto a `target` tree in place:
//!
//! | Source value       | Effect on target                                   |
//! |--------------------|----------------------------------------------------|
//! | array              | replaces the target value wholesale                |
//! | object             | merged key-by-key (an empty object is created first when the target has none) |
//! | anything else      | overwrites the target value                        |
//!
//! Keys present only in the target are left untouched.  Lists are never
//! patched element-by-element: a stored `services` list is always the complete
//! list the editor saved.
//!
//! Recursion follows the shape of the input; there is no depth limit.  JSON
//! trees are acyclic, so termination is guaranteed.

use serde_json::{Map, Value};

/// Overlays `source` onto `target` and returns `target`.
///
/// A `source` that is not an object leaves `target` unchanged.  A `target`
/// that is not an object is replaced by an empty object before merging.
pub fn merge_deep<'a>(target: &'a mut Value, source: &Value) -> &'a mut Value {
    let Value::Object(src) = source else {
        return target;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(dst) = &mut *target {
        merge_objects(dst, src);
    }
    target
}

fn merge_objects(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, src_val) in source {
        match src_val {
            Value::Object(nested) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(dst) = slot {
                    merge_objects(dst, nested);
                }
            }
            // Arrays and scalars (including null) overwrite.
            other => {
                target.insert(key.clone(), other.clone());
            }
        }
    }
}

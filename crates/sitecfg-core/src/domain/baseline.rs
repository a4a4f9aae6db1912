//! The schema baseline: the canonical default configuration.
//!
//! Every load deep-merges the winning stored copy onto a fresh clone of this
//! tree, so a reader always sees every baseline key even when the stored copy
//! is partial or was written by an older editor.
//!
//! The tree ships as `baseline.json` next to this file and is parsed once, on
//! first access.  Callers receive either a shared immutable reference
//! ([`baseline`]) or an independently owned copy ([`fresh_baseline`]); there is
//! no way to obtain a mutable alias of the canonical tree.

use once_cell::sync::Lazy;
use serde_json::Value;

const BASELINE_JSON: &str = include_str!("baseline.json");

static BASELINE: Lazy<Value> = Lazy::new(|| {
    // The embedded document is validated by the test suite; a parse failure
    // here means the crate itself was built from a corrupt asset.
    serde_json::from_str(BASELINE_JSON).expect("embedded baseline.json must be valid JSON")
});

/// Returns the canonical baseline tree.
///
/// The reference is immutable.  Use [`fresh_baseline`] to obtain a copy that
/// can be edited or merged into.
pub fn baseline() -> &'static Value {
    &BASELINE
}

/// Returns a deep, independently owned copy of the baseline.
pub fn fresh_baseline() -> Value {
    clone_value(baseline())
}

/// Deep-clones any configuration value.
///
/// Arrays and nested objects are freshly allocated; mutating the result never
/// affects `value`.
pub fn clone_value(value: &Value) -> Value {
    value.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOP_LEVEL_KEYS: [&str; 15] = [
        "brand",
        "meta",
        "header",
        "hero",
        "about",
        "services",
        "servicesSection",
        "collections",
        "projects",
        "media",
        "process",
        "showroom",
        "contact",
        "whatsapp",
        "footer",
    ];

    #[test]
    fn test_baseline_is_an_object_with_every_section() {
        // Arrange / Act
        let base = baseline();

        // Assert
        let obj = base.as_object().expect("baseline must be an object");
        for key in TOP_LEVEL_KEYS {
            assert!(obj.contains_key(key), "baseline is missing `{key}`");
        }
        assert_eq!(obj.len(), TOP_LEVEL_KEYS.len());
    }

    #[test]
    fn test_fresh_baseline_equals_canonical_tree() {
        assert_eq!(&fresh_baseline(), baseline());
    }

    #[test]
    fn test_fresh_baseline_copies_are_independent() {
        // Arrange
        let mut first = fresh_baseline();
        let second = fresh_baseline();

        // Act – mutate a nested list in the first copy
        first["services"]
            .as_array_mut()
            .expect("services is a list")
            .clear();
        first["hero"]["title"] = Value::from("changed");

        // Assert – neither the second copy nor the canonical tree moved
        assert_eq!(second["services"].as_array().map(Vec::len), Some(3));
        assert_eq!(baseline()["services"].as_array().map(Vec::len), Some(3));
        assert_ne!(baseline()["hero"]["title"], Value::from("changed"));
    }

    #[test]
    fn test_clone_value_deep_copies_nested_arrays() {
        let original = serde_json::json!({ "items": [{ "title": "a" }] });
        let mut copy = clone_value(&original);
        copy["items"][0]["title"] = Value::from("b");
        assert_eq!(original["items"][0]["title"], "a");
    }

    #[test]
    fn test_baseline_image_descriptors_carry_recommended_size() {
        let logo = &baseline()["brand"]["logo"];
        assert_eq!(logo["recommended"]["width"], 512);
        assert_eq!(logo["recommended"]["height"], 512);
    }
}

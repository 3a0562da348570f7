//! Deep merge of configuration documents.

use serde_json::Value;

/// Merge `overlay` on top of `base`, returning a new value.
///
/// - objects merge key by key, recursively
/// - arrays concatenate, `base` elements first
/// - anything else is replaced by `overlay`
///
/// Neither input is modified.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, overlay_val) in overlay_map {
                let value = match base_map.get(key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => overlay_val.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            Value::Array(base_items.iter().chain(overlay_items).cloned().collect())
        }
        (_, overlay) => overlay.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_overwrite() {
        let merged = deep_merge(&json!({ "root": "/a", "keep": 1 }), &json!({ "root": "/b" }));
        assert_eq!(merged, json!({ "root": "/b", "keep": 1 }));
    }

    #[test]
    fn test_arrays_concatenate_parent_first() {
        let merged = deep_merge(
            &json!({ "gen": { "args": ["a", "b"] } }),
            &json!({ "gen": { "args": ["c"] } }),
        );
        assert_eq!(merged, json!({ "gen": { "args": ["a", "b", "c"] } }));
    }

    #[test]
    fn test_nested_objects_merge() {
        let merged = deep_merge(
            &json!({ "env": { "A": "1", "B": "2" }, "gen": { "out": "Debug" } }),
            &json!({ "env": { "B": "3", "C": "4" } }),
        );
        assert_eq!(
            merged,
            json!({ "env": { "A": "1", "B": "3", "C": "4" }, "gen": { "out": "Debug" } })
        );
    }

    #[test]
    fn test_type_mismatch_takes_overlay() {
        let merged = deep_merge(&json!({ "gen": { "args": ["a"] } }), &json!({ "gen": "none" }));
        assert_eq!(merged, json!({ "gen": "none" }));
    }

    #[test]
    fn test_inputs_untouched() {
        let base = json!({ "gen": { "args": ["a"] } });
        let overlay = json!({ "gen": { "args": ["b"] } });
        let _ = deep_merge(&base, &overlay);
        assert_eq!(base, json!({ "gen": { "args": ["a"] } }));
        assert_eq!(overlay, json!({ "gen": { "args": ["b"] } }));
    }

    #[test]
    fn test_associative_over_chain() {
        let c = json!({ "gen": { "args": ["c"] }, "root": "/c", "env": { "X": "c" } });
        let b = json!({ "gen": { "args": ["b"] }, "root": "/b" });
        let a = json!({ "gen": { "args": ["a"] }, "env": { "X": "a" } });

        let left = deep_merge(&deep_merge(&c, &b), &a);
        let right = deep_merge(&c, &deep_merge(&b, &a));

        assert_eq!(left, right);
        assert_eq!(left["gen"]["args"], json!(["c", "b", "a"]));
        assert_eq!(left["root"], "/b");
        assert_eq!(left["env"]["X"], "a");
    }
}

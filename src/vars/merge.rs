// ABOUTME: Deep override merge for variable mappings
// ABOUTME: Returns a new mapping; inputs are never mutated

use serde_json::Value as JsonValue;

use super::VarMap;

/// Merge `overlay` over `base`.
///
/// On a key collision the overlay value wins, except when both sides are
/// mappings: those merge key by key. Keys only present in `base` are kept.
/// Arrays and scalars are replaced wholesale.
pub fn merge_override(base: &VarMap, overlay: &VarMap) -> VarMap {
    let mut merged = base.clone();
    for (key, incoming) in overlay {
        let value = match (merged.remove(key), incoming) {
            (Some(JsonValue::Object(existing)), JsonValue::Object(incoming)) => {
                JsonValue::Object(merge_override(&existing, incoming))
            }
            (_, incoming) => incoming.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

//! Helpers for scrubbing history payloads before they reach a caller.

use serde_json::Value;

/// Remove every `embeddings` field from the value, at any nesting depth.
///
/// Raw vectors run to hundreds of floats per record; ten records' worth in a JSON
/// response is enough to degrade clients, so the history read path never carries them.
pub fn strip_embeddings(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("embeddings");
            for nested in map.values_mut() {
                strip_embeddings(nested);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_embeddings(item);
            }
        }
        _ => {}
    }
}

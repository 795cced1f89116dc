use serde_json::{Map, Value};

use crate::models::ModelResult;

/// Decode model output as a JSON object, or keep it verbatim as raw text.
///
/// Only a top-level object counts as structured. Arrays, scalars and invalid
/// JSON all come back as `RawText` with the input unchanged.
pub fn normalize(raw: &str) -> ModelResult {
    match serde_json::from_str::<Map<String, Value>>(raw) {
        Ok(map) => ModelResult::Structured(map),
        Err(e) => {
            tracing::debug!("Model output is not a JSON object ({e}); keeping raw text");
            ModelResult::RawText(raw.to_string())
        }
    }
}

//! Parsing of inference responses into match records

use crate::matching::client::{InferenceError, InferenceResult};
use crate::matching::record::{MatchRecord, RawMatch};
use serde_json::Value;

/// Removes Markdown code-fence markers and surrounding whitespace
///
/// Models are asked for bare JSON but often wrap it in a fenced block
/// anyway. A leading ```` ```json ```` (or bare ```` ``` ````) and a trailing
/// ```` ``` ```` are removed.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```JSON"))
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Parses a response into validated match records
///
/// The response must be a JSON array (after fence stripping); anything else
/// fails the whole batch. Individual elements that do not validate are
/// dropped with a warning and the rest of the batch is kept.
pub fn parse_match_response(text: &str) -> InferenceResult<Vec<MatchRecord>> {
    let json = strip_code_fences(text);
    if json.is_empty() {
        return Err(InferenceError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(InferenceError::InvalidResponse(format!(
            "expected a JSON array, got {}",
            json_kind(&value)
        )));
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let raw: RawMatch = match serde_json::from_value(item) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed match entry");
                continue;
            }
        };

        match MatchRecord::from_raw(raw) {
            Ok(record) => records.push(record),
            Err(rejection) => {
                tracing::warn!(index, reason = %rejection, "Skipping invalid match entry");
            }
        }
    }

    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

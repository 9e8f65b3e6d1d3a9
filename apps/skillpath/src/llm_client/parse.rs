//! Structured decoding of LLM replies.
//!
//! Primary path: strip code fences, then decode strictly into the target type.
//! Last resort: scan for the first embedded `{...}` / `[...]` span and decode that.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::llm_client::LlmError;

/// Max characters of a failed reply echoed back in `NoStructuredContent`.
const ECHO_LIMIT: usize = 200;

/// Decodes `text` into `T`.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let body = strip_json_fences(text);

    match serde_json::from_str::<T>(body) {
        Ok(value) => Ok(value),
        Err(strict_error) => match embedded_json(body) {
            Some(span) if span.len() < body.len() => {
                serde_json::from_str::<T>(span).map_err(LlmError::Parse)
            }
            _ => Err(LlmError::Parse(strict_error)),
        },
    }
}

/// Decodes `text` into an untyped JSON value, failing with
/// `NoStructuredContent` when nothing parseable is found.
pub fn decode_structured(text: &str) -> Result<Value, LlmError> {
    decode::<Value>(text).map_err(|_| {
        LlmError::NoStructuredContent(text.trim().chars().take(ECHO_LIMIT).collect())
    })
}

/// Flattens a reply into a list of records.
///
/// Accepts a bare array, an object wrapping an array of objects
/// (`{"resources": [...]}`), or a single object.
pub fn into_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            let wrapped = map.values().find_map(|v| match v {
                Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
                    Some(items.clone())
                }
                _ => None,
            });
            wrapped.unwrap_or_else(|| vec![Value::Object(map)])
        }
        _ => Vec::new(),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences, including fences that
/// follow a short preamble.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(open) = text.find("```") else {
        return text;
    };
    let inner = &text[open + 3..];
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    match inner.find("```") {
        Some(close) => inner[..close].trim(),
        None => inner.trim(),
    }
}

/// Returns the span from the first opening brace/bracket to the last matching closer.
fn embedded_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let closer = if text[start..].starts_with('{') {
        '}'
    } else {
        ']'
    };
    let end = text.rfind(closer)?;
    (end > start).then(|| &text[start..=end])
}

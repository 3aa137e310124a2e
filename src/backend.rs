//! Translation backends.
//!
//! A backend takes a system and user instruction and returns the raw text the
//! model produced. Parsing that text into a batch lives here too so every
//! backend shares the same fence stripping and error reporting.
use crate::error::SyncError;
use anyhow::Result;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

mod command;
pub mod openai;

pub use command::CommandBackend;
pub use openai::OpenAiBackend;

/// One request to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub system: String,
    pub user: String,
}

pub trait TranslationBackend {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Send one request and return the raw response text.
    fn complete(&self, request: &TranslationRequest) -> Result<String>;
}

/// Parse a backend response into a JSON object, tolerating code fences and
/// prose around a single object.
pub fn parse_batch_response(text: &str) -> Result<Map<String, JsonValue>> {
    let json_text = strip_code_fences(text);
    let parsed = match serde_json::from_str::<JsonValue>(json_text) {
        Ok(value) => value,
        Err(err) => find_embedded_object(json_text).ok_or_else(|| {
            SyncError::MalformedResponse(format!(
                "{err} (first 200 chars: {})",
                json_text.chars().take(200).collect::<String>()
            ))
        })?,
    };
    match parsed {
        JsonValue::Object(map) => Ok(map),
        other => Err(SyncError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))
        .into()),
    }
}

/// Strip a surrounding ```json or bare ``` fence if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the language tag on the opening fence line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn find_embedded_object(text: &str) -> Option<JsonValue> {
    for (idx, ch) in text.char_indices() {
        if ch != '{' {
            continue;
        }
        let mut deserializer = serde_json::Deserializer::from_str(&text[idx..]);
        if let Ok(value) = JsonValue::deserialize(&mut deserializer) {
            if value.is_object() {
                return Some(value);
            }
        }
    }
    None
}

pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

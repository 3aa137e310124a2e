//! Structured value codec.
//!
//! Prepares values for translation and rebuilds them afterwards. Link targets
//! are never trusted from the backend: every `link_N` field is restored from
//! the original before `full_text` is re-rendered.
use crate::catalog::{StructuredValue, Value};
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use std::sync::OnceLock;

fn link_key_regex() -> &'static Regex {
    static LINK_KEY: OnceLock<Regex> = OnceLock::new();
    LINK_KEY.get_or_init(|| Regex::new(r"^link_\d+$").expect("valid link key regex"))
}

/// True for `link_1`, `link_2`, ... but not `link_text_1`.
pub fn is_link_key(key: &str) -> bool {
    link_key_regex().is_match(key)
}

/// Value handed to the backend plus whether it carries segments.
#[derive(Debug, Clone)]
pub struct SplitValue<'a> {
    pub value: &'a Value,
    pub nested: bool,
}

/// Structured values are already in segment form, so splitting only tags them.
pub fn split_for_translation(value: &Value) -> SplitValue<'_> {
    SplitValue {
        value,
        nested: value.is_structured(),
    }
}

/// Restore link targets from `original` and re-render `full_text`.
pub fn reconstruct(translated: Value, original: &Value) -> Value {
    match translated {
        Value::Plain(text) => Value::Plain(text),
        Value::Structured(structured) => {
            let mut tree = JsonValue::Object(structured.into_fields());
            restore_links(&mut tree, &original.to_json());
            let fields = match tree {
                JsonValue::Object(fields) => fields,
                _ => Map::new(),
            };
            let mut structured = StructuredValue::from_fields(fields);
            structured.attach_full_text();
            Value::Structured(structured)
        }
    }
}

/// Walk `translated` and `original` in lockstep, overwriting every `link_N`
/// key in `translated` with the original's value.
///
/// Objects pair by key and arrays by position. Keys the original lacks are
/// left alone, and mismatched shapes are skipped. `link_N` keys the backend
/// dropped are carried forward from the original.
pub fn restore_links(translated: &mut JsonValue, original: &JsonValue) {
    match (translated, original) {
        (JsonValue::Object(translated), JsonValue::Object(original)) => {
            for (key, value) in translated.iter_mut() {
                let Some(original_value) = original.get(key) else {
                    continue;
                };
                if is_link_key(key) {
                    *value = original_value.clone();
                } else {
                    restore_links(value, original_value);
                }
            }
            for (key, original_value) in original {
                if is_link_key(key) && !translated.contains_key(key) {
                    translated.insert(key.clone(), original_value.clone());
                }
            }
        }
        (JsonValue::Array(translated), JsonValue::Array(original)) => {
            for (value, original_value) in translated.iter_mut().zip(original) {
                restore_links(value, original_value);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;

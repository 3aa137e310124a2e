//! Catalog data model.
//!
//! A catalog maps string keys to either plain text or a structured,
//! link-bearing value split into indexed `text_N` / `link_text_N` / `link_N`
//! segments. Structured values keep every field they were loaded with so a
//! round trip through the store never drops data.
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

mod store;

pub use store::{read_catalog, write_catalog};

/// Derived field synthesized from the segments of a structured value.
pub const FULL_TEXT_KEY: &str = "full_text";

/// A per-locale key to value mapping. Sorted so files and processing order
/// stay deterministic.
pub type Catalog = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Plain(String),
    Structured(StructuredValue),
}

impl Value {
    pub fn is_structured(&self) -> bool {
        matches!(self, Value::Structured(_))
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Plain(text) => JsonValue::String(text.clone()),
            Value::Structured(structured) => JsonValue::Object(structured.fields.clone()),
        }
    }
}

/// A link-bearing string decomposed into indexed segment fields.
///
/// Serializes in segment order (`text_1`, `link_text_1`, `link_1`, `text_2`,
/// ...) with any other fields after, so prompts and files read as a sentence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct StructuredValue {
    fields: Map<String, JsonValue>,
}

impl Serialize for StructuredValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in self.ordered_fields() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// `(index, slot)` for segment field names; slot orders text, link text, link.
fn segment_slot(key: &str) -> Option<(usize, u8)> {
    let (slot, index) = if let Some(index) = key.strip_prefix("link_text_") {
        (1, index)
    } else if let Some(index) = key.strip_prefix("text_") {
        (0, index)
    } else if let Some(index) = key.strip_prefix("link_") {
        (2, index)
    } else {
        return None;
    };
    index.parse().ok().map(|index| (index, slot))
}

/// One `text_N` / `link_text_N` / `link_N` group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: Option<String>,
    pub link_text: Option<String>,
    pub link: Option<String>,
}

impl Segment {
    fn is_empty(&self) -> bool {
        self.text.is_none() && self.link_text.is_none() && self.link.is_none()
    }

    /// Render this segment the way it appears in `full_text`.
    pub fn render(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        match (&self.link_text, &self.link) {
            (Some(link_text), Some(link)) => {
                out.push('[');
                out.push_str(link_text);
                out.push_str("](");
                out.push_str(link);
                out.push(')');
            }
            (Some(link_text), None) => {
                out.push('[');
                out.push_str(link_text);
                out.push(']');
            }
            (None, Some(link)) => {
                out.push('(');
                out.push_str(link);
                out.push(')');
            }
            (None, None) => {}
        }
    }
}

impl StructuredValue {
    pub fn from_fields(fields: Map<String, JsonValue>) -> Self {
        Self { fields }
    }

    pub fn into_fields(self) -> Map<String, JsonValue> {
        self.fields
    }

    /// Fields with segments first in index order, then the rest by name.
    pub fn ordered_fields(&self) -> Vec<(&String, &JsonValue)> {
        let mut fields: Vec<_> = self.fields.iter().collect();
        fields.sort_by_key(|(key, _)| match segment_slot(key) {
            Some((index, slot)) => (false, index, slot),
            None => (true, 0, 0),
        });
        fields
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(JsonValue::as_str)
    }

    /// Segment at a 1-based index; fields that are not strings count as absent.
    pub fn segment(&self, index: usize) -> Segment {
        let field = |prefix: &str| self.get_str(&format!("{prefix}_{index}")).map(str::to_string);
        Segment {
            text: field("text"),
            link_text: field("link_text"),
            link: field("link"),
        }
    }

    /// Segments in index order, stopping at the first fully absent index.
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        for index in 1.. {
            let segment = self.segment(index);
            if segment.is_empty() {
                break;
            }
            segments.push(segment);
        }
        segments
    }

    /// Deterministic full-sentence rendering of the segments.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        for segment in self.segments() {
            segment.render(&mut out);
        }
        out
    }

    /// Replace the derived `full_text` field with a freshly rendered one.
    pub fn attach_full_text(&mut self) {
        let full_text = self.full_text();
        self.fields
            .insert(FULL_TEXT_KEY.to_string(), JsonValue::String(full_text));
    }
}

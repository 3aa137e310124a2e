//! Locale registry.
//!
//! A CSV table whose header names a `Code` column and optionally a
//! `Language` (or `Name`) column used as the language name in prompts.
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    pub code: String,
    /// Human-readable language name, falling back to the code.
    pub language: String,
}

pub fn load_registry(path: &Path) -> Result<Vec<Locale>> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_registry(&text).with_context(|| format!("parse locale registry {}", path.display()))
}

pub fn parse_registry(text: &str) -> Result<Vec<Locale>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(split_csv_line);
    let header = rows.next().ok_or_else(|| anyhow!("registry is empty"))?;
    let column = |names: &[&str]| {
        header
            .iter()
            .position(|field| names.iter().any(|name| field.trim().eq_ignore_ascii_case(name)))
    };
    let code_idx = column(&["Code"]).ok_or_else(|| anyhow!("registry header has no Code column"))?;
    let language_idx = column(&["Language", "Name"]);

    let mut locales = Vec::new();
    for row in rows {
        let Some(code) = row.get(code_idx).map(|code| code.trim()) else {
            continue;
        };
        if code.is_empty() {
            continue;
        }
        let language = language_idx
            .and_then(|idx| row.get(idx))
            .map(|language| language.trim())
            .filter(|language| !language.is_empty())
            .unwrap_or(code);
        locales.push(Locale {
            code: code.to_string(),
            language: language.to_string(),
        });
    }
    Ok(locales)
}

/// Target locales: every registry row whose code differs from the source.
pub fn target_locales(registry: Vec<Locale>, source_locale: &str) -> Vec<Locale> {
    registry
        .into_iter()
        .filter(|locale| locale.code != source_locale)
        .collect()
}

/// Split one CSV record, honoring double-quoted fields and `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(ch),
        }
    }
    fields.push(field);
    fields
}

//! Translation prompt assembly.
use crate::backend::TranslationRequest;
use crate::catalog::Value;
use anyhow::{Context, Result};
use std::collections::BTreeMap;

// Prompt templates loaded at compile time
const SYSTEM_BASE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/prompts/translate_system.md"
));
const NESTED_CLAUSE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/prompts/translate_nested.md"
));
const FOOTER: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/prompts/translate_footer.md"
));

/// Key used for the single entry of every batch.
pub const BATCH_KEY: &str = "1";

/// Terms kept in English unless the config overrides them.
pub fn default_protected_terms() -> Vec<String> {
    ["Futarchy", "META", "MetaDAO", "Futarchic"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Builds requests for one target language.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    protected_terms: Vec<String>,
}

impl PromptBuilder {
    pub fn new(protected_terms: Vec<String>) -> Self {
        Self { protected_terms }
    }

    pub fn system_instruction(&self, nested: bool) -> String {
        let terms = self
            .protected_terms
            .iter()
            .map(|term| format!("\"{term}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let mut system = SYSTEM_BASE.trim_end().replace("{protected_terms}", &terms);
        if nested {
            system.push('\n');
            system.push_str(NESTED_CLAUSE.trim_end());
        }
        system.push('\n');
        system.push_str(FOOTER.trim_end());
        system
    }

    /// Request for a singleton batch `{"1": value}`.
    pub fn build(&self, language: &str, value: &Value, nested: bool) -> Result<TranslationRequest> {
        let batch = BTreeMap::from([(BATCH_KEY, value)]);
        let serialized = serde_json::to_string(&batch).context("serialize translation batch")?;
        Ok(TranslationRequest {
            system: self.system_instruction(nested),
            user: format!("Translate the following texts to this language {language}:\n{serialized}"),
        })
    }
}

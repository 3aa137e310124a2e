//! Per-key translation driver.
//!
//! Keys are translated one at a time, each as a singleton batch, and every
//! success is persisted before the next key starts. An interrupted run loses
//! at most the key in flight; a key that exhausts its retries ends the run.
use crate::backend::{json_kind, parse_batch_response, TranslationBackend};
use crate::catalog::{write_catalog, Catalog, StructuredValue, Value};
use crate::codec::{reconstruct, split_for_translation};
use crate::error::SyncError;
use crate::prompt::{PromptBuilder, BATCH_KEY};
use crate::registry::Locale;
use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use serde_json::{Map, Value as JsonValue};
use std::path::Path;
use std::time::Instant;

/// Lifecycle of one key within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Pending,
    Requested,
    Succeeded,
    FailedExhausted,
}

impl KeyState {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyState::Pending => "pending",
            KeyState::Requested => "requested",
            KeyState::Succeeded => "succeeded",
            KeyState::FailedExhausted => "failed_exhausted",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    pub translated: usize,
}

pub struct Orchestrator<'a> {
    backend: &'a dyn TranslationBackend,
    prompts: &'a PromptBuilder,
    retry: RetryPolicy,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        backend: &'a dyn TranslationBackend,
        prompts: &'a PromptBuilder,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            prompts,
            retry,
        }
    }

    /// Translate every entry of `missing` into `locale`, persisting each result
    /// to `target_path` immediately. `target` is replaced with the catalog as
    /// written after every key.
    pub fn translate_missing(
        &self,
        locale: &Locale,
        target_path: &Path,
        missing: &Catalog,
        target: &mut Catalog,
    ) -> Result<TranslationReport> {
        let mut report = TranslationReport::default();
        let total = missing.len();
        for (position, (key, value)) in missing.iter().enumerate() {
            tracing::debug!(
                locale = %locale.code,
                key = %key,
                state = KeyState::Pending.as_str(),
                "key queued"
            );
            let start = Instant::now();
            let translated = match self.translate_value(locale, key, value) {
                Ok(translated) => translated,
                Err(err) => {
                    tracing::error!(
                        locale = %locale.code,
                        key = %key,
                        state = KeyState::FailedExhausted.as_str(),
                        "translation failed"
                    );
                    return Err(err)
                        .with_context(|| format!("translate key {key:?} for {}", locale.code));
                }
            };

            let update = Catalog::from([(key.clone(), translated)]);
            *target = write_catalog(target_path, &update)
                .with_context(|| format!("persist key {key:?} for {}", locale.code))?;
            report.translated += 1;
            tracing::info!(
                locale = %locale.code,
                key = %key,
                state = KeyState::Succeeded.as_str(),
                index = position + 1,
                total,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "key translated"
            );
        }
        Ok(report)
    }

    fn translate_value(&self, locale: &Locale, key: &str, value: &Value) -> Result<Value> {
        let split = split_for_translation(value);
        let request = self
            .prompts
            .build(&locale.language, split.value, split.nested)?;
        tracing::debug!(
            locale = %locale.code,
            key = %key,
            nested = split.nested,
            backend = %self.backend.name(),
            state = KeyState::Requested.as_str(),
            "requesting translation"
        );
        let translated = self.retry.call(|| {
            let raw = self.backend.complete(&request)?;
            let batch = parse_batch_response(&raw)?;
            decode_translation(batch, value)
        })?;
        Ok(reconstruct(translated, value))
    }
}

/// Pull the batch entry out of a parsed response and check that it has the
/// same shape as the value that was sent.
pub fn decode_translation(mut batch: Map<String, JsonValue>, original: &Value) -> Result<Value> {
    let entry = batch.remove(BATCH_KEY).ok_or_else(|| {
        SyncError::MalformedResponse(format!("response has no entry for key {BATCH_KEY:?}"))
    })?;
    match (entry, original) {
        (JsonValue::String(text), Value::Plain(_)) => Ok(Value::Plain(text)),
        (JsonValue::Object(fields), Value::Structured(_)) => {
            Ok(Value::Structured(StructuredValue::from_fields(fields)))
        }
        (entry, original) => {
            let expected = if original.is_structured() {
                "an object"
            } else {
                "a string"
            };
            Err(SyncError::MalformedResponse(format!(
                "expected {expected} for key {BATCH_KEY:?}, got {}",
                json_kind(&entry)
            ))
            .into())
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

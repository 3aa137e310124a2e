//! Sync configuration.
//!
//! Every field has a default so a run works without a config file. A file,
//! when given, is strict JSON with unknown fields rejected; CLI flags override
//! it and `LOCSYNC_LM_COMMAND` supplies a command backend when neither names
//! one.
use crate::backend::{openai, CommandBackend, OpenAiBackend, TranslationBackend};
use crate::cost::DEFAULT_COST_PER_CHAR;
use crate::error::SyncError;
use crate::prompt::default_protected_terms;
use crate::retry::{Backoff, RetryPolicy, DEFAULT_DELAY_SECS, DEFAULT_MAX_ATTEMPTS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const LM_COMMAND_ENV: &str = "LOCSYNC_LM_COMMAND";
pub const DEFAULT_SOURCE_LOCALE: &str = "en";
pub const DEFAULT_FILE_SUFFIX: &str = "_strings.json";
pub const DEFAULT_REGISTRY: &str = "languages.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SyncConfig {
    /// Directory holding one `<code>/` subdirectory per locale.
    pub catalog_root: PathBuf,
    pub source_locale: String,
    /// CSV file with a `Code` column listing locales.
    pub registry: PathBuf,
    pub file_suffix: String,
    pub cost_per_char: f64,
    pub retry: RetryConfig,
    pub protected_terms: Vec<String>,
    pub backend: Option<BackendConfig>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            catalog_root: PathBuf::from(".."),
            source_locale: DEFAULT_SOURCE_LOCALE.to_string(),
            registry: PathBuf::from(DEFAULT_REGISTRY),
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            cost_per_char: DEFAULT_COST_PER_CHAR,
            retry: RetryConfig::default(),
            protected_terms: default_protected_terms(),
            backend: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_secs: u64,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_secs: DEFAULT_DELAY_SECS,
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_secs(self.delay_secs),
            backoff: self.backoff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Chat-completions HTTP API.
    Openai {
        #[serde(default = "default_model")]
        model: String,
        #[serde(default = "default_base_url")]
        base_url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
        #[serde(default = "default_api_key_env")]
        api_key_env: String,
    },
    /// Local command reading the prompt on stdin.
    Command { command: String },
}

fn default_model() -> String {
    openai::DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    openai::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    openai::DEFAULT_TIMEOUT_SECS
}

fn default_api_key_env() -> String {
    openai::DEFAULT_API_KEY_ENV.to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Openai {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl BackendConfig {
    /// Construct the backend. For the HTTP backend this reads the credential,
    /// so a missing token fails here, before any catalog is touched.
    pub fn build(&self) -> Result<Box<dyn TranslationBackend>> {
        match self {
            BackendConfig::Openai {
                model,
                base_url,
                timeout_secs,
                api_key_env,
            } => {
                let api_key = OpenAiBackend::api_key_from_env(api_key_env)?;
                Ok(Box::new(OpenAiBackend::new(
                    base_url,
                    model,
                    api_key,
                    Duration::from_secs(*timeout_secs),
                )))
            }
            BackendConfig::Command { command } => Ok(Box::new(CommandBackend::new(command)?)),
        }
    }
}

impl SyncConfig {
    /// Load a config file, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
        let config: SyncConfig = serde_json::from_slice(&bytes)
            .map_err(|err| SyncError::Config(format!("parse {}: {err}", path.display())))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(SyncError::Config("retry.max_attempts must be at least 1".into()).into());
        }
        if !self.cost_per_char.is_finite() || self.cost_per_char < 0.0 {
            return Err(SyncError::Config(format!(
                "cost_per_char must be a non-negative number (got {})",
                self.cost_per_char
            ))
            .into());
        }
        if self.source_locale.trim().is_empty() {
            return Err(SyncError::Config("source_locale must be non-empty".into()).into());
        }
        if self.file_suffix.contains(['/', '\\']) {
            return Err(SyncError::Config(format!(
                "file_suffix must not contain path separators (got {:?})",
                self.file_suffix
            ))
            .into());
        }
        Ok(())
    }

    /// Resolve the backend: explicit command flag, then config file, then the
    /// environment, then the HTTP default.
    pub fn resolve_backend(&self, lm_flag: Option<&str>) -> BackendConfig {
        if let Some(command) = lm_flag {
            return BackendConfig::Command {
                command: command.to_string(),
            };
        }
        if let Some(backend) = &self.backend {
            return backend.clone();
        }
        if let Ok(command) = std::env::var(LM_COMMAND_ENV) {
            if !command.trim().is_empty() {
                return BackendConfig::Command { command };
            }
        }
        BackendConfig::default()
    }

    /// `<catalog_root>/<code>/<code><file_suffix>`
    pub fn catalog_path(&self, code: &str) -> PathBuf {
        self.catalog_root
            .join(code)
            .join(format!("{code}{}", self.file_suffix))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.policy()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

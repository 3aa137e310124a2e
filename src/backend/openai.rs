//! Chat-completions backend over blocking HTTP.
use super::{TranslationBackend, TranslationRequest};
use crate::error::SyncError;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use ureq::Agent;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

pub struct OpenAiBackend {
    agent: Agent,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(base_url: &str, model: &str, api_key: String, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key,
        }
    }

    /// Read the credential from `var`; absence is a configuration error.
    pub fn api_key_from_env(var: &str) -> Result<String> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(SyncError::MissingCredential {
                var: var.to_string(),
            }
            .into()),
        }
    }
}

impl TranslationBackend for OpenAiBackend {
    fn name(&self) -> &str {
        &self.model
    }

    fn complete(&self, request: &TranslationRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
        };

        let start = Instant::now();
        let mut response = self
            .agent
            .post(self.endpoint.as_str())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send_json(&body)
            .with_context(|| format!("POST {}", self.endpoint))?;
        let parsed: ChatResponse = response
            .body_mut()
            .read_json()
            .context("decode chat completion response")?;
        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            prompt_bytes = request.system.len() + request.user.len(),
            "backend call complete"
        );

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion response has no message content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let backend = OpenAiBackend::new(
            "http://localhost:9/v1/",
            DEFAULT_MODEL,
            "key".to_string(),
            Duration::from_secs(1),
        );
        assert_eq!(backend.endpoint, "http://localhost:9/v1/chat/completions");
        assert_eq!(backend.name(), "gpt-4");
    }

    #[test]
    fn missing_credential_is_a_config_error() {
        let err = OpenAiBackend::api_key_from_env("LOCSYNC_TEST_UNSET_CREDENTIAL")
            .expect_err("unset variable");
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::MissingCredential { .. })
        ));
    }

    #[test]
    fn request_body_matches_chat_schema() {
        let body = ChatRequest {
            model: "gpt-4",
            temperature: 0.0,
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "usr",
                },
            ],
        };
        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "usr");
        assert_eq!(value["temperature"], 0.0);
    }
}

//! Local LM command backend.
//!
//! Runs a user-configured command (e.g. `llm -m gpt-4o`, `ollama run ...`, or
//! a wrapper script) with the prompt on stdin and treats stdout as the model
//! response. A non-zero exit is a failed call and goes through retry like any
//! other failure.
use super::{TranslationBackend, TranslationRequest};
use crate::error::SyncError;
use anyhow::{anyhow, Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

pub struct CommandBackend {
    command: String,
    program: PathBuf,
    args: Vec<String>,
}

impl CommandBackend {
    /// Parse `command` with shell quoting rules and resolve its program on
    /// `PATH` so a typo fails before any catalog work.
    pub fn new(command: &str) -> Result<Self> {
        let mut argv = shell_words::split(command)
            .map_err(|err| SyncError::Config(format!("parse LM command {command:?}: {err}")))?;
        if argv.is_empty() {
            return Err(SyncError::Config("LM command is empty".to_string()).into());
        }
        let program_name = argv.remove(0);
        let program = which::which(&program_name).map_err(|err| {
            SyncError::Config(format!("LM command program {program_name:?} not found: {err}"))
        })?;
        Ok(Self {
            command: command.to_string(),
            program,
            args: argv,
        })
    }
}

/// Stdin layout for command backends: system instruction, then user turn.
pub(crate) fn render_prompt(request: &TranslationRequest) -> String {
    format!(
        "# Instructions\n{}\n\n# Task\n{}\n",
        request.system.trim(),
        request.user.trim()
    )
}

impl TranslationBackend for CommandBackend {
    fn name(&self) -> &str {
        &self.command
    }

    fn complete(&self, request: &TranslationRequest) -> Result<String> {
        let prompt = render_prompt(request);
        let start = Instant::now();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn LM command: {}", self.program.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .context("write prompt to LM stdin")?;
        }

        let output = child.wait_with_output().context("wait for LM command")?;
        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            prompt_bytes = prompt.len(),
            response_bytes = output.stdout.len(),
            "lm invoke complete"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "LM command failed with status {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        String::from_utf8(output.stdout).context("decode LM stdout as UTF-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TranslationRequest {
        TranslationRequest {
            system: "Translate.".to_string(),
            user: "Translate to fr:\n{\"1\":\"Hello\"}".to_string(),
        }
    }

    #[test]
    fn empty_command_is_rejected() {
        let err = CommandBackend::new("   ").err().expect("empty command");
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::Config(_))
        ));
    }

    #[test]
    fn unknown_program_is_rejected() {
        assert!(CommandBackend::new("locsync-definitely-not-a-real-program --flag").is_err());
    }

    #[test]
    fn prompt_contains_both_instructions() {
        let prompt = render_prompt(&request());
        assert!(prompt.starts_with("# Instructions\nTranslate."));
        assert!(prompt.contains("# Task\nTranslate to fr:"));
    }

    #[cfg(unix)]
    #[test]
    fn stdout_is_returned_and_failures_propagate() {
        let backend =
            CommandBackend::new(r#"sh -c 'cat >/dev/null; printf "{\"1\": \"Bonjour\"}"'"#)
                .expect("sh available");
        assert_eq!(
            backend.complete(&request()).expect("command succeeds"),
            "{\"1\": \"Bonjour\"}"
        );

        let failing = CommandBackend::new("sh -c 'cat >/dev/null; echo boom >&2; exit 3'")
            .expect("sh available");
        let err = failing.complete(&request()).expect_err("non-zero exit");
        assert!(err.to_string().contains("boom"));
    }
}

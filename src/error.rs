//! Errors that must stay distinguishable at the process boundary.
//!
//! Everything else travels as `anyhow::Error` with context; `main` downcasts
//! to these variants to pick an exit code.
use std::collections::BTreeSet;
use thiserror::Error;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_KEY_MISMATCH: u8 = 2;
pub const EXIT_CONFIG_ERROR: u8 = 3;
pub const EXIT_RETRIES_EXHAUSTED: u8 = 4;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("credential {var} is not set in the environment")]
    MissingCredential { var: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("request failed after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    #[error(
        "keys mismatch for {locale}: {} missing, {} extra",
        .missing.len(),
        .extra.len()
    )]
    KeyMismatch {
        locale: String,
        missing: BTreeSet<String>,
        extra: BTreeSet<String>,
    },
}

impl SyncError {
    pub fn exit_code(&self) -> u8 {
        match self {
            SyncError::MissingCredential { .. } | SyncError::Config(_) => EXIT_CONFIG_ERROR,
            SyncError::RetriesExhausted { .. } => EXIT_RETRIES_EXHAUSTED,
            SyncError::KeyMismatch { .. } => EXIT_KEY_MISMATCH,
            SyncError::MalformedResponse(_) => EXIT_FAILURE,
        }
    }
}

/// Exit code for an arbitrary run error, looking through context layers.
///
/// The outermost `SyncError` wins, whether it was raised or attached as
/// context, so a retry exhaustion caused by a malformed response maps to the
/// exhaustion code.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<SyncError>()
        .or_else(|| {
            err.chain()
                .find_map(|cause| cause.downcast_ref::<SyncError>())
        })
        .map(SyncError::exit_code)
        .unwrap_or(EXIT_FAILURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn exit_code_survives_added_context() {
        let err = Err::<(), _>(SyncError::KeyMismatch {
            locale: "fr".to_string(),
            missing: BTreeSet::from(["a".to_string()]),
            extra: BTreeSet::new(),
        })
        .context("verify fr")
        .expect_err("error");
        assert_eq!(exit_code_for(&err), EXIT_KEY_MISMATCH);
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), EXIT_FAILURE);
    }

    #[test]
    fn key_mismatch_message_counts_keys() {
        let err = SyncError::KeyMismatch {
            locale: "de".to_string(),
            missing: BTreeSet::from(["a".to_string(), "b".to_string()]),
            extra: BTreeSet::from(["z".to_string()]),
        };
        assert_eq!(err.to_string(), "keys mismatch for de: 2 missing, 1 extra");
    }
}

//! Post-run consistency check between source and target key sets.
use crate::catalog::{read_catalog, Catalog};
use crate::diff::key_set_delta;
use crate::error::SyncError;
use anyhow::Result;
use std::path::Path;

/// Re-read the target catalog from disk and require its key set to equal the
/// source's. A mismatch is returned as [`SyncError::KeyMismatch`].
pub fn verify_locale(locale: &str, source: &Catalog, target_path: &Path) -> Result<()> {
    let target = read_catalog(target_path, true)?
        .into_option()
        .unwrap_or_default();
    let delta = key_set_delta(source, &target);
    if delta.is_empty() {
        tracing::info!(locale, keys = source.len(), "translation completed successfully");
        return Ok(());
    }
    tracing::error!(
        locale,
        missing = ?delta.missing,
        extra = ?delta.extra,
        "keys mismatch"
    );
    Err(SyncError::KeyMismatch {
        locale: locale.to_string(),
        missing: delta.missing,
        extra: delta.extra,
    }
    .into())
}

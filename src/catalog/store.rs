//! Durable catalog persistence.
//!
//! Writes merge a partial update onto whatever is already on disk and publish
//! the result through a temp file in the same directory followed by a rename,
//! so readers never see a half-written catalog.
use super::Catalog;
use anyhow::{Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Outcome of reading a catalog that may not exist yet.
#[derive(Debug)]
pub enum CatalogRead {
    Loaded(Catalog),
    Missing,
}

impl CatalogRead {
    pub fn into_option(self) -> Option<Catalog> {
        match self {
            CatalogRead::Loaded(catalog) => Some(catalog),
            CatalogRead::Missing => None,
        }
    }
}

/// Load a catalog, returning an empty one for absent files when
/// `create_if_missing` is set. Reading never touches the filesystem beyond the
/// read itself.
pub fn read_catalog(path: &Path, create_if_missing: bool) -> Result<CatalogRead> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            if create_if_missing {
                return Ok(CatalogRead::Loaded(Catalog::new()));
            }
            return Ok(CatalogRead::Missing);
        }
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    let catalog: Catalog = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse catalog JSON {}", path.display()))?;
    Ok(CatalogRead::Loaded(catalog))
}

/// Merge `update` onto the catalog at `path` and persist atomically.
///
/// Existing keys are overwritten, new keys are added, nothing is removed.
/// Returns the merged catalog as written.
pub fn write_catalog(path: &Path, update: &Catalog) -> Result<Catalog> {
    let mut merged = read_catalog(path, true)?
        .into_option()
        .unwrap_or_default();
    merged.extend(update.iter().map(|(key, value)| (key.clone(), value.clone())));

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    let mut bytes = serde_json::to_vec_pretty(&merged).context("serialize catalog")?;
    bytes.push(b'\n');
    let existing = match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => return Err(err).with_context(|| format!("stat {}", path.display())),
    };
    let mut builder = tempfile::Builder::new();
    if let Some(permissions) = new_file_permissions() {
        builder.permissions(permissions);
    }
    let mut tmp = builder
        .tempfile_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    // A rewrite keeps the catalog's mode exactly, bypassing the umask.
    if let Some(permissions) = existing {
        tmp.as_file()
            .set_permissions(permissions)
            .with_context(|| format!("set permissions on {}", tmp.path().display()))?;
    }
    tmp.write_all(&bytes)
        .with_context(|| format!("write {}", tmp.path().display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync {}", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("publish {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        updated = update.len(),
        total = merged.len(),
        "catalog written"
    );
    Ok(merged)
}

/// Mode for a brand new catalog, subject to the umask like `fs::write`.
#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

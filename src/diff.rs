//! Catalog diffing.
use crate::catalog::Catalog;
use std::collections::BTreeSet;

/// Entries of `source` whose keys are absent from `target`, with source values.
pub fn missing_keys(source: &Catalog, target: &Catalog) -> Catalog {
    source
        .iter()
        .filter(|(key, _)| !target.contains_key(*key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Key-set difference between two catalogs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySetDelta {
    /// Keys in the source but not the target.
    pub missing: BTreeSet<String>,
    /// Keys in the target but not the source.
    pub extra: BTreeSet<String>,
}

impl KeySetDelta {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

pub fn key_set_delta(source: &Catalog, target: &Catalog) -> KeySetDelta {
    KeySetDelta {
        missing: source
            .keys()
            .filter(|key| !target.contains_key(*key))
            .cloned()
            .collect(),
        extra: target
            .keys()
            .filter(|key| !source.contains_key(*key))
            .cloned()
            .collect(),
    }
}

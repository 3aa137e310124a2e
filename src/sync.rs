//! Per-locale synchronization workflow.
//!
//! diff -> cost gate -> orchestrator -> verifier, one locale at a time. A
//! missing source catalog skips its locale; a declined estimate stops the
//! whole run; a key mismatch after translation is fatal.
use crate::catalog::{read_catalog, write_catalog, Catalog};
use crate::config::SyncConfig;
use crate::cost::{estimate, Confirm, CostEstimate};
use crate::diff::missing_keys;
use crate::orchestrator::Orchestrator;
use crate::registry::Locale;
use crate::verify::verify_locale;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Everything known about one locale before any backend call.
#[derive(Debug, Clone)]
pub struct LocalePlan {
    pub source: Catalog,
    pub target: Catalog,
    pub target_path: PathBuf,
    pub missing: Catalog,
    pub estimate: CostEstimate,
}

/// Load source and target catalogs for `locale` and diff them.
///
/// Returns `None` (after a warning) when the source catalog does not exist.
pub fn plan_locale(config: &SyncConfig, locale: &Locale) -> Result<Option<LocalePlan>> {
    let source_path = config.catalog_path(&config.source_locale);
    let target_path = config.catalog_path(&locale.code);

    let Some(source) = read_catalog(&source_path, false)?.into_option() else {
        tracing::warn!(
            source = %source_path.display(),
            locale = %locale.code,
            "skipping locale: source catalog missing"
        );
        return Ok(None);
    };
    let target = read_catalog(&target_path, true)?
        .into_option()
        .unwrap_or_default();

    let missing = missing_keys(&source, &target);
    let estimate = estimate(&missing, config.cost_per_char);
    Ok(Some(LocalePlan {
        source,
        target,
        target_path,
        missing,
        estimate,
    }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleOutcome {
    /// Source catalog missing.
    Skipped,
    /// Nothing was missing; the verifier still ran.
    UpToDate,
    Translated { keys: usize },
    /// Operator declined the estimate; nothing was written.
    Aborted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub outcomes: Vec<(String, LocaleOutcome)>,
    pub aborted: bool,
}

impl RunSummary {
    pub fn translated_keys(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, outcome)| match outcome {
                LocaleOutcome::Translated { keys } => *keys,
                _ => 0,
            })
            .sum()
    }
}

pub struct Synchronizer<'a> {
    config: &'a SyncConfig,
    orchestrator: Orchestrator<'a>,
    confirm: &'a mut dyn Confirm,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        config: &'a SyncConfig,
        orchestrator: Orchestrator<'a>,
        confirm: &'a mut dyn Confirm,
    ) -> Self {
        Self {
            config,
            orchestrator,
            confirm,
        }
    }

    /// Sync every locale in order, stopping early if the operator declines.
    pub fn run(&mut self, locales: &[Locale]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for locale in locales {
            tracing::info!(
                locale = %locale.code,
                language = %locale.language,
                "target language set"
            );
            let outcome = self.sync_locale(locale)?;
            let aborted = outcome == LocaleOutcome::Aborted;
            summary.outcomes.push((locale.code.clone(), outcome));
            if aborted {
                summary.aborted = true;
                break;
            }
        }
        Ok(summary)
    }

    pub fn sync_locale(&mut self, locale: &Locale) -> Result<LocaleOutcome> {
        let Some(plan) = plan_locale(self.config, locale)? else {
            return Ok(LocaleOutcome::Skipped);
        };
        let LocalePlan {
            source,
            mut target,
            target_path,
            missing,
            estimate,
        } = plan;

        if missing.is_empty() {
            tracing::info!(locale = %locale.code, "no missing keys");
            verify_locale(&locale.code, &source, &target_path)?;
            return Ok(LocaleOutcome::UpToDate);
        }

        tracing::info!(
            locale = %locale.code,
            missing = missing.len(),
            chars = estimate.total_chars,
            cost = estimate.cost,
            "pending translation"
        );
        if !self.confirm.confirm(&locale.code, &estimate)? {
            tracing::info!(locale = %locale.code, "translation aborted");
            return Ok(LocaleOutcome::Aborted);
        }

        write_catalog(&target_path, &Catalog::new())
            .with_context(|| format!("initialize {}", target_path.display()))?;
        let report = self
            .orchestrator
            .translate_missing(locale, &target_path, &missing, &mut target)?;
        verify_locale(&locale.code, &source, &target_path)?;
        Ok(LocaleOutcome::Translated {
            keys: report.translated,
        })
    }
}

/// Run the verifier for every locale without translating anything.
pub fn verify_all(config: &SyncConfig, locales: &[Locale]) -> Result<usize> {
    let mut verified = 0;
    for locale in locales {
        let Some(plan) = plan_locale(config, locale)? else {
            continue;
        };
        verify_locale(&locale.code, &plan.source, &plan.target_path)?;
        verified += 1;
    }
    Ok(verified)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;

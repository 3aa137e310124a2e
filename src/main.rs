use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod backend;
mod catalog;
mod cli;
mod codec;
mod config;
mod cost;
mod diff;
mod error;
mod logging;
mod orchestrator;
mod prompt;
mod registry;
mod retry;
mod sync;
#[cfg(test)]
mod testing;
mod verify;

use crate::cli::{Command, CommonArgs, RootArgs, SyncArgs};
use crate::config::SyncConfig;
use crate::cost::PromptConfirm;
use crate::error::{exit_code_for, SyncError};
use crate::orchestrator::Orchestrator;
use crate::prompt::PromptBuilder;
use crate::registry::{load_registry, target_locales, Locale};
use crate::sync::{plan_locale, verify_all, Synchronizer};

fn main() -> ExitCode {
    let args = RootArgs::parse();
    logging::init(args.command.common().verbose);

    let result = match args.command {
        Command::Sync(args) => cmd_sync(args),
        Command::Status(args) => cmd_status(args),
        Command::Verify(args) => cmd_verify(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn load_config(common: &CommonArgs) -> Result<SyncConfig> {
    let mut config = SyncConfig::load(common.config.as_deref())?;
    if let Some(root) = &common.catalog_root {
        config.catalog_root = root.clone();
    }
    if let Some(registry) = &common.registry {
        config.registry = registry.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Registry targets, narrowed to `--locale` codes when given.
fn resolve_locales(config: &SyncConfig, filter: &[String]) -> Result<Vec<Locale>> {
    let targets = target_locales(load_registry(&config.registry)?, &config.source_locale);
    if filter.is_empty() {
        return Ok(targets);
    }
    let mut selected = Vec::new();
    for code in filter {
        let locale = targets
            .iter()
            .find(|locale| &locale.code == code)
            .ok_or_else(|| {
                SyncError::Config(format!(
                    "locale {code:?} is not a target in {}",
                    config.registry.display()
                ))
            })?;
        selected.push(locale.clone());
    }
    Ok(selected)
}

fn cmd_sync(args: SyncArgs) -> Result<()> {
    let config = load_config(&args.common)?;
    // Backend construction checks the credential before any catalog is read.
    let backend = config.resolve_backend(args.lm.as_deref()).build()?;
    let locales = resolve_locales(&config, &args.common.locales)?;

    let prompts = PromptBuilder::new(config.protected_terms.clone());
    let orchestrator = Orchestrator::new(backend.as_ref(), &prompts, config.retry_policy());
    let stdin = std::io::stdin();
    let mut confirm = PromptConfirm::new(stdin.lock(), std::io::stdout());
    let mut synchronizer = Synchronizer::new(&config, orchestrator, &mut confirm);

    let summary = synchronizer.run(&locales)?;
    if summary.aborted {
        tracing::info!("run aborted by operator");
    } else {
        tracing::info!(
            locales = summary.outcomes.len(),
            translated = summary.translated_keys(),
            "sync finished"
        );
    }
    Ok(())
}

fn cmd_status(args: CommonArgs) -> Result<()> {
    let config = load_config(&args)?;
    let locales = resolve_locales(&config, &args.locales)?;
    println!("{:<8} {:>8} {:>10} {:>12}", "locale", "missing", "chars", "est. cost");
    for locale in &locales {
        match plan_locale(&config, locale)? {
            Some(plan) => println!(
                "{:<8} {:>8} {:>10} {:>12}",
                locale.code,
                plan.missing.len(),
                plan.estimate.total_chars,
                format!("${:.6}", plan.estimate.cost)
            ),
            None => println!("{:<8} {:>8}", locale.code, "skipped"),
        }
    }
    Ok(())
}

fn cmd_verify(args: CommonArgs) -> Result<()> {
    let config = load_config(&args)?;
    let locales = resolve_locales(&config, &args.locales)?;
    let verified = verify_all(&config, &locales)?;
    tracing::info!(verified, "all target catalogs match the source key set");
    Ok(())
}

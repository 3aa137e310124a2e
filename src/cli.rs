//! CLI argument parsing for the catalog sync workflow.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "locsync",
    version,
    about = "Incrementally translate documentation string catalogs",
    after_help = "Commands:\n  sync     Translate missing keys for every target locale\n  status   Show pending keys and estimated cost per locale\n  verify   Check that every target catalog has the source key set\n\nExamples:\n  locsync status --catalog-root docs/i18n\n  locsync sync --catalog-root docs/i18n --locale fr --locale de\n  locsync sync --lm 'llm -m gpt-4o'\n  locsync verify --config locsync.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Sync(SyncArgs),
    Status(CommonArgs),
    Verify(CommonArgs),
}

/// Inputs shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// JSON config file (defaults apply to every omitted field)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding one <code>/<code>_strings.json per locale
    #[arg(long, value_name = "DIR")]
    pub catalog_root: Option<PathBuf>,

    /// CSV locale registry with a Code column
    #[arg(long, value_name = "PATH")]
    pub registry: Option<PathBuf>,

    /// Restrict the run to these locale codes (repeatable)
    #[arg(long = "locale", value_name = "CODE")]
    pub locales: Vec<String>,

    /// Emit debug-level logs
    #[arg(long)]
    pub verbose: bool,
}

/// Sync command inputs.
#[derive(Parser, Debug)]
#[command(about = "Translate missing keys for every target locale")]
pub struct SyncArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Local LM command that reads the prompt on stdin (overrides config)
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,
}

impl Command {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Command::Sync(args) => &args.common,
            Command::Status(args) | Command::Verify(args) => args,
        }
    }
}

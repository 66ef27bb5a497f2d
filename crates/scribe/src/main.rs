//! scribe CLI
#![deny(unsafe_code)]

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use scribe::commands::{self, Session};
use scribe::{Cli, Commands};
use scribe_core::{ConfigLoader, RuleRegistry};
use tracing::debug;

mod observability;

fn utf8(path: std::path::PathBuf, what: &str) -> anyhow::Result<Utf8PathBuf> {
    Utf8PathBuf::try_from(path)
        .map_err(|e| anyhow::anyhow!("{what} is not valid UTF-8: {}", e.into_path_buf().display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.color.apply();

    if let Some(ref dir) = cli.chdir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }

    let cwd = utf8(
        std::env::current_dir().context("failed to determine current directory")?,
        "current directory",
    )?;
    let mut loader = ConfigLoader::new().with_project_search(&cwd);
    if let Some(ref config_path) = cli.config {
        loader = loader.with_file(utf8(config_path.clone(), "config path")?);
    }
    let loaded = loader
        .load_with_source()
        .context("failed to load configuration")?;

    let env_filter =
        observability::env_filter(cli.quiet, cli.verbose, loaded.config.log_level.as_str());
    let _guard = observability::init_observability(loaded.config.log_dir.as_deref(), env_filter)
        .context("failed to initialize logging")?;

    debug!(
        verbose = cli.verbose,
        quiet = cli.quiet,
        json = cli.json,
        color = ?cli.color,
        chdir = ?cli.chdir,
        rule = ?cli.rule,
        "CLI initialized"
    );

    let session = Session {
        project_root: loaded.project_root.unwrap_or_else(|| cwd.clone()),
        config: loaded.config,
        registry: RuleRegistry::builtin(),
        rule_override: cli.rule,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Commit(args) => commands::commit::cmd_commit(args, &session),
        Commands::Check(args) => commands::check::cmd_check(args, &session),
        Commands::Bump(args) => commands::bump::cmd_bump(args, &session),
        Commands::Example => commands::describe::cmd_example(&session),
        Commands::Schema => commands::describe::cmd_schema(&session),
        Commands::Info => commands::describe::cmd_info(&session),
        Commands::Ls => commands::ls::cmd_ls(&session),
        Commands::Init(args) => commands::init::cmd_init(args, &session),
    };
    if let Err(ref err) = result {
        tracing::error!(error = %err, "fatal error");
    }
    result
}

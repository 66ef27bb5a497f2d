//! Init command: write a starter config with a `[customize]` section.

use anyhow::{Context, bail};
use clap::{Args, ValueEnum};
use inquire::Confirm;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use scribe_core::config::CustomizeConfig;
use scribe_core::rule::{Choice, customize};
use scribe_core::version::BumpLevel;
use scribe_core::{Config, QuestionKind, QuestionSpec};

use super::Session;

/// Output format for the starter config.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum InitFormat {
    /// `.scribe.toml`
    #[default]
    Toml,
    /// `.scribe.yaml`
    Yaml,
}

impl InitFormat {
    const fn file_name(self) -> &'static str {
        match self {
            Self::Toml => ".scribe.toml",
            Self::Yaml => ".scribe.yaml",
        }
    }
}

/// Arguments for the `init` subcommand.
#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Config file format
    #[arg(long, value_enum, default_value_t)]
    pub format: InitFormat,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Serialize)]
struct InitReport {
    path: String,
    created: bool,
}

/// A working `customize` rule to start editing from.
pub fn starter_config() -> Config {
    let questions = vec![
        QuestionSpec::new(
            QuestionKind::List,
            "change_type",
            "Select the type of change you are committing",
        )
        .with_choices(vec![
            Choice::new("feature", "feature: A new feature."),
            Choice::new("bug fix", "bug fix: A bug fix."),
        ]),
        QuestionSpec::new(QuestionKind::Input, "message", "Body."),
        QuestionSpec::new(
            QuestionKind::Confirm,
            "show_message",
            "Do you want to add body message in commit?",
        )
        .with_default(true),
    ];

    Config {
        rule: Some(customize::NAME.to_string()),
        customize: Some(CustomizeConfig {
            message_template: Some(
                "{{change_type}}:{% if show_message %} {{message}}{% endif %}".into(),
            ),
            example: Some("feature: this feature enable customize through config file".into()),
            schema: Some("<type>: <body>".into()),
            schema_pattern: Some(r"(feature|bug fix):(\s.*)".into()),
            bump_pattern: Some("^(break|new|fix|hotfix)".into()),
            bump_map: Some(
                [
                    ("break", BumpLevel::Major),
                    ("new", BumpLevel::Minor),
                    ("fix", BumpLevel::Patch),
                    ("hotfix", BumpLevel::Patch),
                ]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            ),
            info: Some("This is a customized rule.".into()),
            info_path: None,
            questions,
        }),
        ..Config::default()
    }
}

fn render(config: &Config, format: InitFormat) -> anyhow::Result<String> {
    match format {
        InitFormat::Toml => toml::to_string_pretty(config).context("failed to serialize TOML"),
        InitFormat::Yaml => serde_saphyr::to_string(config).context("failed to serialize YAML"),
    }
}

/// Execute the init command.
#[instrument(name = "cmd_init", skip_all)]
pub fn cmd_init(args: InitArgs, session: &Session) -> anyhow::Result<()> {
    let path = session.project_root.join(args.format.file_name());
    debug!(%path, format = ?args.format, "executing init command");

    if path.exists() {
        bail!("{path} already exists; not overwriting");
    }

    if !args.yes && !session.json {
        let create = Confirm::new(&format!("Create {path}?"))
            .with_default(true)
            .prompt()
            .context("confirmation prompt failed")?;
        if !create {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
    }

    let contents = render(&starter_config(), args.format)?;
    std::fs::write(&path, contents).with_context(|| format!("failed to write {path}"))?;

    if session.json {
        return super::print_json(&InitReport {
            path: path.to_string(),
            created: true,
        });
    }
    println!("  {} Created {}", "✓".green(), path.cyan());
    Ok(())
}

//! Check command: validate a commit message against the rule's schema pattern.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use super::Session;

/// Arguments for the `check` subcommand.
#[derive(Args, Debug, Default)]
#[group(required = true, multiple = false)]
pub struct CheckArgs {
    /// Message to check
    #[arg(short, long, value_name = "MSG")]
    pub message: Option<String>,

    /// Read the message from FILE (e.g., `.git/COMMIT_EDITMSG` in a commit-msg hook)
    #[arg(long, value_name = "FILE")]
    pub commit_msg_file: Option<Utf8PathBuf>,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    rule: &'a str,
    valid: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_pattern: Option<&'a str>,
}

/// Execute the check command; fails when the message does not match.
#[instrument(name = "cmd_check", skip_all)]
pub fn cmd_check(args: CheckArgs, session: &Session) -> anyhow::Result<()> {
    let rule = session.rule()?;

    let message = match (args.message, args.commit_msg_file) {
        (Some(message), _) => message,
        (None, Some(path)) => {
            let path = session.resolve_path(&path);
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read commit message file {path}"))?;
            strip_comments(&raw)
        }
        (None, None) => bail!("either --message or --commit-msg-file is required"),
    };

    let valid = rule.validate(&message);
    debug!(rule = rule.name(), valid, "checked message");

    if session.json {
        super::print_json(&CheckReport {
            rule: rule.name(),
            valid,
            message: &message,
            schema_pattern: rule.schema_pattern(),
        })?;
    } else if valid {
        println!("  {} Commit message is valid", "✓".green());
    } else {
        println!("  {} Commit message does not follow the {} rule", "✗".red(), rule.name().bold());
        println!();
        println!("{}", message.dimmed());
        if let Some(schema) = rule.schema() {
            println!();
            println!("{}: {}", "Expected".dimmed(), schema);
        }
        if let Some(pattern) = rule.schema_pattern() {
            println!("{}: {}", "Pattern".dimmed(), pattern.cyan());
        }
    }

    if !valid {
        bail!("commit validation failed");
    }
    Ok(())
}

/// Drop git comment lines and surrounding blank space.
fn strip_comments(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

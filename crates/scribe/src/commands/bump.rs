//! Bump command: thin CLI layer over `scribe_core::bump`.

use anyhow::Context;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use scribe_core::bump::BumpDecision;
use scribe_core::semver::Version;
use scribe_core::{git, version};

use super::Session;

/// Arguments for the `bump` subcommand.
#[derive(Args, Debug, Default)]
pub struct BumpArgs {
    /// Current version (default: parsed from the latest `v*` tag)
    #[arg(long, value_name = "VERSION")]
    pub current: Option<String>,

    /// Consider commits after this ref (default: the latest `v*` tag)
    #[arg(long, value_name = "REF")]
    pub since: Option<String>,

    /// Use these messages instead of git history (repeatable)
    #[arg(short, long = "message", value_name = "MSG")]
    pub messages: Vec<String>,
}

#[derive(Serialize)]
struct BumpReport<'a> {
    rule: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    since: Option<&'a str>,
    commits: usize,
    #[serde(flatten)]
    decision: &'a BumpDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<String>,
}

/// Execute the bump command.
#[instrument(name = "cmd_bump", skip_all)]
pub fn cmd_bump(args: BumpArgs, session: &Session) -> anyhow::Result<()> {
    let rule = session.rule()?;

    let (since, messages) = if args.messages.is_empty() {
        let since = match args.since {
            Some(since) => Some(since),
            None => git::latest_version_tag().context("failed to read tags")?,
        };
        let messages =
            git::commit_messages(since.as_deref()).context("failed to read commit history")?;
        (since, messages)
    } else {
        (args.since, args.messages)
    };
    debug!(rule = rule.name(), since = ?since, commits = messages.len(), "executing bump command");

    let decision = rule
        .aggregate_bump(&messages)
        .context("bump resolution failed")?;

    let current = current_version(args.current.as_deref(), since.as_deref())?;
    let next = current
        .as_ref()
        .and_then(|v| version::apply_severity(v, decision.severity));

    if session.json {
        return super::print_json(&BumpReport {
            rule: rule.name(),
            since: since.as_deref(),
            commits: messages.len(),
            decision: &decision,
            current: current.as_ref().map(Version::to_string),
            next: next.as_ref().map(Version::to_string),
        });
    }

    println!(
        "{}: {} ({} commit{})",
        "Bump".bold(),
        decision.severity.to_string().green().bold(),
        messages.len(),
        if messages.len() == 1 { "" } else { "s" }
    );
    if let Some(ref trigger) = decision.trigger {
        let first_line = trigger.message.lines().next().unwrap_or_default();
        println!("{}: {}", "Triggered by".dimmed(), first_line);
    }
    match (current, next) {
        (Some(current), Some(next)) => println!(
            "{}: {} → {}",
            "Version".bold(),
            current.to_string().dimmed(),
            next.to_string().green().bold()
        ),
        (Some(current), None) => {
            println!("{}: {} (no release needed)", "Version".bold(), current);
        }
        (None, _) => println!(
            "{}: {}",
            "Version".dimmed(),
            "unknown (no tag; pass --current)".yellow()
        ),
    }
    Ok(())
}

/// Explicit `--current` wins; otherwise a version-shaped `since` ref.
fn current_version(explicit: Option<&str>, since: Option<&str>) -> anyhow::Result<Option<Version>> {
    if let Some(explicit) = explicit {
        return version::parse_version(explicit)
            .map(Some)
            .with_context(|| format!("invalid --current version: {explicit}"));
    }
    Ok(since.and_then(|s| version::parse_version(s).ok()))
}

//! Commit command: ask the rule's questions, render, validate, commit.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use scribe_core::{Answers, RuleProvider, git};

use super::Session;

/// Arguments for the `commit` subcommand.
#[derive(Args, Debug, Default)]
pub struct CommitArgs {
    /// Print the message instead of committing
    #[arg(long)]
    pub dry_run: bool,

    /// Also write the rendered message to FILE
    #[arg(long, value_name = "FILE")]
    pub write_message_to_file: Option<Utf8PathBuf>,

    /// Pre-filled answers as a JSON object; unanswered questions are prompted
    #[arg(long, value_name = "FILE")]
    pub answers: Option<Utf8PathBuf>,

    /// Extra arguments passed through to `git commit` (after `--`)
    #[arg(last = true, value_name = "GIT_ARGS")]
    pub git_args: Vec<String>,
}

#[derive(Serialize)]
struct CommitReport<'a> {
    rule: &'a str,
    message: &'a str,
    dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    git_output: Option<String>,
}

/// Execute the commit command.
#[instrument(name = "cmd_commit", skip_all, fields(dry_run = args.dry_run))]
pub fn cmd_commit(args: CommitArgs, session: &Session) -> anyhow::Result<()> {
    let rule = session.rule()?;
    debug!(rule = rule.name(), "executing commit command");

    let mut answers = match args.answers {
        Some(ref path) => load_answers(&session.resolve_path(path))?,
        None => Answers::new(),
    };
    collect_answers(rule.as_ref(), &mut answers)?;

    let message = rule
        .message(&answers)
        .context("failed to render commit message")?;
    ensure_valid(rule.as_ref(), &message)?;

    let written_to = match args.write_message_to_file {
        Some(ref path) => {
            let path = session.resolve_path(path);
            std::fs::write(&path, &message)
                .with_context(|| format!("failed to write message to {path}"))?;
            Some(path.to_string())
        }
        None => None,
    };

    let git_output = if args.dry_run {
        None
    } else {
        if !git::is_inside_repo().context("failed to run git")? {
            bail!("not inside a git repository");
        }
        Some(run_commit(&message, &args.git_args, session.json)?)
    };

    if session.json {
        return super::print_json(&CommitReport {
            rule: rule.name(),
            message: &message,
            dry_run: args.dry_run,
            written_to,
            git_output,
        });
    }

    if args.dry_run {
        println!("{message}");
    } else {
        println!("  {} Committed", "✓".green());
        if let Some(output) = git_output.filter(|o| !o.trim().is_empty()) {
            println!("{}", output.trim_end().dimmed());
        }
    }
    if let Some(path) = written_to {
        eprintln!("  {} Message written to {}", "→".dimmed(), path.cyan());
    }
    Ok(())
}

/// Prompt for every question not already answered, in declared order.
fn collect_answers(rule: &dyn RuleProvider, answers: &mut Answers) -> anyhow::Result<()> {
    for question in rule.questions() {
        if answers.contains_key(&question.name) {
            continue;
        }
        let answer = super::prompt_question(question)?;
        answers.insert(question.name.clone(), answer);
    }
    Ok(())
}

fn load_answers(path: &camino::Utf8Path) -> anyhow::Result<Answers> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read answers {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("invalid answers in {path}"))
}

fn ensure_valid(rule: &dyn RuleProvider, message: &str) -> anyhow::Result<()> {
    if rule.validate(message) {
        return Ok(());
    }
    let pattern = rule.schema_pattern().unwrap_or_default();
    bail!("rendered message does not match schema_pattern {pattern:?}:\n{message}")
}

fn run_commit(message: &str, git_args: &[String], quiet: bool) -> anyhow::Result<String> {
    let spinner = (!quiet).then(|| {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("git commit...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        spinner
    });
    let result = git::commit(message, git_args).context("git commit failed");
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    result
}

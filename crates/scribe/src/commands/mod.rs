//! Command implementations

pub mod bump;

pub mod check;

pub mod commit;

pub mod describe;

pub mod init;

pub mod ls;

use std::sync::Arc;

use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use inquire::{Confirm, MultiSelect, Password, Select, Text};
use tracing::debug;

use scribe_core::rule::Choice;
use scribe_core::{
    AnswerValue, Config, FileReader, FsReader, QuestionKind, QuestionSpec, RuleContext,
    RuleProvider, RuleRegistry,
};

/// Everything a command needs from startup.
#[derive(Debug)]
pub struct Session {
    /// Loaded configuration.
    pub config: Config,
    /// Rule lookup.
    pub registry: RuleRegistry,
    /// Directory relative rule paths resolve against.
    pub project_root: Utf8PathBuf,
    /// `--rule` override, if given.
    pub rule_override: Option<String>,
    /// Global `--json` flag.
    pub json: bool,
}

impl Session {
    /// Name of the rule in effect (`--rule` beats config).
    pub fn rule_name(&self) -> &str {
        self.rule_override
            .as_deref()
            .unwrap_or_else(|| self.config.rule_name())
    }

    /// Construct the rule in effect.
    pub fn rule(&self) -> anyhow::Result<Box<dyn RuleProvider>> {
        let reader: Arc<dyn FileReader> = Arc::new(FsReader::new(&self.project_root));
        let ctx = RuleContext::new(&self.config, reader);
        let name = self.rule_name();
        self.registry
            .build(name, &ctx)
            .with_context(|| format!("failed to load rule '{name}'"))
    }

    /// Resolve a user-supplied path against the project root.
    pub fn resolve_path(&self, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

/// A choice as shown in a selection prompt.
struct ChoiceOption<'a>(&'a Choice);

impl std::fmt::Display for ChoiceOption<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// Ask one question interactively.
///
/// Shared by every command that collects answers (currently `commit`).
pub fn prompt_question(question: &QuestionSpec) -> anyhow::Result<AnswerValue> {
    debug!(name = %question.name, kind = %question.kind, "prompting");
    let cancelled = || format!("prompt '{}' cancelled", question.name);

    let answer = match &question.kind {
        QuestionKind::List => {
            let choices = question_choices(question)?;
            let cursor = default_text(question)
                .and_then(|d| choices.iter().position(|c| c.value == d))
                .unwrap_or(0);
            let options: Vec<_> = choices.iter().map(ChoiceOption).collect();
            let picked = Select::new(&question.message, options)
                .with_starting_cursor(cursor)
                .prompt()
                .with_context(cancelled)?;
            AnswerValue::Text(picked.0.value.clone())
        }
        QuestionKind::Checkbox => {
            let choices = question_choices(question)?;
            let defaults: Vec<usize> = match &question.default {
                Some(AnswerValue::List(values)) => choices
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| values.contains(&c.value))
                    .map(|(i, _)| i)
                    .collect(),
                _ => Vec::new(),
            };
            let options: Vec<_> = choices.iter().map(ChoiceOption).collect();
            let picked = MultiSelect::new(&question.message, options)
                .with_default(&defaults)
                .prompt()
                .with_context(cancelled)?;
            AnswerValue::List(picked.into_iter().map(|c| c.0.value.clone()).collect())
        }
        QuestionKind::Confirm => {
            let default = question
                .default
                .as_ref()
                .is_some_and(AnswerValue::is_truthy);
            let answer = Confirm::new(&question.message)
                .with_default(default)
                .prompt()
                .with_context(cancelled)?;
            AnswerValue::Bool(answer)
        }
        QuestionKind::Other(kind) if kind == "password" => {
            let answer = Password::new(&question.message)
                .without_confirmation()
                .prompt()
                .with_context(cancelled)?;
            AnswerValue::Text(answer)
        }
        QuestionKind::Input | QuestionKind::Other(_) => {
            let default = default_text(question);
            let mut prompt = Text::new(&question.message);
            if let Some(default) = default.as_deref() {
                prompt = prompt.with_default(default);
            }
            AnswerValue::Text(prompt.prompt().with_context(cancelled)?)
        }
    };
    Ok(answer)
}

fn question_choices(question: &QuestionSpec) -> anyhow::Result<&[Choice]> {
    match question.choices.as_deref() {
        Some(choices) if !choices.is_empty() => Ok(choices),
        _ => bail!(
            "question '{}' is a {} question but has no choices",
            question.name,
            question.kind
        ),
    }
}

fn default_text(question: &QuestionSpec) -> Option<String> {
    match question.default.as_ref()? {
        AnswerValue::Bool(_) => None,
        other => Some(other.to_string()),
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

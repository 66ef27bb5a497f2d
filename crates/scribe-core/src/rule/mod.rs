//! Commit rules.
//!
//! A rule bundles everything a project says about its commits: the
//! questions used to author one, the template that turns answers into a
//! message, the pattern a valid message matches, and how messages map to
//! version bumps.
//!
//! Every rule implements [`RuleProvider`]. Two implementations ship:
//!
//! - [`ConventionalRule`](conventional::ConventionalRule) - compiled-in
//!   Conventional Commits
//! - [`CustomizeRule`](customize::CustomizeRule) - defined entirely by the
//!   `[customize]` config section
//!
//! Both compile their [`RuleDefinition`] into a [`CompiledRule`] once, at
//! construction, so a broken definition fails early rather than mid-session.

pub mod conventional;
pub mod customize;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::bump::{BumpDecision, BumpMap, BumpResolver, BumpResult, BumpSeverity};
use crate::config::CustomizeConfig;
use crate::error::{ConfigurationError, RuleResult};
use crate::info::{FileReader, resolve_info};
use crate::render::{AnswerValue, Answers, RenderResult, Template};
use crate::schema::SchemaValidator;

/// How a question's answer is collected.
///
/// The engine passes this through to the prompting layer untouched.
/// Unrecognized kinds are kept verbatim in [`QuestionKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Pick one of `choices`.
    List,
    /// Pick any number of `choices`.
    Checkbox,
    /// Free text.
    Input,
    /// Yes / no.
    Confirm,
    /// Any other kind, by name.
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Checkbox => f.write_str("checkbox"),
            Self::Input => f.write_str("input"),
            Self::Confirm => f.write_str("confirm"),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

/// One selectable option of a list-style question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// What ends up in the answers.
    pub value: String,
    /// Display text.
    pub name: String,
}

impl Choice {
    /// Create a choice.
    pub fn new(value: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name: name.into(),
        }
    }
}

/// A single prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSpec {
    /// How the answer is collected.
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// Answer key; unique within a rule.
    pub name: String,
    /// Prompt text.
    pub message: String,
    /// Options for list-style questions, in display order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    /// Pre-filled answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<AnswerValue>,
    /// Any other keys, passed through as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl QuestionSpec {
    /// Create a question with no choices, default, or extra keys.
    pub fn new(kind: QuestionKind, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            message: message.into(),
            choices: None,
            default: None,
            extra: BTreeMap::new(),
        }
    }

    /// Attach choices.
    #[must_use]
    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = Some(choices);
        self
    }

    /// Attach a default answer.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<AnswerValue>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// The validated definition of one rule.
///
/// Immutable once built; accessors hand back exactly what was configured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleDefinition {
    message_template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bump_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bump_map: Option<BumpMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    info_path: Option<Utf8PathBuf>,
    questions: Vec<QuestionSpec>,
}

impl RuleDefinition {
    /// Start a definition from its message template.
    pub fn new(message_template: impl Into<String>) -> Self {
        Self {
            message_template: message_template.into(),
            example: None,
            schema: None,
            schema_pattern: None,
            bump_pattern: None,
            bump_map: None,
            info: None,
            info_path: None,
            questions: Vec::new(),
        }
    }

    /// Set the example message.
    #[must_use]
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Set the human-readable schema.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set the validation pattern.
    #[must_use]
    pub fn with_schema_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.schema_pattern = Some(pattern.into());
        self
    }

    /// Set the bump pattern and map together.
    #[must_use]
    pub fn with_bump(mut self, pattern: impl Into<String>, map: BumpMap) -> Self {
        self.bump_pattern = Some(pattern.into());
        self.bump_map = Some(map);
        self
    }

    /// Set inline info text.
    #[must_use]
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    /// Set the questions, in prompt order.
    #[must_use]
    pub fn with_questions(mut self, questions: Vec<QuestionSpec>) -> Self {
        self.questions = questions;
        self
    }

    /// The message template.
    pub fn message_template(&self) -> &str {
        &self.message_template
    }

    /// Example message, verbatim.
    pub fn example(&self) -> Option<&str> {
        self.example.as_deref()
    }

    /// Human-readable schema, verbatim.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Validation pattern, verbatim.
    pub fn schema_pattern(&self) -> Option<&str> {
        self.schema_pattern.as_deref()
    }

    /// Bump pattern, verbatim.
    pub fn bump_pattern(&self) -> Option<&str> {
        self.bump_pattern.as_deref()
    }

    /// Bump map, as configured.
    pub const fn bump_map(&self) -> Option<&BumpMap> {
        self.bump_map.as_ref()
    }

    /// Inline info text.
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    /// Path to an info file.
    pub fn info_path(&self) -> Option<&Utf8Path> {
        self.info_path.as_deref()
    }

    /// Questions in declared order.
    pub fn questions(&self) -> &[QuestionSpec] {
        &self.questions
    }
}

impl TryFrom<CustomizeConfig> for RuleDefinition {
    type Error = ConfigurationError;

    fn try_from(section: CustomizeConfig) -> Result<Self, Self::Error> {
        let message_template = section
            .message_template
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigurationError::MissingMessageTemplate)?;

        Ok(Self {
            message_template,
            example: section.example,
            schema: section.schema,
            schema_pattern: section.schema_pattern,
            bump_pattern: section.bump_pattern,
            bump_map: section.bump_map,
            info: section.info,
            info_path: section.info_path,
            questions: section.questions,
        })
    }
}

/// The contract every commit rule satisfies.
///
/// Implementors supply the definition plus the compiled pieces; the
/// accessors and bump helpers have default implementations over those.
pub trait RuleProvider: fmt::Debug + Send + Sync {
    /// Registry name of this rule.
    fn name(&self) -> &str;

    /// The underlying definition.
    fn definition(&self) -> &RuleDefinition;

    /// Render the commit message from collected answers.
    fn message(&self, answers: &Answers) -> RenderResult<String>;

    /// Effective guidance text; reads `info_path` when set.
    fn info(&self) -> RuleResult<Option<String>>;

    /// Compiled `schema_pattern`.
    fn schema_validator(&self) -> &SchemaValidator;

    /// Compiled `bump_pattern` + `bump_map`, if the rule bumps at all.
    fn bump_resolver(&self) -> Option<&BumpResolver>;

    /// Questions in declared order.
    fn questions(&self) -> &[QuestionSpec] {
        self.definition().questions()
    }

    /// Example message.
    fn example(&self) -> Option<&str> {
        self.definition().example()
    }

    /// Human-readable schema.
    fn schema(&self) -> Option<&str> {
        self.definition().schema()
    }

    /// Validation pattern.
    fn schema_pattern(&self) -> Option<&str> {
        self.definition().schema_pattern()
    }

    /// Bump pattern.
    fn bump_pattern(&self) -> Option<&str> {
        self.definition().bump_pattern()
    }

    /// Bump map.
    fn bump_map(&self) -> Option<&BumpMap> {
        self.definition().bump_map()
    }

    /// Whether `message` satisfies the schema pattern.
    fn validate(&self, message: &str) -> bool {
        self.schema_validator().is_valid(message)
    }

    /// Severity of one commit; `None` when the rule has no bump pattern.
    fn resolve_bump(&self, message: &str) -> BumpResult<BumpSeverity> {
        self.bump_resolver()
            .map_or(Ok(BumpSeverity::None), |resolver| resolver.resolve(message))
    }

    /// Aggregate severity of many commits.
    fn aggregate_bump(&self, messages: &[String]) -> BumpResult<BumpDecision> {
        self.bump_resolver()
            .map_or_else(|| Ok(BumpDecision::default()), |resolver| resolver.aggregate(messages))
    }
}

/// A definition with its template and patterns compiled.
///
/// Shared engine behind the shipped rules.
pub struct CompiledRule {
    definition: RuleDefinition,
    template: Template,
    schema: SchemaValidator,
    bump: Option<BumpResolver>,
    reader: Arc<dyn FileReader>,
}

impl fmt::Debug for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRule")
            .field("definition", &self.definition)
            .field("reader", &self.reader)
            .finish_non_exhaustive()
    }
}

impl CompiledRule {
    /// Validate and compile a definition.
    ///
    /// Fails on an empty template, a malformed template, duplicate question
    /// names, or a pattern that is not a valid regex.
    #[instrument(skip_all)]
    pub fn new(
        definition: RuleDefinition,
        reader: Arc<dyn FileReader>,
    ) -> Result<Self, ConfigurationError> {
        if definition.message_template.trim().is_empty() {
            return Err(ConfigurationError::MissingMessageTemplate);
        }
        let template = Template::parse(&definition.message_template)
            .map_err(ConfigurationError::InvalidTemplate)?;

        let mut seen = HashSet::new();
        for question in &definition.questions {
            if !seen.insert(question.name.as_str()) {
                return Err(ConfigurationError::DuplicateQuestion(question.name.clone()));
            }
        }

        let schema = SchemaValidator::new(definition.schema_pattern.as_deref())?;
        let bump = definition
            .bump_pattern
            .as_deref()
            .map(|pattern| {
                BumpResolver::new(pattern, definition.bump_map.clone().unwrap_or_default())
            })
            .transpose()?;

        debug!(
            questions = definition.questions.len(),
            has_schema = schema.is_configured(),
            has_bump = bump.is_some(),
            "compiled rule"
        );

        Ok(Self {
            definition,
            template,
            schema,
            bump,
            reader,
        })
    }

    /// The definition this rule was compiled from.
    pub const fn definition(&self) -> &RuleDefinition {
        &self.definition
    }

    /// Render the template.
    pub fn message(&self, answers: &Answers) -> RenderResult<String> {
        self.template.render(answers)
    }

    /// Resolve info text through the rule's file reader.
    pub fn info(&self) -> RuleResult<Option<String>> {
        resolve_info(
            self.definition.info(),
            self.definition.info_path(),
            self.reader.as_ref(),
        )
    }

    /// Compiled schema pattern.
    pub const fn schema_validator(&self) -> &SchemaValidator {
        &self.schema
    }

    /// Compiled bump pattern.
    pub const fn bump_resolver(&self) -> Option<&BumpResolver> {
        self.bump.as_ref()
    }
}

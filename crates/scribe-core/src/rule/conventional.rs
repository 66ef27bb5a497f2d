//! Built-in Conventional Commits rule.
//!
//! Header format is `<type>(<scope>)!: <subject>`. A `!` marker (or a
//! `BREAKING CHANGE` header) bumps MAJOR, `feat` bumps MINOR, and
//! `fix` / `refactor` / `perf` bump PATCH.

use std::sync::Arc;

use crate::bump::{BumpMap, BumpResolver};
use crate::error::RuleResult;
use crate::info::FileReader;
use crate::render::{Answers, RenderResult};
use crate::rule::{
    Choice, CompiledRule, QuestionKind, QuestionSpec, RuleDefinition, RuleProvider,
};
use crate::schema::SchemaValidator;
use crate::version::BumpLevel;

/// Registry name of the built-in rule.
pub const NAME: &str = "conventional";

const MESSAGE_TEMPLATE: &str = "{{prefix}}{% if scope %}({{scope}}){% endif %}\
{% if is_breaking_change %}!{% endif %}: {{subject}}\
{% if body %}\n\n{{body}}{% endif %}\
{% if footer %}\n\n{% if is_breaking_change %}BREAKING CHANGE: {% endif %}{{footer}}{% endif %}";

const EXAMPLE: &str = "fix: correct minor typos in code\n\n\
see the issue for details on the typos fixed\n\n\
closes issue #12";

const SCHEMA: &str = "<type>(<scope>): <subject>\n\
<BLANK LINE>\n\
<body>\n\
<BLANK LINE>\n\
(BREAKING CHANGE: )<footer>";

const SCHEMA_PATTERN: &str = r"(?s)^(build|ci|docs|feat|fix|perf|refactor|style|test|chore|revert|bump)(\(\S+\))?!?:( [^\n\r]+)((\n\n.*)|(\s*))?$";

const BUMP_PATTERN: &str = r"^(?:(BREAKING[ -]CHANGE)|\w+(?:\([^)]*\))?(!):|(feat|fix|refactor|perf)(?:\([^)]*\))?:)";

const INFO: &str = "\
The commit contains the following structural elements:

  fix:       patches a bug in your codebase (PATCH in semantic versioning).
  feat:      introduces a new feature (MINOR in semantic versioning).
  type!:     a `!` after the type/scope marks a breaking change (MAJOR).
  BREAKING CHANGE: used as the header line, also marks a breaking change (MAJOR).

Only the header line decides the version bump. A `BREAKING CHANGE:` footer
documents the change but does not raise the bump on its own, so mark
breaking commits with `!` as well.

Other types such as build, chore, ci, docs, style, refactor, perf and test
are allowed; refactor and perf also bump PATCH.

A scope may be added in parentheses after the type, e.g. `feat(parser): ...`.";

fn bump_map() -> BumpMap {
    BumpMap::from([
        ("BREAKING CHANGE".to_string(), BumpLevel::Major),
        ("BREAKING-CHANGE".to_string(), BumpLevel::Major),
        ("!".to_string(), BumpLevel::Major),
        ("feat".to_string(), BumpLevel::Minor),
        ("fix".to_string(), BumpLevel::Patch),
        ("refactor".to_string(), BumpLevel::Patch),
        ("perf".to_string(), BumpLevel::Patch),
    ])
}

fn questions() -> Vec<QuestionSpec> {
    vec![
        QuestionSpec::new(
            QuestionKind::List,
            "prefix",
            "Select the type of change you are committing",
        )
        .with_choices(vec![
            Choice::new("fix", "fix: A bug fix. Correlates with PATCH in SemVer"),
            Choice::new("feat", "feat: A new feature. Correlates with MINOR in SemVer"),
            Choice::new("docs", "docs: Documentation only changes"),
            Choice::new(
                "style",
                "style: Changes that do not affect the meaning of the code (white-space, formatting, etc)",
            ),
            Choice::new(
                "refactor",
                "refactor: A code change that neither fixes a bug nor adds a feature",
            ),
            Choice::new("perf", "perf: A code change that improves performance"),
            Choice::new("test", "test: Adding missing or correcting existing tests"),
            Choice::new(
                "build",
                "build: Changes that affect the build system or external dependencies",
            ),
            Choice::new("ci", "ci: Changes to CI configuration files and scripts"),
        ]),
        QuestionSpec::new(
            QuestionKind::Input,
            "scope",
            "What is the scope of this change? (class or file name): (press [enter] to skip)",
        ),
        QuestionSpec::new(
            QuestionKind::Input,
            "subject",
            "Write a short and imperative summary of the code changes: (lower case and no period)",
        ),
        QuestionSpec::new(
            QuestionKind::Input,
            "body",
            "Provide additional contextual information about the code changes: (press [enter] to skip)",
        ),
        QuestionSpec::new(
            QuestionKind::Confirm,
            "is_breaking_change",
            "Is this a BREAKING CHANGE? Correlates with MAJOR in SemVer",
        )
        .with_default(false),
        QuestionSpec::new(
            QuestionKind::Input,
            "footer",
            "Footer. Information about Breaking Changes and reference issues that this commit closes: (press [enter] to skip)",
        ),
    ]
}

/// The compiled-in definition.
pub fn definition() -> RuleDefinition {
    RuleDefinition::new(MESSAGE_TEMPLATE)
        .with_example(EXAMPLE)
        .with_schema(SCHEMA)
        .with_schema_pattern(SCHEMA_PATTERN)
        .with_bump(BUMP_PATTERN, bump_map())
        .with_info(INFO)
        .with_questions(questions())
}

/// Conventional Commits.
#[derive(Debug)]
pub struct ConventionalRule {
    rule: CompiledRule,
}

impl ConventionalRule {
    /// Build the rule.
    pub fn new(reader: Arc<dyn FileReader>) -> RuleResult<Self> {
        Ok(Self {
            rule: CompiledRule::new(definition(), reader)?,
        })
    }
}

impl RuleProvider for ConventionalRule {
    fn name(&self) -> &str {
        NAME
    }

    fn definition(&self) -> &RuleDefinition {
        self.rule.definition()
    }

    fn message(&self, answers: &Answers) -> RenderResult<String> {
        self.rule.message(answers)
    }

    fn info(&self) -> RuleResult<Option<String>> {
        self.rule.info()
    }

    fn schema_validator(&self) -> &SchemaValidator {
        self.rule.schema_validator()
    }

    fn bump_resolver(&self) -> Option<&BumpResolver> {
        self.rule.bump_resolver()
    }
}

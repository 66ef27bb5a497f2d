//! The configuration-driven rule.
//!
//! Everything comes from the `[customize]` config section: questions,
//! message template, example, schema, schema pattern, bump pattern and map,
//! and info text (inline or from `info_path`).

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::bump::BumpResolver;
use crate::config::Config;
use crate::error::{ConfigurationError, RuleResult};
use crate::info::FileReader;
use crate::render::{Answers, RenderResult};
use crate::rule::{CompiledRule, RuleDefinition, RuleProvider};
use crate::schema::SchemaValidator;

/// Registry name of the configuration-driven rule.
pub const NAME: &str = "customize";

/// A rule defined by the `[customize]` section.
#[derive(Debug)]
pub struct CustomizeRule {
    rule: CompiledRule,
}

impl CustomizeRule {
    /// Build the rule from loaded configuration.
    ///
    /// Fails with [`ConfigurationError::MissingCustomize`] when there is no
    /// `[customize]` section, and [`ConfigurationError::MissingMessageTemplate`]
    /// when the section lacks a non-empty `message_template`.
    #[instrument(skip_all)]
    pub fn from_config(config: &Config, reader: Arc<dyn FileReader>) -> RuleResult<Self> {
        let section = config
            .customize
            .clone()
            .ok_or(ConfigurationError::MissingCustomize)?;
        let definition = RuleDefinition::try_from(section)?;
        debug!(questions = definition.questions().len(), "building customize rule");
        Ok(Self {
            rule: CompiledRule::new(definition, reader)?,
        })
    }
}

impl RuleProvider for CustomizeRule {
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

//! Commit message validation against a rule's `schema_pattern`.

use regex::Regex;
use tracing::{debug, instrument};

use crate::error::{ConfigurationError, RuleResult};

/// A compiled `schema_pattern`.
///
/// An absent pattern means no validation is configured, and every message
/// passes.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    pattern: Option<Regex>,
}

impl SchemaValidator {
    /// Compile a validator from an optional pattern.
    pub fn new(pattern: Option<&str>) -> Result<Self, ConfigurationError> {
        let pattern = pattern
            .map(Regex::new)
            .transpose()
            .map_err(|source| ConfigurationError::InvalidPattern {
                field: "schema_pattern",
                source,
            })?;
        Ok(Self { pattern })
    }

    /// Whether any pattern is configured.
    pub const fn is_configured(&self) -> bool {
        self.pattern.is_some()
    }

    /// Search the message for the pattern.
    pub fn is_valid(&self, message: &str) -> bool {
        self.pattern.as_ref().is_none_or(|re| re.is_match(message))
    }
}

/// Check `message` against `schema_pattern` in one step.
///
/// Performs a search, not an anchored match; put `^`/`$` in the pattern to
/// anchor it.
#[instrument(skip(message))]
pub fn validate(message: &str, schema_pattern: Option<&str>) -> RuleResult<bool> {
    let valid = SchemaValidator::new(schema_pattern)?.is_valid(message);
    debug!(valid, "schema validation");
    Ok(valid)
}

//! Error types for scribe-core

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::bump::BumpConfigurationError;
use crate::render::RenderError;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A rule definition that cannot be turned into a usable rule.
///
/// Raised when a rule is constructed, never lazily.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The configuration has no `[customize]` section at all.
    #[error("no [customize] section found; the customize rule needs a message_template")]
    MissingCustomize,

    /// The `[customize]` section exists but has no usable `message_template`.
    #[error("customize.message_template is missing or empty")]
    MissingMessageTemplate,

    /// The `message_template` does not parse.
    #[error("invalid message_template: {0}")]
    InvalidTemplate(#[source] RenderError),

    /// Two questions share the same `name`.
    #[error("duplicate question name: {0}")]
    DuplicateQuestion(String),

    /// A configured pattern is not a valid regular expression.
    #[error("invalid {field}: {source}")]
    InvalidPattern {
        /// Which key held the pattern (e.g., `"bump_pattern"`).
        field: &'static str,
        /// The regex compile error.
        #[source]
        source: regex::Error,
    },
}

/// Errors surfaced by rule providers.
#[derive(Error, Debug)]
pub enum RuleError {
    /// The rule definition is unusable.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Rendering the commit message failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The bump pattern matched an alternative the bump map does not cover.
    #[error(transparent)]
    Bump(#[from] BumpConfigurationError),

    /// Reading `info_path` failed.
    #[error("failed to read {path}: {source}")]
    Resource {
        /// The path that could not be read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No rule with this name is registered.
    #[error("unknown rule: {name} (available: {available})")]
    UnknownRule {
        /// The requested rule name.
        name: String,
        /// Comma-separated list of registered names.
        available: String,
    },
}

/// Result alias for rule operations.
pub type RuleResult<T> = Result<T, RuleError>;

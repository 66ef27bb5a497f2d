//! Core library for scribe.
//!
//! This crate provides the commit-rule engine used by the `scribe` CLI and
//! any downstream consumers.
//!
//! # Modules
//!
//! - [`bump`] - Mapping commit messages to version bump severities
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`git`] - Git operations for committing and reading history
//! - [`info`] - Rule guidance text, inline or from a file
//! - [`registry`] - Rule lookup by name
//! - [`render`] - Commit message templates
//! - [`rule`] - The rule contract and shipped rules
//! - [`schema`] - Commit message validation
//! - [`version`] - Semantic version arithmetic
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use scribe_core::{ConfigLoader, FsReader, RuleContext, RuleRegistry};
//!
//! let config = ConfigLoader::new()
//!     .with_user_config(true)
//!     .load()
//!     .expect("Failed to load configuration");
//!
//! let ctx = RuleContext::new(&config, Arc::new(FsReader::new(".")));
//! let rule = RuleRegistry::builtin()
//!     .build_configured(&ctx)
//!     .expect("rule should build");
//! assert!(rule.validate("feat: add pagination"));
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod config;

pub mod error;

pub mod git;

pub mod info;

pub mod registry;

pub mod render;

pub mod rule;

pub mod schema;

pub mod version;

pub use bump::{BumpDecision, BumpSeverity};
pub use config::{Config, ConfigLoader, LoadedConfig, LogLevel};
pub use error::{ConfigError, ConfigResult, ConfigurationError, RuleError, RuleResult};
pub use info::{FileReader, FsReader};
pub use registry::{RuleContext, RuleRegistry};
pub use render::{AnswerValue, Answers};
pub use rule::{QuestionKind, QuestionSpec, RuleDefinition, RuleProvider};

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;

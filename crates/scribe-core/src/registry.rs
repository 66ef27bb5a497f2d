//! Name-to-constructor lookup for commit rules.
//!
//! The registry is an explicit value built once at startup and then only
//! read. Rules are constructed on demand from a [`RuleContext`].

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::{RuleError, RuleResult};
use crate::info::FileReader;
use crate::rule::conventional::{self, ConventionalRule};
use crate::rule::customize::{self, CustomizeRule};
use crate::rule::RuleProvider;

/// What a rule constructor gets to work with.
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    /// Loaded configuration.
    pub config: &'a Config,
    /// Reader for files referenced by the rule (such as `info_path`).
    pub reader: Arc<dyn FileReader>,
}

impl<'a> RuleContext<'a> {
    /// Create a context.
    pub fn new(config: &'a Config, reader: Arc<dyn FileReader>) -> Self {
        Self { config, reader }
    }
}

/// Builds a rule from context.
pub type RuleConstructor = fn(&RuleContext<'_>) -> RuleResult<Box<dyn RuleProvider>>;

/// Immutable mapping from rule name to constructor.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: BTreeMap<String, RuleConstructor>,
}

fn build_conventional(ctx: &RuleContext<'_>) -> RuleResult<Box<dyn RuleProvider>> {
    Ok(Box::new(ConventionalRule::new(Arc::clone(&ctx.reader))?))
}

fn build_customize(ctx: &RuleContext<'_>) -> RuleResult<Box<dyn RuleProvider>> {
    Ok(Box::new(CustomizeRule::from_config(
        ctx.config,
        Arc::clone(&ctx.reader),
    )?))
}

impl RuleRegistry {
    /// An empty registry.
    pub const fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// The shipped rules: `conventional` and `customize`.
    pub fn builtin() -> Self {
        Self::empty()
            .with_rule(conventional::NAME, build_conventional)
            .with_rule(customize::NAME, build_customize)
    }

    /// Register (or replace) a rule under `name`.
    #[must_use]
    pub fn with_rule(mut self, name: impl Into<String>, constructor: RuleConstructor) -> Self {
        self.rules.insert(name.into(), constructor);
        self
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Construct the rule registered under `name`.
    #[instrument(skip(self, ctx))]
    pub fn build(&self, name: &str, ctx: &RuleContext<'_>) -> RuleResult<Box<dyn RuleProvider>> {
        let constructor = self.rules.get(name).ok_or_else(|| RuleError::UnknownRule {
            name: name.to_string(),
            available: self.names().join(", "),
        })?;
        debug!(rule = name, "constructing rule");
        constructor(ctx)
    }

    /// Construct the rule the configuration selects.
    pub fn build_configured(&self, ctx: &RuleContext<'_>) -> RuleResult<Box<dyn RuleProvider>> {
        self.build(ctx.config.rule_name(), ctx)
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

//! Bump severity resolution.
//!
//! A rule's `bump_pattern` is matched against the first line of each commit
//! message. The text captured by the alternative that matched is looked up
//! in `bump_map` to get a severity; across many commits the highest severity
//! wins.
//!
//! # Matching
//!
//! The key is the text of the first capture group that participated in the
//! match (the whole match when the pattern has no groups). Alternation is
//! leftmost-first, so `^(fix|fixup)` resolves `fixup: …` through `fix`.
//! A matched alternative without a `bump_map` entry is an error, not a
//! silent no-bump.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::error::{ConfigurationError, RuleResult};
use crate::version::BumpLevel;

/// Mapping from captured alternative text to a bump level.
pub type BumpMap = BTreeMap<String, BumpLevel>;

/// The bump implied by a commit, ordered `None < Patch < Minor < Major`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum BumpSeverity {
    /// No release-worthy change.
    #[default]
    None,
    /// Patch release (x.y.Z).
    Patch,
    /// Minor release (x.Y.0).
    Minor,
    /// Major release (X.0.0).
    Major,
}

impl BumpSeverity {
    /// The bump level to apply, or `None` when nothing should be released.
    pub const fn level(self) -> Option<BumpLevel> {
        match self {
            Self::None => None,
            Self::Patch => Some(BumpLevel::Patch),
            Self::Minor => Some(BumpLevel::Minor),
            Self::Major => Some(BumpLevel::Major),
        }
    }
}

impl From<BumpLevel> for BumpSeverity {
    fn from(level: BumpLevel) -> Self {
        match level {
            BumpLevel::Patch => Self::Patch,
            BumpLevel::Minor => Self::Minor,
            BumpLevel::Major => Self::Major,
        }
    }
}

impl fmt::Display for BumpSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level() {
            Some(level) => write!(f, "{level}"),
            None => f.write_str("none"),
        }
    }
}

/// The bump pattern matched text that the bump map does not cover.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BumpConfigurationError {
    /// Captured alternative has no `bump_map` entry.
    #[error("bump_pattern matched `{alternative}`, which has no entry in bump_map")]
    UnmappedAlternative {
        /// The captured text.
        alternative: String,
    },
}

/// Result alias for bump resolution.
pub type BumpResult<T> = Result<T, BumpConfigurationError>;

/// The commit that decided an aggregate bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpTrigger {
    /// Position of the commit in the input sequence.
    pub index: usize,
    /// The full commit message.
    pub message: String,
}

/// Outcome of aggregating many commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BumpDecision {
    /// Highest severity across all commits.
    pub severity: BumpSeverity,
    /// First commit, in input order, that reached `severity`.
    ///
    /// `None` when no commit implied a bump.
    pub trigger: Option<BumpTrigger>,
}

/// A compiled `bump_pattern` + `bump_map` pair.
#[derive(Debug, Clone)]
pub struct BumpResolver {
    pattern: Regex,
    map: BumpMap,
}

impl BumpResolver {
    /// Compile the pattern.
    ///
    /// Coverage of the pattern's alternatives by `map` is checked per
    /// commit in [`resolve`](Self::resolve).
    pub fn new(pattern: &str, map: BumpMap) -> Result<Self, ConfigurationError> {
        let pattern = Regex::new(pattern).map_err(|source| ConfigurationError::InvalidPattern {
            field: "bump_pattern",
            source,
        })?;
        Ok(Self { pattern, map })
    }

    /// Severity implied by a single commit message.
    pub fn resolve(&self, message: &str) -> BumpResult<BumpSeverity> {
        let first_line = message.lines().next().unwrap_or_default();
        let Some(caps) = self.pattern.captures(first_line) else {
            trace!(first_line, "no bump pattern match");
            return Ok(BumpSeverity::None);
        };

        let alternative = caps
            .iter()
            .skip(1)
            .flatten()
            .next()
            .or_else(|| caps.get(0))
            .map_or("", |m| m.as_str());

        self.map
            .get(alternative)
            .map(|level| BumpSeverity::from(*level))
            .ok_or_else(|| BumpConfigurationError::UnmappedAlternative {
                alternative: alternative.to_string(),
            })
    }

    /// Highest severity across `messages`, with the commit that set it.
    #[instrument(skip_all)]
    pub fn aggregate<I, S>(&self, messages: I) -> BumpResult<BumpDecision>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut decision = BumpDecision::default();
        let mut count = 0usize;

        for (index, message) in messages.into_iter().enumerate() {
            let message = message.as_ref();
            let severity = self.resolve(message)?;
            count += 1;
            if severity > decision.severity {
                debug!(index, %severity, "bump severity raised");
                decision = BumpDecision {
                    severity,
                    trigger: Some(BumpTrigger {
                        index,
                        message: message.to_string(),
                    }),
                };
            }
        }

        debug!(count, severity = %decision.severity, "aggregated commits");
        Ok(decision)
    }
}

/// Resolve one message against a pattern and map.
pub fn resolve(message: &str, bump_pattern: &str, bump_map: &BumpMap) -> RuleResult<BumpSeverity> {
    let resolver = BumpResolver::new(bump_pattern, bump_map.clone())?;
    Ok(resolver.resolve(message)?)
}

/// Aggregate many messages against a pattern and map.
pub fn aggregate<I, S>(messages: I, bump_pattern: &str, bump_map: &BumpMap) -> RuleResult<BumpDecision>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let resolver = BumpResolver::new(bump_pattern, bump_map.clone())?;
    Ok(resolver.aggregate(messages)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;

    const PATTERN: &str = "^(break|new|fix|hotfix)";

    fn map() -> BumpMap {
        BumpMap::from([
            ("break".to_string(), BumpLevel::Major),
            ("new".to_string(), BumpLevel::Minor),
            ("fix".to_string(), BumpLevel::Patch),
            ("hotfix".to_string(), BumpLevel::Patch),
        ])
    }

    fn resolver() -> BumpResolver {
        BumpResolver::new(PATTERN, map()).unwrap()
    }

    #[test]
    fn severity_total_order() {
        assert!(BumpSeverity::None < BumpSeverity::Patch);
        assert!(BumpSeverity::Patch < BumpSeverity::Minor);
        assert!(BumpSeverity::Minor < BumpSeverity::Major);
    }

    #[test]
    fn resolves_mapped_prefix() {
        assert_eq!(resolve("new: add widget", PATTERN, &map()).unwrap(), BumpSeverity::Minor);
        assert_eq!(resolver().resolve("break: drop v1 api").unwrap(), BumpSeverity::Major);
        assert_eq!(resolver().resolve("hotfix: crash").unwrap(), BumpSeverity::Patch);
    }

    #[test]
    fn unmatched_message_is_none() {
        assert_eq!(resolve("docs: typo", PATTERN, &map()).unwrap(), BumpSeverity::None);
        assert_eq!(resolver().resolve("").unwrap(), BumpSeverity::None);
    }

    #[test]
    fn only_first_line_is_matched() {
        let msg = "docs: typo\n\nbreak: this line is body text";
        assert_eq!(resolver().resolve(msg).unwrap(), BumpSeverity::None);
    }

    #[test]
    fn unmapped_alternative_is_error() {
        let mut partial = map();
        partial.remove("hotfix");
        let err = resolve("hotfix: crash", PATTERN, &partial).unwrap_err();
        assert!(matches!(
            err,
            RuleError::Bump(BumpConfigurationError::UnmappedAlternative { ref alternative })
                if alternative == "hotfix"
        ));
    }

    #[test]
    fn leftmost_alternative_wins() {
        let map = BumpMap::from([("fix".to_string(), BumpLevel::Patch)]);
        let resolver = BumpResolver::new("^(fix|fixup)", map).unwrap();
        assert_eq!(resolver.resolve("fixup: squash").unwrap(), BumpSeverity::Patch);
    }

    #[test]
    fn first_participating_group_is_the_key() {
        let map = BumpMap::from([
            ("!".to_string(), BumpLevel::Major),
            ("feat".to_string(), BumpLevel::Minor),
        ]);
        let resolver = BumpResolver::new(r"^(?:\w+(!):|(feat):)", map).unwrap();
        assert_eq!(resolver.resolve("fix!: x").unwrap(), BumpSeverity::Major);
        assert_eq!(resolver.resolve("feat: x").unwrap(), BumpSeverity::Minor);
    }

    #[test]
    fn pattern_without_groups_uses_whole_match() {
        let map = BumpMap::from([("release".to_string(), BumpLevel::Minor)]);
        let resolver = BumpResolver::new("^release", map).unwrap();
        assert_eq!(resolver.resolve("release it").unwrap(), BumpSeverity::Minor);
    }

    #[test]
    fn invalid_pattern_is_configuration_error() {
        let err = BumpResolver::new("^(break", map()).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::InvalidPattern {
                field: "bump_pattern",
                ..
            }
        ));
    }

    #[test]
    fn aggregate_empty_is_none() {
        let decision = aggregate(Vec::<String>::new(), PATTERN, &map()).unwrap();
        assert_eq!(decision.severity, BumpSeverity::None);
        assert!(decision.trigger.is_none());
    }

    #[test]
    fn aggregate_takes_max_regardless_of_order() {
        let forward = aggregate(["break: x", "fix: y"], PATTERN, &map()).unwrap();
        let backward = aggregate(["fix: y", "break: x"], PATTERN, &map()).unwrap();
        assert_eq!(forward.severity, BumpSeverity::Major);
        assert_eq!(backward.severity, BumpSeverity::Major);
    }

    #[test]
    fn aggregate_reports_first_commit_at_max() {
        let decision = resolver()
            .aggregate(["docs: a", "fix: b", "new: c", "new: d", "fix: e"])
            .unwrap();
        assert_eq!(decision.severity, BumpSeverity::Minor);
        assert_eq!(
            decision.trigger,
            Some(BumpTrigger {
                index: 2,
                message: "new: c".into()
            })
        );
    }

    #[test]
    fn aggregate_of_unmatched_commits_has_no_trigger() {
        let decision = resolver().aggregate(["docs: a", "chore: b"]).unwrap();
        assert_eq!(decision, BumpDecision::default());
    }

    #[test]
    fn aggregate_surfaces_first_error() {
        let map = BumpMap::from([("fix".to_string(), BumpLevel::Patch)]);
        let resolver = BumpResolver::new(PATTERN, map).unwrap();
        let err = resolver.aggregate(["fix: a", "new: b"]).unwrap_err();
        assert_eq!(
            err,
            BumpConfigurationError::UnmappedAlternative {
                alternative: "new".into()
            }
        );
    }

    #[test]
    fn severity_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&BumpSeverity::Major).unwrap(), "\"MAJOR\"");
        assert_eq!(BumpSeverity::Minor.to_string(), "minor");
        assert_eq!(BumpSeverity::None.to_string(), "none");
    }
}

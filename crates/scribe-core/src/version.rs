//! Semantic version arithmetic.
//!
//! Turns an aggregated [`BumpSeverity`] into the next version number.
//! Deciding *whether* to release is left to the caller.

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bump::BumpSeverity;

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    /// Failed to parse a semver string.
    #[error("invalid semver: {0}")]
    InvalidSemver(#[from] semver::Error),
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Semver bump level, as written in a rule's `bump_map`.
///
/// Config files use `MAJOR` / `MINOR` / `PATCH`; lowercase is accepted too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BumpLevel {
    /// Patch release (x.y.Z).
    #[serde(alias = "patch")]
    Patch,
    /// Minor release (x.Y.0).
    #[serde(alias = "minor")]
    Minor,
    /// Major release (X.0.0).
    #[serde(alias = "major")]
    Major,
}

impl std::fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// Compute the next version by applying a bump level.
pub const fn next_version(current: &Version, level: BumpLevel) -> Version {
    match level {
        BumpLevel::Patch => Version::new(current.major, current.minor, current.patch + 1),
        BumpLevel::Minor => Version::new(current.major, current.minor + 1, 0),
        BumpLevel::Major => Version::new(current.major + 1, 0, 0),
    }
}

/// Apply an aggregated severity.
///
/// Returns `None` for [`BumpSeverity::None`]: there is nothing to release.
pub fn apply_severity(current: &Version, severity: BumpSeverity) -> Option<Version> {
    severity.level().map(|level| next_version(current, level))
}

/// Parse a version string, stripping an optional `v` prefix.
pub fn parse_version(s: &str) -> VersionResult<Version> {
    let s = s.strip_prefix('v').unwrap_or(s);
    Ok(Version::parse(s)?)
}

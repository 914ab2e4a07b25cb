//! Semantic version parsing, bumping and comparison.
//!
//! This module provides the canonical version type read from the VERSION
//! file and the bump directive that drives a release.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Type of version bump requested for a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    /// Patch version bump (0.0.X).
    Patch,
    /// Minor version bump (0.X.0).
    Minor,
    /// Major version bump (X.0.0).
    Major,
}

impl BumpType {
    /// Parse a bump type from a string, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `major`, `minor` or `patch`.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            _ => Err(Error::InvalidBumpType {
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for BumpType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// A semantic version following the `SemVer` 2.0.0 specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major version number.
    pub major: u64,
    /// Minor version number.
    pub minor: u64,
    /// Patch version number.
    pub patch: u64,
    /// Pre-release identifier (e.g., "alpha", "beta.1").
    pub prerelease: Option<String>,
    /// Build metadata (e.g., "20230101", "commit.abc123").
    pub build: Option<String>,
}

impl Version {
    /// Create a new version.
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Create a version with a pre-release identifier.
    #[must_use]
    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        self.prerelease = Some(prerelease.into());
        self
    }

    /// Create a version with build metadata.
    #[must_use]
    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }

    /// Apply a bump type to this version.
    ///
    /// Lower components are reset and pre-release/build metadata dropped.
    #[must_use]
    pub const fn bump(&self, bump_type: BumpType) -> Self {
        match bump_type {
            BumpType::Major => Self::new(self.major + 1, 0, 0),
            BumpType::Minor => Self::new(self.major, self.minor + 1, 0),
            BumpType::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }

    /// Check if this is a pre-release version.
    #[must_use]
    pub const fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        // Remove leading 'v' if present
        let s = s.strip_prefix('v').unwrap_or(s);

        // Split off build metadata
        let (version_pre, build) = match s.split_once('+') {
            Some((v, b)) => (v, Some(b.to_string())),
            None => (s, None),
        };

        // Split off prerelease
        let (version, prerelease) = match version_pre.split_once('-') {
            Some((v, p)) => (v, Some(p.to_string())),
            None => (version_pre, None),
        };

        if prerelease.as_deref() == Some("") || build.as_deref() == Some("") {
            return Err(Error::invalid_version(s));
        }

        let parts: Vec<&str> = version.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(Error::invalid_version(format!(
                "{s} (expected MAJOR.MINOR.PATCH)"
            )));
        };

        let major = major
            .parse()
            .map_err(|_| Error::invalid_version(format!("Invalid major version: {major}")))?;
        let minor = minor
            .parse()
            .map_err(|_| Error::invalid_version(format!("Invalid minor version: {minor}")))?;
        let patch = patch
            .parse()
            .map_err(|_| Error::invalid_version(format!("Invalid patch version: {patch}")))?;

        Ok(Self {
            major,
            minor,
            patch,
            prerelease,
            build,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(ref pre) = self.prerelease {
            write!(f, "-{pre}")?;
        }
        if let Some(ref build) = self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            // Pre-release versions have lower precedence; build metadata is ignored
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

/// Compare two version strings.
///
/// # Errors
///
/// Returns an error naming whichever side failed to parse.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering> {
    let va: Version = a
        .parse()
        .map_err(|_| Error::invalid_version(format!("parsing version a {a:?}")))?;
    let vb: Version = b
        .parse()
        .map_err(|_| Error::invalid_version(format!("parsing version b {b:?}")))?;
    Ok(va.cmp(&vb))
}

/// Returns true if version `a` is strictly greater than version `b`.
///
/// # Errors
///
/// Returns an error if either string is not a valid version.
pub fn is_greater(a: &str, b: &str) -> Result<bool> {
    Ok(compare_versions(a, b)? == Ordering::Greater)
}

//! Guard against rewriting a file whose version has drifted.
//!
//! A target value is expected to contain the current release version. When it
//! holds some other version instead, the file was missed by an earlier release
//! and blindly overwriting it would hide the problem.

use super::embedded::find_embedded_version;
use super::locate::LocatedValue;
use crate::error::{Error, Result};
use std::path::Path;

/// The current and next version as they appear in a target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPair<'a> {
    /// Literal prepended to both versions (commonly `v` or empty).
    pub prefix: &'a str,
    /// Version being released from.
    pub current: &'a str,
    /// Version being released to.
    pub new: &'a str,
}

impl VersionPair<'_> {
    /// `prefix + current`.
    #[must_use]
    pub fn expected_old(&self) -> String {
        format!("{}{}", self.prefix, self.current)
    }

    /// `prefix + new`.
    #[must_use]
    pub fn expected_new(&self) -> String {
        format!("{}{}", self.prefix, self.new)
    }
}

/// How a located value is turned into its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The old version was found inside the value and only that span changes.
    Embedded,
    /// The value carries no version and is replaced outright.
    WholeValue,
}

/// The value text before and after the update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Which path produced the new value.
    pub strategy: Strategy,
    /// The value as it appears in the file today.
    pub old_value: String,
    /// The value to write.
    pub new_value: String,
}

impl Replacement {
    /// True when the update leaves the value untouched.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.old_value == self.new_value
    }
}

/// Decide what the located value becomes.
///
/// `file` and `address` are only used to describe a [`Error::VersionMismatch`].
///
/// # Errors
///
/// Returns [`Error::VersionMismatch`] when the value embeds a version other
/// than `pair.expected_old()`.
pub fn plan_replacement(
    located: &LocatedValue,
    pair: &VersionPair<'_>,
    file: &Path,
    address: &str,
) -> Result<Replacement> {
    let expected = pair.expected_old();
    let value = &located.value;

    if value.contains(&expected) {
        return Ok(Replacement {
            strategy: Strategy::Embedded,
            old_value: value.clone(),
            new_value: value.replacen(&expected, &pair.expected_new(), 1),
        });
    }

    if let Some(found) = find_embedded_version(value, pair.prefix) {
        return Err(Error::VersionMismatch {
            file: file.to_path_buf(),
            path: address.to_string(),
            expected,
            found,
            value: value.clone(),
        });
    }

    Ok(Replacement {
        strategy: Strategy::WholeValue,
        old_value: value.clone(),
        new_value: pair.expected_new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(value: &str) -> LocatedValue {
        LocatedValue {
            value: value.to_string(),
            key: "image".to_string(),
            numeric: false,
        }
    }

    const PAIR: VersionPair<'static> = VersionPair {
        prefix: "v",
        current: "1.0.0",
        new: "1.1.0",
    };

    #[test]
    fn test_expected_strings() {
        assert_eq!(PAIR.expected_old(), "v1.0.0");
        assert_eq!(PAIR.expected_new(), "v1.1.0");
    }

    #[test]
    fn test_embedded_replacement_preserves_rest() {
        let plan = plan_replacement(
            &located("registry.io/app:v1.0.0"),
            &PAIR,
            Path::new("values.yaml"),
            "image",
        )
        .unwrap();
        assert_eq!(plan.strategy, Strategy::Embedded);
        assert_eq!(plan.new_value, "registry.io/app:v1.1.0");
    }

    #[test]
    fn test_embedded_replaces_first_occurrence_only() {
        let plan = plan_replacement(
            &located("v1.0.0/app:v1.0.0"),
            &PAIR,
            Path::new("values.yaml"),
            "image",
        )
        .unwrap();
        assert_eq!(plan.new_value, "v1.1.0/app:v1.0.0");
    }

    #[test]
    fn test_drift_detected() {
        let err = plan_replacement(
            &located("registry.io/app:v0.9.0"),
            &PAIR,
            Path::new("deploy/values.yaml"),
            "spec.image",
        )
        .unwrap_err();
        match err {
            Error::VersionMismatch {
                file,
                path,
                expected,
                found,
                value,
            } => {
                assert_eq!(file, Path::new("deploy/values.yaml"));
                assert_eq!(path, "spec.image");
                assert_eq!(expected, "v1.0.0");
                assert_eq!(found, "v0.9.0");
                assert_eq!(value, "registry.io/app:v0.9.0");
            }
            other => panic!("expected VersionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_value_with_other_version_is_drift() {
        let pair = VersionPair {
            prefix: "",
            current: "1.0.0",
            new: "1.1.0",
        };
        let err = plan_replacement(&located("0.9.0"), &pair, Path::new("Chart.yaml"), "version")
            .unwrap_err();
        assert!(matches!(err, Error::VersionMismatch { .. }));
    }

    #[test]
    fn test_whole_value_replacement() {
        let plan = plan_replacement(
            &located("latest"),
            &PAIR,
            Path::new("values.yaml"),
            "image.tag",
        )
        .unwrap();
        assert_eq!(plan.strategy, Strategy::WholeValue);
        assert_eq!(plan.old_value, "latest");
        assert_eq!(plan.new_value, "v1.1.0");
    }

    #[test]
    fn test_equal_versions_are_noop() {
        let pair = VersionPair {
            prefix: "",
            current: "1.0.0",
            new: "1.0.0",
        };
        let plan =
            plan_replacement(&located("app:1.0.0"), &pair, Path::new("x.yaml"), "image").unwrap();
        assert!(plan.is_noop());
    }
}

//! Surgical version updates in YAML files.
//!
//! An update runs in four stages:
//!
//! 1. [`path::parse`] turns a dot/bracket address into steps.
//! 2. [`locate::locate`] walks the parsed document to the scalar at that address.
//! 3. [`drift::plan_replacement`] decides the new value, refusing to touch a
//!    file whose embedded version is not the current one.
//! 4. [`rewrite::rewrite_where`] swaps the value in the raw text.
//!
//! Only the fourth stage touches the text, and it changes nothing but the
//! value itself. Every candidate edit is parsed again and accepted only when
//! the requested address now holds the new value.

pub mod drift;
pub mod embedded;
pub mod locate;
pub mod path;
pub mod rewrite;

pub use drift::{Replacement, Strategy, VersionPair, plan_replacement};
pub use embedded::find_embedded_version;
pub use locate::{LocatedValue, locate};
pub use path::{PathStep, ResolvedPath, parse};
pub use rewrite::{
    FALLBACK_RULE, REPLACEMENT_RULES, ReplacementRule, plain_values, rewrite, rewrite_where,
};

use crate::error::{Error, Result};
use crate::target::VersionFileTarget;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Compute the updated text of a YAML document without touching the disk.
///
/// `target.file` is only used for error context. When `current == new` the
/// content is returned unchanged once the address has been resolved.
///
/// # Errors
///
/// Returns any error from parsing the address or document, locating the
/// value, drift validation, or the rewrite.
pub fn update_yaml_content(
    content: &str,
    target: &VersionFileTarget,
    current: &str,
    new: &str,
) -> Result<String> {
    let path = parse(&target.path)?;
    let document: Value = serde_yaml::from_str(content).map_err(|source| Error::YamlParse {
        file: Some(target.file.clone()),
        source,
    })?;
    let located = locate(&document, &path).map_err(|e| e.in_file(&target.file))?;

    if current == new {
        debug!(file = %target.file.display(), path = %target.path, "Version unchanged");
        return Ok(content.to_string());
    }

    let pair = VersionPair {
        prefix: &target.prefix,
        current,
        new,
    };
    let mut outcome = replace_located(content, &path, &located, &pair, target);
    if located.numeric && outcome.is_err() {
        for spelling in source_spellings(content, &located) {
            let respelled = LocatedValue {
                value: spelling,
                ..located.clone()
            };
            outcome = replace_located(content, &path, &respelled, &pair, target);
            if outcome.is_ok() {
                break;
            }
        }
    }
    outcome
}

fn replace_located(
    content: &str,
    path: &ResolvedPath,
    located: &LocatedValue,
    pair: &VersionPair<'_>,
    target: &VersionFileTarget,
) -> Result<String> {
    let plan = plan_replacement(located, pair, &target.file, &target.path)?;
    debug!(
        file = %target.file.display(),
        path = %target.path,
        strategy = ?plan.strategy,
        old = %plan.old_value,
        new = %plan.new_value,
        "Planned replacement"
    );

    if plan.is_noop() {
        return Ok(content.to_string());
    }

    rewrite_where(
        content,
        &located.key,
        &plan.old_value,
        &plan.new_value,
        |candidate| holds_value(candidate, path, &plan.new_value),
    )
}

/// Source spellings of a numeric value, such as `1.10` for the number the
/// parser renders as `1.1`.
fn source_spellings(content: &str, located: &LocatedValue) -> Vec<String> {
    let mut spellings: Vec<String> = Vec::new();
    for text in plain_values(content, &located.key) {
        let same_number = matches!(
            serde_yaml::from_str::<Value>(text),
            Ok(Value::Number(n)) if n.to_string() == located.value
        );
        if same_number && text != located.value && !spellings.iter().any(|s| s == text) {
            spellings.push(text.to_string());
        }
    }
    spellings
}

/// True when `candidate` parses and `path` resolves to exactly `expected`.
fn holds_value(candidate: &str, path: &ResolvedPath, expected: &str) -> bool {
    serde_yaml::from_str::<Value>(candidate)
        .ok()
        .and_then(|document| locate(&document, path).ok())
        .is_some_and(|found| found.value == expected)
}

/// Update one target file in place.
///
/// The file is read fully and written back only when the update succeeds and
/// changes something. Writing reuses the existing file, so its permissions
/// are kept.
///
/// # Errors
///
/// Returns [`Error::Io`] on read/write failure and any error from
/// [`update_yaml_content`].
pub fn update_yaml_file(target: &VersionFileTarget, current: &str, new: &str) -> Result<()> {
    let content =
        fs::read_to_string(&target.file).map_err(|e| Error::io(target.file.clone(), e))?;
    let updated = update_yaml_content(&content, target, current, new)?;

    if updated == content {
        debug!(file = %target.file.display(), "No changes to write");
        return Ok(());
    }

    fs::write(&target.file, updated).map_err(|e| Error::io(target.file.clone(), e))?;
    info!(
        file = %target.file.display(),
        path = %target.path,
        version = %new,
        "Updated version value"
    );
    Ok(())
}

/// Update the value at `dot_path` in `file` from `prefix + current` to
/// `prefix + new`.
///
/// # Errors
///
/// See [`update_yaml_file`].
pub fn update_version_value(
    file: &Path,
    dot_path: &str,
    prefix: &str,
    current: &str,
    new: &str,
) -> Result<()> {
    let target = VersionFileTarget::new(file, dot_path).with_prefix(prefix);
    update_yaml_file(&target, current, new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn target(path: &str, prefix: &str) -> VersionFileTarget {
        VersionFileTarget::new("values.yaml", path).with_prefix(prefix)
    }

    #[test]
    fn test_update_content_embedded() {
        let content = "image: registry.io/app:v1.0.0 # pinned\n";
        let out = update_yaml_content(content, &target("image", "v"), "1.0.0", "1.1.0").unwrap();
        assert_eq!(out, "image: registry.io/app:v1.1.0 # pinned\n");
    }

    #[test]
    fn test_update_content_whole_value() {
        let content = "image:\n  tag: \"latest\"\n";
        let out = update_yaml_content(content, &target("image.tag", ""), "1.0.0", "1.1.0").unwrap();
        assert_eq!(out, "image:\n  tag: \"1.1.0\"\n");
    }

    #[test]
    fn test_update_content_same_version_is_identity() {
        let content = "image:\n  tag: latest\n";
        let out = update_yaml_content(content, &target("image.tag", ""), "1.0.0", "1.0.0").unwrap();
        assert_eq!(out, content);
    }

    #[test]
    fn test_update_content_bad_path_reported_first() {
        let err = update_yaml_content("a: 1\n", &target(".a", ""), "1.0.0", "1.0.0").unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn test_update_content_missing_key_names_file() {
        let err =
            update_yaml_content("a: 1\n", &target("b", ""), "1.0.0", "1.1.0").unwrap_err();
        match err {
            Error::KeyNotFound { key, file, .. } => {
                assert_eq!(key, "b");
                assert_eq!(file, Some(PathBuf::from("values.yaml")));
            }
            other => panic!("expected KeyNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_update_content_invalid_yaml() {
        let err = update_yaml_content("a: [1, 2\n", &target("a", ""), "1.0.0", "1.1.0")
            .unwrap_err();
        assert!(matches!(err, Error::YamlParse { file: Some(_), .. }));
    }

    #[test]
    fn test_update_content_drift() {
        let content = "image: registry.io/app:v0.9.0\n";
        let err = update_yaml_content(content, &target("image", "v"), "1.0.0", "1.1.0")
            .unwrap_err();
        assert!(matches!(err, Error::VersionMismatch { .. }));
    }

    #[test]
    fn test_update_content_keeps_number_spelling() {
        let appversion = target("appVersion", "");
        let out = update_yaml_content("appVersion: 1.10\n", &appversion, "1.10.0", "2.0.0").unwrap();
        assert_eq!(out, "appVersion: 2.0.0\n");

        let out =
            update_yaml_content("tag: 0x10 # hex\n", &target("tag", ""), "1.0.0", "2.0.0").unwrap();
        assert_eq!(out, "tag: 2.0.0 # hex\n");
    }

    #[test]
    fn test_update_content_targets_requested_parent() {
        let content = "a:\n  tag: latest\nb:\n  tag: latest\n";
        let out = update_yaml_content(content, &target("b.tag", ""), "1.0.0", "2.0.0").unwrap();
        assert_eq!(out, "a:\n  tag: latest\nb:\n  tag: 2.0.0\n");
    }

    #[test]
    fn test_update_content_number_spelled_differently_elsewhere() {
        let content = "a:\n  tag: 1.10\nb:\n  tag: 1.1\n";
        let out = update_yaml_content(content, &target("a.tag", ""), "1.0.0", "2.0.0").unwrap();
        assert_eq!(out, "a:\n  tag: 2.0.0\nb:\n  tag: 1.1\n");
    }

    #[test]
    fn test_holds_value() {
        let path = parse("b.tag").unwrap();
        assert!(holds_value("a:\n  tag: x\nb:\n  tag: y\n", &path, "y"));
        assert!(!holds_value("a:\n  tag: y\nb:\n  tag: x\n", &path, "y"));
        assert!(!holds_value("b: [\n", &path, "y"));
    }
}

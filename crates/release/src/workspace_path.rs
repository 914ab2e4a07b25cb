//! Containment checks for user-supplied file paths.
//!
//! Target files come from workflow configuration, so every one is checked to
//! resolve inside the repository checkout before it is read or written.
//! Resolution is lexical; symlinks are not followed.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Resolve `user_path` against `base` and ensure it stays inside `base`.
///
/// An empty `base` means the current working directory. Returns the absolute,
/// normalized path.
///
/// # Errors
///
/// Returns [`Error::PathGuard`] if the path is empty, climbs out through
/// `..`, or is an absolute path outside `base`.
pub fn validate_path(base: &Path, user_path: &str) -> Result<PathBuf> {
    if user_path.is_empty() {
        return Err(Error::path_guard("path cannot be empty", user_path));
    }

    let abs_base = absolute_base(base)?;
    let cleaned = normalize(Path::new(user_path));

    if matches!(cleaned.components().next(), Some(Component::ParentDir)) {
        return Err(Error::path_guard(
            format!("path traversal detected in {user_path:?}"),
            user_path,
        ));
    }

    let full = if cleaned.is_absolute() {
        cleaned
    } else {
        normalize(&abs_base.join(cleaned))
    };

    if !full.starts_with(&abs_base) {
        return Err(Error::path_guard(
            format!("path {user_path:?} resolves outside allowed directory"),
            user_path,
        ));
    }

    Ok(full)
}

/// Like [`validate_path`] but returns the path relative to `base`.
///
/// # Errors
///
/// See [`validate_path`].
pub fn validate_path_relative(base: &Path, user_path: &str) -> Result<PathBuf> {
    let full = validate_path(base, user_path)?;
    let abs_base = absolute_base(base)?;
    let relative = full
        .strip_prefix(&abs_base)
        .map(Path::to_path_buf)
        .map_err(|_| {
            Error::path_guard(
                format!("path {user_path:?} resolves outside allowed directory"),
                user_path,
            )
        })?;

    if relative.as_os_str().is_empty() {
        Ok(PathBuf::from("."))
    } else {
        Ok(relative)
    }
}

fn absolute_base(base: &Path) -> Result<PathBuf> {
    let base = if base.as_os_str().is_empty() {
        Path::new(".")
    } else {
        base
    };
    std::path::absolute(base)
        .map(|p| normalize(&p))
        .map_err(|e| Error::io(base, e))
}

/// Lexically resolve `.` and `..` components.
///
/// Leading `..` components of a relative path are kept; `..` at the root of an
/// absolute path is dropped.
fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

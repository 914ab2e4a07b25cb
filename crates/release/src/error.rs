//! Error types for version and version-file operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for release operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bumping versions or updating version files.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The dot/bracket address could not be parsed.
    #[error("Invalid path '{path}': {message}")]
    #[diagnostic(
        code(relver::release::invalid_path),
        help("Use dot notation with optional indices, e.g. spec.containers[0].image")
    )]
    InvalidPath {
        /// The address as supplied by the caller
        path: String,
        /// What is wrong with it
        message: String,
    },

    /// A map key along the path does not exist in the document.
    #[error("Key '{key}' not found at path '{path}'{}", file_suffix(.file.as_ref()))]
    #[diagnostic(
        code(relver::release::key_not_found),
        help("Check that the path matches the structure of the YAML document")
    )]
    KeyNotFound {
        /// The missing key
        key: String,
        /// The full address being resolved
        path: String,
        /// The file being read, when known
        file: Option<PathBuf>,
    },

    /// A sequence index is past the end, or was applied to a non-sequence.
    #[error("Index {index} out of bounds at '{key}' (length {len}) in path '{path}'")]
    #[diagnostic(code(relver::release::index_out_of_bounds))]
    IndexOutOfBounds {
        /// The key bound to the sequence
        key: String,
        /// The requested index
        index: usize,
        /// The observed sequence length (0 for non-sequences)
        len: usize,
        /// The full address being resolved
        path: String,
    },

    /// A step expected a mapping/sequence, or the terminal node is not a scalar.
    #[error("Expected {expected} at '{key}' in path '{path}', found {found}")]
    #[diagnostic(code(relver::release::wrong_node_kind))]
    WrongNodeKind {
        /// The step key where the mismatch occurred
        key: String,
        /// What kind of node was expected
        expected: &'static str,
        /// What kind of node was found
        found: &'static str,
        /// The full address being resolved
        path: String,
    },

    /// The value at the path embeds a version that differs from the current one.
    #[error(
        "version mismatch in {} at path {path}: expected to find {expected:?} but found {found:?} in value {value:?}",
        .file.display()
    )]
    #[diagnostic(
        code(relver::release::version_mismatch),
        help(
            "This usually means the file was not updated in a previous release. Update this file to `{expected}` before re-running"
        )
    )]
    VersionMismatch {
        /// The file being updated
        file: PathBuf,
        /// The declared dot/bracket address
        path: String,
        /// The expected old version string (prefix + current version)
        expected: String,
        /// The embedded version actually found
        found: String,
        /// The full value at the path
        value: String,
    },

    /// No formatting rule could locate the value text to replace.
    #[error("could not find value {value:?} for key {key:?} to replace")]
    #[diagnostic(
        code(relver::release::no_match),
        help("The value uses a YAML formatting style that cannot be rewritten in place")
    )]
    NoMatchToReplace {
        /// The key scoping the replacement
        key: String,
        /// The literal value that was searched for
        value: String,
    },

    /// The document is not valid YAML.
    #[error("Failed to parse YAML{}: {source}", file_suffix(.file.as_ref()))]
    #[diagnostic(code(relver::release::yaml_parse))]
    YamlParse {
        /// The file being parsed, when known
        file: Option<PathBuf>,
        /// The underlying parser error
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to parse or validate a version string.
    #[error("Invalid version: {version}")]
    #[diagnostic(
        code(relver::release::invalid_version),
        help("Version must follow semantic versioning (e.g., 1.0.0, 2.1.0-beta.1)")
    )]
    InvalidVersion {
        /// The invalid version string
        version: String,
    },

    /// The bump directive is not one of major, minor, patch.
    #[error("Invalid bump type: {value} (expected major, minor, or patch)")]
    #[diagnostic(code(relver::release::invalid_bump_type))]
    InvalidBumpType {
        /// The rejected directive
        value: String,
    },

    /// The `--version-files` JSON could not be used.
    #[error("Invalid version files: {message}")]
    #[diagnostic(
        code(relver::release::invalid_targets),
        help(r#"Expected a JSON array like [{{"file": "values.yaml", "path": "image.tag", "prefix": "v"}}]"#)
    )]
    InvalidTargets {
        /// What is wrong with the input
        message: String,
    },

    /// The canonical VERSION file is unusable.
    #[error("Version file error: {message}")]
    #[diagnostic(code(relver::release::version_file))]
    VersionFile {
        /// The error message
        message: String,
        /// The VERSION file path
        path: PathBuf,
    },

    /// A target file path escapes the working tree.
    #[error("{message}")]
    #[diagnostic(
        code(relver::release::path_guard),
        help("Target files must live inside the repository checkout")
    )]
    PathGuard {
        /// The error message
        message: String,
        /// The rejected path
        path: String,
    },

    /// File read/write failure.
    #[error("I/O error on {}: {source}", .path.display())]
    #[diagnostic(
        code(relver::release::io),
        help("Check that the file exists and is writable")
    )]
    Io {
        /// The file involved
        path: PathBuf,
        /// The underlying source error
        #[source]
        source: std::io::Error,
    },
}

fn file_suffix(file: Option<&PathBuf>) -> String {
    file.map(|f| format!(" in {}", f.display()))
        .unwrap_or_default()
}

impl Error {
    /// Create a new invalid path error.
    #[must_use]
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid version error.
    #[must_use]
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create a new invalid targets error.
    #[must_use]
    pub fn invalid_targets(message: impl Into<String>) -> Self {
        Self::InvalidTargets {
            message: message.into(),
        }
    }

    /// Create a new version file error.
    #[must_use]
    pub fn version_file(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::VersionFile {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a new path guard error.
    #[must_use]
    pub fn path_guard(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::PathGuard {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a new I/O error bound to a path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach the file being processed to errors that are produced before
    /// the file is known (locator and parser errors).
    #[must_use]
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::KeyNotFound { key, path: p, .. } => Self::KeyNotFound {
                key,
                path: p,
                file: Some(path.into()),
            },
            Self::YamlParse { source, .. } => Self::YamlParse {
                file: Some(path.into()),
                source,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_error() {
        let err = Error::invalid_path(".version", "leading dot not allowed");
        assert!(err.to_string().contains(".version"));
        assert!(err.to_string().contains("leading dot"));
    }

    #[test]
    fn test_key_not_found_with_file() {
        let err = Error::KeyNotFound {
            key: "version".to_string(),
            path: "metadata.version".to_string(),
            file: None,
        }
        .in_file("Chart.yaml");
        let msg = err.to_string();
        assert!(msg.contains("'version'"));
        assert!(msg.contains("in Chart.yaml"));
    }

    #[test]
    fn test_index_out_of_bounds_error() {
        let err = Error::IndexOutOfBounds {
            key: "containers".to_string(),
            index: 3,
            len: 1,
            path: "containers[3].image".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Index 3"));
        assert!(msg.contains("length 1"));
    }

    #[test]
    fn test_version_mismatch_error() {
        let err = Error::VersionMismatch {
            file: PathBuf::from("values.yaml"),
            path: "image".to_string(),
            expected: "v2.0.0".to_string(),
            found: "v1.0.0".to_string(),
            value: "registry.io/app:v1.0.0".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("values.yaml"));
        assert!(msg.contains("\"v2.0.0\""));
        assert!(msg.contains("\"v1.0.0\""));
    }

    #[test]
    fn test_version_mismatch_help() {
        let err = Error::VersionMismatch {
            file: PathBuf::from("values.yaml"),
            path: "image".to_string(),
            expected: "v2.0.0".to_string(),
            found: "v1.0.0".to_string(),
            value: "registry.io/app:v1.0.0".to_string(),
        };
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("Update this file to `v2.0.0`"));
    }

    #[test]
    fn test_no_match_error() {
        let err = Error::NoMatchToReplace {
            key: "tag".to_string(),
            value: "1.0.0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not find value \"1.0.0\" for key \"tag\" to replace"
        );
    }

    #[test]
    fn test_invalid_version_error() {
        let err = Error::invalid_version("not-a-version");
        assert!(err.to_string().contains("not-a-version"));
    }

    #[test]
    fn test_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io("missing.yaml", io_err);
        assert!(err.to_string().contains("missing.yaml"));
    }

    #[test]
    fn test_diagnostic_code() {
        let err = Error::invalid_version("x");
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("relver::release::invalid_version".to_string())
        );
    }
}

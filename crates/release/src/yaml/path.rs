//! Dot/bracket address parsing.
//!
//! Addresses look like `spec.containers[0].image` or
//! `metadata.annotations["app.kubernetes.io/version"]`. Parsing produces an
//! ordered list of [`PathStep`]s, root to leaf.

use crate::error::{Error, Result};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// One navigation step through a YAML document.
///
/// A step with an index navigates into the sequence bound to `key` and then
/// takes element `index`. An empty `key` with an index indexes the current
/// node directly (the second bracket in `matrix[0][1]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    /// Mapping key to look up (empty for a bare index step).
    pub key: String,
    /// Sequence index to take after the key lookup.
    pub index: Option<usize>,
}

impl PathStep {
    /// A pure map-key step.
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            index: None,
        }
    }

    /// A map-key step followed by a sequence index.
    #[must_use]
    pub fn indexed(key: impl Into<String>, index: usize) -> Self {
        Self {
            key: key.into(),
            index: Some(index),
        }
    }
}

/// An ordered sequence of [`PathStep`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    steps: Vec<PathStep>,
}

impl ResolvedPath {
    /// The steps in navigation order.
    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// The last non-empty key along the path.
    ///
    /// This is the YAML key whose value is rewritten.
    #[must_use]
    pub fn terminal_key(&self) -> &str {
        self.steps
            .iter()
            .rev()
            .find(|s| !s.key.is_empty())
            .map_or("", |s| s.key.as_str())
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if !step.key.is_empty() {
                if step.key.contains(['.', '[', ']']) {
                    write!(f, "[{:?}]", step.key)?;
                } else {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(&step.key)?;
                }
            }
            if let Some(index) = step.index {
                write!(f, "[{index}]")?;
            }
        }
        Ok(())
    }
}

enum Bracket {
    Index(usize),
    Literal(String),
}

/// Parse a dot/bracket address into a [`ResolvedPath`].
///
/// A leading `$.` is accepted and ignored.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] for an empty address, a leading `.`, empty
/// segments, or malformed brackets.
pub fn parse(address: &str) -> Result<ResolvedPath> {
    if address.is_empty() {
        return Err(Error::invalid_path(address, "path cannot be empty"));
    }

    // A leading dot becomes a recursive-descent query in path languages,
    // which would match keys anywhere in the document.
    if address.starts_with('.') {
        return Err(Error::invalid_path(
            address,
            format!(
                "leading dot not allowed - use {:?} instead",
                address.trim_start_matches('.')
            ),
        ));
    }

    let body = address.strip_prefix("$.").unwrap_or(address);
    if body.is_empty() {
        return Err(Error::invalid_path(address, "path cannot be empty"));
    }

    let mut steps = Vec::new();
    let mut key = String::new();
    // Set once the current segment has emitted a step through a bracket.
    let mut bracketed = false;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !key.is_empty() {
                    steps.push(PathStep::key(std::mem::take(&mut key)));
                } else if !bracketed {
                    return Err(Error::invalid_path(address, "empty path segment"));
                }
                if chars.peek().is_none() {
                    return Err(Error::invalid_path(address, "path cannot end with '.'"));
                }
                bracketed = false;
            }
            '[' => {
                match read_bracket(&mut chars).map_err(|m| Error::invalid_path(address, m))? {
                    Bracket::Index(index) => {
                        if !key.is_empty() {
                            steps.push(PathStep::indexed(std::mem::take(&mut key), index));
                        } else if bracketed {
                            steps.push(PathStep {
                                key: String::new(),
                                index: Some(index),
                            });
                        } else {
                            return Err(Error::invalid_path(
                                address,
                                format!("index [{index}] must follow a key"),
                            ));
                        }
                    }
                    Bracket::Literal(literal) => {
                        if !key.is_empty() {
                            steps.push(PathStep::key(std::mem::take(&mut key)));
                        }
                        steps.push(PathStep::key(literal));
                    }
                }
                bracketed = true;
                if !matches!(chars.peek(), None | Some('.' | '[')) {
                    return Err(Error::invalid_path(
                        address,
                        "expected '.' or '[' after ']'",
                    ));
                }
            }
            ']' => return Err(Error::invalid_path(address, "unmatched ']'")),
            _ => key.push(c),
        }
    }

    if !key.is_empty() {
        steps.push(PathStep::key(key));
    }

    Ok(ResolvedPath { steps })
}

/// Read the inside of a bracket; the opening `[` has been consumed.
fn read_bracket(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<Bracket, String> {
    if let Some(&quote) = chars.peek().filter(|c| matches!(c, '"' | '\'')) {
        chars.next();
        let mut literal = String::new();
        loop {
            match chars.next() {
                Some(c) if c == quote => break,
                Some(c) => literal.push(c),
                None => return Err("unterminated quoted key".to_string()),
            }
        }
        if chars.next() != Some(']') {
            return Err("expected ']' after quoted key".to_string());
        }
        if literal.is_empty() {
            return Err("quoted key cannot be empty".to_string());
        }
        return Ok(Bracket::Literal(literal));
    }

    let mut digits = String::new();
    loop {
        match chars.next() {
            Some(']') => break,
            Some(c) => digits.push(c),
            None => return Err("unterminated '['".to_string()),
        }
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!(
            "index must be a non-negative integer, got [{digits}]"
        ));
    }
    digits
        .parse()
        .map(Bracket::Index)
        .map_err(|e| format!("index [{digits}] is invalid: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(address: &str) -> Vec<PathStep> {
        parse(address).unwrap().steps().to_vec()
    }

    #[test]
    fn test_parse_simple_key() {
        assert_eq!(steps("version"), vec![PathStep::key("version")]);
    }

    #[test]
    fn test_parse_dotted_path() {
        assert_eq!(
            steps("metadata.version"),
            vec![PathStep::key("metadata"), PathStep::key("version")]
        );
    }

    #[test]
    fn test_parse_deep_path() {
        assert_eq!(steps("spec.template.spec.image.tag").len(), 5);
    }

    #[test]
    fn test_parse_array_index() {
        assert_eq!(
            steps("containers[0].image"),
            vec![PathStep::indexed("containers", 0), PathStep::key("image")]
        );
    }

    #[test]
    fn test_parse_multiple_indices() {
        assert_eq!(
            steps("spec.containers[0].ports[1].containerPort"),
            vec![
                PathStep::key("spec"),
                PathStep::indexed("containers", 0),
                PathStep::indexed("ports", 1),
                PathStep::key("containerPort"),
            ]
        );
    }

    #[test]
    fn test_parse_nested_index() {
        assert_eq!(
            steps("matrix[0][2]"),
            vec![
                PathStep::indexed("matrix", 0),
                PathStep {
                    key: String::new(),
                    index: Some(2)
                },
            ]
        );
    }

    #[test]
    fn test_parse_quoted_literal() {
        assert_eq!(
            steps(r#"metadata.annotations["app.kubernetes.io/version"]"#),
            vec![
                PathStep::key("metadata"),
                PathStep::key("annotations"),
                PathStep::key("app.kubernetes.io/version"),
            ]
        );
        assert_eq!(
            steps("labels['helm.sh/chart']"),
            vec![PathStep::key("labels"), PathStep::key("helm.sh/chart")]
        );
    }

    #[test]
    fn test_parse_dollar_prefix() {
        assert_eq!(steps("$.image.tag"), steps("image.tag"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        assert_eq!(
            parse("spec.containers[0].image").unwrap(),
            parse("spec.containers[0].image").unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_empty() {
        let err = parse("").unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_parse_rejects_leading_dot() {
        let err = parse(".version").unwrap_err();
        assert!(err.to_string().contains("leading dot not allowed"));
        assert!(err.to_string().contains("\"version\""));

        let err = parse("..recursive").unwrap_err();
        assert!(err.to_string().contains("\"recursive\""));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "a..b",
            "a.",
            "a[",
            "a[x]",
            "a[-1]",
            "a[]",
            "a]",
            "[0]",
            "a[0]b",
            "a[\"x\"",
            "a['']",
            "$.",
        ] {
            assert!(parse(bad).is_err(), "expected {bad:?} to be rejected");
        }
    }

    #[test]
    fn test_terminal_key() {
        assert_eq!(parse("spec.containers[0].image").unwrap().terminal_key(), "image");
        assert_eq!(parse("containers[1]").unwrap().terminal_key(), "containers");
        assert_eq!(parse("matrix[0][1]").unwrap().terminal_key(), "matrix");
    }

    #[test]
    fn test_display_round_trip() {
        for address in ["version", "spec.containers[0].image", "matrix[0][1]"] {
            assert_eq!(parse(address).unwrap().to_string(), address);
        }
        let quoted = parse(r#"annotations["app.kubernetes.io/version"]"#).unwrap();
        assert_eq!(
            quoted.to_string(),
            r#"annotations["app.kubernetes.io/version"]"#
        );
    }
}

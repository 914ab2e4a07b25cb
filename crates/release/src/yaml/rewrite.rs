//! Format-preserving text substitution.
//!
//! The document is never re-serialized. Instead the old value is found next to
//! its key in the raw text and swapped for the new one, so comments, quoting,
//! key order and indentation survive untouched.

use crate::error::{Error, Result};
use regex::Regex;
use tracing::{debug, warn};

/// One textual shape a `key: value` pair can take.
#[derive(Debug, Clone, Copy)]
pub struct ReplacementRule {
    /// Short name used in logs.
    pub name: &'static str,
    /// Builds the regex source for a key and the old value.
    pub pattern: fn(key: &str, old: &str) -> String,
    /// Builds the replacement template for the new value.
    pub replacement: fn(new: &str) -> String,
}

/// Rules tried in order; the first that matches wins.
pub static REPLACEMENT_RULES: [ReplacementRule; 4] = [
    ReplacementRule {
        name: "double-quoted",
        pattern: double_quoted_pattern,
        replacement: double_quoted_replacement,
    },
    ReplacementRule {
        name: "single-quoted",
        pattern: single_quoted_pattern,
        replacement: single_quoted_replacement,
    },
    ReplacementRule {
        name: "unquoted-eol",
        pattern: unquoted_eol_pattern,
        replacement: keep_trailer_replacement,
    },
    ReplacementRule {
        name: "unquoted-with-comment",
        pattern: unquoted_comment_pattern,
        replacement: keep_trailer_replacement,
    },
];

/// Tried after every rule in [`REPLACEMENT_RULES`] failed.
pub static FALLBACK_RULE: ReplacementRule = ReplacementRule {
    name: "bare",
    pattern: bare_pattern,
    replacement: keep_trailer_replacement,
};

/// Capture group 1: the key with whatever precedes its value on the line.
///
/// The key must start a line or follow whitespace, `-`, `{` or `,` so that
/// `tag` never matches inside `mytag`. Keys may themselves be quoted.
fn scoped_key(key: &str) -> String {
    format!(
        r#"(?m)((?:^|[\s\-{{,])["']?{}["']?:[ \t]*)"#,
        regex::escape(key)
    )
}

fn double_quoted_pattern(key: &str, old: &str) -> String {
    format!(r#"{}"{}""#, scoped_key(key), regex::escape(old))
}

fn single_quoted_pattern(key: &str, old: &str) -> String {
    format!("{}'{}'", scoped_key(key), regex::escape(old))
}

fn unquoted_eol_pattern(key: &str, old: &str) -> String {
    format!(r"{}{}([ \t\r]*)$", scoped_key(key), regex::escape(old))
}

fn unquoted_comment_pattern(key: &str, old: &str) -> String {
    format!(r"{}{}([ \t]*#)", scoped_key(key), regex::escape(old))
}

/// The value must still end where a plain or flow scalar ends, so `1.1`
/// never matches the front of `1.10`.
fn bare_pattern(key: &str, old: &str) -> String {
    format!(
        r"{}{}([ \t\r]*(?:$|#|,|\}}|\]))",
        scoped_key(key),
        regex::escape(old)
    )
}

/// `$` is the group reference sigil in templates.
fn literal(new: &str) -> String {
    new.replace('$', "$$")
}

fn double_quoted_replacement(new: &str) -> String {
    format!(r#"${{1}}"{}""#, literal(new))
}

fn single_quoted_replacement(new: &str) -> String {
    format!("${{1}}'{}'", literal(new))
}

fn keep_trailer_replacement(new: &str) -> String {
    format!("${{1}}{}${{2}}", literal(new))
}

/// Replace the first occurrence of `old` written as the value of `key`.
///
/// Exactly one substitution is made. Every byte outside the replaced value is
/// preserved.
///
/// # Errors
///
/// Returns [`Error::NoMatchToReplace`] when no rule finds the value.
pub fn rewrite(content: &str, key: &str, old: &str, new: &str) -> Result<String> {
    rewrite_where(content, key, old, new, |_| true)
}

/// Like [`rewrite`], but each candidate substitution is handed to `accept`
/// and only the first accepted one is returned.
///
/// Candidates are produced rule by rule in the order of
/// [`REPLACEMENT_RULES`] followed by [`FALLBACK_RULE`], and within a rule in
/// document order. Each candidate differs from `content` in exactly one
/// value.
///
/// # Errors
///
/// Returns [`Error::NoMatchToReplace`] when no candidate is accepted.
pub fn rewrite_where<F>(content: &str, key: &str, old: &str, new: &str, accept: F) -> Result<String>
where
    F: Fn(&str) -> bool,
{
    for rule in REPLACEMENT_RULES.iter().chain([&FALLBACK_RULE]) {
        let source = (rule.pattern)(key, old);
        let re = match Regex::new(&source) {
            Ok(re) => re,
            Err(e) => {
                warn!(rule = rule.name, error = %e, "Skipping replacement rule");
                continue;
            }
        };
        let template = (rule.replacement)(new);

        for caps in re.captures_iter(content) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let mut candidate = String::with_capacity(content.len() + new.len());
            candidate.push_str(&content[..whole.start()]);
            caps.expand(&template, &mut candidate);
            candidate.push_str(&content[whole.end()..]);

            if accept(&candidate) {
                debug!(
                    rule = rule.name,
                    key,
                    old,
                    new,
                    offset = whole.start(),
                    "Replacement rule matched"
                );
                return Ok(candidate);
            }
            debug!(
                rule = rule.name,
                key,
                offset = whole.start(),
                "Rejected replacement candidate"
            );
        }
    }

    Err(Error::NoMatchToReplace {
        key: key.to_string(),
        value: old.to_string(),
    })
}

/// Unquoted scalar texts written as the value of `key`, in document order.
///
/// Used to recover the source spelling of a number, which the parsed
/// document only keeps in canonical form.
#[must_use]
pub fn plain_values<'a>(content: &'a str, key: &str) -> Vec<&'a str> {
    let source = format!(r#"{}([^\s#,\[\]{{}}"']+)"#, scoped_key(key));
    let Ok(re) = Regex::new(&source) else {
        return Vec::new();
    };
    re.captures_iter(content)
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str())
        .collect()
}

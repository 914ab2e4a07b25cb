//! Detection of semver-shaped versions embedded in larger values.

use regex::Regex;

/// `MAJOR.MINOR.PATCH` with an optional pre-release suffix.
const SEMVER: &str = r"\d+\.\d+\.\d+(?:-[A-Za-z0-9.]+)?";

/// Find a version embedded in `value`, such as the tag in
/// `registry.io/app:v1.2.3`.
///
/// Two positions qualify: `prefix` + version at the very end of the value, or
/// right after a `:`. The end-of-value match wins when both exist. The
/// returned text includes the prefix but not the colon. Versions in the
/// middle of a path segment (`/v1.2.3/`) are ignored.
#[must_use]
pub fn find_embedded_version(value: &str, prefix: &str) -> Option<String> {
    let prefix = regex::escape(prefix);

    let at_end = Regex::new(&format!("{prefix}{SEMVER}$")).ok()?;
    if let Some(m) = at_end.find(value) {
        return Some(m.as_str().to_string());
    }

    let after_colon = Regex::new(&format!(":({prefix}{SEMVER})")).ok()?;
    after_colon
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_tag_with_prefix() {
        assert_eq!(
            find_embedded_version("registry.io/app:v1.2.3", "v").as_deref(),
            Some("v1.2.3")
        );
    }

    #[test]
    fn test_image_tag_without_prefix() {
        assert_eq!(
            find_embedded_version("ghcr.io/org/app:0.7.1", "").as_deref(),
            Some("0.7.1")
        );
    }

    #[test]
    fn test_prerelease_suffix() {
        assert_eq!(
            find_embedded_version("app:1.0.0-rc.1", "").as_deref(),
            Some("1.0.0-rc.1")
        );
    }

    #[test]
    fn test_bare_version() {
        assert_eq!(find_embedded_version("2.0.0", "").as_deref(), Some("2.0.0"));
        assert_eq!(find_embedded_version("v2.0.0", "v").as_deref(), Some("v2.0.0"));
    }

    #[test]
    fn test_colon_match_in_middle() {
        assert_eq!(
            find_embedded_version("app:1.2.3@sha256", "").as_deref(),
            Some("1.2.3")
        );
    }

    #[test]
    fn test_end_match_preferred_over_colon() {
        assert_eq!(
            find_embedded_version("base:1.0.0/app-2.0.0", "").as_deref(),
            Some("2.0.0")
        );
    }

    #[test]
    fn test_mid_path_ignored() {
        assert_eq!(find_embedded_version("https://host/v1.2.3/chart.tgz", "v"), None);
    }

    #[test]
    fn test_no_version() {
        assert_eq!(find_embedded_version("latest", ""), None);
        assert_eq!(find_embedded_version("registry.io/app:latest", ""), None);
        assert_eq!(find_embedded_version("", "v"), None);
    }

    #[test]
    fn test_prefix_is_literal() {
        // '.' in the prefix must not act as a wildcard
        assert_eq!(find_embedded_version("app:x1.2.3", "."), None);
        assert_eq!(
            find_embedded_version("app:.1.2.3", ".").as_deref(),
            Some(".1.2.3")
        );
    }
}

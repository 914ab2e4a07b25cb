//! Resolved release configuration.

use crate::cli::{Cli, CliError};
use crate::helm_docs;
use relver_release::{BumpType, VersionFileTarget, parse_targets, validate_path_relative};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything the release pipeline needs, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Requested bump
    pub bump_type: BumpType,
    /// Canonical version file, relative to the checkout
    pub version_file: PathBuf,
    /// Validated helm-docs arguments; `None` skips helm-docs
    pub helm_docs_args: Option<Vec<String>>,
    /// YAML targets, file paths relative to the checkout
    pub version_files: Vec<VersionFileTarget>,
    /// GitHub token; only required when a PR is opened
    pub token: Option<String>,
    /// Repository owner
    pub repo_owner: String,
    /// Repository name
    pub repo_name: String,
    /// Branch the release PR targets
    pub base_branch: String,
    /// Apply file changes but skip the PR
    pub dry_run: bool,
}

impl ReleaseConfig {
    /// Build the configuration from parsed flags, resolving files against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Config`] for missing required settings, an invalid
    /// bump type, malformed `--version-files`, paths escaping `base`, or
    /// disallowed helm-docs arguments.
    pub fn from_cli(cli: &Cli, base: &Path) -> Result<Self, CliError> {
        let bump_type = match cli.bump_type.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(CliError::config_with_help(
                    "--bump-type is required",
                    "Pass --bump-type major|minor|patch or set RELVER_BUMP_TYPE",
                ));
            }
            Some(value) => BumpType::parse(value)?,
        };

        let token = cli
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let (repo_owner, repo_name) = match cli.repository.as_deref() {
            Some(repository) if !repository.trim().is_empty() => parse_repository(repository)?,
            _ if cli.dry_run => (String::new(), String::new()),
            _ => {
                return Err(CliError::config_with_help(
                    "GITHUB_REPOSITORY environment variable is required",
                    "Set GITHUB_REPOSITORY=owner/repo or pass --repository",
                ));
            }
        };

        if token.is_none() && !cli.dry_run {
            return Err(CliError::config_with_help(
                "--token or GITHUB_TOKEN is required",
                "Use --dry-run to update files without opening a pull request",
            ));
        }

        let version_file = guard(base, &cli.version_file)?;

        let mut version_files = parse_targets(cli.version_files.as_deref().unwrap_or_default())?;
        for target in &mut version_files {
            target.file = guard(base, &target.file)?;
        }

        let helm_docs_args = match cli.helm_docs_args.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                helm_docs::validate_args(raw)
                    .map_err(|e| CliError::config(format!("invalid --helm-docs-args: {e}")))?,
            ),
        };

        let base_branch = cli.base_branch.trim();
        if base_branch.is_empty() {
            return Err(CliError::config("--base-branch cannot be empty"));
        }

        debug!(
            bump = %bump_type,
            targets = version_files.len(),
            helm_docs = helm_docs_args.is_some(),
            dry_run = cli.dry_run,
            "Resolved release configuration"
        );

        Ok(Self {
            bump_type,
            version_file,
            helm_docs_args,
            version_files,
            token,
            repo_owner,
            repo_name,
            base_branch: base_branch.to_string(),
            dry_run: cli.dry_run,
        })
    }
}

fn guard(base: &Path, path: &Path) -> Result<PathBuf, CliError> {
    Ok(validate_path_relative(base, &path.to_string_lossy())?)
}

/// Split `owner/repo`.
///
/// # Errors
///
/// Returns [`CliError::Config`] unless the value has exactly two non-empty parts.
pub fn parse_repository(repository: &str) -> Result<(String, String), CliError> {
    match repository.trim().split('/').collect::<Vec<_>>().as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Ok(((*owner).to_string(), (*repo).to_string()))
        }
        _ => Err(CliError::config(format!(
            "invalid GITHUB_REPOSITORY format: {repository:?} (expected owner/repo)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{EXIT_CLI, exit_code_for};
    use crate::tracing::{LogLevel, TracingFormat};
    use tempfile::TempDir;

    fn cli() -> Cli {
        Cli {
            bump_type: Some("minor".to_string()),
            version_file: PathBuf::from("VERSION"),
            helm_docs_args: None,
            version_files: None,
            token: Some("ghp_test".to_string()),
            repository: Some("acme/widgets".to_string()),
            base_branch: "main".to_string(),
            dry_run: false,
            level: LogLevel::Info,
            format: TracingFormat::Compact,
        }
    }

    fn config_message(err: CliError) -> String {
        assert_eq!(exit_code_for(&err), EXIT_CLI, "{err}");
        err.to_string()
    }

    #[test]
    fn test_complete_config() {
        let dir = TempDir::new().unwrap();
        let mut cli = cli();
        cli.version_files = Some(
            r#"[{"file": "charts/app/values.yaml", "path": "image.tag", "prefix": "v"}]"#
                .to_string(),
        );
        cli.helm_docs_args = Some("--chart-search-root charts".to_string());

        let config = ReleaseConfig::from_cli(&cli, dir.path()).unwrap();

        assert_eq!(config.bump_type, BumpType::Minor);
        assert_eq!(config.version_file, PathBuf::from("VERSION"));
        assert_eq!(config.repo_owner, "acme");
        assert_eq!(config.repo_name, "widgets");
        assert_eq!(config.token.as_deref(), Some("ghp_test"));
        assert_eq!(
            config.version_files,
            [VersionFileTarget::new("charts/app/values.yaml", "image.tag").with_prefix("v")]
        );
        assert_eq!(
            config.helm_docs_args,
            Some(vec!["--chart-search-root".to_string(), "charts".to_string()])
        );
    }

    #[test]
    fn test_bump_type_required() {
        let dir = TempDir::new().unwrap();
        let mut cli = cli();
        cli.bump_type = None;
        let msg = config_message(ReleaseConfig::from_cli(&cli, dir.path()).unwrap_err());
        assert!(msg.contains("--bump-type is required"));

        cli.bump_type = Some("huge".to_string());
        let msg = config_message(ReleaseConfig::from_cli(&cli, dir.path()).unwrap_err());
        assert!(msg.contains("Invalid bump type: huge"));
    }

    #[test]
    fn test_token_required_unless_dry_run() {
        let dir = TempDir::new().unwrap();
        let mut cli = cli();
        cli.token = Some("  ".to_string());
        let msg = config_message(ReleaseConfig::from_cli(&cli, dir.path()).unwrap_err());
        assert!(msg.contains("--token or GITHUB_TOKEN is required"));

        cli.dry_run = true;
        let config = ReleaseConfig::from_cli(&cli, dir.path()).unwrap();
        assert!(config.token.is_none());
    }

    #[test]
    fn test_repository_required_unless_dry_run() {
        let dir = TempDir::new().unwrap();
        let mut cli = cli();
        cli.repository = None;
        let msg = config_message(ReleaseConfig::from_cli(&cli, dir.path()).unwrap_err());
        assert!(msg.contains("GITHUB_REPOSITORY environment variable is required"));

        cli.dry_run = true;
        assert!(ReleaseConfig::from_cli(&cli, dir.path()).is_ok());
    }

    #[test]
    fn test_parse_repository() {
        assert_eq!(
            parse_repository("stacklok/toolhive").unwrap(),
            ("stacklok".to_string(), "toolhive".to_string())
        );
        for bad in ["toolhive", "a/b/c", "/repo", "owner/"] {
            let msg = config_message(parse_repository(bad).unwrap_err());
            assert!(msg.contains("expected owner/repo"), "{bad}: {msg}");
        }
    }

    #[test]
    fn test_target_escaping_checkout_rejected() {
        let dir = TempDir::new().unwrap();
        let mut cli = cli();
        cli.version_files = Some(r#"[{"file": "../other/values.yaml", "path": "tag"}]"#.to_string());
        let msg = config_message(ReleaseConfig::from_cli(&cli, dir.path()).unwrap_err());
        assert!(msg.contains("path traversal detected"));
    }

    #[test]
    fn test_absolute_target_inside_checkout_made_relative() {
        let dir = TempDir::new().unwrap();
        let mut cli = cli();
        let inside = dir.path().join("deploy").join("values.yaml");
        cli.version_files = Some(
            serde_json::json!([{"file": inside, "path": "image.tag"}]).to_string(),
        );
        let config = ReleaseConfig::from_cli(&cli, dir.path()).unwrap();
        assert_eq!(config.version_files[0].file, Path::new("deploy/values.yaml"));
    }

    #[test]
    fn test_malformed_targets() {
        let dir = TempDir::new().unwrap();
        let mut cli = cli();
        cli.version_files = Some(r#"[{"file": "values.yaml"}]"#.to_string());
        let msg = config_message(ReleaseConfig::from_cli(&cli, dir.path()).unwrap_err());
        assert!(msg.contains("Invalid version files"));
    }

    #[test]
    fn test_disallowed_helm_docs_args() {
        let dir = TempDir::new().unwrap();
        let mut cli = cli();
        cli.helm_docs_args = Some("--exec sh".to_string());
        let msg = config_message(ReleaseConfig::from_cli(&cli, dir.path()).unwrap_err());
        assert!(msg.contains("invalid --helm-docs-args"));

        cli.helm_docs_args = Some("   ".to_string());
        assert!(
            ReleaseConfig::from_cli(&cli, dir.path())
                .unwrap()
                .helm_docs_args
                .is_none()
        );
    }
}

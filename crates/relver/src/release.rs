//! The release pipeline.
//!
//! Reads and bumps the canonical version, moves every declared copy of it
//! to the new value, optionally regenerates chart docs, and opens the
//! release pull request. File updates are all attempted before any failure
//! is reported, and no pull request is opened when one of them fails.

use crate::cli::CliError;
use crate::config::ReleaseConfig;
use crate::helm_docs::{HelmDocsError, HelmDocsRunner, ProcessHelmDocs};
use crate::outputs::GithubOutput;
use crate::pr_body::generate_pr_body;
use relver_github::{GitHubClient, PrCreator, PrRequest, PrResult};
use relver_release::{
    FsVersionFile, SurgicalYamlUpdater, Version, VersionReader, VersionWriter, YamlUpdater,
    is_greater,
};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// The collaborators the pipeline drives.
pub struct Dependencies {
    /// Reads the canonical version
    pub version_reader: Box<dyn VersionReader>,
    /// Writes the canonical version
    pub version_writer: Box<dyn VersionWriter>,
    /// Rewrites version values in YAML files
    pub yaml_updater: Box<dyn YamlUpdater>,
    /// Runs helm-docs
    pub helm_docs: Box<dyn HelmDocsRunner>,
    /// Opens the pull request; absent in dry runs
    pub pr_creator: Option<Box<dyn PrCreator>>,
    /// Step output sink
    pub outputs: GithubOutput,
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependencies")
            .field("pr_creator", &self.pr_creator.is_some())
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl Dependencies {
    /// Production collaborators: local filesystem, `helm-docs` from `PATH`,
    /// the GitHub API and `$GITHUB_OUTPUT`.
    ///
    /// # Errors
    ///
    /// Returns an error if the GitHub client cannot be built.
    pub fn from_config(config: &ReleaseConfig) -> Result<Self, CliError> {
        let pr_creator: Option<Box<dyn PrCreator>> = match (&config.token, config.dry_run) {
            (Some(token), false) => Some(Box::new(GitHubClient::new(token)?)),
            _ => None,
        };

        Ok(Self {
            version_reader: Box::new(FsVersionFile),
            version_writer: Box::new(FsVersionFile),
            yaml_updater: Box::new(SurgicalYamlUpdater),
            helm_docs: Box::new(ProcessHelmDocs),
            pr_creator,
            outputs: GithubOutput::from_env(),
        })
    }
}

/// One failed file update.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The canonical version file could not be written
    #[error("writing version file {}: {source}", .path.display())]
    VersionFile {
        /// Version file path
        path: PathBuf,
        /// Underlying failure
        source: relver_release::Error,
    },
    /// A YAML target could not be updated
    #[error("updating {} at {path}: {source}", .file.display())]
    Target {
        /// YAML file
        file: PathBuf,
        /// Address inside the file
        path: String,
        /// Underlying failure
        source: relver_release::Error,
    },
    /// helm-docs failed
    #[error("running helm-docs: {source}")]
    HelmDocs {
        /// Underlying failure
        source: HelmDocsError,
    },
}

/// Outcome of updating every file.
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Files helm-docs reported as modified
    pub helm_docs_files: Vec<PathBuf>,
    /// Every failure, in the order the files were attempted
    pub errors: Vec<UpdateError>,
}

impl UpdateReport {
    /// Whether every update succeeded
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn collected failures into a single error listing all of them.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Release`] when any update failed.
    pub fn into_result(self) -> Result<Vec<PathBuf>, CliError> {
        if self.errors.is_empty() {
            return Ok(self.helm_docs_files);
        }
        let details = self
            .errors
            .iter()
            .map(|e| format!("  - {e}"))
            .collect::<Vec<_>>()
            .join("\n");
        Err(CliError::release(format!("updating files:\n{details}")).with_help(
            "No pull request was opened. Fix the files listed above and run the release again",
        ))
    }
}

/// Result of a release run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseOutcome {
    /// Version before the bump
    pub previous_version: String,
    /// Version after the bump
    pub version: String,
    /// Files changed by the release
    pub files: Vec<PathBuf>,
    /// The opened pull request, absent in dry runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PrResult>,
}

/// Read the current version and compute the bumped one.
///
/// Returns the trimmed current version text and the new version.
///
/// # Errors
///
/// Returns an error if the version file cannot be read or parsed, or if the
/// bumped version is not greater than the current one.
pub fn bump_version(
    config: &ReleaseConfig,
    reader: &dyn VersionReader,
) -> Result<(String, Version), CliError> {
    let current = reader
        .read_version(&config.version_file)
        .map_err(|e| CliError::release_from("reading version", &e))?;
    let parsed: Version = current
        .parse()
        .map_err(|e: relver_release::Error| CliError::release_from("parsing version", &e))?;
    let new = parsed.bump(config.bump_type);

    let greater = is_greater(&new.to_string(), &parsed.to_string())
        .map_err(|e| CliError::release_from("comparing versions", &e))?;
    if !greater {
        return Err(CliError::release(format!(
            "new version {new} is not greater than current {current}"
        )));
    }

    info!(current = %current, new = %new, bump = %config.bump_type, "Computed release version");
    Ok((current, new))
}

/// Write the new version everywhere it is declared.
///
/// Every file is attempted even after a failure; helm-docs runs last.
pub fn update_all_files(
    config: &ReleaseConfig,
    current: &str,
    new: &str,
    deps: &Dependencies,
) -> UpdateReport {
    let mut report = UpdateReport::default();

    match deps.version_writer.write_version(&config.version_file, new) {
        Ok(()) => info!(file = %config.version_file.display(), version = new, "Updated version file"),
        Err(source) => report.errors.push(UpdateError::VersionFile {
            path: config.version_file.clone(),
            source,
        }),
    }

    for target in &config.version_files {
        match deps.yaml_updater.update(target, current, new) {
            Ok(()) => info!(
                file = %target.file.display(),
                path = %target.path,
                "Updated version field"
            ),
            Err(source) => {
                warn!(file = %target.file.display(), path = %target.path, error = %source, "Failed to update version field");
                report.errors.push(UpdateError::Target {
                    file: target.file.clone(),
                    path: target.path.clone(),
                    source,
                });
            }
        }
    }

    if let Some(args) = &config.helm_docs_args {
        match deps.helm_docs.run(args) {
            Ok(files) => report.helm_docs_files = files,
            Err(source) => report.errors.push(UpdateError::HelmDocs { source }),
        }
    }

    report
}

/// Files committed to the release branch: the version file, every target,
/// then anything helm-docs touched. Duplicates are dropped.
#[must_use]
pub fn release_files(config: &ReleaseConfig, helm_docs_files: &[PathBuf]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    let candidates = std::iter::once(&config.version_file)
        .chain(config.version_files.iter().map(|t| &t.file))
        .chain(helm_docs_files);
    for file in candidates {
        if !files.contains(file) {
            files.push(file.clone());
        }
    }
    files
}

/// Open the release pull request on `release/v<new>`.
///
/// # Errors
///
/// Returns an error if the pull request cannot be created.
pub async fn create_release_pr(
    config: &ReleaseConfig,
    creator: &dyn PrCreator,
    new_version: &str,
    files: Vec<PathBuf>,
) -> Result<PrResult, CliError> {
    let request = PrRequest {
        owner: config.repo_owner.clone(),
        repo: config.repo_name.clone(),
        base_branch: config.base_branch.clone(),
        head_branch: format!("release/v{new_version}"),
        title: format!("Release v{new_version}"),
        body: generate_pr_body(
            new_version,
            config.bump_type,
            &config.version_file,
            &config.version_files,
            config.helm_docs_args.is_some(),
        ),
        files,
    };

    creator
        .create_release_pr(&request)
        .await
        .map_err(|e| CliError::release_from("creating PR", &e))
}

/// Run the whole pipeline.
///
/// # Errors
///
/// Returns the first fatal error: version read/parse/bump, the aggregated
/// file update failures, or pull request creation.
#[instrument(skip_all, fields(bump = %config.bump_type, dry_run = config.dry_run))]
pub async fn run(config: &ReleaseConfig, deps: &Dependencies) -> Result<ReleaseOutcome, CliError> {
    let (current, new) = bump_version(config, deps.version_reader.as_ref())?;
    let new = new.to_string();

    let helm_docs_files = update_all_files(config, &current, &new, deps).into_result()?;
    let files = release_files(config, &helm_docs_files);

    if config.dry_run {
        info!(version = %new, files = files.len(), "Dry run: files updated, skipping pull request");
        deps.outputs.set("version", &new);
        return Ok(ReleaseOutcome {
            previous_version: current,
            version: new,
            files,
            pull_request: None,
        });
    }

    let creator = deps.pr_creator.as_deref().ok_or_else(|| {
        CliError::config("--token or GITHUB_TOKEN is required")
    })?;
    let pr = create_release_pr(config, creator, &new, files.clone()).await?;
    info!(number = pr.number, url = %pr.url, "Release pull request created");

    deps.outputs.set("version", &new);
    deps.outputs.set("pr_number", &pr.number.to_string());
    deps.outputs.set("pr_url", &pr.url);

    Ok(ReleaseOutcome {
        previous_version: current,
        version: new,
        files,
        pull_request: Some(pr),
    })
}

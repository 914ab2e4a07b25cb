//! Octocrab-backed release pull request creation.

use crate::error::{Error, Result};
use crate::request::{PrRequest, PrResult};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::models::repos::Object;
use octocrab::params::repos::Reference;
use std::path::Path;
use tracing::{debug, info, warn};

/// Label applied to every release pull request.
pub const RELEASE_LABEL: &str = "release";

/// Opens release pull requests.
#[async_trait]
pub trait PrCreator: Send + Sync {
    /// Create the head branch, commit the request's files to it and open a
    /// pull request against the base branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid or any GitHub call other
    /// than labelling fails.
    async fn create_release_pr(&self, request: &PrRequest) -> Result<PrResult>;
}

/// Reads the local contents of files to commit.
pub trait FileReader: Send + Sync {
    /// Read the whole file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read_file(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// [`FileReader`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileReader;

impl FileReader for FsFileReader {
    fn read_file(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// GitHub API client implementing [`PrCreator`].
pub struct GitHubClient {
    client: Octocrab,
    file_reader: Box<dyn FileReader>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient").finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a client authenticated with a personal or Actions token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if the token is empty and [`Error::Api`] if
    /// the HTTP client cannot be built.
    pub fn new(token: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(Error::auth("token is required"));
        }
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| Error::api("creating GitHub client", e))?;
        Ok(Self {
            client,
            file_reader: Box::new(FsFileReader),
        })
    }

    /// Replace the reader used for file contents.
    #[must_use]
    pub fn with_file_reader(mut self, reader: impl FileReader + 'static) -> Self {
        self.file_reader = Box::new(reader);
        self
    }

    async fn base_sha(&self, request: &PrRequest) -> Result<String> {
        let reference = self
            .client
            .repos(&request.owner, &request.repo)
            .get_ref(&Reference::Branch(request.base_branch.clone()))
            .await
            .map_err(|e| Error::api("getting base branch ref", e))?;

        match reference.object {
            Object::Commit { sha, .. } | Object::Tag { sha, .. } => Ok(sha),
            #[allow(unreachable_patterns)]
            _ => Err(Error::api(
                "getting base branch ref",
                format!("{} does not point at a commit", request.base_branch),
            )),
        }
    }

    async fn commit_file(&self, request: &PrRequest, path: &Path) -> Result<()> {
        let content = self.file_reader.read_file(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let repo_path = path.to_string_lossy().replace('\\', "/");
        let basename = path
            .file_name()
            .map_or_else(|| repo_path.clone(), |n| n.to_string_lossy().into_owned());
        let message = format!("Update {basename} for release");
        let repos = self.client.repos(&request.owner, &request.repo);
        let operation = format!("committing file {}", path.display());

        let existing_sha = match repos
            .get_content()
            .path(&repo_path)
            .r#ref(&request.head_branch)
            .send()
            .await
        {
            Ok(items) => items.items.into_iter().next().map(|item| item.sha),
            Err(octocrab::Error::GitHub { source, .. }) if source.message.contains("Not Found") => {
                None
            }
            Err(e) => return Err(Error::api(operation, e)),
        };

        if let Some(sha) = existing_sha {
            debug!(file = %repo_path, sha = %sha, "Updating existing file");
            repos
                .update_file(&repo_path, &message, content, sha)
                .branch(&request.head_branch)
                .send()
                .await
                .map_err(|e| Error::api(operation, e))?;
        } else {
            debug!(file = %repo_path, "Creating new file");
            repos
                .create_file(&repo_path, &message, content)
                .branch(&request.head_branch)
                .send()
                .await
                .map_err(|e| Error::api(operation, e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl PrCreator for GitHubClient {
    async fn create_release_pr(&self, request: &PrRequest) -> Result<PrResult> {
        request.validate()?;

        let sha = self.base_sha(request).await?;
        debug!(base = %request.base_branch, sha = %sha, "Resolved base branch");

        self.client
            .repos(&request.owner, &request.repo)
            .create_ref(&Reference::Branch(request.head_branch.clone()), sha)
            .await
            .map_err(|e| Error::api("creating branch", e))?;
        info!(branch = %request.head_branch, "Created release branch");

        for file in &request.files {
            self.commit_file(request, file).await?;
        }

        let pr = self
            .client
            .pulls(&request.owner, &request.repo)
            .create(&request.title, &request.head_branch, &request.base_branch)
            .body(&request.body)
            .send()
            .await
            .map_err(|e| Error::api("creating pull request", e))?;

        // The label may not exist in the repository.
        if let Err(e) = self
            .client
            .issues(&request.owner, &request.repo)
            .add_labels(pr.number, &[RELEASE_LABEL.to_string()])
            .await
        {
            warn!(pr = pr.number, error = %e, "Failed to add release label");
        }

        let url = pr.html_url.map(|u| u.to_string()).unwrap_or_default();
        info!(pr = pr.number, url = %url, "Opened release pull request");

        Ok(PrResult {
            number: pr.number,
            url,
        })
    }
}

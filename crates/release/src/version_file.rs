//! The canonical `VERSION` file and the seams used to update files.
//!
//! The release pipeline talks to the filesystem only through the traits in
//! this module, so it can be driven by in-memory fakes in tests.

use crate::error::{Error, Result};
use crate::target::VersionFileTarget;
use crate::yaml;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads the canonical version.
pub trait VersionReader: Send + Sync {
    /// Read the trimmed version string stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is empty.
    fn read_version(&self, path: &Path) -> Result<String>;
}

/// Writes the canonical version.
pub trait VersionWriter: Send + Sync {
    /// Store `version` at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write_version(&self, path: &Path, version: &str) -> Result<()>;
}

/// Updates one version value inside a YAML file.
pub trait YamlUpdater: Send + Sync {
    /// Move the value at `target` from `current` to `new`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be located or rewritten.
    fn update(&self, target: &VersionFileTarget, current: &str, new: &str) -> Result<()>;
}

/// `VERSION` file access on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsVersionFile;

impl VersionReader for FsVersionFile {
    fn read_version(&self, path: &Path) -> Result<String> {
        read_version(path)
    }
}

impl VersionWriter for FsVersionFile {
    fn write_version(&self, path: &Path, version: &str) -> Result<()> {
        write_version(path, version)
    }
}

/// [`YamlUpdater`] backed by the format-preserving rewriter.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurgicalYamlUpdater;

impl YamlUpdater for SurgicalYamlUpdater {
    fn update(&self, target: &VersionFileTarget, current: &str, new: &str) -> Result<()> {
        yaml::update_yaml_file(target, current, new)
    }
}

/// Read and trim the version stored at `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and
/// [`Error::VersionFile`] if it contains only whitespace.
pub fn read_version(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let version = content.trim();
    if version.is_empty() {
        return Err(Error::version_file("VERSION file is empty", path));
    }
    debug!(path = %path.display(), version, "Read version");
    Ok(version.to_string())
}

/// Write `version` to `path` followed by a single newline.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be written.
pub fn write_version(path: &Path, version: &str) -> Result<()> {
    let version = version.trim();
    fs::write(path, format!("{version}\n")).map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), version, "Wrote version");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_version_trims() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("VERSION");
        fs::write(&path, "  0.7.1 \n\n").unwrap();
        assert_eq!(read_version(&path).unwrap(), "0.7.1");
    }

    #[test]
    fn test_read_version_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("VERSION");
        fs::write(&path, " \n").unwrap();
        let err = read_version(&path).unwrap_err();
        assert!(err.to_string().contains("VERSION file is empty"));
    }

    #[test]
    fn test_read_version_missing() {
        let temp = TempDir::new().unwrap();
        let err = read_version(&temp.path().join("VERSION")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_write_version_adds_newline() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("VERSION");
        write_version(&path, " 1.2.3 ").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "1.2.3\n");
    }

    #[test]
    fn test_fs_version_file_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("VERSION");
        let file = FsVersionFile;
        file.write_version(&path, "2.0.0").unwrap();
        assert_eq!(file.read_version(&path).unwrap(), "2.0.0");
    }

    #[test]
    fn test_surgical_updater() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Chart.yaml");
        fs::write(&path, "name: app\nappVersion: \"1.0.0\"\n").unwrap();

        let target = VersionFileTarget::new(&path, "appVersion");
        SurgicalYamlUpdater.update(&target, "1.0.0", "1.1.0").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "name: app\nappVersion: \"1.1.0\"\n"
        );
    }
}

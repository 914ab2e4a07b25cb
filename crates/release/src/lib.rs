//! Version bumping and surgical YAML version updates for relver.
//!
//! This crate holds everything a release needs that does not talk to GitHub:
//! reading and bumping the canonical `VERSION`, and moving every declared
//! copy of that version in YAML files (Helm charts, Kubernetes manifests,
//! CI configuration) to the new value without disturbing the rest of the file.
//!
//! # Architecture
//!
//! - [`version`] - Semantic version parsing, bumping and comparison
//! - [`version_file`] - The `VERSION` file and the I/O traits used by the pipeline
//! - [`target`] - `{file, path, prefix}` declarations of version locations
//! - [`yaml`] - Path parsing, value lookup, drift detection and text rewriting
//! - [`workspace_path`] - Keeps target paths inside the checkout
//!
//! # Example
//!
//! ```rust,ignore
//! use relver_release::{BumpType, Version, update_version_value};
//! use std::path::Path;
//!
//! let current: Version = "1.4.2".parse()?;
//! let next = current.bump(BumpType::Minor);
//!
//! update_version_value(
//!     Path::new("deploy/values.yaml"),
//!     "spec.containers[0].image",
//!     "v",
//!     &current.to_string(),
//!     &next.to_string(),
//! )?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod target;
pub mod version;
pub mod version_file;
pub mod workspace_path;
pub mod yaml;

pub use error::{Error, Result};
pub use target::{VersionFileTarget, parse_targets};
pub use version::{BumpType, Version, compare_versions, is_greater};
pub use version_file::{
    FsVersionFile, SurgicalYamlUpdater, VersionReader, VersionWriter, YamlUpdater, read_version,
    write_version,
};
pub use workspace_path::{validate_path, validate_path_relative};
pub use yaml::{update_version_value, update_yaml_content, update_yaml_file};

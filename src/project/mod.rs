//! Projects and per-project reference bookkeeping
//!
//! - `directory` - a project backed by a directory with a `project.json`
//! - `manager` - applies reference changes to one project and its local repository

mod directory;
mod manager;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::package::{Package, PackageVersion};

pub use directory::DirectoryProject;
pub use manager::{PackageProjectManager, ProjectManager};

#[cfg(test)]
pub use manager::MockProjectManager;

/// File name of a project's package reference file.
pub const REFERENCE_FILE: &str = "packages.json";

/// A package reference as the project itself records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectReference {
    pub id: String,
    pub version: PackageVersion,
    /// Install path of the package, relative to the project when possible.
    pub hint_path: PathBuf,
}

/// The project a package manager operates on.
#[cfg_attr(test, mockall::automock)]
pub trait ProjectSystem: Send + Sync {
    fn name(&self) -> String;

    fn directory(&self) -> PathBuf;

    fn solution_directory(&self) -> PathBuf;

    /// Resolve a path relative to the project directory.
    fn full_path(&self, relative: &Path) -> PathBuf;

    fn references(&self) -> Result<Vec<ProjectReference>>;

    /// Point the project at an installed package. Replaces any reference to
    /// another version of the same id.
    fn add_reference(&self, package: &Package, install_path: &Path) -> Result<()>;

    fn remove_reference(&self, package_id: &str) -> Result<()>;
}

//! Package repositories
//!
//! Source, shared and per-project repositories all implement [`PackageRepository`]:
//!
//! - `memory` - in-memory repository, loaded from a JSON feed for the source role
//! - `shared` - solution-wide physical store with reference counting
//! - `reference` - per-project view backed by a `packages.json` reference file
//!
//! `path` maps package identity to its on-disk location.

mod memory;
mod path;
mod reference;
mod shared;

use anyhow::Result;
use std::path::Path;

use crate::package::{Package, PackageVersion};

pub use memory::{Feed, MemoryRepository};
pub use path::{DefaultPathResolver, PathResolver};
pub use reference::{PackageReference, PackageReferenceRepository, ReferenceFile, ReferenceOptions};
pub use shared::{SharedRepositoryChange, SolutionSharedRepository};

#[cfg(test)]
pub use path::MockPathResolver;

/// A queryable, mutable collection of packages keyed by `(id, version)`.
#[cfg_attr(test, mockall::automock)]
pub trait PackageRepository: Send + Sync {
    fn packages(&self) -> Result<Vec<Package>>;

    fn add_package(&self, package: &Package) -> Result<()>;

    fn remove_package(&self, package: &Package) -> Result<()>;

    /// All versions of `id`, lowest first.
    fn find_packages_by_id(&self, id: &str) -> Result<Vec<Package>> {
        let mut found: Vec<Package> = self
            .packages()?
            .into_iter()
            .filter(|p| p.has_id(id))
            .collect();
        found.sort_by(|a, b| a.version().cmp(b.version()));
        Ok(found)
    }

    fn find_package(&self, id: &str, version: &PackageVersion) -> Result<Option<Package>> {
        Ok(self
            .find_packages_by_id(id)?
            .into_iter()
            .find(|p| p.version() == version))
    }

    /// Highest available version of `id`.
    fn find_latest(&self, id: &str) -> Result<Option<Package>> {
        Ok(self.find_packages_by_id(id)?.into_iter().next_back())
    }

    fn exists(&self, id: &str, version: &PackageVersion) -> Result<bool> {
        Ok(self.find_package(id, version)?.is_some())
    }
}

/// The solution-level store. Besides holding packages it tracks which
/// project reference files participate in reference counting.
pub trait SharedPackageRepository: PackageRepository {
    /// Record a project reference file. Registering twice is a no-op.
    fn register_repository(&self, path: &Path) -> Result<()>;

    fn unregister_repository(&self, path: &Path) -> Result<()>;

    /// True iff any registered reference file contains `id` at `version`.
    fn is_referenced(&self, id: &str, version: &PackageVersion) -> Result<bool>;
}

//! Shared fixtures for unit tests.

use anyhow::Result;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

use crate::package::{Dependency, Package, PackageVersion};
use crate::repository::{MemoryRepository, PackageRepository, SharedPackageRepository};

pub fn package(id: &str, version: &str) -> Package {
    Package::new(id, version.parse().unwrap())
}

pub fn dependency(id: &str, constraint: &str) -> Dependency {
    Dependency::new(id, constraint.parse().unwrap())
}

/// A shared repository that records how it was used.
///
/// Reference counting is simulated: ids passed to [`FakeSharedRepository::reference`]
/// are reported as referenced, everything else is not.
#[derive(Default)]
pub struct FakeSharedRepository {
    store: MemoryRepository,
    added: Mutex<Vec<Package>>,
    removed: Mutex<Vec<Package>>,
    registered: Mutex<Vec<PathBuf>>,
    referenced_ids: Mutex<Vec<String>>,
    is_referenced_calls: Mutex<Vec<(String, PackageVersion)>>,
}

impl FakeSharedRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_packages(packages: impl IntoIterator<Item = Package>) -> Self {
        Self {
            store: MemoryRepository::with_packages(packages),
            ..Self::default()
        }
    }

    /// Report `id` as referenced by another project.
    pub fn reference(&self, id: &str) {
        self.referenced_ids.lock().push(id.to_string());
    }

    pub fn added(&self) -> Vec<Package> {
        self.added.lock().clone()
    }

    pub fn removed(&self) -> Vec<Package> {
        self.removed.lock().clone()
    }

    pub fn registered(&self) -> Vec<PathBuf> {
        self.registered.lock().clone()
    }

    pub fn is_referenced_calls(&self) -> Vec<(String, PackageVersion)> {
        self.is_referenced_calls.lock().clone()
    }
}

impl PackageRepository for FakeSharedRepository {
    fn packages(&self) -> Result<Vec<Package>> {
        self.store.packages()
    }

    fn add_package(&self, package: &Package) -> Result<()> {
        self.added.lock().push(package.clone());
        self.store.add_package(package)
    }

    fn remove_package(&self, package: &Package) -> Result<()> {
        self.removed.lock().push(package.clone());
        self.store.remove_package(package)
    }
}

impl SharedPackageRepository for FakeSharedRepository {
    fn register_repository(&self, path: &Path) -> Result<()> {
        let mut registered = self.registered.lock();
        if !registered.iter().any(|p| p == path) {
            registered.push(path.to_path_buf());
        }
        Ok(())
    }

    fn unregister_repository(&self, path: &Path) -> Result<()> {
        self.registered.lock().retain(|p| p != path);
        Ok(())
    }

    fn is_referenced(&self, id: &str, version: &PackageVersion) -> Result<bool> {
        self.is_referenced_calls
            .lock()
            .push((id.to_string(), version.clone()));
        Ok(self
            .referenced_ids
            .lock()
            .iter()
            .any(|referenced| referenced.eq_ignore_ascii_case(id)))
    }
}

/// A solution on disk with one project and a feed file, for command tests.
pub struct Workspace {
    _dir: tempfile::TempDir,
    pub config: crate::commands::Config,
}

impl Workspace {
    pub fn new(packages: Vec<Package>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let solution_dir = dir.path().join("solution");
        let project_dir = solution_dir.join("App");
        std::fs::create_dir_all(&project_dir).unwrap();

        let feed = dir.path().join("feed.json");
        let content = serde_json::to_string_pretty(&crate::repository::Feed { packages }).unwrap();
        std::fs::write(&feed, content).unwrap();

        Self {
            _dir: dir,
            config: crate::commands::Config {
                solution_dir,
                project_dir,
                packages_dir: "packages".to_string(),
                feed,
            },
        }
    }

    /// Manifest written by the shared repository for `directory` (e.g. `Lib.1.0`).
    pub fn package_manifest(&self, directory: &str) -> PathBuf {
        self.config
            .packages_root()
            .join(directory)
            .join(format!("{}.json", directory))
    }

    pub fn reference_file(&self) -> PathBuf {
        self.config.project_dir.join(crate::project::REFERENCE_FILE)
    }

    /// Run the `install` command with default options.
    pub fn install(&self, spec: &str) -> Result<()> {
        crate::commands::install(
            std::sync::Arc::new(crate::runtime::RealRuntime),
            spec,
            crate::commands::InstallOptions::default(),
            &self.config,
        )
    }
}

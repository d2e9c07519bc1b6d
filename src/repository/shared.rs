//! Solution-wide shared package store.
//!
//! Layout under the root:
//!
//! ```text
//! <root>/
//! ├── repositories.json          # registered reference files, relative to root
//! └── <Id>.<Version>/
//!     └── <Id>.<Version>.json    # package manifest
//! ```

use anyhow::{Context, Result, bail};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::package::{Package, PackageVersion};
use crate::runtime::{
    Runtime, is_path_under, relative_path_from_dir, resolve_relative_path, write_with_parent,
};

use super::{PackageRepository, PathResolver, ReferenceFile, SharedPackageRepository};

const REGISTRATION_FILE: &str = "repositories.json";

/// A mutation of the physical store, delivered to observers in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharedRepositoryChange {
    Added(Package),
    Removed(Package),
}

type ChangeObserver = Box<dyn Fn(&SharedRepositoryChange) + Send + Sync>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Registrations {
    #[serde(default)]
    repositories: Vec<PathBuf>,
}

pub struct SolutionSharedRepository<R: Runtime> {
    runtime: Arc<R>,
    root: PathBuf,
    path_resolver: Arc<dyn PathResolver>,
    observers: Mutex<Vec<ChangeObserver>>,
    lock: Mutex<()>,
}

impl<R: Runtime> SolutionSharedRepository<R> {
    pub fn new(runtime: Arc<R>, root: PathBuf, path_resolver: Arc<dyn PathResolver>) -> Self {
        Self {
            runtime,
            root,
            path_resolver,
            observers: Mutex::new(Vec::new()),
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_resolver(&self) -> Arc<dyn PathResolver> {
        self.path_resolver.clone()
    }

    /// Subscribe to added/removed notifications.
    pub fn on_change<F>(&self, observer: F)
    where
        F: Fn(&SharedRepositoryChange) + Send + Sync + 'static,
    {
        self.observers.lock().push(Box::new(observer));
    }

    /// Absolute paths of the registered reference files.
    pub fn registered_repositories(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .load_registrations()?
            .repositories
            .iter()
            .map(|path| resolve_relative_path(&self.root, path))
            .collect())
    }

    fn registration_path(&self) -> PathBuf {
        self.root.join(REGISTRATION_FILE)
    }

    fn manifest_path(&self, package: &Package) -> PathBuf {
        self.path_resolver
            .install_path(package)
            .join(format!("{}.json", self.path_resolver.package_directory(package)))
    }

    fn load_registrations(&self) -> Result<Registrations> {
        let path = self.registration_path();
        if !self.runtime.exists(&path) {
            return Ok(Registrations::default());
        }
        let content = self.runtime.read_to_string(&path)?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    fn save_registrations(&self, registrations: &Registrations) -> Result<()> {
        let path = self.registration_path();
        if registrations.repositories.is_empty() {
            if self.runtime.exists(&path) {
                self.runtime.remove_file(&path)?;
            }
            return Ok(());
        }
        let content = serde_json::to_string_pretty(registrations)?;
        write_with_parent(self.runtime.as_ref(), &path, content.as_bytes())
            .with_context(|| format!("Failed to save {:?}", path))
    }

    /// Stored form of a reference file path: relative to the root when possible.
    fn stored_path(&self, path: &Path) -> PathBuf {
        relative_path_from_dir(&self.root, path).unwrap_or_else(|| path.to_path_buf())
    }

    /// Install path of `package`, refusing anything outside the root.
    fn checked_install_path(&self, package: &Package) -> Result<PathBuf> {
        let install_path = self.path_resolver.install_path(package);
        if !is_path_under(&install_path, &self.root) || install_path == self.root {
            bail!(
                "Refusing to remove {:?}: not inside the shared repository {:?}",
                install_path,
                self.root
            );
        }
        Ok(install_path)
    }

    fn load_manifest(&self, path: &Path) -> Result<Package> {
        let content = self.runtime.read_to_string(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse package manifest {:?}", path))
    }

    fn notify(&self, change: SharedRepositoryChange) {
        for observer in self.observers.lock().iter() {
            observer(&change);
        }
    }
}

impl<R: Runtime> PackageRepository for SolutionSharedRepository<R> {
    fn packages(&self) -> Result<Vec<Package>> {
        if !self.runtime.exists(&self.root) {
            return Ok(vec![]);
        }

        let mut packages = Vec::new();
        for entry in self.runtime.read_dir(&self.root)? {
            if !self.runtime.is_dir(&entry) {
                continue;
            }
            let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let manifest = entry.join(format!("{}.json", name));
            if !self.runtime.exists(&manifest) {
                log::debug!("Skipping {:?}: no package manifest", entry);
                continue;
            }
            match self.load_manifest(&manifest) {
                Ok(package) => packages.push(package),
                Err(e) => log::warn!("Failed to load package manifest {:?}: {}", manifest, e),
            }
        }
        Ok(packages)
    }

    fn add_package(&self, package: &Package) -> Result<()> {
        let _guard = self.lock.lock();
        if self.exists(package.id(), package.version())? {
            log::debug!("{} is already in the shared repository", package);
            return Ok(());
        }

        let manifest = self.manifest_path(package);
        let content = serde_json::to_string_pretty(package)?;
        write_with_parent(self.runtime.as_ref(), &manifest, content.as_bytes())
            .with_context(|| format!("Failed to add {} to the shared repository", package))?;
        log::info!("Added {} to {:?}", package, self.root);

        self.notify(SharedRepositoryChange::Added(package.clone()));
        Ok(())
    }

    fn remove_package(&self, package: &Package) -> Result<()> {
        let _guard = self.lock.lock();
        let mut install_path = self.checked_install_path(package)?;
        let mut stored = package.clone();

        if !self.runtime.exists(&install_path) {
            // Stored under another spelling, e.g. "test 1.0.0.0" for "Test.1.0"
            let Some(found) = self
                .packages()?
                .into_iter()
                .find(|p| p.is(package.id(), package.version()))
            else {
                log::debug!("{} is not in the shared repository", package);
                return Ok(());
            };
            install_path = self.checked_install_path(&found)?;
            stored = found;
        }

        self.runtime.remove_dir_all(&install_path)?;
        log::info!("Removed {} from {:?}", stored, self.root);

        self.notify(SharedRepositoryChange::Removed(stored));
        Ok(())
    }

    fn exists(&self, id: &str, version: &PackageVersion) -> Result<bool> {
        let candidate = Package::new(id, version.clone());
        if self.runtime.exists(&self.manifest_path(&candidate)) {
            return Ok(true);
        }
        // Same version written differently, e.g. "1.0" and "1.0.0.0"
        Ok(self.packages()?.iter().any(|p| p.is(id, version)))
    }
}

impl<R: Runtime> SharedPackageRepository for SolutionSharedRepository<R> {
    fn register_repository(&self, path: &Path) -> Result<()> {
        let _guard = self.lock.lock();
        let stored = self.stored_path(path);
        let mut registrations = self.load_registrations()?;
        if registrations.repositories.contains(&stored) {
            return Ok(());
        }
        log::debug!("Registering reference file {:?}", path);
        registrations.repositories.push(stored);
        self.save_registrations(&registrations)
    }

    fn unregister_repository(&self, path: &Path) -> Result<()> {
        let _guard = self.lock.lock();
        let stored = self.stored_path(path);
        let mut registrations = self.load_registrations()?;
        let before = registrations.repositories.len();
        registrations.repositories.retain(|p| p != &stored);
        if registrations.repositories.len() == before {
            return Ok(());
        }
        log::debug!("Unregistering reference file {:?}", path);
        self.save_registrations(&registrations)
    }

    fn is_referenced(&self, id: &str, version: &PackageVersion) -> Result<bool> {
        for path in self.registered_repositories()? {
            if !self.runtime.exists(&path) {
                log::debug!("Registered reference file {:?} does not exist", path);
                continue;
            }
            if ReferenceFile::load(self.runtime.as_ref(), &path)?.contains(id, version) {
                log::debug!("{} {} is referenced by {:?}", id, version, path);
                return Ok(true);
            }
        }
        Ok(false)
    }
}

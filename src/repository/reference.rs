//! Per-project reference file and the local repository built on it.
//!
//! A project's `packages.json` lists the packages it references. Package content
//! lives in the shared repository; this file only records identities and the
//! flags each reference was created with.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::package::{Package, PackageVersion};
use crate::runtime::{Runtime, write_with_parent};

use super::{PackageRepository, SharedPackageRepository};

fn is_false(value: &bool) -> bool {
    !*value
}

fn default_explicit() -> bool {
    true
}

/// One entry of a project reference file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReference {
    pub id: String,
    pub version: PackageVersion,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore_dependencies: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_prerelease: bool,
    /// False when the package was pulled in as a dependency.
    #[serde(default = "default_explicit")]
    pub explicit: bool,
}

impl PackageReference {
    pub fn new(package: &Package, options: ReferenceOptions) -> Self {
        Self {
            id: package.id().to_string(),
            version: package.version().clone(),
            ignore_dependencies: options.ignore_dependencies,
            allow_prerelease: options.allow_prerelease,
            explicit: options.explicit,
        }
    }

    pub fn is(&self, id: &str, version: &PackageVersion) -> bool {
        self.id.eq_ignore_ascii_case(id) && &self.version == version
    }
}

/// Flags recorded alongside a reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceOptions {
    pub ignore_dependencies: bool,
    pub allow_prerelease: bool,
    pub explicit: bool,
}

/// Contents of a `packages.json` reference file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ReferenceFile {
    #[serde(default)]
    pub packages: Vec<PackageReference>,
}

impl ReferenceFile {
    /// Load a reference file. A missing file has no references.
    pub fn load<R: Runtime + ?Sized>(runtime: &R, path: &Path) -> Result<Self> {
        if !runtime.exists(path) {
            return Ok(Self::default());
        }
        let content = runtime.read_to_string(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse reference file {:?}", path))
    }

    /// Save the reference file, deleting it once it holds no references.
    pub fn save<R: Runtime + ?Sized>(&self, runtime: &R, path: &Path) -> Result<()> {
        if self.packages.is_empty() {
            if runtime.exists(path) {
                runtime.remove_file(path)?;
            }
            return Ok(());
        }
        let content = serde_json::to_string_pretty(self)?;
        write_with_parent(runtime, path, content.as_bytes())
            .with_context(|| format!("Failed to save reference file {:?}", path))
    }

    pub fn contains(&self, id: &str, version: &PackageVersion) -> bool {
        self.packages.iter().any(|r| r.is(id, version))
    }

    pub fn find(&self, id: &str) -> Option<&PackageReference> {
        self.packages.iter().find(|r| r.id.eq_ignore_ascii_case(id))
    }

    /// Insert a reference, replacing any other version of the same id.
    pub fn upsert(&mut self, reference: PackageReference) -> Option<PackageReference> {
        match self
            .packages
            .iter_mut()
            .find(|r| r.id.eq_ignore_ascii_case(&reference.id))
        {
            Some(existing) => Some(std::mem::replace(existing, reference)),
            None => {
                self.packages.push(reference);
                None
            }
        }
    }

    pub fn remove(&mut self, id: &str, version: &PackageVersion) -> bool {
        let before = self.packages.len();
        self.packages.retain(|r| !r.is(id, version));
        self.packages.len() != before
    }
}

/// The local repository of one project.
///
/// Registered with the shared repository while its reference file exists,
/// so the shared store counts this project's references.
pub struct PackageReferenceRepository<R: Runtime> {
    runtime: Arc<R>,
    path: PathBuf,
    shared: Arc<dyn SharedPackageRepository>,
    lock: Mutex<()>,
}

impl<R: Runtime> PackageReferenceRepository<R> {
    pub fn new(
        runtime: Arc<R>,
        path: PathBuf,
        shared: Arc<dyn SharedPackageRepository>,
    ) -> Result<Self> {
        if runtime.exists(&path) {
            shared.register_repository(&path)?;
        }
        Ok(Self {
            runtime,
            path,
            shared,
            lock: Mutex::new(()),
        })
    }

    /// Path of the reference file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn shared_repository(&self) -> Arc<dyn SharedPackageRepository> {
        self.shared.clone()
    }

    pub fn references(&self) -> Result<Vec<PackageReference>> {
        Ok(ReferenceFile::load(self.runtime.as_ref(), &self.path)?.packages)
    }

    pub fn reference(&self, id: &str) -> Result<Option<PackageReference>> {
        Ok(ReferenceFile::load(self.runtime.as_ref(), &self.path)?
            .find(id)
            .cloned())
    }

    /// Record `package`, replacing a reference to another version of it.
    pub fn add_reference(&self, package: &Package, options: ReferenceOptions) -> Result<()> {
        let _guard = self.lock.lock();
        let mut file = ReferenceFile::load(self.runtime.as_ref(), &self.path)?;
        if let Some(previous) = file.upsert(PackageReference::new(package, options))
            && previous.version != *package.version()
        {
            log::debug!(
                "Replaced reference {} {} with {}",
                previous.id,
                previous.version,
                package.version()
            );
        }
        file.save(self.runtime.as_ref(), &self.path)?;
        self.shared.register_repository(&self.path)
    }

    /// Drop the reference. Removing the last one unregisters the project.
    pub fn remove_reference(&self, package: &Package) -> Result<()> {
        let _guard = self.lock.lock();
        let mut file = ReferenceFile::load(self.runtime.as_ref(), &self.path)?;
        if !file.remove(package.id(), package.version()) {
            log::debug!("{} is not referenced by {:?}", package, self.path);
            return Ok(());
        }
        file.save(self.runtime.as_ref(), &self.path)?;
        if file.packages.is_empty() {
            self.shared.unregister_repository(&self.path)?;
        }
        Ok(())
    }
}

impl<R: Runtime> PackageRepository for PackageReferenceRepository<R> {
    fn packages(&self) -> Result<Vec<Package>> {
        let mut packages = Vec::new();
        for reference in self.references()? {
            match self.shared.find_package(&reference.id, &reference.version)? {
                Some(package) => packages.push(package),
                None => {
                    log::warn!(
                        "{} {} is referenced by {:?} but missing from the shared repository",
                        reference.id,
                        reference.version,
                        self.path
                    );
                    packages.push(Package::new(reference.id, reference.version));
                }
            }
        }
        Ok(packages)
    }

    fn add_package(&self, package: &Package) -> Result<()> {
        self.add_reference(
            package,
            ReferenceOptions {
                explicit: true,
                ..Default::default()
            },
        )
    }

    fn remove_package(&self, package: &Package) -> Result<()> {
        self.remove_reference(package)
    }

    fn exists(&self, id: &str, version: &PackageVersion) -> Result<bool> {
        Ok(ReferenceFile::load(self.runtime.as_ref(), &self.path)?.contains(id, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Dependency;
    use crate::runtime::RealRuntime;
    use crate::test_utils::{FakeSharedRepository, package};
    use tempfile::tempdir;

    fn local(
        dir: &Path,
        shared: &Arc<FakeSharedRepository>,
    ) -> PackageReferenceRepository<RealRuntime> {
        PackageReferenceRepository::new(
            Arc::new(RealRuntime),
            dir.join("MyProject").join("packages.json"),
            shared.clone(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_registers_existing_reference_file_with_shared_repository() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MyProject").join("packages.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "packages": [{ "id": "Test", "version": "1.0" }] }"#).unwrap();
        let shared = Arc::new(FakeSharedRepository::new());

        let repository = local(dir.path(), &shared);

        assert_eq!(shared.registered(), vec![repository.path().to_path_buf()]);
    }

    #[test]
    fn test_new_without_reference_file_registers_on_first_reference() {
        let dir = tempdir().unwrap();
        let shared = Arc::new(FakeSharedRepository::new());

        let repository = local(dir.path(), &shared);
        assert!(shared.registered().is_empty());

        repository
            .add_reference(&package("Test", "1.0"), ReferenceOptions::default())
            .unwrap();
        assert_eq!(shared.registered(), vec![repository.path().to_path_buf()]);
    }

    #[test]
    fn test_add_reference_persists_flags() {
        let dir = tempdir().unwrap();
        let shared = Arc::new(FakeSharedRepository::new());
        let repository = local(dir.path(), &shared);

        repository
            .add_reference(
                &package("Test", "1.0"),
                ReferenceOptions {
                    ignore_dependencies: true,
                    allow_prerelease: true,
                    explicit: false,
                },
            )
            .unwrap();

        let reference = repository.reference("test").unwrap().unwrap();
        assert!(reference.ignore_dependencies);
        assert!(reference.allow_prerelease);
        assert!(!reference.explicit);
        assert!(repository.path().exists());
    }

    #[test]
    fn test_add_reference_replaces_other_version() {
        let dir = tempdir().unwrap();
        let shared = Arc::new(FakeSharedRepository::new());
        let repository = local(dir.path(), &shared);

        repository.add_package(&package("Test", "1.0")).unwrap();
        repository.add_package(&package("Test", "1.1")).unwrap();

        let references = repository.references().unwrap();
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].version.to_string(), "1.1");
        assert!(!repository.exists("Test", &"1.0".parse().unwrap()).unwrap());
        assert!(repository.exists("Test", &"1.1".parse().unwrap()).unwrap());
    }

    #[test]
    fn test_packages_resolve_manifests_from_shared_repository() {
        let dir = tempdir().unwrap();
        let app =
            package("App", "1.0").with_dependency(Dependency::new("Lib", "1.0".parse().unwrap()));
        let shared = Arc::new(FakeSharedRepository::with_packages([app.clone()]));
        let repository = local(dir.path(), &shared);

        repository.add_package(&app).unwrap();
        repository.add_package(&package("Orphan", "2.0")).unwrap();

        let packages = repository.packages().unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].dependencies().len(), 1);
        // Missing from the shared repository, so no manifest to read dependencies from
        assert!(packages[1].dependencies().is_empty());
    }

    #[test]
    fn test_removing_last_reference_deletes_file_and_unregisters() {
        let dir = tempdir().unwrap();
        let shared = Arc::new(FakeSharedRepository::new());
        let repository = local(dir.path(), &shared);
        let first = package("First", "1.0");
        let second = package("Second", "1.0");

        repository.add_package(&first).unwrap();
        repository.add_package(&second).unwrap();

        repository.remove_package(&first).unwrap();
        assert!(repository.path().exists());
        assert_eq!(shared.registered().len(), 1);

        repository.remove_package(&second).unwrap();
        assert!(!repository.path().exists());
        assert!(shared.registered().is_empty());
    }

    #[test]
    fn test_reference_file_defaults_explicit_to_true() {
        let json = r#"{ "packages": [{ "id": "Test", "version": "1.0" }] }"#;
        let file: ReferenceFile = serde_json::from_str(json).unwrap();

        assert!(file.packages[0].explicit);
        assert!(!file.packages[0].ignore_dependencies);
        assert!(file.contains("TEST", &"1.0.0.0".parse().unwrap()));
    }
}

//! Reference bookkeeping for one project.
//!
//! The package manager applies operations to the shared repository; this
//! module records the outcome in the project's local repository and in the
//! project itself, cascading to dependencies.

use std::path::Path;
use std::sync::Arc;

use crate::logger::Logger;
use crate::package::Package;
use crate::repository::{
    PackageReferenceRepository, PackageRepository, PathResolver, ReferenceOptions,
    SharedPackageRepository,
};
use crate::resolver::{InstallWalker, OperationResolver, UninstallWalker, collect_orphans};
use crate::runtime::Runtime;
use crate::{Error, Result};

use super::{ProjectSystem, REFERENCE_FILE};

#[cfg_attr(test, mockall::automock)]
pub trait ProjectManager: Send + Sync {
    fn project(&self) -> Arc<dyn ProjectSystem>;

    /// The project's local repository.
    fn local_repository(&self) -> Arc<dyn PackageRepository>;

    /// The shared repository the local repository is registered with.
    fn source_repository(&self) -> Arc<dyn SharedPackageRepository>;

    fn path_resolver(&self) -> Arc<dyn PathResolver>;

    fn add_package_reference(
        &self,
        package: &Package,
        ignore_dependencies: bool,
        allow_prerelease: bool,
    ) -> Result<()>;

    fn update_package_reference(
        &self,
        package: &Package,
        update_dependencies: bool,
        allow_prerelease: bool,
    ) -> Result<()>;

    fn remove_package_reference(
        &self,
        package: &Package,
        force: bool,
        remove_dependencies: bool,
    ) -> Result<()>;
}

/// Project manager backed by a `packages.json` reference file.
pub struct PackageProjectManager<R: Runtime> {
    project: Arc<dyn ProjectSystem>,
    local: Arc<PackageReferenceRepository<R>>,
    shared: Arc<dyn SharedPackageRepository>,
    path_resolver: Arc<dyn PathResolver>,
    logger: Arc<dyn Logger>,
}

impl<R: Runtime + 'static> PackageProjectManager<R> {
    /// Create the manager. The project's reference file is registered with the
    /// shared repository once it exists.
    pub fn new(
        runtime: Arc<R>,
        project: Arc<dyn ProjectSystem>,
        shared: Arc<dyn SharedPackageRepository>,
        path_resolver: Arc<dyn PathResolver>,
        logger: Arc<dyn Logger>,
    ) -> Result<Self> {
        let reference_file = project.full_path(Path::new(REFERENCE_FILE));
        let local = PackageReferenceRepository::new(runtime, reference_file, shared.clone())?;
        Ok(Self {
            project,
            local: Arc::new(local),
            shared,
            path_resolver,
            logger,
        })
    }

    pub fn reference_repository(&self) -> &PackageReferenceRepository<R> {
        &self.local
    }

    fn install_walker(&self, ignore_dependencies: bool, allow_prerelease: bool) -> InstallWalker {
        let shared: Arc<dyn PackageRepository> = self.shared.clone();
        InstallWalker::new(
            self.local_repository(),
            shared,
            self.logger.clone(),
            ignore_dependencies,
            allow_prerelease,
        )
    }

    /// Reference `package` and every package of its closure not yet referenced.
    fn reference_closure(
        &self,
        package: &Package,
        ignore_dependencies: bool,
        allow_prerelease: bool,
        explicit: bool,
    ) -> Result<()> {
        let operations = self
            .install_walker(ignore_dependencies, allow_prerelease)
            .resolve_operations(package)?;

        let options = ReferenceOptions {
            ignore_dependencies,
            allow_prerelease,
            explicit: false,
        };
        for operation in operations.iter().filter(|op| op.package != *package) {
            // A new version of a directly referenced package stays direct
            let direct = self
                .local
                .reference(operation.package.id())?
                .is_some_and(|r| r.explicit);
            let dependency_options = ReferenceOptions {
                explicit: direct,
                ..options
            };
            self.add_reference(&operation.package, dependency_options)?;
        }
        self.add_reference(package, ReferenceOptions { explicit, ..options })
    }

    fn add_reference(&self, package: &Package, options: ReferenceOptions) -> Result<()> {
        let install_path = self.path_resolver.install_path(package);
        self.local
            .add_reference(package, options)
            .and_then(|()| self.project.add_reference(package, &install_path))
            .map_err(|source| Error::Reference {
                package: package.clone(),
                source,
            })?;
        log::info!("Added reference to {} in project {}", package, self.project.name());
        Ok(())
    }

    fn remove_reference(&self, package: &Package) -> Result<()> {
        self.local
            .remove_reference(package)
            .and_then(|()| self.project.remove_reference(package.id()))
            .map_err(|source| Error::Reference {
                package: package.clone(),
                source,
            })?;
        log::info!("Removed reference to {} from project {}", package, self.project.name());
        Ok(())
    }

    /// Packages the project asked for directly, other than `except`.
    fn explicit_references(&self, except: &Package) -> Result<Vec<Package>> {
        Ok(self
            .local
            .references()?
            .into_iter()
            .filter(|r| r.explicit && !r.is(except.id(), except.version()))
            .map(|r| Package::new(r.id, r.version))
            .collect())
    }
}

impl<R: Runtime + 'static> ProjectManager for PackageProjectManager<R> {
    fn project(&self) -> Arc<dyn ProjectSystem> {
        self.project.clone()
    }

    fn local_repository(&self) -> Arc<dyn PackageRepository> {
        self.local.clone()
    }

    fn source_repository(&self) -> Arc<dyn SharedPackageRepository> {
        self.shared.clone()
    }

    fn path_resolver(&self) -> Arc<dyn PathResolver> {
        self.path_resolver.clone()
    }

    fn add_package_reference(
        &self,
        package: &Package,
        ignore_dependencies: bool,
        allow_prerelease: bool,
    ) -> Result<()> {
        self.reference_closure(package, ignore_dependencies, allow_prerelease, true)
    }

    fn update_package_reference(
        &self,
        package: &Package,
        update_dependencies: bool,
        allow_prerelease: bool,
    ) -> Result<()> {
        let previous: Vec<Package> = self
            .local
            .find_packages_by_id(package.id())?
            .into_iter()
            .filter(|p| p != package)
            .collect();
        let explicit = self
            .local
            .reference(package.id())?
            .is_none_or(|r| r.explicit);

        self.reference_closure(package, !update_dependencies, allow_prerelease, explicit)?;

        if update_dependencies && !previous.is_empty() {
            let installed = self.local.packages()?;
            let retained = self.explicit_references(package)?;
            let mut removing = previous.clone();
            collect_orphans(&installed, &mut removing, &retained);
            for orphan in &removing[previous.len()..] {
                self.remove_reference(orphan)?;
            }
        }
        Ok(())
    }

    fn remove_package_reference(
        &self,
        package: &Package,
        force: bool,
        remove_dependencies: bool,
    ) -> Result<()> {
        let retained = if remove_dependencies {
            self.explicit_references(package)?
        } else {
            Vec::new()
        };
        let walker = UninstallWalker::new(
            self.local_repository(),
            self.logger.clone(),
            force,
            remove_dependencies,
        );
        let operations = walker.with_retained(retained).resolve_operations(package)?;

        for operation in &operations {
            self.remove_reference(&operation.package)?;
        }
        Ok(())
    }
}

//! Package manager
//!
//! Top-level orchestration of install, update and uninstall requests:
//!
//! 1. Resolve the plan (caller-supplied or through the resolver factory)
//! 2. Apply it to the shared repository
//! 3. Record references through the project manager
//! 4. Raise lifecycle events
//!
//! Uninstall records the reference removal before touching the shared
//! repository so that reference counting no longer sees this project.

mod action;
mod events;

use std::sync::Arc;

use crate::logger::{LogForwarder, Logger};
use crate::package::{Operation, Package, PackageAction};
use crate::project::{PackageProjectManager, ProjectManager, ProjectSystem};
use crate::repository::{PackageRepository, PathResolver, SharedPackageRepository};
use crate::resolver::{
    OperationResolver, OperationResolverFactory, PreResolvedOperations, UpdatePackageSettings,
};
use crate::runtime::Runtime;
use crate::{Error, Result};

pub use action::{InstallAction, UpdatePackageAction, UpdatePackagesAction};
pub use events::{PackageEvents, PackageOperationEvent};

pub struct PackageManager {
    source: Arc<dyn PackageRepository>,
    shared: Arc<dyn SharedPackageRepository>,
    path_resolver: Arc<dyn PathResolver>,
    resolver_factory: Box<dyn OperationResolverFactory>,
    project_manager: Box<dyn ProjectManager>,
    logger: Arc<dyn Logger>,
    events: PackageEvents,
}

impl PackageManager {
    /// Create a package manager for `project`. An existing reference file of
    /// the project is registered with `shared`.
    pub fn new<R: Runtime + 'static>(
        runtime: Arc<R>,
        source: Arc<dyn PackageRepository>,
        project: Arc<dyn ProjectSystem>,
        shared: Arc<dyn SharedPackageRepository>,
        path_resolver: Arc<dyn PathResolver>,
        resolver_factory: Box<dyn OperationResolverFactory>,
    ) -> Result<Self> {
        let logger: Arc<dyn Logger> = Arc::new(LogForwarder);
        let project_manager = PackageProjectManager::new(
            runtime,
            project,
            shared.clone(),
            path_resolver.clone(),
            logger.clone(),
        )?;

        Ok(Self {
            source,
            shared,
            path_resolver,
            resolver_factory,
            project_manager: Box::new(project_manager),
            logger,
            events: PackageEvents::default(),
        })
    }

    pub fn source_repository(&self) -> Arc<dyn PackageRepository> {
        self.source.clone()
    }

    pub fn shared_repository(&self) -> Arc<dyn SharedPackageRepository> {
        self.shared.clone()
    }

    /// The project's local repository, as held by the project manager.
    pub fn local_repository(&self) -> Arc<dyn PackageRepository> {
        self.project_manager.local_repository()
    }

    pub fn path_resolver(&self) -> Arc<dyn PathResolver> {
        self.path_resolver.clone()
    }

    pub fn project_manager(&self) -> &dyn ProjectManager {
        self.project_manager.as_ref()
    }

    pub fn set_project_manager(&mut self, project_manager: Box<dyn ProjectManager>) {
        self.project_manager = project_manager;
    }

    pub fn logger(&self) -> Arc<dyn Logger> {
        self.logger.clone()
    }

    /// Replace the logger handed to resolvers.
    pub fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = logger;
    }

    pub fn on_package_installed<F>(&mut self, handler: F)
    where
        F: Fn(&PackageOperationEvent) + Send + Sync + 'static,
    {
        self.events.on_installed(Box::new(handler));
    }

    pub fn on_package_uninstalled<F>(&mut self, handler: F)
    where
        F: Fn(&PackageOperationEvent) + Send + Sync + 'static,
    {
        self.events.on_uninstalled(Box::new(handler));
    }

    pub fn install_package(
        &self,
        package: &Package,
        ignore_dependencies: bool,
        allow_prerelease: bool,
    ) -> Result<()> {
        let operations =
            self.get_install_package_operations(package, ignore_dependencies, allow_prerelease)?;
        self.execute_install(package, &operations, ignore_dependencies, allow_prerelease)
    }

    /// Install with the plan supplied by `action`, resolving only when it has none.
    pub fn install_package_with_action(
        &self,
        package: &Package,
        action: &InstallAction,
    ) -> Result<()> {
        let operations = match &action.operations {
            Some(operations) => {
                PreResolvedOperations::new(operations.clone()).resolve_operations(package)?
            }
            None => self.get_install_package_operations(
                package,
                action.ignore_dependencies,
                action.allow_prerelease_versions,
            )?,
        };
        self.execute_install(
            package,
            &operations,
            action.ignore_dependencies,
            action.allow_prerelease_versions,
        )
    }

    /// Dry run of an install.
    pub fn get_install_package_operations(
        &self,
        package: &Package,
        ignore_dependencies: bool,
        allow_prerelease: bool,
    ) -> Result<Vec<Operation>> {
        self.resolver_factory
            .create_install_resolver(
                self.local_repository(),
                self.source.clone(),
                self.logger.clone(),
                ignore_dependencies,
                allow_prerelease,
            )
            .resolve_operations(package)
    }

    pub fn uninstall_package(
        &self,
        package: &Package,
        force_remove: bool,
        remove_dependencies: bool,
    ) -> Result<()> {
        let operations = self
            .resolver_factory
            .create_uninstall_resolver(
                self.local_repository(),
                self.logger.clone(),
                force_remove,
                remove_dependencies,
            )
            .resolve_operations(package)?;

        self.project_manager
            .remove_package_reference(package, force_remove, remove_dependencies)?;
        self.run_package_operations(&operations)?;

        self.events.raise_uninstalled(&self.event_for(package));
        Ok(())
    }

    pub fn update_package(&self, package: &Package, action: &UpdatePackageAction) -> Result<()> {
        let operations = match &action.operations {
            Some(operations) => operations.clone(),
            None => {
                let packages = std::slice::from_ref(package);
                self.get_update_package_operations(packages, action.settings())?
            }
        };
        let before = self.local_repository().packages()?;

        self.run_package_operations(&operations)?;
        self.project_manager.update_package_reference(
            package,
            action.update_dependencies,
            action.allow_prerelease_versions,
        )?;
        self.remove_dropped(&before)?;

        self.events.raise_installed(&self.event_for(package));
        Ok(())
    }

    /// Apply every operation of the batch, then update references in package order.
    ///
    /// Events are raised once all references are updated.
    pub fn update_packages(&self, action: &UpdatePackagesAction) -> Result<()> {
        let before = self.local_repository().packages()?;

        self.run_package_operations(&action.operations)?;
        for package in &action.packages {
            self.project_manager.update_package_reference(
                package,
                action.settings.update_dependencies,
                action.settings.allow_prerelease_versions,
            )?;
        }
        self.remove_dropped(&before)?;

        for package in &action.packages {
            self.events.raise_installed(&self.event_for(package));
        }
        Ok(())
    }

    /// Plans for every package in input order, without duplicates.
    pub fn get_update_package_operations(
        &self,
        packages: &[Package],
        settings: UpdatePackageSettings,
    ) -> Result<Vec<Operation>> {
        let resolver = self.resolver_factory.create_update_resolver(
            self.local_repository(),
            self.source.clone(),
            self.logger.clone(),
            settings,
        );

        let mut operations: Vec<Operation> = Vec::new();
        for package in packages {
            for operation in resolver.resolve_operations(package)? {
                if !operations.contains(&operation) {
                    operations.push(operation);
                }
            }
        }
        Ok(operations)
    }

    /// Apply operations to the shared repository in order.
    ///
    /// Uninstalls are skipped while any project still references the package.
    /// On failure, earlier operations stay applied.
    pub fn run_package_operations(&self, operations: &[Operation]) -> Result<()> {
        for (index, operation) in operations.iter().enumerate() {
            let result = match operation.action {
                PackageAction::Install => self.shared.add_package(&operation.package),
                PackageAction::Uninstall => self.remove_if_unreferenced(&operation.package),
            };
            if let Err(source) = result {
                return Err(Error::Apply {
                    operation: operation.clone(),
                    remaining: operations[index..].to_vec(),
                    source,
                });
            }
        }
        Ok(())
    }

    fn execute_install(
        &self,
        package: &Package,
        operations: &[Operation],
        ignore_dependencies: bool,
        allow_prerelease: bool,
    ) -> Result<()> {
        let before = self.local_repository().packages()?;

        self.run_package_operations(operations)?;
        self.project_manager
            .add_package_reference(package, ignore_dependencies, allow_prerelease)?;
        self.remove_dropped(&before)?;

        self.events.raise_installed(&self.event_for(package));
        Ok(())
    }

    fn remove_if_unreferenced(&self, package: &Package) -> anyhow::Result<()> {
        if self.shared.is_referenced(package.id(), package.version())? {
            log::info!("{} is still referenced by another project, keeping it", package);
            return Ok(());
        }
        self.shared.remove_package(package)
    }

    /// Remove packages the project stopped referencing, e.g. replaced versions
    /// and orphaned dependencies, unless another project still uses them.
    fn remove_dropped(&self, before: &[Package]) -> Result<()> {
        let after = self.local_repository().packages()?;
        for package in before.iter().filter(|p| !after.contains(p)) {
            self.remove_if_unreferenced(package)?;
        }
        Ok(())
    }

    fn event_for(&self, package: &Package) -> PackageOperationEvent {
        PackageOperationEvent {
            package: package.clone(),
            install_path: self.path_resolver.install_path(package),
        }
    }
}

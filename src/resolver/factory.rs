//! Resolver factory.
//!
//! The package manager never builds resolvers directly; it asks this
//! factory so the resolution strategy can be swapped without touching the
//! orchestration logic.

use std::sync::Arc;

use crate::logger::Logger;
use crate::repository::PackageRepository;

use super::{InstallWalker, OperationResolver, UninstallWalker, UpdatePackageSettings, UpdateWalker};

#[cfg_attr(test, mockall::automock)]
pub trait OperationResolverFactory: Send + Sync {
    fn create_install_resolver(
        &self,
        local: Arc<dyn PackageRepository>,
        source: Arc<dyn PackageRepository>,
        logger: Arc<dyn Logger>,
        ignore_dependencies: bool,
        allow_prerelease: bool,
    ) -> Box<dyn OperationResolver>;

    fn create_update_resolver(
        &self,
        local: Arc<dyn PackageRepository>,
        source: Arc<dyn PackageRepository>,
        logger: Arc<dyn Logger>,
        settings: UpdatePackageSettings,
    ) -> Box<dyn OperationResolver>;

    fn create_uninstall_resolver(
        &self,
        local: Arc<dyn PackageRepository>,
        logger: Arc<dyn Logger>,
        force: bool,
        remove_dependencies: bool,
    ) -> Box<dyn OperationResolver>;
}

/// Builds the walker resolvers.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultResolverFactory;

impl OperationResolverFactory for DefaultResolverFactory {
    fn create_install_resolver(
        &self,
        local: Arc<dyn PackageRepository>,
        source: Arc<dyn PackageRepository>,
        logger: Arc<dyn Logger>,
        ignore_dependencies: bool,
        allow_prerelease: bool,
    ) -> Box<dyn OperationResolver> {
        Box::new(InstallWalker::new(
            local,
            source,
            logger,
            ignore_dependencies,
            allow_prerelease,
        ))
    }

    fn create_update_resolver(
        &self,
        local: Arc<dyn PackageRepository>,
        source: Arc<dyn PackageRepository>,
        logger: Arc<dyn Logger>,
        settings: UpdatePackageSettings,
    ) -> Box<dyn OperationResolver> {
        Box::new(UpdateWalker::new(local, source, logger, settings))
    }

    fn create_uninstall_resolver(
        &self,
        local: Arc<dyn PackageRepository>,
        logger: Arc<dyn Logger>,
        force: bool,
        remove_dependencies: bool,
    ) -> Box<dyn OperationResolver> {
        Box::new(UninstallWalker::new(local, logger, force, remove_dependencies))
    }
}

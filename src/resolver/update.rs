use std::sync::Arc;

use crate::Result;
use crate::logger::Logger;
use crate::package::{Operation, Package};
use crate::repository::PackageRepository;

use super::{InstallWalker, OperationResolver};

/// Flags shared by every package of an update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatePackageSettings {
    pub update_dependencies: bool,
    pub allow_prerelease_versions: bool,
}

impl Default for UpdatePackageSettings {
    fn default() -> Self {
        Self {
            update_dependencies: true,
            allow_prerelease_versions: false,
        }
    }
}

/// Resolves updates as installs of the new version.
pub struct UpdateWalker {
    settings: UpdatePackageSettings,
    install: InstallWalker,
}

impl UpdateWalker {
    pub fn new(
        local: Arc<dyn PackageRepository>,
        source: Arc<dyn PackageRepository>,
        logger: Arc<dyn Logger>,
        settings: UpdatePackageSettings,
    ) -> Self {
        Self {
            settings,
            install: InstallWalker::new(
                local,
                source,
                logger,
                !settings.update_dependencies,
                settings.allow_prerelease_versions,
            ),
        }
    }

    pub fn settings(&self) -> UpdatePackageSettings {
        self.settings
    }
}

impl OperationResolver for UpdateWalker {
    fn resolve_operations(&self, package: &Package) -> Result<Vec<Operation>> {
        self.install.resolve_operations(package)
    }
}

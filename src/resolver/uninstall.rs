use std::sync::Arc;

use crate::logger::{LogLevel, Logger};
use crate::package::{Operation, Package};
use crate::repository::PackageRepository;
use crate::{Error, Result};

use super::OperationResolver;

/// Computes the removal plan for a package installed in a local repository.
pub struct UninstallWalker {
    local: Arc<dyn PackageRepository>,
    logger: Arc<dyn Logger>,
    force: bool,
    remove_dependencies: bool,
    retained: Vec<Package>,
}

impl UninstallWalker {
    pub fn new(
        local: Arc<dyn PackageRepository>,
        logger: Arc<dyn Logger>,
        force: bool,
        remove_dependencies: bool,
    ) -> Self {
        Self {
            local,
            logger,
            force,
            remove_dependencies,
            retained: Vec::new(),
        }
    }

    /// Packages that stay installed even when nothing depends on them.
    pub fn with_retained(mut self, retained: Vec<Package>) -> Self {
        self.retained = retained;
        self
    }
}

/// Extend `removing` with the dependencies of its packages that nothing left
/// in `installed` still needs. A package joins only once every remaining
/// package stops needing it, so it always follows its dependents.
pub(crate) fn collect_orphans(
    installed: &[Package],
    removing: &mut Vec<Package>,
    retained: &[Package],
) {
    loop {
        let orphan = installed.iter().find(|candidate| {
            !removing.contains(candidate)
                && !retained.contains(candidate)
                && removing.iter().any(|r| r.depends_on(candidate))
                && !installed
                    .iter()
                    .filter(|p| !removing.contains(p))
                    .any(|p| p.depends_on(candidate))
        });

        match orphan {
            Some(orphan) => {
                log::debug!("{} is no longer needed", orphan);
                removing.push(orphan.clone());
            }
            None => break,
        }
    }
}

impl OperationResolver for UninstallWalker {
    fn resolve_operations(&self, package: &Package) -> Result<Vec<Operation>> {
        let installed = self.local.packages()?;
        // Plan with the installed instance, which carries the stored spelling
        let Some(package) = installed.iter().find(|p| *p == package) else {
            return Err(Error::PackageNotInstalled(package.to_string()));
        };

        let dependents: Vec<String> = installed
            .iter()
            .filter(|p| *p != package && p.depends_on(package))
            .map(|p| p.to_string())
            .collect();
        if !dependents.is_empty() {
            if !self.force {
                return Err(Error::PackageHasDependents {
                    package: package.to_string(),
                    dependents,
                });
            }
            self.logger.log(
                LogLevel::Warning,
                &format!(
                    "Removing {} even though {} depend(s) on it.",
                    package,
                    dependents.join(", ")
                ),
            );
        }

        let mut removing = vec![package.clone()];
        if self.remove_dependencies {
            collect_orphans(&installed, &mut removing, &self.retained);
        }

        Ok(removing.into_iter().map(Operation::uninstall).collect())
    }
}

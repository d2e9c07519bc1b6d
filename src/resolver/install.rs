use std::sync::Arc;

use crate::logger::{LogLevel, Logger};
use crate::package::{Dependency, Operation, Package};
use crate::repository::PackageRepository;
use crate::{Error, Result};

use super::OperationResolver;

/// Computes the install plan for a package and its dependency closure.
///
/// Dependencies are walked depth-first in declaration order and emitted in
/// post-order, so every dependency precedes the packages that need it.
pub struct InstallWalker {
    local: Arc<dyn PackageRepository>,
    source: Arc<dyn PackageRepository>,
    logger: Arc<dyn Logger>,
    ignore_dependencies: bool,
    allow_prerelease: bool,
}

#[derive(Default)]
struct Walk {
    operations: Vec<Operation>,
    selected: Vec<Package>,
    /// Installed packages some dependency of this walk relies on.
    kept: Vec<Package>,
    visiting: Vec<Package>,
}

impl InstallWalker {
    pub fn new(
        local: Arc<dyn PackageRepository>,
        source: Arc<dyn PackageRepository>,
        logger: Arc<dyn Logger>,
        ignore_dependencies: bool,
        allow_prerelease: bool,
    ) -> Self {
        Self {
            local,
            source,
            logger,
            ignore_dependencies,
            allow_prerelease,
        }
    }

    pub fn ignore_dependencies(&self) -> bool {
        self.ignore_dependencies
    }

    pub fn allow_prerelease(&self) -> bool {
        self.allow_prerelease
    }

    fn visit(&self, package: &Package, walk: &mut Walk) -> Result<()> {
        walk.visiting.push(package.clone());

        if !self.ignore_dependencies {
            for dependency in package.dependencies() {
                if let Some(start) = walk.visiting.iter().position(|p| p.has_id(&dependency.id)) {
                    let mut chain: Vec<String> = walk.visiting[start..]
                        .iter()
                        .map(|p| p.id().to_string())
                        .collect();
                    chain.push(dependency.id.clone());
                    return Err(Error::CyclicDependency { chain });
                }

                if walk
                    .selected
                    .iter()
                    .chain(&walk.kept)
                    .any(|p| dependency.is_satisfied_by(p))
                {
                    continue;
                }

                // One version per id: a second, incompatible pick would
                // replace the first in the project.
                if let Some(chosen) = walk
                    .selected
                    .iter()
                    .chain(&walk.kept)
                    .find(|p| p.has_id(&dependency.id))
                {
                    log::debug!("{} conflicts with {}", dependency, chosen);
                    return Err(Error::UnresolvableDependency {
                        package: package.to_string(),
                        dependency: dependency.clone(),
                    });
                }

                if let Some(installed) = self.find_local(dependency)? {
                    log::debug!("{} is satisfied by installed {}", dependency, installed);
                    walk.kept.push(installed);
                    continue;
                }

                self.logger.log(
                    LogLevel::Info,
                    &format!("Attempting to resolve dependency '{}'.", dependency),
                );
                let candidate = self.select_candidate(package, dependency)?;
                self.visit(&candidate, walk)?;
            }
        }

        walk.visiting.pop();
        walk.selected.push(package.clone());
        if !self.local.exists(package.id(), package.version())? {
            walk.operations.push(Operation::install(package.clone()));
        }
        Ok(())
    }

    fn find_local(&self, dependency: &Dependency) -> Result<Option<Package>> {
        Ok(self
            .local
            .find_packages_by_id(&dependency.id)?
            .into_iter()
            .find(|p| dependency.constraint.satisfies(p.version())))
    }

    /// Lowest source version satisfying the dependency.
    fn select_candidate(&self, package: &Package, dependency: &Dependency) -> Result<Package> {
        let (prerelease, stable): (Vec<Package>, Vec<Package>) = self
            .source
            .find_packages_by_id(&dependency.id)?
            .into_iter()
            .filter(|p| dependency.constraint.satisfies(p.version()))
            .partition(|p| p.version().is_prerelease());

        let has_prerelease = !prerelease.is_empty();
        let pool: Vec<Package> = if self.allow_prerelease {
            stable.into_iter().chain(prerelease).collect()
        } else {
            stable
        };

        match pool.into_iter().min_by(|a, b| a.version().cmp(b.version())) {
            Some(candidate) => {
                log::debug!("Selected {} for {}", candidate, dependency);
                Ok(candidate)
            }
            None if has_prerelease => Err(Error::PrereleaseNotAllowed {
                package: package.to_string(),
                dependency: dependency.clone(),
            }),
            None => Err(Error::UnresolvableDependency {
                package: package.to_string(),
                dependency: dependency.clone(),
            }),
        }
    }
}

impl OperationResolver for InstallWalker {
    fn resolve_operations(&self, package: &Package) -> Result<Vec<Operation>> {
        let mut walk = Walk::default();
        self.visit(package, &mut walk)?;
        Ok(walk.operations)
    }
}

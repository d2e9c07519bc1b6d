//! Operation resolvers
//!
//! A resolver turns a target package plus the current repository state into
//! an ordered list of install/uninstall operations. Resolvers never mutate a
//! repository.

mod factory;
mod install;
mod uninstall;
mod update;

use crate::Result;
use crate::package::{Operation, Package};

pub use factory::{DefaultResolverFactory, OperationResolverFactory};
pub use install::InstallWalker;
pub use uninstall::UninstallWalker;
pub(crate) use uninstall::collect_orphans;
pub use update::{UpdatePackageSettings, UpdateWalker};

#[cfg(test)]
pub use factory::MockOperationResolverFactory;

#[cfg_attr(test, mockall::automock)]
pub trait OperationResolver: Send + Sync {
    fn resolve_operations(&self, package: &Package) -> Result<Vec<Operation>>;
}

/// Returns a caller-supplied plan verbatim.
#[derive(Debug, Clone, Default)]
pub struct PreResolvedOperations {
    operations: Vec<Operation>,
}

impl PreResolvedOperations {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }
}

impl OperationResolver for PreResolvedOperations {
    fn resolve_operations(&self, _package: &Package) -> Result<Vec<Operation>> {
        Ok(self.operations.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::package;

    #[test]
    fn test_pre_resolved_operations_ignore_target() {
        let dependency = package("Lib", "1.0");
        let resolver = PreResolvedOperations::new(vec![Operation::install(dependency.clone())]);

        let operations = resolver.resolve_operations(&package("App", "1.0")).unwrap();
        assert_eq!(operations, vec![Operation::install(dependency)]);
    }

    #[test]
    fn test_pre_resolved_empty_plan() {
        let resolver = PreResolvedOperations::default();
        assert!(resolver.resolve_operations(&package("App", "1.0")).unwrap().is_empty());
    }
}

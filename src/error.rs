use thiserror::Error;

use crate::package::{Dependency, Operation, Package};

/// Errors raised while resolving or applying package operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A declared dependency matches no version in the source repository.
    #[error("Unable to resolve dependency '{dependency}' required by {package}")]
    UnresolvableDependency {
        package: String,
        dependency: Dependency,
    },

    /// Only prerelease versions satisfy the dependency and prereleases are not allowed.
    #[error(
        "Dependency '{dependency}' required by {package} is only satisfied by prerelease versions. Allow prerelease versions to install it."
    )]
    PrereleaseNotAllowed {
        package: String,
        dependency: Dependency,
    },

    /// The dependency graph loops back on itself.
    #[error("Circular dependency detected: {}", chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    #[error("Package '{0}' not found")]
    PackageNotFound(String),

    #[error("Package {0} is not installed in the project")]
    PackageNotInstalled(String),

    /// Other packages in the project still depend on the package being removed.
    #[error("Unable to remove {package} because {} depend(s) on it", dependents.join(", "))]
    PackageHasDependents {
        package: String,
        dependents: Vec<String>,
    },

    #[error("Invalid version '{0}'")]
    InvalidVersion(String),

    #[error("Invalid version constraint '{0}'")]
    InvalidConstraint(String),

    /// An operation failed against the shared repository.
    ///
    /// Operations before `operation` stay applied. `remaining` starts with the
    /// failed operation and lists everything not yet applied, so a retry can
    /// resume from there.
    #[error("Failed to {operation}: {source}")]
    Apply {
        operation: Operation,
        remaining: Vec<Operation>,
        #[source]
        source: anyhow::Error,
    },

    /// Recording a project reference failed. The shared repository keeps
    /// whatever the request already applied.
    #[error("Failed to update project reference for {package}: {source}")]
    Reference {
        package: Package,
        #[source]
        source: anyhow::Error,
    },

    /// A repository or project collaborator failed outside the apply phase.
    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

/// Result type alias using solpack's Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::VersionConstraint;

    #[test]
    fn test_cyclic_dependency_message() {
        let err = Error::CyclicDependency {
            chain: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.to_string(), "Circular dependency detected: A -> B -> A");
    }

    #[test]
    fn test_unresolvable_dependency_message() {
        let err = Error::UnresolvableDependency {
            package: "Test 1.0".into(),
            dependency: Dependency::new("Missing", "[2.0]".parse::<VersionConstraint>().unwrap()),
        };
        let message = err.to_string();
        assert!(message.contains("Missing"));
        assert!(message.contains("Test 1.0"));
    }

    #[test]
    fn test_apply_error_keeps_remaining_operations() {
        let first = Package::new("First", "1.0".parse().unwrap());
        let second = Package::new("Second", "1.0".parse().unwrap());
        let err = Error::Apply {
            operation: Operation::install(first.clone()),
            remaining: vec![Operation::install(first.clone()), Operation::install(second)],
            source: anyhow::anyhow!("disk full"),
        };

        match err {
            Error::Apply { remaining, .. } => {
                assert_eq!(remaining.len(), 2);
                assert_eq!(remaining[0].package.id(), "First");
                assert_eq!(remaining[1].package.id(), "Second");
            }
            _ => panic!("Expected Apply error"),
        }
    }
}

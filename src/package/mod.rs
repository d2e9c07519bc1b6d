//! Package model
//!
//! This module defines the immutable package identity shared by every
//! repository, the dependency declarations a package carries, and the
//! install/uninstall operations computed by the resolvers.

mod constraint;
mod operation;
mod version;

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

pub use constraint::VersionConstraint;
pub use operation::{Operation, PackageAction};
pub use version::PackageVersion;

/// A versioned package with its declared dependencies.
///
/// Identity is `(id, version)`; ids compare case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    id: String,
    version: PackageVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<Dependency>,
}

impl Package {
    pub fn new(id: impl Into<String>, version: PackageVersion) -> Self {
        Self {
            id: id.into(),
            version,
            description: None,
            dependencies: Vec::new(),
        }
    }

    /// Append a dependency, keeping declaration order.
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &PackageVersion {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id)
    }

    /// Check identity against an `(id, version)` pair.
    pub fn is(&self, id: &str, version: &PackageVersion) -> bool {
        self.has_id(id) && &self.version == version
    }

    /// Check whether this package declares a dependency that `other` satisfies.
    pub fn depends_on(&self, other: &Package) -> bool {
        self.dependencies.iter().any(|d| d.is_satisfied_by(other))
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.is(&other.id, &other.version)
    }
}

impl Eq for Package {}

impl Hash for Package {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.to_ascii_lowercase().hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

/// A dependency declaration: a package id and the versions it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: String,
    #[serde(default)]
    pub constraint: VersionConstraint,
}

impl Dependency {
    pub fn new(id: impl Into<String>, constraint: VersionConstraint) -> Self {
        Self {
            id: id.into(),
            constraint,
        }
    }

    pub fn is_satisfied_by(&self, package: &Package) -> bool {
        package.has_id(&self.id) && self.constraint.satisfies(package.version())
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraint.is_any() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} {}", self.id, self.constraint)
        }
    }
}

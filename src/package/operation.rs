use std::fmt;

use serde::{Deserialize, Serialize};

use super::Package;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageAction {
    Install,
    Uninstall,
}

impl fmt::Display for PackageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageAction::Install => write!(f, "install"),
            PackageAction::Uninstall => write!(f, "uninstall"),
        }
    }
}

/// One step of a resolved plan. Order within a plan is significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    pub package: Package,
    pub action: PackageAction,
}

impl Operation {
    pub fn new(package: Package, action: PackageAction) -> Self {
        Self { package, action }
    }

    pub fn install(package: Package) -> Self {
        Self::new(package, PackageAction::Install)
    }

    pub fn uninstall(package: Package) -> Self {
        Self::new(package, PackageAction::Uninstall)
    }

    pub fn is_install(&self) -> bool {
        self.action == PackageAction::Install
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, self.package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_display() {
        let op = Operation::install(Package::new("Test", "1.0.0.0".parse().unwrap()));
        assert_eq!(op.to_string(), "install Test 1.0.0.0");
        assert!(op.is_install());
    }

    #[test]
    fn test_operations_with_same_package_and_action_are_equal() {
        let a = Operation::uninstall(Package::new("Test", "1.0".parse().unwrap()));
        let b = Operation::uninstall(Package::new("test", "1.0.0".parse().unwrap()));
        assert_eq!(a, b);
        assert_ne!(a, Operation::install(a.package.clone()));
    }
}

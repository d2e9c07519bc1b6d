use crate::package::{Operation, Package};
use crate::resolver::UpdatePackageSettings;

/// Install request with an optional pre-resolved plan.
#[derive(Debug, Clone, Default)]
pub struct InstallAction {
    /// `None` resolves the plan through the resolver factory.
    pub operations: Option<Vec<Operation>>,
    pub ignore_dependencies: bool,
    pub allow_prerelease_versions: bool,
}

/// Update request for a single package.
#[derive(Debug, Clone)]
pub struct UpdatePackageAction {
    /// `None` resolves the plan through the resolver factory.
    pub operations: Option<Vec<Operation>>,
    pub update_dependencies: bool,
    pub allow_prerelease_versions: bool,
}

impl Default for UpdatePackageAction {
    fn default() -> Self {
        let settings = UpdatePackageSettings::default();
        Self {
            operations: None,
            update_dependencies: settings.update_dependencies,
            allow_prerelease_versions: settings.allow_prerelease_versions,
        }
    }
}

impl UpdatePackageAction {
    pub fn settings(&self) -> UpdatePackageSettings {
        UpdatePackageSettings {
            update_dependencies: self.update_dependencies,
            allow_prerelease_versions: self.allow_prerelease_versions,
        }
    }
}

/// Batch update. Operations run first, then references are updated in
/// package order.
#[derive(Debug, Clone, Default)]
pub struct UpdatePackagesAction {
    pub packages: Vec<Package>,
    pub operations: Vec<Operation>,
    pub settings: UpdatePackageSettings,
}

impl UpdatePackagesAction {
    pub fn new(settings: UpdatePackageSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn add_packages(&mut self, packages: impl IntoIterator<Item = Package>) {
        self.packages.extend(packages);
    }

    pub fn add_operations(&mut self, operations: impl IntoIterator<Item = Operation>) {
        self.operations.extend(operations);
    }

    pub fn has_packages(&self) -> bool {
        !self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::package;

    #[test]
    fn test_update_action_defaults_update_dependencies() {
        let action = UpdatePackageAction::default();
        assert!(action.update_dependencies);
        assert!(!action.allow_prerelease_versions);
        assert!(action.operations.is_none());
        assert_eq!(action.settings(), UpdatePackageSettings::default());
    }

    #[test]
    fn test_update_packages_action_collects_in_order() {
        let mut action = UpdatePackagesAction::new(UpdatePackageSettings {
            update_dependencies: false,
            allow_prerelease_versions: true,
        });
        assert!(!action.has_packages());

        action.add_packages([package("First", "1.1"), package("Second", "2.0")]);
        action.add_operations([Operation::install(package("First", "1.1"))]);

        assert!(action.has_packages());
        assert_eq!(action.packages[1].id(), "Second");
        assert_eq!(action.operations.len(), 1);
        assert!(!action.settings.update_dependencies);
    }
}

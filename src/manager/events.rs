use std::path::PathBuf;

use crate::package::Package;

/// Payload of package lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOperationEvent {
    pub package: Package,
    pub install_path: PathBuf,
}

type Handler = Box<dyn Fn(&PackageOperationEvent) + Send + Sync>;

/// Observer lists for installed and uninstalled notifications.
#[derive(Default)]
pub struct PackageEvents {
    installed: Vec<Handler>,
    uninstalled: Vec<Handler>,
}

impl PackageEvents {
    pub fn on_installed(&mut self, handler: Handler) {
        self.installed.push(handler);
    }

    pub fn on_uninstalled(&mut self, handler: Handler) {
        self.uninstalled.push(handler);
    }

    pub fn raise_installed(&self, event: &PackageOperationEvent) {
        for handler in &self.installed {
            handler(event);
        }
    }

    pub fn raise_uninstalled(&self, event: &PackageOperationEvent) {
        for handler in &self.uninstalled {
            handler(event);
        }
    }
}

use std::path::{Path, PathBuf};

use crate::package::Package;

/// Maps a package identity to where it lives in the shared repository.
#[cfg_attr(test, mockall::automock)]
pub trait PathResolver: Send + Sync {
    /// Directory name of the package, `<Id>.<Version>`.
    fn package_directory(&self, package: &Package) -> String;

    /// Full install path of the package.
    fn install_path(&self, package: &Package) -> PathBuf;
}

/// Lays packages out as `<root>/<Id>.<Version>`.
#[derive(Debug, Clone)]
pub struct DefaultPathResolver {
    root: PathBuf,
}

impl DefaultPathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PathResolver for DefaultPathResolver {
    fn package_directory(&self, package: &Package) -> String {
        format!("{}.{}", package.id(), package.version())
    }

    fn install_path(&self, package: &Package) -> PathBuf {
        self.root.join(self.package_directory(package))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_path_uses_id_and_version() {
        let resolver = DefaultPathResolver::new("/solution/packages");
        let package = Package::new("MyPackageId", "1.4.5.2".parse().unwrap());

        assert_eq!(resolver.package_directory(&package), "MyPackageId.1.4.5.2");
        assert_eq!(
            resolver.install_path(&package),
            PathBuf::from("/solution/packages/MyPackageId.1.4.5.2")
        );
    }

    #[test]
    fn test_install_path_keeps_prerelease_label() {
        let resolver = DefaultPathResolver::new("/solution/packages");
        let package = Package::new("Lib", "2.0-beta".parse().unwrap());

        assert!(resolver.install_path(&package).ends_with("Lib.2.0-beta"));
        assert_eq!(resolver.root(), Path::new("/solution/packages"));
    }
}

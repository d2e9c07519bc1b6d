use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::package::Package;
use crate::runtime::Runtime;

use super::PackageRepository;

/// On-disk format of a package feed file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Feed {
    #[serde(default)]
    pub packages: Vec<Package>,
}

impl Feed {
    pub fn load<R: Runtime + ?Sized>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read package feed {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse package feed {:?}", path))
    }
}

/// Packages held in memory. Serves as the source repository once a feed is loaded.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    packages: Mutex<Vec<Package>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_packages(packages: impl IntoIterator<Item = Package>) -> Self {
        let repository = Self::new();
        for package in packages {
            repository.insert(package);
        }
        repository
    }

    pub fn from_feed<R: Runtime + ?Sized>(runtime: &R, path: &Path) -> Result<Self> {
        let feed = Feed::load(runtime, path)?;
        log::debug!("Loaded {} package(s) from {:?}", feed.packages.len(), path);
        Ok(Self::with_packages(feed.packages))
    }

    /// Packages whose id matches the glob `pattern`, case-insensitively,
    /// ordered by id then version.
    pub fn search(&self, pattern: &str) -> Result<Vec<Package>> {
        let pattern = Pattern::new(pattern)
            .with_context(|| format!("Invalid search pattern '{}'", pattern))?;
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };

        let mut found: Vec<Package> = self
            .packages
            .lock()
            .iter()
            .filter(|p| pattern.matches_with(p.id(), options))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.id()
                .to_ascii_lowercase()
                .cmp(&b.id().to_ascii_lowercase())
                .then_with(|| a.version().cmp(b.version()))
        });
        Ok(found)
    }

    fn insert(&self, package: Package) -> bool {
        let mut packages = self.packages.lock();
        if packages.contains(&package) {
            return false;
        }
        packages.push(package);
        true
    }
}

impl PackageRepository for MemoryRepository {
    fn packages(&self) -> Result<Vec<Package>> {
        Ok(self.packages.lock().clone())
    }

    fn add_package(&self, package: &Package) -> Result<()> {
        if !self.insert(package.clone()) {
            log::debug!("{} is already present", package);
        }
        Ok(())
    }

    fn remove_package(&self, package: &Package) -> Result<()> {
        self.packages.lock().retain(|p| p != package);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    fn package(id: &str, version: &str) -> Package {
        Package::new(id, version.parse().unwrap())
    }

    #[test]
    fn test_add_package_is_idempotent() {
        let repository = MemoryRepository::new();
        repository.add_package(&package("Test", "1.0")).unwrap();
        repository.add_package(&package("test", "1.0.0.0")).unwrap();

        assert_eq!(repository.packages().unwrap().len(), 1);
    }

    #[test]
    fn test_find_packages_by_id_sorted_by_version() {
        let repository = MemoryRepository::with_packages([
            package("Lib", "2.0"),
            package("Lib", "1.0"),
            package("Lib", "1.5-beta"),
            package("Other", "1.0"),
        ]);

        let versions: Vec<String> = repository
            .find_packages_by_id("lib")
            .unwrap()
            .iter()
            .map(|p| p.version().to_string())
            .collect();
        assert_eq!(versions, vec!["1.0", "1.5-beta", "2.0"]);

        let latest = repository.find_latest("Lib").unwrap().unwrap();
        assert_eq!(latest.version().to_string(), "2.0");
        assert!(repository.find_latest("Missing").unwrap().is_none());
    }

    #[test]
    fn test_exists_and_remove() {
        let repository = MemoryRepository::with_packages([package("Test", "1.0")]);
        let version = "1.0.0".parse().unwrap();

        assert!(repository.exists("Test", &version).unwrap());
        repository.remove_package(&package("Test", "1.0")).unwrap();
        assert!(!repository.exists("Test", &version).unwrap());
    }

    #[test]
    fn test_search_glob_is_case_insensitive() {
        let repository = MemoryRepository::with_packages([
            package("NUnit", "2.5"),
            package("nunit.runners", "2.5"),
            package("Moq", "4.0"),
        ]);

        let ids: Vec<String> = repository
            .search("nunit*")
            .unwrap()
            .iter()
            .map(|p| p.id().to_string())
            .collect();
        assert_eq!(ids, vec!["NUnit", "nunit.runners"]);

        assert!(repository.search("[").is_err());
    }

    #[test]
    fn test_from_feed() {
        let mut runtime = MockRuntime::new();
        let feed_path = PathBuf::from("/config/solpack/feed.json");

        runtime
            .expect_read_to_string()
            .with(eq(feed_path.clone()))
            .returning(|_| {
                Ok(r#"{
                    "packages": [
                        {
                            "id": "App",
                            "version": "1.0",
                            "dependencies": [{ "id": "Lib", "constraint": "1.0" }]
                        },
                        { "id": "Lib", "version": "1.0" }
                    ]
                }"#
                .into())
            });

        let repository = MemoryRepository::from_feed(&runtime, &feed_path).unwrap();
        let app = repository
            .find_package("App", &"1.0".parse().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(app.dependencies().len(), 1);
        assert_eq!(repository.packages().unwrap().len(), 2);
    }

    #[test]
    fn test_from_feed_reports_invalid_json() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("not json".into()));

        let err = MemoryRepository::from_feed(&runtime, Path::new("/feed.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse package feed"));
    }
}

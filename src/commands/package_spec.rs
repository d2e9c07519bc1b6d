use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

use crate::package::{Package, PackageVersion};
use crate::repository::PackageRepository;

/// Package named on the command line.
/// Format: "Id" or "Id@Version"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub id: String,
    /// None = latest available
    pub version: Option<PackageVersion>,
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.id, v),
            None => write!(f, "{}", self.id),
        }
    }
}

impl FromStr for PackageSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, version) = match s.rsplit_once('@') {
            Some((_, "")) => {
                return Err(anyhow!(
                    "Invalid format: version after @ cannot be empty. Expected 'Id@Version'."
                ));
            }
            Some((id, version)) => (id, Some(version.parse::<PackageVersion>()?)),
            None => (s, None),
        };

        if id.trim().is_empty() {
            return Err(anyhow!("Invalid format: package id cannot be empty."));
        }

        Ok(Self {
            id: id.trim().to_string(),
            version,
        })
    }
}

impl PackageSpec {
    /// Find the named package in `repository`. Without an explicit version
    /// the highest version wins, skipping prereleases unless `allow_prerelease`.
    pub fn find_in(
        &self,
        repository: &dyn PackageRepository,
        allow_prerelease: bool,
    ) -> Result<Option<Package>> {
        match &self.version {
            Some(version) => repository.find_package(&self.id, version),
            None => Ok(repository
                .find_packages_by_id(&self.id)?
                .into_iter()
                .filter(|p| allow_prerelease || !p.version().is_prerelease())
                .next_back()),
        }
    }
}

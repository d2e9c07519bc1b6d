//! Package versions.
//!
//! Versions have one to four numeric components and an optional prerelease
//! label (`1.0`, `1.0.0.0`, `1.4.5.2`, `2.0-beta1`). The first three
//! components and the label are kept in a `semver::Version`; the fourth
//! (revision) is kept alongside it.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A package version as declared by a package or a dependency constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageVersion {
    semver: semver::Version,
    revision: u64,
    original: String,
}

impl PackageVersion {
    pub fn major(&self) -> u64 {
        self.semver.major
    }

    pub fn minor(&self) -> u64 {
        self.semver.minor
    }

    pub fn patch(&self) -> u64 {
        self.semver.patch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The prerelease label, empty for release versions.
    pub fn prerelease(&self) -> &str {
        self.semver.pre.as_str()
    }

    pub fn is_prerelease(&self) -> bool {
        !self.semver.pre.is_empty()
    }

    fn numbers(&self) -> (u64, u64, u64, u64) {
        (
            self.semver.major,
            self.semver.minor,
            self.semver.patch,
            self.revision,
        )
    }
}

impl FromStr for PackageVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || Error::InvalidVersion(s.to_string());

        let (numbers, pre) = match trimmed.split_once('-') {
            Some((_, pre)) if pre.is_empty() => return Err(invalid()),
            Some((numbers, pre)) => (numbers, Some(pre)),
            None => (trimmed, None),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.len() > 4 {
            return Err(invalid());
        }

        let mut components = [0u64; 4];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }

        let mut version = semver::Version::new(components[0], components[1], components[2]);
        if let Some(pre) = pre {
            version.pre = semver::Prerelease::new(pre).map_err(|_| invalid())?;
        }

        Ok(Self {
            semver: version,
            revision: components[3],
            original: trimmed.to_string(),
        })
    }
}

impl TryFrom<String> for PackageVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PackageVersion> for String {
    fn from(version: PackageVersion) -> Self {
        version.original
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageVersion {
    /// Numeric components first, then the prerelease label
    /// (a prerelease sorts before its release).
    fn cmp(&self, other: &Self) -> Ordering {
        self.numbers()
            .cmp(&other.numbers())
            .then_with(|| self.semver.pre.cmp(&other.semver.pre))
    }
}

impl Hash for PackageVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.numbers().hash(state);
        self.semver.pre.as_str().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> PackageVersion {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_four_components() {
        let version = v("1.4.5.2");
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 4);
        assert_eq!(version.patch(), 5);
        assert_eq!(version.revision(), 2);
        assert!(!version.is_prerelease());
    }

    #[test]
    fn test_missing_components_are_zero() {
        assert_eq!(v("1.0"), v("1.0.0.0"));
        assert_eq!(v("2"), v("2.0.0"));
    }

    #[test]
    fn test_display_keeps_original_text() {
        assert_eq!(v("1.0.0.0").to_string(), "1.0.0.0");
        assert_eq!(v("1.1").to_string(), "1.1");
    }

    #[test]
    fn test_prerelease() {
        let version = v("2.0-beta1");
        assert!(version.is_prerelease());
        assert_eq!(version.prerelease(), "beta1");
    }

    #[test]
    fn test_ordering() {
        assert!(v("1.0") < v("1.0.0.1"));
        assert!(v("1.9") < v("1.10"));
        assert!(v("2.0-alpha") < v("2.0"));
        assert!(v("2.0-alpha") < v("2.0-beta"));
        assert!(v("1.9.9.9") < v("2.0-alpha"));
    }

    #[test]
    fn test_invalid_versions() {
        assert!("".parse::<PackageVersion>().is_err());
        assert!("1.2.3.4.5".parse::<PackageVersion>().is_err());
        assert!("1.x".parse::<PackageVersion>().is_err());
        assert!("1.0-".parse::<PackageVersion>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&v("1.4.5.2")).unwrap();
        assert_eq!(json, "\"1.4.5.2\"");

        let parsed: PackageVersion = serde_json::from_str("\"3.0-rc1\"").unwrap();
        assert_eq!(parsed, v("3.0-rc1"));
    }
}

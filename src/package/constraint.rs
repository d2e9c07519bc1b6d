//! Version constraints in interval notation.
//!
//! - `""` any version
//! - `1.0` at least 1.0
//! - `[1.0]` exactly 1.0
//! - `[1.0,2.0)` from 1.0 inclusive to 2.0 exclusive; either end may be open

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PackageVersion;
use crate::error::Error;

/// Range of versions a dependency accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionConstraint {
    min: Option<PackageVersion>,
    min_inclusive: bool,
    max: Option<PackageVersion>,
    max_inclusive: bool,
}

impl VersionConstraint {
    /// Accept every version.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn exact(version: PackageVersion) -> Self {
        Self {
            min: Some(version.clone()),
            min_inclusive: true,
            max: Some(version),
            max_inclusive: true,
        }
    }

    pub fn at_least(version: PackageVersion) -> Self {
        Self {
            min: Some(version),
            min_inclusive: true,
            max: None,
            max_inclusive: false,
        }
    }

    pub fn is_any(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Check whether `version` falls inside the range.
    pub fn satisfies(&self, version: &PackageVersion) -> bool {
        let above_min = match &self.min {
            Some(min) if self.min_inclusive => version >= min,
            Some(min) => version > min,
            None => true,
        };
        let below_max = match &self.max {
            Some(max) if self.max_inclusive => version <= max,
            Some(max) => version < max,
            None => true,
        };
        above_min && below_max
    }

    fn is_exact(&self) -> bool {
        self.min_inclusive && self.max_inclusive && self.min.is_some() && self.min == self.max
    }
}

impl FromStr for VersionConstraint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || Error::InvalidConstraint(s.to_string());

        if trimmed.is_empty() {
            return Ok(Self::any());
        }

        let min_inclusive = match trimmed.chars().next() {
            Some('[') => true,
            Some('(') => false,
            // A bare version is a lower bound
            _ => return trimmed.parse().map(Self::at_least).map_err(|_| invalid()),
        };
        let max_inclusive = match trimmed.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(invalid()),
        };
        if trimmed.len() < 2 {
            return Err(invalid());
        }

        let inner = &trimmed[1..trimmed.len() - 1];
        let Some((low, high)) = inner.split_once(',') else {
            // "[1.0]" is the only valid single-version interval
            if !(min_inclusive && max_inclusive) {
                return Err(invalid());
            }
            return inner.parse().map(Self::exact).map_err(|_| invalid());
        };

        let parse_bound = |text: &str| -> Result<Option<PackageVersion>, Error> {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                text.parse().map(Some).map_err(|_| invalid())
            }
        };
        let min = parse_bound(low)?;
        let max = parse_bound(high)?;

        match (&min, &max) {
            (None, None) => return Err(invalid()),
            (Some(min), Some(max)) if min > max => return Err(invalid()),
            _ => {}
        }

        Ok(Self {
            min_inclusive: min_inclusive && min.is_some(),
            max_inclusive: max_inclusive && max.is_some(),
            min,
            max,
        })
    }
}

impl TryFrom<String> for VersionConstraint {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionConstraint> for String {
    fn from(constraint: VersionConstraint) -> Self {
        constraint.to_string()
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return Ok(());
        }
        if self.is_exact()
            && let Some(version) = &self.min
        {
            return write!(f, "[{}]", version);
        }
        if let (Some(min), None, true) = (&self.min, &self.max, self.min_inclusive) {
            return write!(f, "{}", min);
        }

        let open = if self.min_inclusive { '[' } else { '(' };
        let close = if self.max_inclusive { ']' } else { ')' };
        let min = self.min.as_ref().map(ToString::to_string).unwrap_or_default();
        let max = self.max.as_ref().map(ToString::to_string).unwrap_or_default();
        write!(f, "{}{}, {}{}", open, min, max, close)
    }
}

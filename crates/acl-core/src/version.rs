use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AclError, AclResult};

/// A `vMAJOR.MINOR.PATCH` version.
///
/// The ordering helpers are deliberately not a total order:
/// [`is_greater_than`](Self::is_greater_than) holds when *any* component is
/// larger, [`is_less_than`](Self::is_less_than) only when *all* components are
/// smaller. Existing artifacts and adventures rely on this behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component.
    pub patch: u32,
}

impl Version {
    /// Create a version from its components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string such as `v0.1.0`. The leading `v` is optional.
    ///
    /// Components are decimal `u32`s, and a leading `+` on a component is
    /// accepted, so `v+1.0.0` reads as `v1.0.0`.
    pub fn parse(text: &str) -> AclResult<Self> {
        let trimmed = text.strip_prefix('v').unwrap_or(text);
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() != 3 {
            return Err(AclError::Format(format!(
                "invalid version \"{text}\": expected vMAJOR.MINOR.PATCH"
            )));
        }

        let component = |name: &str, raw: &str| {
            raw.parse::<u32>().map_err(|e| {
                AclError::Format(format!("invalid {name} component \"{raw}\" in \"{text}\": {e}"))
            })
        };

        Ok(Self {
            major: component("major", parts[0])?,
            minor: component("minor", parts[1])?,
            patch: component("patch", parts[2])?,
        })
    }

    /// True if any single component of `self` is strictly greater than the
    /// same component of `other`.
    pub fn is_greater_than(&self, other: &Version) -> bool {
        self.major > other.major || self.minor > other.minor || self.patch > other.patch
    }

    /// True only if every component of `self` is strictly less than the same
    /// component of `other`.
    pub fn is_less_than(&self, other: &Version) -> bool {
        self.major < other.major && self.minor < other.minor && self.patch < other.patch
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A version or a range of versions, e.g. `v0.1.0+` or `v0.1.0-v0.3.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedVersion {
    /// Lower reference point of the range.
    pub base: Version,
    /// Upper reference point of the range.
    pub to: Version,
    /// Also accept versions above `to`.
    pub or_higher: bool,
    /// Also accept versions below `base`.
    pub or_lower: bool,
}

impl SupportedVersion {
    /// Accept exactly `version`.
    pub const fn exact(version: Version) -> Self {
        Self {
            base: version,
            to: version,
            or_higher: false,
            or_lower: false,
        }
    }

    /// Accept `version` and anything above it.
    pub const fn or_higher(version: Version) -> Self {
        Self {
            base: version,
            to: version,
            or_higher: true,
            or_lower: false,
        }
    }

    /// Accept the versions between `base` and `to`.
    pub const fn between(base: Version, to: Version) -> Self {
        Self {
            base,
            to,
            or_higher: false,
            or_lower: false,
        }
    }

    /// Decide whether `candidate` falls within this range.
    ///
    /// The checks run in a fixed order and use the any/all comparisons of
    /// [`Version`], so a candidate can match an open-ended range through a
    /// single larger component.
    pub fn matches(&self, candidate: &Version) -> bool {
        if *candidate == self.base || *candidate == self.to {
            return true;
        }
        if self.base == self.to && !self.or_higher && !self.or_lower {
            return false;
        }
        if candidate.is_greater_than(&self.base) && candidate.is_less_than(&self.to) {
            return true;
        }
        if self.or_higher && candidate.is_greater_than(&self.to) {
            return true;
        }
        if self.or_lower && candidate.is_less_than(&self.base) {
            return true;
        }
        false
    }
}

impl fmt::Display for SupportedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.or_lower {
            write!(f, "-")?;
        }
        write!(f, "{}", self.base)?;
        if self.base != self.to {
            write!(f, "-{}", self.to)?;
        }
        if self.or_higher {
            write!(f, "+")?;
        }
        Ok(())
    }
}

impl FromStr for SupportedVersion {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (or_lower, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (or_higher, rest) = match rest.strip_suffix('+') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        let (base, to) = match rest.split_once('-') {
            Some((base, to)) => (Version::parse(base)?, Version::parse(to)?),
            None => {
                let v = Version::parse(rest)?;
                (v, v)
            }
        };
        Ok(Self {
            base,
            to,
            or_higher,
            or_lower,
        })
    }
}

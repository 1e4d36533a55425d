use semver::{Prerelease, Version};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A mod manifest version: major.minor.patch with an optional prerelease tag.
///
/// Backed by `semver::Version` so the ordering rules (a prerelease is strictly less than the
/// same triple without one, prereleases compare lexicographically) come for free, but manifests
/// are allowed to omit the patch component (`"1.2"`) and to use the bare sentinel `"0.0"` for
/// "no version declared", neither of which strict semver accepts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion(Version);

impl SemanticVersion {
    pub const ZERO: SemanticVersion = SemanticVersion(Version::new(0, 0, 0));

    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion(Version::new(major, minor, patch))
    }

    pub fn with_prerelease(major: u64, minor: u64, patch: u64, prerelease: &str) -> Self {
        let mut v = Version::new(major, minor, patch);
        v.pre = Prerelease::new(prerelease).unwrap_or(Prerelease::EMPTY);
        SemanticVersion(v)
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    pub fn prerelease(&self) -> Option<&str> {
        if self.0.pre.is_empty() {
            None
        } else {
            Some(self.0.pre.as_str())
        }
    }

    /// The sentinel "absent" value manifests use when no version was declared.
    pub fn is_sentinel(&self) -> bool {
        *self == SemanticVersion::ZERO
    }

    /// Strict-greater-than, the only comparison the resolver and validator need.
    pub fn is_newer_than(&self, other: &SemanticVersion) -> bool {
        self > other
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0.major, self.0.minor, self.0.patch)?;
        if let Some(pre) = self.prerelease() {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VersionParseError {
    #[error("version string is empty")]
    Empty,
    #[error("'{0}' is not a valid version (expected major.minor[.patch][-prerelease])")]
    Malformed(String),
}

impl FromStr for SemanticVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let (numeric, prerelease) = match trimmed.split_once('-') {
            Some((head, tail)) => (head, Some(tail)),
            None => (trimmed, None),
        };

        let parts: Vec<&str> = numeric.split('.').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(VersionParseError::Malformed(trimmed.to_string()));
        }

        let major = parts[0]
            .parse::<u64>()
            .map_err(|_| VersionParseError::Malformed(trimmed.to_string()))?;
        let minor = parts[1]
            .parse::<u64>()
            .map_err(|_| VersionParseError::Malformed(trimmed.to_string()))?;
        let patch = match parts.get(2) {
            Some(p) => p
                .parse::<u64>()
                .map_err(|_| VersionParseError::Malformed(trimmed.to_string()))?,
            None => 0,
        };

        let mut version = Version::new(major, minor, patch);
        if let Some(pre) = prerelease {
            version.pre = Prerelease::new(pre)
                .map_err(|_| VersionParseError::Malformed(trimmed.to_string()))?;
        }

        Ok(SemanticVersion(version))
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SemanticVersion::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// Parses a manifest version field, treating the sentinel `"0.0"` the same as any other value.
/// Callers that care about "was a version actually declared" should check `is_sentinel()`.
pub fn parse_manifest_version(raw: &str) -> Result<SemanticVersion, VersionParseError> {
    SemanticVersion::from_str(raw)
}

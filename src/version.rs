//! Schema revision identifiers

use std::fmt;

use semver::Version;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// The four registered manifest schema revisions, oldest first.
///
/// The variant order is the migration order: every revision except the
/// latest has a [`next`](SchemaVersion::next) successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaVersion {
    /// Array-of-modules form, each module carrying a `declarations` array.
    V0_1_0,
    /// Flat single-package form with one `declaration` and inline-typed data.
    V0_2_0,
    /// Flat form with `dataSchema` / `dataUserInterface` hoisted to the top level.
    V0_3_0,
    /// Modules form with one `declaration` per module and embedded data schemas.
    V1_0_0,
}

impl SchemaVersion {
    /// All registered revisions, oldest first.
    pub const ALL: [SchemaVersion; 4] = [
        SchemaVersion::V0_1_0,
        SchemaVersion::V0_2_0,
        SchemaVersion::V0_3_0,
        SchemaVersion::V1_0_0,
    ];

    /// Parse a `schemaVersion` literal. Unknown strings yield `None`; the
    /// caller decides how to fail (parsing fails closed).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "0.1.0" => Some(Self::V0_1_0),
            "0.2.0" => Some(Self::V0_2_0),
            "0.3.0" => Some(Self::V0_3_0),
            "1.0.0" => Some(Self::V1_0_0),
            _ => None,
        }
    }

    /// The literal `schemaVersion` string for this revision.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V0_1_0 => "0.1.0",
            Self::V0_2_0 => "0.2.0",
            Self::V0_3_0 => "0.3.0",
            Self::V1_0_0 => "1.0.0",
        }
    }

    /// Semver view of this revision, used for ordering in the registry.
    pub fn semver(&self) -> Version {
        match self {
            Self::V0_1_0 => Version::new(0, 1, 0),
            Self::V0_2_0 => Version::new(0, 2, 0),
            Self::V0_3_0 => Version::new(0, 3, 0),
            Self::V1_0_0 => Version::new(1, 0, 0),
        }
    }

    /// The latest (canonical) revision.
    pub fn latest() -> Self {
        Self::V1_0_0
    }

    pub fn is_latest(&self) -> bool {
        *self == Self::latest()
    }

    /// The next revision in the migration chain, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::V0_1_0 => Some(Self::V0_2_0),
            Self::V0_2_0 => Some(Self::V0_3_0),
            Self::V0_3_0 => Some(Self::V1_0_0),
            Self::V1_0_0 => None,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VersionVisitor;

        impl Visitor<'_> for VersionVisitor {
            type Value = SchemaVersion;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a registered schemaVersion string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<SchemaVersion, E> {
                SchemaVersion::parse(value)
                    .ok_or_else(|| E::custom(format!("unknown schema version: {value}")))
            }
        }

        deserializer.deserialize_str(VersionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_versions() {
        for version in SchemaVersion::ALL {
            assert_eq!(SchemaVersion::parse(version.as_str()), Some(version));
        }
    }

    #[test]
    fn test_parse_unknown_version() {
        assert_eq!(SchemaVersion::parse("2.0.0"), None);
        assert_eq!(SchemaVersion::parse("v1.0.0"), None);
        assert_eq!(SchemaVersion::parse(""), None);
    }

    #[test]
    fn test_migration_chain_reaches_latest() {
        let mut version = SchemaVersion::V0_1_0;
        let mut hops = 0;
        while let Some(next) = version.next() {
            assert!(next > version);
            version = next;
            hops += 1;
        }
        assert_eq!(version, SchemaVersion::latest());
        assert_eq!(hops, 3);
    }

    #[test]
    fn test_semver_ordering_matches_variant_ordering() {
        for pair in SchemaVersion::ALL.windows(2) {
            assert!(pair[0].semver() < pair[1].semver());
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&SchemaVersion::V0_3_0).unwrap();
        assert_eq!(json, "\"0.3.0\"");
        let back: SchemaVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SchemaVersion::V0_3_0);
    }
}

//! Content fingerprints for manifest sources
//!
//! Every parsed document keeps a SHA-256 fingerprint of its source JSON so
//! that callers can correlate migrated output with the exact input it came
//! from when auditing or debugging a migration chain.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 fingerprint of a manifest's source JSON
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute a fingerprint from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{hash:x}"))
    }

    /// Compute a fingerprint from a string
    pub fn from_str(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Compute a fingerprint of a JSON value's compact serialization
    pub fn from_json(value: &serde_json::Value) -> Self {
        let canonical = serde_json::to_string(value).unwrap_or_default();
        Self::from_str(&canonical)
    }

    /// The hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that a JSON value matches this fingerprint
    pub fn verify_json(&self, value: &serde_json::Value) -> bool {
        *self == Self::from_json(value)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let value = json!({"schemaVersion": "1.0.0", "modules": []});
        assert_eq!(Checksum::from_json(&value), Checksum::from_json(&value));
    }

    #[test]
    fn test_fingerprint_differs_for_different_content() {
        let a = Checksum::from_str(r#"{"name": "clock"}"#);
        let b = Checksum::from_str(r#"{"name": "calendar"}"#);
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_json() {
        let value = json!({"path": "widgets/clock.js"});
        let checksum = Checksum::from_json(&value);
        assert!(checksum.verify_json(&value));
        assert!(!checksum.verify_json(&json!({"path": "other.js"})));
    }
}

//! Error types for manifest processing

use thiserror::Error;

use crate::validator::ValidationError;

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, ManifestError>;

/// Fatal manifest errors.
///
/// Structural defects in an otherwise parseable document are *not* errors of
/// this kind; those are accumulated in a
/// [`ValidationResult`](crate::validator::ValidationResult) instead.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("manifest root must be a JSON object")]
    NotAnObject,

    #[error("missing required field: schemaVersion")]
    MissingSchemaVersion,

    #[error("unknown schema version: {version}")]
    UnknownSchemaVersion { version: String },

    #[error("a rule set for schema version {version} is already registered")]
    DuplicateRuleSet { version: String },
}

/// A version-to-version migration step that cannot be completed without data
/// loss or ambiguity. The chain aborts atomically at the failing step; the
/// input document is never modified.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error(
        "multiplicity not representable in target version: \
         {modules} module(s), {declarations} declaration(s)"
    )]
    MultiplicityNotRepresentable { modules: usize, declarations: usize },

    #[error("unmappable type: {text:?} has no JSON Schema equivalent")]
    UnmappableType { text: String },

    #[error(
        "migration step to {version} produced an invalid document \
         ({} structural error(s))",
        .errors.len()
    )]
    InvalidIntermediate {
        version: String,
        errors: Vec<ValidationError>,
    },

    #[error("migrated document failed to reparse at {version}: {reason}")]
    Reparse { version: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicity_message_carries_counts() {
        let err = MigrationError::MultiplicityNotRepresentable {
            modules: 2,
            declarations: 3,
        };
        let message = err.to_string();
        assert!(message.contains("2 module(s)"));
        assert!(message.contains("3 declaration(s)"));
    }

    #[test]
    fn test_invalid_intermediate_counts_errors() {
        let err = MigrationError::InvalidIntermediate {
            version: "0.2.0".to_string(),
            errors: vec![ValidationError {
                code: "MISSING_FIELD",
                message: "missing required field: name".to_string(),
                path: "name".to_string(),
            }],
        };
        assert!(err.to_string().contains("1 structural error(s)"));
    }
}

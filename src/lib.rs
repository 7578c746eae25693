//! Widget Manifest Library
//!
//! A document model, validator, and forward migrator for "web widget
//! application manifest" JSON documents: declarative descriptions of a
//! distributable widget package (entry module paths, CSS custom properties
//! and parts, shadow-DOM slots, configurable data and its JSON-Schema-typed
//! shape, icons, parameters, and optional data-editing UI).
//!
//! ## Features
//!
//! - **Version-tagged parsing**: the top-level `schemaVersion` string
//!   selects one of four registered revisions; unknown versions fail closed
//! - **Exhaustive validation**: structural defects and cross-field
//!   invariant violations are accumulated and returned together, with
//!   unrecognized fields downgraded to warnings for forward compatibility
//! - **Forward migration**: older documents migrate one revision at a time
//!   to the latest shape, atomically, with every intermediate re-validated
//! - **Audit fingerprints**: every document carries a SHA-256 checksum of
//!   its source JSON
//!
//! ## Revisions
//!
//! ```text
//! 0.1.0  modules[] ── declarations[] per module, inline-typed data
//! 0.2.0  flat package ── one declaration, inline-typed data
//! 0.3.0  flat package ── dataSchema / dataUserInterface at top level
//! 1.0.0  modules[] ── one declaration per module, embedded data schemas
//! ```
//!
//! ## Example
//!
//! ```
//! let doc = widget_manifest::parse(r#"{
//!     "schemaVersion": "1.0.0",
//!     "modules": [{
//!         "kind": "web-widget-application",
//!         "path": "widgets/clock.js",
//!         "declaration": {"slots": [{"name": ""}]}
//!     }]
//! }"#).unwrap();
//!
//! let result = widget_manifest::validate(&doc);
//! assert!(result.is_clean());
//! ```

pub mod checksum;
pub mod document;
pub mod error;
pub mod migrate;
pub mod reference;
pub mod registry;
pub mod syntax;
pub mod validator;
pub mod version;

pub use checksum::Checksum;
pub use document::{
    CssCustomProperty, CssPart, Data, DataUserInterface, Declaration, Declared, Demo, Icon,
    ManifestDocument, Parameter, Payload, Portal, Slot, Type, MODULE_KIND,
};
pub use error::{ManifestError, MigrationError, Result};
pub use migrate::migrate;
pub use reference::{
    Reference, ReferenceScope, ResolvedReference, SourceReference, TypeReference, GLOBAL_PACKAGE,
};
pub use registry::{FieldKind, FieldRule, RuleSet, ShapeRules, VersionRegistry};
pub use validator::{validate, ValidationError, ValidationResult, ValidationWarning};
pub use version::SchemaVersion;

/// Parse a manifest document from JSON text. See [`ManifestDocument::parse`].
pub fn parse(text: &str) -> Result<ManifestDocument> {
    ManifestDocument::parse(text)
}

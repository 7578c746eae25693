//! The version-tagged manifest document model
//!
//! A [`ManifestDocument`] is produced by parsing raw JSON text. It keeps
//! three things: the revision tag selected by the top-level `schemaVersion`
//! string, the original parsed JSON (immutable, for auditing and the
//! validator's unknown-field scan), and a typed view of the payload when the
//! raw shape lines up with the revision. Documents never mutate; migration
//! produces new documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checksum::Checksum;
use crate::error::{ManifestError, Result};
use crate::reference::{SourceReference, TypeReference};
use crate::registry::VersionRegistry;
use crate::version::SchemaVersion;

/// The module kind tag carried by every widget module.
pub const MODULE_KIND: &str = "web-widget-application";

/// Tri-state collection field.
///
/// An absent collection means "undeclared" and must survive round-tripping
/// as absence; an explicit `[]` means "declared empty" and round-trips as
/// `[]`. Use with `#[serde(default, skip_serializing_if = "Declared::is_absent")]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Declared<T> {
    #[default]
    Absent,
    Empty,
    Populated(Vec<T>),
}

impl<T> Declared<T> {
    pub fn from_vec(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Populated(items)
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The declared items; empty for both `Absent` and `Empty`.
    pub fn items(&self) -> &[T] {
        match self {
            Self::Populated(items) => items,
            Self::Absent | Self::Empty => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl<T: Serialize> Serialize for Declared<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.items())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Declared<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Self::from_vec(Vec::<T>::deserialize(deserializer)?))
    }
}

/// A shadow-DOM content insertion point. The empty string names the
/// unnamed (default) slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named, externally styleable internal element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssPart {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A themeable CSS variable. `name` includes the leading `--`; `syntax` is a
/// CSS syntax string checked only for grammar well-formedness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssCustomProperty {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portal {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A parameter the widget is known to understand. Parameters are always
/// serialized as strings, so `default` is the actual value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demo {
    /// Relative URL if published with the package, absolute if hosted.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    pub path: String,
    /// Space-separated `WxH` tokens, or `any`.
    pub sizes: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

/// A hand-written type description carried verbatim from the source
/// language's type syntax (JSDoc, Closure, TypeScript, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
    pub text: String,
    #[serde(default, skip_serializing_if = "Declared::is_absent")]
    pub references: Declared<TypeReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceReference>,
}

impl Type {
    /// Lower this type text to a JSON Schema primitive type name, when it
    /// names one.
    pub fn json_primitive(&self) -> Option<&'static str> {
        json_primitive_for(&self.text)
    }
}

/// Lower a hand-written type text to a JSON Schema primitive type name.
pub(crate) fn json_primitive_for(text: &str) -> Option<&'static str> {
    match text.trim() {
        "string" => Some("string"),
        "number" => Some("number"),
        "integer" => Some("integer"),
        "boolean" => Some("boolean"),
        "object" => Some("object"),
        "array" => Some("array"),
        "null" => Some("null"),
        _ => None,
    }
}

/// A secondary module providing an editing UI for the widget's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUserInterface {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_path: Option<String>,
}

/// The widget's stateful configuration.
///
/// Early revisions describe its shape with an inline [`Type`]; later
/// revisions embed a JSON Schema in `schema`. `default` is the actual
/// default value, which must satisfy whichever shape description is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_interface: Option<DataUserInterface>,
}

/// The described capability surface of a widget. All member collections are
/// tri-state: absent means undeclared, not empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    #[serde(default, skip_serializing_if = "Declared::is_absent")]
    pub parameters: Declared<Parameter>,
    #[serde(default, skip_serializing_if = "Declared::is_absent")]
    pub portals: Declared<Portal>,
    #[serde(default, skip_serializing_if = "Declared::is_absent")]
    pub slots: Declared<Slot>,
    #[serde(default, skip_serializing_if = "Declared::is_absent")]
    pub css_parts: Declared<CssPart>,
    #[serde(default, skip_serializing_if = "Declared::is_absent")]
    pub css_properties: Declared<CssCustomProperty>,
    #[serde(default, skip_serializing_if = "Declared::is_absent")]
    pub demos: Declared<Demo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandboxed: Option<bool>,
}

/// `0.1.0` root: an array of modules, each with its own declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulesManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub kind: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Declared::is_absent")]
    pub declarations: Declared<Declaration>,
}

/// `0.2.0` root: a flat single-widget package with one declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatManifest {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(default, skip_serializing_if = "Declared::is_absent")]
    pub icons: Declared<Icon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<Declaration>,
}

/// `0.3.0` root: the flat form with the data description hoisted to the top
/// level as an embedded JSON Schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSchemaManifest {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(default, skip_serializing_if = "Declared::is_absent")]
    pub icons: Declared<Icon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<Declaration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_user_interface: Option<DataUserInterface>,
}

/// `1.0.0` root: modules again, one declaration per module, data described
/// by an embedded schema inside the declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModularManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(default, skip_serializing_if = "Declared::is_absent")]
    pub icons: Declared<Icon>,
    pub modules: Vec<ModularModule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModularModule {
    pub kind: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<Declaration>,
}

/// Typed payload, one variant per revision.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Modules(ModulesManifest),
    Flat(FlatManifest),
    DataSchema(DataSchemaManifest),
    Modular(ModularManifest),
}

impl Payload {
    fn deserialize(version: SchemaVersion, source: &Value) -> Option<Self> {
        match version {
            SchemaVersion::V0_1_0 => {
                serde_json::from_value(source.clone()).ok().map(Self::Modules)
            }
            SchemaVersion::V0_2_0 => serde_json::from_value(source.clone()).ok().map(Self::Flat),
            SchemaVersion::V0_3_0 => {
                serde_json::from_value(source.clone()).ok().map(Self::DataSchema)
            }
            SchemaVersion::V1_0_0 => {
                serde_json::from_value(source.clone()).ok().map(Self::Modular)
            }
        }
    }
}

/// A parsed, version-tagged manifest document.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    version: SchemaVersion,
    payload: Option<Payload>,
    source: Value,
    fingerprint: Checksum,
}

impl ManifestDocument {
    /// Parse a manifest from JSON text.
    ///
    /// Fails closed: malformed JSON, a non-object root, and a missing or
    /// unregistered `schemaVersion` are all fatal, and no document is
    /// produced. Structural defects beyond that are *not* fatal; they are
    /// reported by [`validate`](crate::validator::validate).
    pub fn parse(text: &str) -> Result<Self> {
        let source: Value = serde_json::from_str(text)?;
        Self::from_value(source)
    }

    /// Build a document from an already-parsed JSON value.
    pub fn from_value(source: Value) -> Result<Self> {
        let object = source.as_object().ok_or(ManifestError::NotAnObject)?;
        let version_str = object
            .get("schemaVersion")
            .and_then(Value::as_str)
            .ok_or(ManifestError::MissingSchemaVersion)?;
        let rule_set = VersionRegistry::global().lookup(version_str).ok_or_else(|| {
            ManifestError::UnknownSchemaVersion {
                version: version_str.to_string(),
            }
        })?;
        let version = rule_set.version();
        tracing::debug!(version = %version, "parsed manifest document");

        // A payload that does not line up with the revision's shape is not
        // fatal here; the validator reports the defects from the raw source.
        let payload = Payload::deserialize(version, &source);
        let fingerprint = Checksum::from_json(&source);
        Ok(Self {
            version,
            payload,
            source,
            fingerprint,
        })
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// The typed payload, when the raw shape deserialized cleanly.
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// The original parsed JSON, kept unmodified for auditing.
    pub fn source(&self) -> &Value {
        &self.source
    }

    /// SHA-256 fingerprint of the source JSON.
    pub fn fingerprint(&self) -> &Checksum {
        &self.fingerprint
    }

    /// The package name, for revisions that carry one.
    pub fn name(&self) -> Option<&str> {
        match self.payload()? {
            Payload::Modules(_) => None,
            Payload::Flat(manifest) => Some(&manifest.name),
            Payload::DataSchema(manifest) => Some(&manifest.name),
            Payload::Modular(manifest) => manifest.name.as_deref(),
        }
    }

    /// All declarations in the document, regardless of revision shape.
    pub fn declarations(&self) -> Vec<&Declaration> {
        match self.payload() {
            Some(Payload::Modules(manifest)) => manifest
                .modules
                .iter()
                .flat_map(|module| module.declarations.items())
                .collect(),
            Some(Payload::Flat(manifest)) => manifest.declaration.iter().collect(),
            Some(Payload::DataSchema(manifest)) => manifest.declaration.iter().collect(),
            Some(Payload::Modular(manifest)) => manifest
                .modules
                .iter()
                .filter_map(|module| module.declaration.as_ref())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Serialize the document back to pretty JSON. The source value is the
    /// canonical serialized form, so unknown fields and explicit empty
    /// collections survive untouched.
    pub fn to_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_declared_distinguishes_absent_from_empty() {
        let absent: Declaration = serde_json::from_value(json!({})).unwrap();
        assert!(absent.slots.is_absent());

        let empty: Declaration = serde_json::from_value(json!({"slots": []})).unwrap();
        assert_eq!(empty.slots, Declared::Empty);

        let serialized = serde_json::to_value(&empty).unwrap();
        assert_eq!(serialized, json!({"slots": []}));
        let reserialized_absent = serde_json::to_value(&absent).unwrap();
        assert_eq!(reserialized_absent, json!({}));
    }

    #[test]
    fn test_parse_earliest_revision() {
        let doc = ManifestDocument::parse(
            r#"{
                "schemaVersion": "0.1.0",
                "modules": [{
                    "kind": "web-widget-application",
                    "path": "widgets/clock.js",
                    "declarations": [{"slots": [{"name": ""}]}]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.version(), SchemaVersion::V0_1_0);
        assert_eq!(doc.declarations().len(), 1);
        assert_eq!(doc.name(), None);
    }

    #[test]
    fn test_parse_latest_revision() {
        let doc = ManifestDocument::parse(
            r#"{
                "schemaVersion": "1.0.0",
                "name": "clock",
                "modules": [{
                    "kind": "web-widget-application",
                    "path": "widgets/clock.js",
                    "declaration": {
                        "data": {
                            "name": "clock",
                            "schema": {"type": "object"},
                            "default": {}
                        }
                    }
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.version(), SchemaVersion::V1_0_0);
        assert_eq!(doc.name(), Some("clock"));
        assert_eq!(doc.declarations().len(), 1);
    }

    #[test]
    fn test_unknown_version_fails_closed() {
        let result = ManifestDocument::parse(r#"{"schemaVersion": "9.9.9", "modules": []}"#);
        assert!(matches!(
            result,
            Err(ManifestError::UnknownSchemaVersion { version }) if version == "9.9.9"
        ));
    }

    #[test]
    fn test_missing_version_fails_closed() {
        assert!(matches!(
            ManifestDocument::parse(r#"{"modules": []}"#),
            Err(ManifestError::MissingSchemaVersion)
        ));
        assert!(matches!(
            ManifestDocument::parse("[]"),
            Err(ManifestError::NotAnObject)
        ));
    }

    #[test]
    fn test_shape_defects_are_not_fatal() {
        // `modules` holds a number, so the typed payload cannot be built,
        // but the document is still returned for inspection.
        let doc =
            ManifestDocument::parse(r#"{"schemaVersion": "0.1.0", "modules": 5}"#).unwrap();
        assert!(doc.payload().is_none());
        assert_eq!(doc.version(), SchemaVersion::V0_1_0);
    }

    #[test]
    fn test_fingerprint_tracks_source() {
        let text = r#"{"schemaVersion": "0.2.0", "name": "clock", "path": "clock.js"}"#;
        let doc = ManifestDocument::parse(text).unwrap();
        assert!(doc.fingerprint().verify_json(doc.source()));
    }

    #[test]
    fn test_type_lowering() {
        let lowered = Type {
            text: " string ".to_string(),
            references: Declared::Absent,
            source: None,
        };
        assert_eq!(lowered.json_primitive(), Some("string"));

        let unmappable = Type {
            text: "Array<FooElement>".to_string(),
            references: Declared::Absent,
            source: None,
        };
        assert_eq!(unmappable.json_primitive(), None);
    }
}

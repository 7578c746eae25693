//! Structural and cross-field validation
//!
//! Validation is a two-pass walk. The first pass is a recursive descent over
//! the *raw* JSON mirroring the revision's rule tables: required fields must
//! be present, present fields must match their declared kind, and
//! unrecognized fields are warnings, never errors, so manifests may carry
//! newer optional fields an older validator does not understand yet. The
//! second pass checks cross-field invariants over the typed payload. All
//! defects are accumulated and returned together; validation never fails
//! fast and never mutates the document.

use jsonschema::JSONSchema;
use serde::Serialize;
use serde_json::{json, Value};

use crate::document::{Data, Declaration, ManifestDocument, Payload, Type};
use crate::registry::{self, FieldKind, RuleSet, ShapeRules};
use crate::syntax;

/// A structural defect in an otherwise-parseable document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Stable machine-readable kind.
    pub code: &'static str,
    pub message: String,
    /// Dotted field path pinpointing the offending value.
    pub path: String,
}

/// An unrecognized-but-harmless field; never blocks downstream use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    pub code: &'static str,
    pub message: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn error(&mut self, code: &'static str, path: &str, message: String) {
        self.errors.push(ValidationError {
            code,
            message,
            path: path.to_string(),
        });
    }

    fn warning(&mut self, code: &'static str, path: &str, message: String) {
        self.warnings.push(ValidationWarning {
            code,
            message,
            path: path.to_string(),
        });
    }
}

/// Validate a parsed document against its revision's rule set.
pub fn validate(doc: &ManifestDocument) -> ValidationResult {
    let rule_set = registry::rule_set_for(doc.version());
    let mut result = validate_value(rule_set, doc.source());
    if let Some(payload) = doc.payload() {
        check_invariants(payload, &mut result);
    }
    tracing::debug!(
        version = %doc.version(),
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated manifest document"
    );
    result
}

/// Structural pass only: walk a raw JSON value against a rule set. The
/// migrator uses this to check intermediate documents between steps.
pub fn validate_value(rule_set: &RuleSet, value: &Value) -> ValidationResult {
    let mut result = ValidationResult::default();
    walk_shape(rule_set, rule_set.root(), value, "", &mut result);
    result
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn walk_shape(
    rule_set: &RuleSet,
    shape: &ShapeRules,
    value: &Value,
    path: &str,
    result: &mut ValidationResult,
) {
    let Some(object) = value.as_object() else {
        result.error(
            "TYPE_MISMATCH",
            path,
            format!("expected a {} object", shape.name),
        );
        return;
    };

    for rule in shape.fields {
        let field_path = join(path, rule.name);
        match object.get(rule.name) {
            Some(field_value) => {
                check_field(rule_set, rule.kind, field_value, &field_path, result);
            }
            None if rule.required => {
                result.error(
                    "MISSING_FIELD",
                    path,
                    format!("missing required field: {}", rule.name),
                );
            }
            None => {}
        }
    }

    for key in object.keys() {
        if shape.field(key).is_none() {
            result.warning(
                "UNKNOWN_FIELD",
                &join(path, key),
                format!("unrecognized field `{key}` on {}", shape.name),
            );
        }
    }
}

fn check_field(
    rule_set: &RuleSet,
    kind: FieldKind,
    value: &Value,
    path: &str,
    result: &mut ValidationResult,
) {
    match kind {
        FieldKind::Any => {}
        FieldKind::Str | FieldKind::Markdown => {
            if !value.is_string() {
                result.error("TYPE_MISMATCH", path, "expected a string".to_string());
            }
        }
        FieldKind::Bool => {
            if !value.is_boolean() {
                result.error("TYPE_MISMATCH", path, "expected a boolean".to_string());
            }
        }
        FieldKind::Uint => {
            if value.as_u64().is_none() {
                result.error(
                    "TYPE_MISMATCH",
                    path,
                    "expected a non-negative integer".to_string(),
                );
            }
        }
        FieldKind::Literal(expected) => {
            if value.as_str() != Some(expected) {
                result.error(
                    "INVALID_TAG",
                    path,
                    format!("expected the literal {expected:?}"),
                );
            }
        }
        FieldKind::Shape(name) => {
            if let Some(shape) = rule_set.shape(name) {
                walk_shape(rule_set, shape, value, path, result);
            }
        }
        FieldKind::List(name) => {
            let Some(items) = value.as_array() else {
                result.error("TYPE_MISMATCH", path, "expected an array".to_string());
                return;
            };
            if let Some(shape) = rule_set.shape(name) {
                for (index, item) in items.iter().enumerate() {
                    walk_shape(rule_set, shape, item, &format!("{path}[{index}]"), result);
                }
            }
        }
        FieldKind::CustomPropertyName => match value.as_str() {
            Some(name) if syntax::is_custom_property_name(name) => {}
            Some(name) => result.error(
                "CSS_PROPERTY_NAME",
                path,
                format!("custom property name must begin with `--`: {name:?}"),
            ),
            None => result.error("TYPE_MISMATCH", path, "expected a string".to_string()),
        },
        FieldKind::IconSizes => match value.as_str() {
            Some(sizes) => {
                if let Err(reason) = syntax::check_icon_sizes(sizes) {
                    result.error("ICON_SIZES", path, reason);
                }
            }
            None => result.error("TYPE_MISMATCH", path, "expected a string".to_string()),
        },
        FieldKind::CssSyntax => match value.as_str() {
            Some(syntax_string) => {
                if let Err(reason) = syntax::check_css_syntax(syntax_string) {
                    result.error("CSS_SYNTAX", path, reason);
                }
            }
            None => result.error("TYPE_MISMATCH", path, "expected a string".to_string()),
        },
    }
}

// Cross-field invariants, checked over the fully-parsed tree after the
// per-field pass.

fn check_invariants(payload: &Payload, result: &mut ValidationResult) {
    match payload {
        Payload::Modules(manifest) => {
            for (i, module) in manifest.modules.iter().enumerate() {
                for (j, declaration) in module.declarations.items().iter().enumerate() {
                    check_declaration(
                        declaration,
                        &format!("modules[{i}].declarations[{j}]"),
                        result,
                    );
                }
            }
        }
        Payload::Flat(manifest) => {
            if let Some(declaration) = &manifest.declaration {
                check_declaration(declaration, "declaration", result);
            }
        }
        Payload::DataSchema(manifest) => {
            if let Some(declaration) = &manifest.declaration {
                check_declaration(declaration, "declaration", result);
            }
            if let (Some(schema), Some(default)) =
                (&manifest.data_schema, &manifest.data_default)
            {
                check_default_against_schema(schema, default, "dataDefault", "dataSchema", result);
            }
            if manifest.data_user_interface.is_some() && manifest.data_schema.is_none() {
                result.warning(
                    "UI_WITHOUT_SCHEMA",
                    "dataUserInterface",
                    "data user interface declared without a data schema".to_string(),
                );
            }
        }
        Payload::Modular(manifest) => {
            for (i, module) in manifest.modules.iter().enumerate() {
                if let Some(declaration) = &module.declaration {
                    check_declaration(declaration, &format!("modules[{i}].declaration"), result);
                }
            }
        }
    }
}

fn check_declaration(declaration: &Declaration, path: &str, result: &mut ValidationResult) {
    for (i, parameter) in declaration.parameters.items().iter().enumerate() {
        if let Some(ty) = &parameter.type_ {
            check_type(ty, &format!("{path}.parameters[{i}].type"), result);
        }
    }
    if let Some(data) = &declaration.data {
        check_data(data, &format!("{path}.data"), result);
    }
}

fn check_data(data: &Data, path: &str, result: &mut ValidationResult) {
    if let Some(ty) = &data.type_ {
        check_type(ty, &format!("{path}.type"), result);
        // An inline type that does not lower to a JSON primitive cannot be
        // conformance-checked here; migration reports it explicitly.
        if let (Some(primitive), Some(default)) = (ty.json_primitive(), &data.default) {
            let schema = json!({ "type": primitive });
            check_default_against_schema(
                &schema,
                default,
                &format!("{path}.default"),
                &format!("{path}.type"),
                result,
            );
        }
    }
    if let Some(schema) = &data.schema {
        if let Some(default) = &data.default {
            check_default_against_schema(
                schema,
                default,
                &format!("{path}.default"),
                &format!("{path}.schema"),
                result,
            );
        }
    }
    if data.user_interface.is_some() && data.schema.is_none() && data.type_.is_none() {
        result.warning(
            "UI_WITHOUT_SCHEMA",
            &format!("{path}.userInterface"),
            "data user interface declared without a data schema".to_string(),
        );
    }
}

fn check_type(ty: &Type, path: &str, result: &mut ValidationResult) {
    let length = ty.text.chars().count();
    for (i, reference) in ty.references.items().iter().enumerate() {
        let reference_path = format!("{path}.references[{i}]");
        match (reference.start, reference.end) {
            (Some(start), Some(end)) => {
                if start > end || end > length {
                    result.error(
                        "REFERENCE_RANGE",
                        &reference_path,
                        format!(
                            "range {start}..{end} is out of bounds for the \
                             {length}-character type text"
                        ),
                    );
                }
            }
            (None, None) => {}
            _ => {
                result.error(
                    "REFERENCE_RANGE",
                    &reference_path,
                    "start and end must both be present or both absent".to_string(),
                );
            }
        }
    }
}

fn check_default_against_schema(
    schema: &Value,
    default: &Value,
    default_path: &str,
    schema_path: &str,
    result: &mut ValidationResult,
) {
    match JSONSchema::compile(schema) {
        Ok(compiled) => {
            if let Err(violations) = compiled.validate(default) {
                for violation in violations {
                    result.error(
                        "DATA_DEFAULT",
                        default_path,
                        format!("default value does not satisfy the data schema: {violation}"),
                    );
                }
            }
        }
        Err(error) => {
            result.error(
                "DATA_SCHEMA",
                schema_path,
                format!("embedded data schema is not a valid JSON Schema: {error}"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ManifestDocument;

    fn parse(text: &str) -> ManifestDocument {
        ManifestDocument::parse(text).unwrap()
    }

    fn codes(result: &ValidationResult) -> Vec<&'static str> {
        result.errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn test_valid_latest_document_is_clean() {
        let doc = parse(
            r#"{
                "schemaVersion": "1.0.0",
                "modules": [{
                    "kind": "web-widget-application",
                    "path": "widgets/clock.js",
                    "declaration": {
                        "slots": [{"name": "", "summary": "default slot"}],
                        "cssProperties": [
                            {"name": "--clock-color", "syntax": "<color>"}
                        ],
                        "data": {
                            "name": "clock",
                            "schema": {"type": "object"},
                            "default": {"timezone": "UTC"}
                        }
                    }
                }]
            }"#,
        );
        let result = validate(&doc);
        assert!(result.is_clean(), "unexpected errors: {:?}", result.errors);
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let doc = parse(r#"{"schemaVersion": "0.2.0", "name": "clock"}"#);
        let result = validate(&doc);
        assert_eq!(codes(&result), vec!["MISSING_FIELD"]);
        assert!(result.errors[0].message.contains("path"));
    }

    #[test]
    fn test_all_defects_reported_in_one_pass() {
        // Three independent defects; no fail-fast.
        let doc = parse(
            r#"{
                "schemaVersion": "1.0.0",
                "modules": [{
                    "kind": "something-else",
                    "path": 42,
                    "declaration": {
                        "cssProperties": [{"name": "clock-color"}]
                    }
                }]
            }"#,
        );
        let result = validate(&doc);
        assert_eq!(
            codes(&result),
            vec!["INVALID_TAG", "TYPE_MISMATCH", "CSS_PROPERTY_NAME"]
        );
        assert_eq!(result.errors[2].path, "modules[0].declaration.cssProperties[0].name");
    }

    #[test]
    fn test_unknown_field_is_a_warning_not_an_error() {
        let doc = parse(
            r#"{
                "schemaVersion": "0.2.0",
                "name": "clock",
                "path": "clock.js",
                "extra": true
            }"#,
        );
        let result = validate(&doc);
        assert!(result.is_clean());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, "UNKNOWN_FIELD");
        assert_eq!(result.warnings[0].path, "extra");
    }

    #[test]
    fn test_icon_sizes_grammar() {
        let doc = parse(
            r#"{
                "schemaVersion": "0.2.0",
                "name": "clock",
                "path": "clock.js",
                "icons": [{"path": "icon.png", "sizes": "48x48 bogus"}]
            }"#,
        );
        let result = validate(&doc);
        assert_eq!(codes(&result), vec!["ICON_SIZES"]);
        assert_eq!(result.errors[0].path, "icons[0].sizes");
    }

    #[test]
    fn test_type_reference_range_must_be_paired() {
        let doc = parse(
            r#"{
                "schemaVersion": "0.2.0",
                "name": "clock",
                "path": "clock.js",
                "declaration": {
                    "parameters": [{
                        "name": "tz",
                        "type": {
                            "text": "Timezone",
                            "references": [{"name": "Timezone", "start": 0}]
                        }
                    }]
                }
            }"#,
        );
        let result = validate(&doc);
        assert_eq!(codes(&result), vec!["REFERENCE_RANGE"]);
        assert_eq!(
            result.errors[0].path,
            "declaration.parameters[0].type.references[0]"
        );
    }

    #[test]
    fn test_type_reference_range_bounds() {
        let doc = parse(
            r#"{
                "schemaVersion": "0.2.0",
                "name": "clock",
                "path": "clock.js",
                "declaration": {
                    "parameters": [{
                        "name": "tz",
                        "type": {
                            "text": "Timezone",
                            "references": [{"name": "Timezone", "start": 2, "end": 99}]
                        }
                    }]
                }
            }"#,
        );
        let result = validate(&doc);
        assert_eq!(codes(&result), vec!["REFERENCE_RANGE"]);
    }

    #[test]
    fn test_data_default_must_satisfy_schema() {
        let doc = parse(
            r#"{
                "schemaVersion": "1.0.0",
                "modules": [{
                    "kind": "web-widget-application",
                    "path": "clock.js",
                    "declaration": {
                        "data": {
                            "name": "clock",
                            "schema": {"type": "string"},
                            "default": {"x": 1}
                        }
                    }
                }]
            }"#,
        );
        let result = validate(&doc);
        assert_eq!(codes(&result), vec!["DATA_DEFAULT"]);
        assert_eq!(result.errors[0].path, "modules[0].declaration.data.default");
    }

    #[test]
    fn test_inline_type_default_conformance() {
        let doc = parse(
            r#"{
                "schemaVersion": "0.2.0",
                "name": "clock",
                "path": "clock.js",
                "declaration": {
                    "data": {
                        "name": "clock",
                        "type": {"text": "string"},
                        "default": 42
                    }
                }
            }"#,
        );
        let result = validate(&doc);
        assert_eq!(codes(&result), vec!["DATA_DEFAULT"]);
        assert_eq!(result.errors[0].path, "declaration.data.default");
    }

    #[test]
    fn test_ui_without_schema_is_a_warning() {
        let doc = parse(
            r#"{
                "schemaVersion": "0.3.0",
                "name": "clock",
                "path": "clock.js",
                "dataUserInterface": {"path": "clock-editor.js"}
            }"#,
        );
        let result = validate(&doc);
        assert!(result.is_clean());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, "UI_WITHOUT_SCHEMA");
    }

    #[test]
    fn test_top_level_data_default_checked_in_hoisted_form() {
        let doc = parse(
            r#"{
                "schemaVersion": "0.3.0",
                "name": "clock",
                "path": "clock.js",
                "dataSchema": {"type": "object"},
                "dataDefault": "not-an-object"
            }"#,
        );
        let result = validate(&doc);
        assert_eq!(codes(&result), vec!["DATA_DEFAULT"]);
        assert_eq!(result.errors[0].path, "dataDefault");
    }
}

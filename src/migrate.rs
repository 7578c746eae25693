//! Forward migration between schema revisions
//!
//! Migration is a chain of single-step transforms, each mapping one
//! revision's shape to the next. The chain runs strictly forward, one step
//! at a time, validating each intermediate against the target revision's
//! rule set before proceeding. A step that cannot complete without data
//! loss or ambiguity fails the whole chain atomically: the error carries the
//! failing step and the caller's document is never touched, so no partially
//! migrated document can ever be observed.

use serde_json::{json, Map, Value};

use crate::document::{self, ManifestDocument, MODULE_KIND};
use crate::error::MigrationError;
use crate::registry;
use crate::validator;
use crate::version::SchemaVersion;

/// Migrate a document forward to the latest schema revision.
///
/// A document already at the latest revision migrates to an identical
/// document.
pub fn migrate(doc: &ManifestDocument) -> Result<ManifestDocument, MigrationError> {
    if doc.version().is_latest() {
        return Ok(doc.clone());
    }

    let mut current = doc.source().clone();
    let mut version = doc.version();

    loop {
        let Some(target) = version.next() else { break };
        current = match version {
            SchemaVersion::V0_1_0 => flatten_modules(current)?,
            SchemaVersion::V0_2_0 => hoist_data_schema(current)?,
            SchemaVersion::V0_3_0 => wrap_into_modules(current)?,
            SchemaVersion::V1_0_0 => break,
        };
        if let Some(root) = current.as_object_mut() {
            root.insert("schemaVersion".to_string(), json!(target.as_str()));
        }

        let rule_set = registry::rule_set_for(target);
        let checked = validator::validate_value(rule_set, &current);
        if !checked.is_clean() {
            return Err(MigrationError::InvalidIntermediate {
                version: target.as_str().to_string(),
                errors: checked.errors,
            });
        }
        tracing::debug!(from = %version, to = %target, "migration step complete");
        version = target;
    }

    ManifestDocument::from_value(current).map_err(|error| MigrationError::Reparse {
        version: version.as_str().to_string(),
        reason: error.to_string(),
    })
}

fn shape_error(version: SchemaVersion, reason: &str) -> MigrationError {
    MigrationError::Reparse {
        version: version.as_str().to_string(),
        reason: reason.to_string(),
    }
}

fn into_map(value: Value, version: SchemaVersion) -> Result<Map<String, Value>, MigrationError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(shape_error(version, "expected a JSON object")),
    }
}

/// Derive a package name from a module path (`widgets/clock.js` -> `clock`).
fn package_name_from_path(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = file.split('.').next().unwrap_or(file);
    if stem.is_empty() {
        path.to_string()
    } else {
        stem.to_string()
    }
}

/// `0.1.0` -> `0.2.0`: collapse the single module's single declaration into
/// the package-level `declaration`. The flat target cannot represent more
/// than one of either, so multiplicity fails rather than silently dropping.
fn flatten_modules(value: Value) -> Result<Value, MigrationError> {
    let source = SchemaVersion::V0_1_0;
    let mut root = into_map(value, source)?;

    let modules = match root.remove("modules") {
        Some(Value::Array(modules)) => modules,
        _ => return Err(shape_error(source, "`modules` must be an array")),
    };
    if modules.len() != 1 {
        return Err(MigrationError::MultiplicityNotRepresentable {
            modules: modules.len(),
            declarations: 0,
        });
    }
    let mut module = match modules.into_iter().next() {
        Some(Value::Object(module)) => module,
        _ => return Err(shape_error(source, "`modules[0]` must be an object")),
    };

    let declarations = match module.remove("declarations") {
        Some(Value::Array(declarations)) => declarations,
        Some(_) => return Err(shape_error(source, "`declarations` must be an array")),
        None => Vec::new(),
    };
    if declarations.len() > 1 {
        return Err(MigrationError::MultiplicityNotRepresentable {
            modules: 1,
            declarations: declarations.len(),
        });
    }

    let path = match module.get("path").and_then(Value::as_str) {
        Some(path) => path.to_string(),
        None => return Err(shape_error(source, "`modules[0].path` must be a string")),
    };
    root.insert("name".to_string(), json!(package_name_from_path(&path)));
    root.insert("path".to_string(), json!(path));
    for field in ["summary", "description"] {
        if let Some(text) = module.remove(field) {
            root.insert(field.to_string(), text);
        }
    }
    if let Some(declaration) = declarations.into_iter().next() {
        root.insert("declaration".to_string(), declaration);
    }

    Ok(Value::Object(root))
}

/// `0.2.0` -> `0.3.0`: lower the inline `data.type` to a JSON Schema and
/// hoist schema, default, and label to the top level. Label fields survive
/// as JSON Schema `title`/`description` annotations. An inline type with no
/// JSON primitive equivalent fails explicitly rather than guessing.
fn hoist_data_schema(value: Value) -> Result<Value, MigrationError> {
    let source = SchemaVersion::V0_2_0;
    let mut root = into_map(value, source)?;

    let Some(declaration_value) = root.remove("declaration") else {
        return Ok(Value::Object(root));
    };
    let mut declaration = into_map(declaration_value, source)?;

    if let Some(data_value) = declaration.remove("data") {
        let mut data = into_map(data_value, source)?;
        if let Some(type_value) = data.remove("type") {
            let text = type_value
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let primitive = document::json_primitive_for(text).ok_or_else(|| {
                MigrationError::UnmappableType {
                    text: text.to_string(),
                }
            })?;
            let mut schema = json!({ "type": primitive });
            if let Some(name) = data.get("name").and_then(Value::as_str) {
                schema["title"] = json!(name);
            }
            if let Some(description) = data.get("description").and_then(Value::as_str) {
                schema["description"] = json!(description);
            }
            root.insert("dataSchema".to_string(), schema);
        }
        if let Some(default) = data.remove("default") {
            root.insert("dataDefault".to_string(), default);
        }
    }
    root.insert("declaration".to_string(), Value::Object(declaration));

    Ok(Value::Object(root))
}

/// `0.3.0` -> `1.0.0`: wrap the flat package into a single-module array,
/// folding the hoisted data description back into `declaration.data`.
fn wrap_into_modules(value: Value) -> Result<Value, MigrationError> {
    let source = SchemaVersion::V0_3_0;
    let mut root = into_map(value, source)?;

    let path = match root.remove("path") {
        Some(Value::String(path)) => path,
        _ => return Err(shape_error(source, "`path` must be a string")),
    };
    let mut declaration = match root.remove("declaration") {
        Some(declaration_value) => into_map(declaration_value, source)?,
        None => Map::new(),
    };

    let schema = root.remove("dataSchema");
    let default = root.remove("dataDefault");
    let user_interface = root.remove("dataUserInterface");
    if schema.is_some() || default.is_some() || user_interface.is_some() {
        let data_name = schema
            .as_ref()
            .and_then(|s| s.get("title"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                root.get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "data".to_string());
        let mut data = Map::new();
        data.insert("name".to_string(), json!(data_name));
        if let Some(schema) = schema {
            data.insert("schema".to_string(), schema);
        }
        if let Some(default) = default {
            data.insert("default".to_string(), default);
        }
        if let Some(user_interface) = user_interface {
            data.insert("userInterface".to_string(), user_interface);
        }
        declaration.insert("data".to_string(), Value::Object(data));
    }

    let mut module = Map::new();
    module.insert("kind".to_string(), json!(MODULE_KIND));
    module.insert("path".to_string(), json!(path));
    for field in ["summary", "description"] {
        if let Some(text) = root.remove(field) {
            module.insert(field.to_string(), text);
        }
    }
    if !declaration.is_empty() {
        module.insert("declaration".to_string(), Value::Object(declaration));
    }
    root.insert("modules".to_string(), json!([Value::Object(module)]));

    Ok(Value::Object(root))
}

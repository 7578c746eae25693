//! End-to-end migration coverage
//!
//! Drives full chains from every historical revision to the latest shape
//! and checks where each piece of the source document lands.

use widget_manifest::{migrate, parse, validate, MigrationError, SchemaVersion};

#[test]
fn test_chain_from_0_1_lands_every_field() {
    let doc = parse(include_str!("fixtures/clock_v0_1.json")).unwrap();
    assert_eq!(doc.version(), SchemaVersion::V0_1_0);

    let migrated = migrate(&doc).unwrap();
    assert_eq!(migrated.version(), SchemaVersion::V1_0_0);
    assert!(validate(&migrated).is_clean());

    let root = migrated.source();
    // Package name derived from the module path stem.
    assert_eq!(root["name"], "clock");
    assert_eq!(root["readme"], doc.source()["readme"]);

    let module = &root["modules"][0];
    assert_eq!(module["kind"], "web-widget-application");
    assert_eq!(module["path"], "widgets/clock.js");
    assert_eq!(module["summary"], "A timezone-aware clock.");

    let declaration = &module["declaration"];
    assert_eq!(declaration["slots"][0]["name"], "");
    assert_eq!(declaration["cssParts"][0]["name"], "face");
    assert_eq!(declaration["parameters"][0]["name"], "timezone");

    // The inline `object` type was lowered to a JSON Schema, keeping the
    // data label as title/description annotations.
    let data = &declaration["data"];
    assert_eq!(data["name"], "clock");
    assert_eq!(data["schema"]["type"], "object");
    assert_eq!(data["schema"]["title"], "clock");
    assert_eq!(data["schema"]["description"], "Clock configuration.");
    assert_eq!(data["default"]["showSeconds"], true);
}

#[test]
fn test_chain_from_0_2() {
    let doc = parse(
        r#"{
            "schemaVersion": "0.2.0",
            "name": "counter",
            "path": "widgets/counter.js",
            "description": "Counts things.",
            "icons": [{"path": "icon.png", "sizes": "any"}],
            "declaration": {
                "slots": [{"name": "label"}],
                "data": {
                    "name": "counter",
                    "type": {"text": "integer"},
                    "default": 0
                }
            }
        }"#,
    )
    .unwrap();

    let migrated = migrate(&doc).unwrap();
    assert_eq!(migrated.version(), SchemaVersion::V1_0_0);
    assert!(validate(&migrated).is_clean());

    let root = migrated.source();
    assert_eq!(root["name"], "counter");
    assert_eq!(root["icons"][0]["sizes"], "any");
    let module = &root["modules"][0];
    assert_eq!(module["path"], "widgets/counter.js");
    assert_eq!(module["description"], "Counts things.");
    let data = &module["declaration"]["data"];
    assert_eq!(data["schema"]["type"], "integer");
    assert_eq!(data["default"], 0);
    assert_eq!(module["declaration"]["slots"][0]["name"], "label");
}

#[test]
fn test_chain_from_0_3_preserves_user_interface() {
    let doc = parse(
        r#"{
            "schemaVersion": "0.3.0",
            "name": "notes",
            "path": "widgets/notes.js",
            "dataSchema": {"type": "object", "title": "notes-config"},
            "dataDefault": {"pinned": []},
            "dataUserInterface": {
                "path": "widgets/notes-editor.js",
                "fallbackPath": "widgets/notes-editor.fallback.js"
            }
        }"#,
    )
    .unwrap();

    let migrated = migrate(&doc).unwrap();
    assert!(validate(&migrated).is_clean());

    let data = &migrated.source()["modules"][0]["declaration"]["data"];
    assert_eq!(data["name"], "notes-config");
    assert_eq!(data["userInterface"]["path"], "widgets/notes-editor.js");
    assert_eq!(
        data["userInterface"]["fallbackPath"],
        "widgets/notes-editor.fallback.js"
    );
    assert_eq!(data["default"]["pinned"], serde_json::json!([]));
}

#[test]
fn test_migration_produces_a_new_document() {
    let doc = parse(include_str!("fixtures/clock_v0_1.json")).unwrap();
    let migrated = migrate(&doc).unwrap();

    assert_ne!(doc.fingerprint(), migrated.fingerprint());
    assert_eq!(doc.version(), SchemaVersion::V0_1_0);
    assert!(doc.fingerprint().verify_json(doc.source()));
}

#[test]
fn test_unmappable_type_aborts_the_whole_chain() {
    // The failure happens in the 0.2.0 -> 0.3.0 step, but the caller sees
    // one atomic failure starting from 0.1.0.
    let doc = parse(
        r#"{
            "schemaVersion": "0.1.0",
            "modules": [{
                "kind": "web-widget-application",
                "path": "chart.js",
                "declarations": [{
                    "data": {
                        "name": "chart",
                        "type": {"text": "Map<string, Series>"},
                        "default": {}
                    }
                }]
            }]
        }"#,
    )
    .unwrap();
    let before = doc.clone();

    match migrate(&doc) {
        Err(MigrationError::UnmappableType { text }) => {
            assert_eq!(text, "Map<string, Series>");
        }
        other => panic!("expected UnmappableType, got {other:?}"),
    }
    assert_eq!(doc, before);
}

#[test]
fn test_widget_without_data_migrates_cleanly() {
    let doc = parse(
        r#"{
            "schemaVersion": "0.1.0",
            "modules": [{
                "kind": "web-widget-application",
                "path": "widgets/badge.js",
                "declarations": [{"cssParts": [{"name": "ring"}]}]
            }]
        }"#,
    )
    .unwrap();

    let migrated = migrate(&doc).unwrap();
    assert!(validate(&migrated).is_clean());
    let declaration = &migrated.source()["modules"][0]["declaration"];
    assert_eq!(declaration["cssParts"][0]["name"], "ring");
    assert!(declaration.get("data").is_none());
}

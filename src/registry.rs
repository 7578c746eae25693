//! Version registry and structural rule sets
//!
//! One immutable [`RuleSet`] per historical schema revision. A rule set is
//! data, not code: a table of named object shapes, each listing its field
//! rules. The validator walks raw JSON against these tables; the migrator
//! checks its intermediate output against them. Registration is append-only
//! and happens once at startup; lookups afterwards are read-only, so
//! documents can be processed concurrently without coordination.

use std::sync::OnceLock;

use crate::error::{ManifestError, Result};
use crate::version::SchemaVersion;

/// The expected shape of a single manifest field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any string.
    Str,
    /// Markdown-bearing string, carried opaquely and never interpreted.
    Markdown,
    Bool,
    /// Non-negative integer (character offsets).
    Uint,
    /// Arbitrary JSON (embedded schemas, default values).
    Any,
    /// An exact string literal tag.
    Literal(&'static str),
    /// A nested object shape, by name in the rule set's shape table.
    Shape(&'static str),
    /// An array of a named object shape.
    List(&'static str),
    /// A CSS custom property name (leading `--`).
    CustomPropertyName,
    /// Space-separated `WxH`/`any` icon size tokens.
    IconSizes,
    /// A CSS syntax string, checked for grammar well-formedness only.
    CssSyntax,
}

/// One field of an object shape.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

impl FieldRule {
    const fn req(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            required: true,
            kind,
        }
    }

    const fn opt(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            required: false,
            kind,
        }
    }
}

/// A named object shape: the fields a conforming object may carry.
#[derive(Debug, Clone, Copy)]
pub struct ShapeRules {
    pub name: &'static str,
    pub fields: &'static [FieldRule],
}

impl ShapeRules {
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The structural rules for one schema revision.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    version: SchemaVersion,
    root: &'static ShapeRules,
    shapes: &'static [ShapeRules],
}

impl RuleSet {
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// The root (package-level) shape.
    pub fn root(&self) -> &'static ShapeRules {
        self.root
    }

    /// Look up a nested shape by name.
    pub fn shape(&self, name: &str) -> Option<&'static ShapeRules> {
        self.shapes.iter().find(|s| s.name == name)
    }
}

// Component shapes shared across revisions.

const TYPE_REFERENCE_FIELDS: &[FieldRule] = &[
    FieldRule::req("name", FieldKind::Str),
    FieldRule::opt("package", FieldKind::Str),
    FieldRule::opt("module", FieldKind::Str),
    FieldRule::opt("start", FieldKind::Uint),
    FieldRule::opt("end", FieldKind::Uint),
];

const SOURCE_REFERENCE_FIELDS: &[FieldRule] = &[FieldRule::req("href", FieldKind::Str)];

const TYPE_FIELDS: &[FieldRule] = &[
    FieldRule::req("text", FieldKind::Str),
    FieldRule::opt("references", FieldKind::List("typeReference")),
    FieldRule::opt("source", FieldKind::Shape("sourceReference")),
];

const SLOT_FIELDS: &[FieldRule] = &[
    FieldRule::req("name", FieldKind::Str),
    FieldRule::opt("summary", FieldKind::Markdown),
    FieldRule::opt("description", FieldKind::Markdown),
];

const CSS_PART_FIELDS: &[FieldRule] = &[
    FieldRule::req("name", FieldKind::Str),
    FieldRule::opt("summary", FieldKind::Markdown),
    FieldRule::opt("description", FieldKind::Markdown),
];

const PORTAL_FIELDS: &[FieldRule] = &[
    FieldRule::req("name", FieldKind::Str),
    FieldRule::opt("summary", FieldKind::Markdown),
    FieldRule::opt("description", FieldKind::Markdown),
];

const CSS_PROPERTY_FIELDS: &[FieldRule] = &[
    FieldRule::req("name", FieldKind::CustomPropertyName),
    FieldRule::opt("syntax", FieldKind::CssSyntax),
    FieldRule::opt("default", FieldKind::Str),
    FieldRule::opt("summary", FieldKind::Markdown),
    FieldRule::opt("description", FieldKind::Markdown),
];

const PARAMETER_FIELDS: &[FieldRule] = &[
    FieldRule::req("name", FieldKind::Str),
    FieldRule::opt("summary", FieldKind::Markdown),
    FieldRule::opt("description", FieldKind::Markdown),
    FieldRule::opt("type", FieldKind::Shape("type")),
    FieldRule::opt("default", FieldKind::Str),
    FieldRule::opt("optional", FieldKind::Bool),
];

const DEMO_FIELDS: &[FieldRule] = &[
    FieldRule::req("url", FieldKind::Str),
    FieldRule::opt("description", FieldKind::Markdown),
    FieldRule::opt("source", FieldKind::Shape("sourceReference")),
];

const ICON_FIELDS: &[FieldRule] = &[
    FieldRule::req("path", FieldKind::Str),
    FieldRule::req("sizes", FieldKind::IconSizes),
    FieldRule::opt("type", FieldKind::Str),
];

const DATA_USER_INTERFACE_FIELDS: &[FieldRule] = &[
    FieldRule::req("path", FieldKind::Str),
    FieldRule::opt("fallbackPath", FieldKind::Str),
];

// Data described by an inline hand-written type (0.1.0 / 0.2.0).
const DATA_INLINE_FIELDS: &[FieldRule] = &[
    FieldRule::req("name", FieldKind::Str),
    FieldRule::opt("summary", FieldKind::Markdown),
    FieldRule::opt("description", FieldKind::Markdown),
    FieldRule::opt("type", FieldKind::Shape("type")),
    FieldRule::opt("default", FieldKind::Any),
];

// Data described by an embedded JSON Schema (1.0.0).
const DATA_SCHEMA_FIELDS: &[FieldRule] = &[
    FieldRule::req("name", FieldKind::Str),
    FieldRule::opt("summary", FieldKind::Markdown),
    FieldRule::opt("description", FieldKind::Markdown),
    FieldRule::opt("schema", FieldKind::Any),
    FieldRule::opt("default", FieldKind::Any),
    FieldRule::opt("userInterface", FieldKind::Shape("dataUserInterface")),
];

const DECLARATION_COMMON: [FieldRule; 7] = [
    FieldRule::opt("parameters", FieldKind::List("parameter")),
    FieldRule::opt("portals", FieldKind::List("portal")),
    FieldRule::opt("slots", FieldKind::List("slot")),
    FieldRule::opt("cssParts", FieldKind::List("cssPart")),
    FieldRule::opt("cssProperties", FieldKind::List("cssProperty")),
    FieldRule::opt("demos", FieldKind::List("demo")),
    FieldRule::opt("sandboxed", FieldKind::Bool),
];

const DECLARATION_WITH_DATA_FIELDS: &[FieldRule] = &[
    DECLARATION_COMMON[0],
    DECLARATION_COMMON[1],
    DECLARATION_COMMON[2],
    DECLARATION_COMMON[3],
    DECLARATION_COMMON[4],
    DECLARATION_COMMON[5],
    DECLARATION_COMMON[6],
    FieldRule::opt("data", FieldKind::Shape("data")),
];

// 0.3.0 hoists the data description to the top level, so its declaration
// carries no `data` member.
const DECLARATION_WITHOUT_DATA_FIELDS: &[FieldRule] = &DECLARATION_COMMON;

const SLOT_SHAPE: ShapeRules = ShapeRules {
    name: "slot",
    fields: SLOT_FIELDS,
};
const CSS_PART_SHAPE: ShapeRules = ShapeRules {
    name: "cssPart",
    fields: CSS_PART_FIELDS,
};
const PORTAL_SHAPE: ShapeRules = ShapeRules {
    name: "portal",
    fields: PORTAL_FIELDS,
};
const CSS_PROPERTY_SHAPE: ShapeRules = ShapeRules {
    name: "cssProperty",
    fields: CSS_PROPERTY_FIELDS,
};
const PARAMETER_SHAPE: ShapeRules = ShapeRules {
    name: "parameter",
    fields: PARAMETER_FIELDS,
};
const DEMO_SHAPE: ShapeRules = ShapeRules {
    name: "demo",
    fields: DEMO_FIELDS,
};
const ICON_SHAPE: ShapeRules = ShapeRules {
    name: "icon",
    fields: ICON_FIELDS,
};
const TYPE_SHAPE: ShapeRules = ShapeRules {
    name: "type",
    fields: TYPE_FIELDS,
};
const TYPE_REFERENCE_SHAPE: ShapeRules = ShapeRules {
    name: "typeReference",
    fields: TYPE_REFERENCE_FIELDS,
};
const SOURCE_REFERENCE_SHAPE: ShapeRules = ShapeRules {
    name: "sourceReference",
    fields: SOURCE_REFERENCE_FIELDS,
};
const DATA_USER_INTERFACE_SHAPE: ShapeRules = ShapeRules {
    name: "dataUserInterface",
    fields: DATA_USER_INTERFACE_FIELDS,
};
const DATA_INLINE_SHAPE: ShapeRules = ShapeRules {
    name: "data",
    fields: DATA_INLINE_FIELDS,
};
const DATA_SCHEMA_SHAPE: ShapeRules = ShapeRules {
    name: "data",
    fields: DATA_SCHEMA_FIELDS,
};
const DECLARATION_WITH_DATA_SHAPE: ShapeRules = ShapeRules {
    name: "declaration",
    fields: DECLARATION_WITH_DATA_FIELDS,
};
const DECLARATION_WITHOUT_DATA_SHAPE: ShapeRules = ShapeRules {
    name: "declaration",
    fields: DECLARATION_WITHOUT_DATA_FIELDS,
};

// 0.1.0: array-of-modules with declarations per module.

const ROOT_0_1: ShapeRules = ShapeRules {
    name: "package",
    fields: &[
        FieldRule::req("schemaVersion", FieldKind::Str),
        FieldRule::opt("readme", FieldKind::Markdown),
        FieldRule::req("modules", FieldKind::List("module")),
    ],
};

const MODULE_0_1_SHAPE: ShapeRules = ShapeRules {
    name: "module",
    fields: &[
        FieldRule::req("kind", FieldKind::Literal(crate::document::MODULE_KIND)),
        FieldRule::req("path", FieldKind::Str),
        FieldRule::opt("summary", FieldKind::Markdown),
        FieldRule::opt("description", FieldKind::Markdown),
        FieldRule::opt("declarations", FieldKind::List("declaration")),
    ],
};

static RULE_SET_0_1: RuleSet = RuleSet {
    version: SchemaVersion::V0_1_0,
    root: &ROOT_0_1,
    shapes: &[
        MODULE_0_1_SHAPE,
        DECLARATION_WITH_DATA_SHAPE,
        DATA_INLINE_SHAPE,
        PARAMETER_SHAPE,
        PORTAL_SHAPE,
        SLOT_SHAPE,
        CSS_PART_SHAPE,
        CSS_PROPERTY_SHAPE,
        DEMO_SHAPE,
        TYPE_SHAPE,
        TYPE_REFERENCE_SHAPE,
        SOURCE_REFERENCE_SHAPE,
    ],
};

// 0.2.0: flat single-package form.

const ROOT_0_2: ShapeRules = ShapeRules {
    name: "package",
    fields: &[
        FieldRule::req("schemaVersion", FieldKind::Str),
        FieldRule::req("name", FieldKind::Str),
        FieldRule::req("path", FieldKind::Str),
        FieldRule::opt("summary", FieldKind::Markdown),
        FieldRule::opt("description", FieldKind::Markdown),
        FieldRule::opt("readme", FieldKind::Markdown),
        FieldRule::opt("icons", FieldKind::List("icon")),
        FieldRule::opt("declaration", FieldKind::Shape("declaration")),
    ],
};

static RULE_SET_0_2: RuleSet = RuleSet {
    version: SchemaVersion::V0_2_0,
    root: &ROOT_0_2,
    shapes: &[
        DECLARATION_WITH_DATA_SHAPE,
        DATA_INLINE_SHAPE,
        PARAMETER_SHAPE,
        PORTAL_SHAPE,
        SLOT_SHAPE,
        CSS_PART_SHAPE,
        CSS_PROPERTY_SHAPE,
        DEMO_SHAPE,
        ICON_SHAPE,
        TYPE_SHAPE,
        TYPE_REFERENCE_SHAPE,
        SOURCE_REFERENCE_SHAPE,
    ],
};

// 0.3.0: flat form with dataSchema / dataUserInterface at the top level.

const ROOT_0_3: ShapeRules = ShapeRules {
    name: "package",
    fields: &[
        FieldRule::req("schemaVersion", FieldKind::Str),
        FieldRule::req("name", FieldKind::Str),
        FieldRule::req("path", FieldKind::Str),
        FieldRule::opt("summary", FieldKind::Markdown),
        FieldRule::opt("description", FieldKind::Markdown),
        FieldRule::opt("readme", FieldKind::Markdown),
        FieldRule::opt("icons", FieldKind::List("icon")),
        FieldRule::opt("declaration", FieldKind::Shape("declaration")),
        FieldRule::opt("dataSchema", FieldKind::Any),
        FieldRule::opt("dataDefault", FieldKind::Any),
        FieldRule::opt("dataUserInterface", FieldKind::Shape("dataUserInterface")),
    ],
};

static RULE_SET_0_3: RuleSet = RuleSet {
    version: SchemaVersion::V0_3_0,
    root: &ROOT_0_3,
    shapes: &[
        DECLARATION_WITHOUT_DATA_SHAPE,
        DATA_USER_INTERFACE_SHAPE,
        PARAMETER_SHAPE,
        PORTAL_SHAPE,
        SLOT_SHAPE,
        CSS_PART_SHAPE,
        CSS_PROPERTY_SHAPE,
        DEMO_SHAPE,
        ICON_SHAPE,
        TYPE_SHAPE,
        TYPE_REFERENCE_SHAPE,
        SOURCE_REFERENCE_SHAPE,
    ],
};

// 1.0.0: modules again, one declaration per module, embedded data schemas.

const ROOT_1_0: ShapeRules = ShapeRules {
    name: "package",
    fields: &[
        FieldRule::req("schemaVersion", FieldKind::Str),
        FieldRule::opt("name", FieldKind::Str),
        FieldRule::opt("readme", FieldKind::Markdown),
        FieldRule::opt("icons", FieldKind::List("icon")),
        FieldRule::req("modules", FieldKind::List("module")),
    ],
};

const MODULE_1_0_SHAPE: ShapeRules = ShapeRules {
    name: "module",
    fields: &[
        FieldRule::req("kind", FieldKind::Literal(crate::document::MODULE_KIND)),
        FieldRule::req("path", FieldKind::Str),
        FieldRule::opt("summary", FieldKind::Markdown),
        FieldRule::opt("description", FieldKind::Markdown),
        FieldRule::opt("declaration", FieldKind::Shape("declaration")),
    ],
};

static RULE_SET_1_0: RuleSet = RuleSet {
    version: SchemaVersion::V1_0_0,
    root: &ROOT_1_0,
    shapes: &[
        MODULE_1_0_SHAPE,
        DECLARATION_WITH_DATA_SHAPE,
        DATA_SCHEMA_SHAPE,
        DATA_USER_INTERFACE_SHAPE,
        PARAMETER_SHAPE,
        PORTAL_SHAPE,
        SLOT_SHAPE,
        CSS_PART_SHAPE,
        CSS_PROPERTY_SHAPE,
        DEMO_SHAPE,
        ICON_SHAPE,
        TYPE_SHAPE,
        TYPE_REFERENCE_SHAPE,
        SOURCE_REFERENCE_SHAPE,
    ],
};

/// The rule set for a known revision.
pub fn rule_set_for(version: SchemaVersion) -> &'static RuleSet {
    match version {
        SchemaVersion::V0_1_0 => &RULE_SET_0_1,
        SchemaVersion::V0_2_0 => &RULE_SET_0_2,
        SchemaVersion::V0_3_0 => &RULE_SET_0_3,
        SchemaVersion::V1_0_0 => &RULE_SET_1_0,
    }
}

/// Append-only registry mapping `schemaVersion` strings to rule sets.
pub struct VersionRegistry {
    entries: Vec<RuleSet>,
}

impl VersionRegistry {
    /// An empty registry. Most callers want [`VersionRegistry::global`].
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The process-wide registry, populated with the builtin rule sets on
    /// first use and read-only thereafter.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<VersionRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::builtin)
    }

    fn builtin() -> Self {
        Self {
            entries: vec![RULE_SET_0_1, RULE_SET_0_2, RULE_SET_0_3, RULE_SET_1_0],
        }
    }

    /// Register a rule set. Registration is append-only: a second rule set
    /// for an already-registered version is an error.
    pub fn register(&mut self, rule_set: RuleSet) -> Result<()> {
        if self.lookup(rule_set.version().as_str()).is_some() {
            return Err(ManifestError::DuplicateRuleSet {
                version: rule_set.version().as_str().to_string(),
            });
        }
        self.entries.push(rule_set);
        self.entries.sort_by_key(|r| r.version().semver());
        Ok(())
    }

    /// Look up the rule set for a `schemaVersion` string. Unknown versions
    /// yield `None`, which parsing surfaces as a fatal error.
    pub fn lookup(&self, version: &str) -> Option<&RuleSet> {
        self.entries.iter().find(|r| r.version().as_str() == version)
    }

    /// All registered versions, oldest first.
    pub fn versions(&self) -> Vec<SchemaVersion> {
        self.entries.iter().map(RuleSet::version).collect()
    }

    /// The newest registered version by semver order.
    pub fn latest(&self) -> Option<SchemaVersion> {
        self.entries
            .iter()
            .map(RuleSet::version)
            .max_by_key(SchemaVersion::semver)
    }
}

impl Default for VersionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

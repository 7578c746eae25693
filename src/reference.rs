//! Symbol references between packages and modules
//!
//! A reference names an export of a module. `package` generally refers to an
//! npm-style package name; the literal token `"global:"` instead marks a
//! global-scope symbol such as `Array` or `HTMLElement`. Resolution here is
//! pure string normalization; dereferencing a resolved triple to an actual
//! file or symbol is an external collaborator's job.

use serde::{Deserialize, Serialize};

/// Package token that marks a reference to a global-scope symbol.
pub const GLOBAL_PACKAGE: &str = "global:";

/// A reference to an export of a module.
///
/// A missing `package` means the reference is local to the current package;
/// a missing `module` means it is local to the containing module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

/// A reference associated with a type string, optionally carrying a range
/// within that string.
///
/// `start` and `end` must both be present or both absent; when present they
/// are character offsets into the associated type text. The validator
/// enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeReference {
    #[serde(flatten)]
    pub reference: Reference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

/// A reference to the source of a declaration or member, as an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    pub href: String,
}

/// Where a resolved reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceScope {
    /// A platform built-in (`package` was the literal `"global:"` token).
    Global,
    /// A named external package.
    Package(String),
    /// Local to the current package.
    LocalPackage,
}

/// Normalized form of a [`Reference`]: trimmed, with empty strings collapsed
/// to absence and the global package token classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub scope: ReferenceScope,
    /// `None` means local to the containing module. Always `None` for
    /// global-scope symbols, which are not module-scoped.
    pub module: Option<String>,
    pub name: String,
}

impl Reference {
    pub fn resolve(&self) -> ResolvedReference {
        let package = normalize(self.package.as_deref());
        let scope = match package {
            Some(GLOBAL_PACKAGE) => ReferenceScope::Global,
            Some(name) => ReferenceScope::Package(name.to_string()),
            None => ReferenceScope::LocalPackage,
        };
        let module = if scope == ReferenceScope::Global {
            None
        } else {
            normalize(self.module.as_deref()).map(str::to_string)
        };
        ResolvedReference {
            scope,
            module,
            name: self.name.trim().to_string(),
        }
    }
}

impl TypeReference {
    pub fn resolve(&self) -> ResolvedReference {
        self.reference.resolve()
    }
}

fn normalize(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

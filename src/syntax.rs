//! Token-level grammars for manifest string fields
//!
//! These checks cover well-formedness only: a CSS syntax string is checked
//! for valid grammar tokens, never for CSS semantics, and icon sizes are
//! checked against the `WxH` token shape.

use std::sync::OnceLock;

use regex::Regex;

fn size_token_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[1-9][0-9]*x[1-9][0-9]*|any)$").unwrap())
}

fn ident_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?-?[a-zA-Z_][a-zA-Z0-9_-]*$").unwrap())
}

/// Whether a string is a CSS custom property name (leading `--` plus at
/// least one further character).
pub fn is_custom_property_name(name: &str) -> bool {
    name.starts_with("--") && name.len() > 2
}

/// Check an icon `sizes` value: one or more space-separated tokens, each
/// either `WxH` (positive decimal dimensions) or the literal `any`.
pub fn check_icon_sizes(sizes: &str) -> Result<(), String> {
    let tokens: Vec<&str> = sizes.split_whitespace().collect();
    if tokens.is_empty() {
        return Err("sizes must contain at least one WxH token".to_string());
    }
    let bad: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| !size_token_pattern().is_match(t))
        .collect();
    if bad.is_empty() {
        Ok(())
    } else {
        Err(format!("invalid size token(s): {}", bad.join(", ")))
    }
}

/// Check a CSS `@property`-style syntax string for grammar well-formedness.
///
/// Accepted forms: the universal `*`, or `|`-separated components where each
/// component is a `<type-name>` or a custom ident, optionally followed by a
/// `+` or `#` multiplier. Whether the names mean anything to CSS is out of
/// scope.
pub fn check_css_syntax(syntax: &str) -> Result<(), String> {
    let trimmed = syntax.trim();
    if trimmed.is_empty() {
        return Err("syntax string must not be empty".to_string());
    }
    if trimmed == "*" {
        return Ok(());
    }
    for component in trimmed.split('|') {
        check_syntax_component(component.trim())?;
    }
    Ok(())
}

fn check_syntax_component(component: &str) -> Result<(), String> {
    if component.is_empty() {
        return Err("empty syntax component (stray `|`?)".to_string());
    }
    let base = component
        .strip_suffix('+')
        .or_else(|| component.strip_suffix('#'))
        .unwrap_or(component);
    if base.is_empty() {
        return Err(format!("multiplier without a component: {component:?}"));
    }
    if let Some(inner) = base.strip_prefix('<') {
        let name = inner
            .strip_suffix('>')
            .ok_or_else(|| format!("unterminated type name: {component:?}"))?;
        if !ident_pattern().is_match(name) {
            return Err(format!("invalid type name: {component:?}"));
        }
        return Ok(());
    }
    if base.contains('>') {
        return Err(format!("unopened type name: {component:?}"));
    }
    if !ident_pattern().is_match(base) {
        return Err(format!("invalid custom ident: {component:?}"));
    }
    Ok(())
}

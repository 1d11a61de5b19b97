//! In-memory export and import transforms
//!
//! Sequences the codecs and engines for a whole document set without touching the file system
//! or the converter:
//!
//!     export:  per unit, in registry order: links → controls → flatten (+ escape)
//!              then boundary marker + unit text, concatenated
//!     import:  split + reconstruct → per unit: links → attributes → controls → collapse blanks
//!
//! File handling and the converter call live in [`crate::publish`].

use crate::common::{attributes, controls, flat_to_nested, links, nested_to_flat};
use crate::error::BridgeError;
use crate::grammar::Grammar;
use crate::ir::lexer::unit_boundary;
use crate::ir::nodes::{Malformation, Recovered};
use crate::registry::UnitRegistry;
use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// A unit's name together with its full source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitText {
    pub name: String,
    pub text: String,
}

impl UnitText {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Export one unit's source text to its linear form (without the boundary marker)
pub fn export_unit(
    name: &str,
    text: &str,
    registry: &UnitRegistry,
    grammar: &Grammar,
) -> Recovered<String> {
    let text = links::encode(text, name, registry, &grammar.controls);
    let text = controls::encode(&text, &grammar.controls);
    nested_to_flat::flatten_unit(&text, name, grammar)
}

/// Build the linear document for a complete unit set.
///
/// Every registered unit must be present and every given unit must be registered.
pub fn export_linear(
    units: &[UnitText],
    registry: &UnitRegistry,
    grammar: &Grammar,
) -> Result<Recovered<String>, BridgeError> {
    if let Some(stray) = units.iter().find(|unit| !registry.contains(&unit.name)) {
        return Err(BridgeError::UnknownUnit(stray.name.clone()));
    }

    let mut linear = String::new();
    let mut issues: Vec<Malformation> = Vec::new();
    for name in registry.names() {
        let unit = units.iter().find(|unit| unit.name == name).ok_or_else(|| {
            BridgeError::Configuration(format!("no source text for unit '{name}'"))
        })?;
        let anchor = registry
            .anchor(name)
            .ok_or_else(|| BridgeError::UnknownUnit(name.to_string()))?;

        tracing::debug!(unit = name, "flattening");
        let flat = export_unit(name, &unit.text, registry, grammar).into_value_collecting(&mut issues);
        linear.push_str("\n\n");
        linear.push_str(&unit_boundary(name, anchor));
        linear.push_str("\n\n");
        linear.push_str(&flat);
    }

    Ok(Recovered::with_issues(linear, issues))
}

/// Rebuild the unit texts from a linear document, in registry order.
///
/// Units missing from the document are reported and left out of the result.
pub fn import_linear(
    linear: &str,
    registry: &UnitRegistry,
    grammar: &Grammar,
) -> Recovered<Vec<UnitText>> {
    flat_to_nested::reconstruct(linear, registry, grammar).map(|units| {
        units
            .into_iter()
            .map(|unit| {
                tracing::debug!(unit = %unit.name, lines = unit.lines.len(), "restoring");
                let text = restore_lines(&unit.name, &unit.lines, registry, grammar);
                UnitText::new(unit.name, text)
            })
            .collect()
    })
}

fn restore_lines(
    name: &str,
    lines: &[String],
    registry: &UnitRegistry,
    grammar: &Grammar,
) -> String {
    let rules = &grammar.controls;
    let restored: Vec<String> = lines
        .iter()
        .map(|line| {
            let line = links::decode(line, name, registry, rules);
            let line = attributes::decode(&line, rules);
            controls::decode(&line, rules)
        })
        .collect();
    finish(&BLANK_RUN.replace_all(&restored.join("\n"), "\n\n"))
}

/// Exactly one trailing newline
fn finish(text: &str) -> String {
    let mut out = text.trim_end().to_string();
    out.push('\n');
    out
}

//! Link codec
//!
//! The linear document has a single anchor namespace, so references between units are folded
//! into it on export and unfolded on import:
//!
//!     inside a.md:   [t](a.md#x)  <->  [t](#x)
//!                    [t](a.md)    <->  [t](#a-md)          (the unit's own boundary anchor)
//!                    [t](b.md#x)  <->  [t](#b_md__x)
//!                    [t](b.md)    <->  [t](#b_md)
//!
//! Targets that do not name a registered unit (absolute URLs, other files, plain anchors) are
//! left as they are. Encoding also folds attribute annotations into the link text, since both
//! rewrites apply to the same link token.

use crate::common::attributes;
use crate::grammar::ControlRules;
use crate::ir::lexer::{scan_linear, scan_source};
use crate::ir::tokens::{render_tokens, InlineToken, Link};
use crate::registry::{UnitRegistry, ANCHOR_SEPARATOR};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static LOCAL_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#(\S+)$").unwrap());

/// Rewrite unit references in source text of `current_unit` into linear anchors
pub fn encode(
    text: &str,
    current_unit: &str,
    registry: &UnitRegistry,
    rules: &ControlRules,
) -> String {
    let tokens = scan_source(text, rules);
    render_tokens(&tokens, |token| match token {
        InlineToken::Link { link, .. } => encode_link(link, current_unit, registry),
        _ => None,
    })
}

/// Rewrite linear anchors in text of `current_unit` back into unit references
pub fn decode(
    text: &str,
    current_unit: &str,
    registry: &UnitRegistry,
    rules: &ControlRules,
) -> String {
    let tokens = scan_linear(text, rules);
    render_tokens(&tokens, |token| match token {
        InlineToken::Link { link, .. } => decode_target(&link.target, current_unit, registry)
            .map(|target| format!("[{}]({target})", link.text)),
        _ => None,
    })
}

fn encode_link(link: &Link, current_unit: &str, registry: &UnitRegistry) -> Option<String> {
    let text = attributes::fold(link);
    match encode_target(&link.target, current_unit, registry) {
        Some(target) => Some(format!("[{text}]({target})")),
        None if link.annotation.is_some() => Some(format!("[{text}]({})", link.target)),
        None => None,
    }
}

/// The linear form of a target, or `None` when it does not reference a registered unit
pub fn encode_target(target: &str, current_unit: &str, registry: &UnitRegistry) -> Option<String> {
    if Url::parse(target).is_ok() {
        return None;
    }
    let (unit, anchor) = match target.split_once('#') {
        Some((unit, anchor)) => (unit, Some(anchor).filter(|a| !a.is_empty())),
        None => (target, None),
    };
    if unit.is_empty() || !registry.contains(unit) {
        return None;
    }

    if unit == current_unit {
        return match anchor {
            Some(anchor) => Some(format!("#{anchor}")),
            None => registry.anchor(unit).map(|own| format!("#{own}")),
        };
    }
    let encoded = registry.encoded(unit)?;
    Some(match anchor {
        Some(anchor) => format!("#{encoded}{ANCHOR_SEPARATOR}{anchor}"),
        None => format!("#{encoded}"),
    })
}

/// The source form of a linear target, or `None` when it was never unit-encoded
pub fn decode_target(target: &str, current_unit: &str, registry: &UnitRegistry) -> Option<String> {
    let anchor = LOCAL_ANCHOR.captures(target)?.get(1)?.as_str();

    if registry.anchor(current_unit) == Some(anchor) {
        return Some(current_unit.to_string());
    }
    let Some((unit, original)) = registry.resolve_encoded(anchor) else {
        tracing::trace!(reference = target, unit = current_unit, "leaving plain anchor untouched");
        return None;
    };
    Some(match (unit == current_unit, original) {
        (true, Some(original)) => format!("#{original}"),
        (true, None) => unit.to_string(),
        (false, Some(original)) => format!("{unit}#{original}"),
        (false, None) => unit.to_string(),
    })
}

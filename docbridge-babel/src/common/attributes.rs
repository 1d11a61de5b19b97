//! Attribute-annotation codec
//!
//! A trailing `{ #id }` after a link does not survive the rich-text format as metadata, so on
//! export it is folded into the visible link text and the link is re-emitted bare:
//!
//!     [Go](b.md#x){ #y }   ->   [Go { #y }](...)
//!
//! On import a link whose visible text ends in a brace-delimited identifier is split back and
//! the annotation is reattached after the target in canonical `{ #id }` spacing.

use crate::grammar::ControlRules;
use crate::ir::lexer::scan_linear;
use crate::ir::tokens::{render_tokens, InlineToken, Link};
use once_cell::sync::Lazy;
use regex::Regex;

static FOLDED_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?s)(.*?) \{ *(#[^}]+?) *\}$").unwrap());

/// Visible text of a link once its annotation is folded in
pub fn fold(link: &Link) -> String {
    match &link.annotation {
        Some(annotation) => format!("{} {}", link.text, braced(annotation)),
        None => link.text.clone(),
    }
}

/// Split a folded annotation off visible text: `"Go { #y }"` → `("Go", Some("#y"))`
pub fn unfold(text: &str) -> (&str, Option<&str>) {
    match FOLDED_ANNOTATION.captures(text) {
        Some(caps) => match (caps.get(1), caps.get(2)) {
            (Some(prefix), Some(id)) => (prefix.as_str(), Some(id.as_str().trim())),
            _ => (text, None),
        },
        None => (text, None),
    }
}

/// Restore folded annotations on every link in a line of linear text
pub fn decode(line: &str, rules: &ControlRules) -> String {
    let tokens = scan_linear(line, rules);
    render_tokens(&tokens, |token| match token {
        InlineToken::Link { link, .. } => match unfold(&link.text) {
            (prefix, Some(id)) => Some(format!("[{prefix}]({}){}", link.target, braced(id))),
            (_, None) => None,
        },
        _ => None,
    })
}

/// `#y` → `{ #y }`
pub fn braced(annotation: &str) -> String {
    format!("{{ {} }}", annotation.trim())
}

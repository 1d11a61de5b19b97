//! Line classification and inline scanning
//!
//! Line level:
//!
//!     /// details | Summary      -> BlockStart { tag: "details", parameter: "Summary" }
//!     ///                        -> BlockEnd
//!         type: info             -> Metadata { key: "type:", value: "info" }
//!     **=== FILE: a.md ===**     -> UnitBoundary { name: "a.md" }   (linear documents only)
//!
//! Inline level, in the two spellings the codecs translate between:
//!
//!     source:  <input type='checkbox' checked id="cb-1" .../>   [Go](b.md#x){ #y }
//!     linear:  [cb-1]                                           [Go { #y }](#b_md__x)

use crate::grammar::{ControlRules, Grammar};
use crate::ir::tokens::{Control, ControlKind, InlineToken, Line, LineToken, Link};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Opening and closing sigil of every block marker
pub const BLOCK_SIGIL: &str = "///";

static BLOCK_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*///\s+(\w+)(.*)$").unwrap());
static BLOCK_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*///\s*$").unwrap());
static UNIT_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*=== FILE: ([\w./-]+) ===\*\*").unwrap());

static SOURCE_INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<input><input\b[^>]*>)|(?P<link>\[(?P<text>[^\]]+)\]\((?P<target>[^)]+)\)(?P<attr>\s*\{ *#[^}]+\})?)",
    )
    .unwrap()
});
static LINEAR_INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<link>\[(?P<text>[^\]]+)\]\((?P<target>[^)]+)\))|(?P<bracket>\[(?P<key>[^\]\s]+)\])")
        .unwrap()
});
static INPUT_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\b(id|name)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Build the unit boundary marker line for a unit
pub fn unit_boundary(name: &str, anchor: &str) -> String {
    format!("**=== FILE: {name} ===** {{#{anchor}}}")
}

/// Name carried by a unit boundary marker anywhere in the line
pub fn boundary_name(line: &str) -> Option<&str> {
    UNIT_BOUNDARY
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Classify one line of a source unit (unit boundaries are not recognised here)
pub fn classify_line(line: &str, grammar: &Grammar) -> LineToken {
    if let Some(caps) = BLOCK_START.captures(line) {
        return LineToken::BlockStart {
            tag: caps[1].to_string(),
            parameter: normalize_parameter(&caps[2]),
        };
    }
    if BLOCK_END.is_match(line) {
        return LineToken::BlockEnd;
    }
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineToken::Blank;
    }
    if let Some(key) = grammar.metadata_key(trimmed) {
        return LineToken::Metadata {
            key: key.to_string(),
            value: trimmed[key.len()..].trim().to_string(),
        };
    }
    LineToken::Content
}

/// Classify one line of a linear document, recognising unit boundaries first
pub fn classify_linear_line(line: &str, grammar: &Grammar) -> LineToken {
    match boundary_name(line) {
        Some(name) => LineToken::UnitBoundary {
            name: name.to_string(),
        },
        None => classify_line(line, grammar),
    }
}

/// Split a unit's text into classified lines
///
/// Splits on `\n` only, so a trailing newline yields a final blank line.
pub fn lex_source(text: &str, grammar: &Grammar) -> Vec<Line> {
    text.split('\n')
        .enumerate()
        .map(|(idx, raw)| Line {
            number: idx + 1,
            text: raw.to_string(),
            token: classify_line(raw, grammar),
            hard_break: false,
        })
        .collect()
}

/// `" | ul.tasklist"` → `"ul.tasklist"`
fn normalize_parameter(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('|')
        .map(str::trim)
        .unwrap_or(trimmed)
        .to_string()
}

/// Scan text in source spelling: `<input>` elements and links with optional annotations.
pub fn scan_source(text: &str, rules: &ControlRules) -> Vec<InlineToken> {
    scan(text, &SOURCE_INLINE, |caps| {
        if let Some(input) = caps.name("input") {
            return input_control(input.as_str(), rules).map(|control| InlineToken::Control {
                control,
                raw: input.as_str().to_string(),
            });
        }
        let annotation = caps
            .name("attr")
            .map(|attr| attr_identifier(attr.as_str()));
        Some(InlineToken::Link {
            link: Link {
                text: caps["text"].to_string(),
                target: caps["target"].to_string(),
                annotation,
            },
            raw: caps[0].to_string(),
        })
    })
}

/// Scan text in linear spelling: bracket control tokens and plain links.
///
/// A bracket immediately followed by `(...)` is always link text, never a control.
pub fn scan_linear(text: &str, rules: &ControlRules) -> Vec<InlineToken> {
    scan(text, &LINEAR_INLINE, |caps| {
        if let Some(key) = caps.name("key") {
            return bracket_control(key.as_str(), rules).map(|control| InlineToken::Control {
                control,
                raw: caps[0].to_string(),
            });
        }
        Some(InlineToken::Link {
            link: Link {
                text: caps["text"].to_string(),
                target: caps["target"].to_string(),
                annotation: None,
            },
            raw: caps[0].to_string(),
        })
    })
}

fn scan<F>(text: &str, pattern: &Regex, mut token_for: F) -> Vec<InlineToken>
where
    F: FnMut(&Captures<'_>) -> Option<InlineToken>,
{
    let mut tokens = Vec::new();
    let mut pending = String::new();
    let mut last = 0;
    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        pending.push_str(&text[last..whole.start()]);
        match token_for(&caps) {
            Some(token) => {
                if !pending.is_empty() {
                    tokens.push(InlineToken::Text(std::mem::take(&mut pending)));
                }
                tokens.push(token);
            }
            None => pending.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    pending.push_str(&text[last..]);
    if !pending.is_empty() {
        tokens.push(InlineToken::Text(pending));
    }
    tokens
}

fn input_control(element: &str, rules: &ControlRules) -> Option<Control> {
    let mut id = None;
    let mut name = None;
    for caps in INPUT_ATTR.captures_iter(element) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string());
        match &caps[1] {
            "id" => id = id.or(value),
            _ => name = name.or(value),
        }
    }

    if let Some(id) = id.filter(|id| has_keyed_prefix(id, &rules.identity_prefix)) {
        return Some(Control {
            kind: ControlKind::Identity,
            key: id,
        });
    }
    name.filter(|name| has_keyed_prefix(name, &rules.name_prefix))
        .map(|name| Control {
            kind: ControlKind::Name,
            key: name,
        })
}

fn bracket_control(key: &str, rules: &ControlRules) -> Option<Control> {
    let kind = if has_keyed_prefix(key, &rules.identity_prefix) {
        ControlKind::Identity
    } else if has_keyed_prefix(key, &rules.name_prefix) {
        ControlKind::Name
    } else {
        return None;
    };
    Some(Control {
        kind,
        key: key.to_string(),
    })
}

fn has_keyed_prefix(key: &str, prefix: &str) -> bool {
    !prefix.is_empty() && key.len() > prefix.len() && key.starts_with(prefix)
}

/// `" { #ref-1 }"` → `"#ref-1"`
fn attr_identifier(attr: &str) -> String {
    attr.trim()
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim()
        .to_string()
}

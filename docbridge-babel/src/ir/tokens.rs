//! Typed token stream shared by the export and import directions.
//!
//! Lines are classified once into [`LineToken`]s; inline syntax inside a line (controls and
//! links) is scanned into [`InlineToken`]s. Both codecs and both engines work on these tokens
//! instead of matching raw strings on their own.

use serde::Serialize;

/// Classification of a single line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LineToken {
    /// `**=== FILE: name ===**` (linear documents only)
    UnitBoundary { name: String },
    /// `/// tag parameter`
    BlockStart { tag: String, parameter: String },
    /// `///`
    BlockEnd,
    /// `type: info`, `open: true`
    Metadata { key: String, value: String },
    Blank,
    Content,
}

/// A line together with its classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    /// 1-based position in the text the line was read from
    pub number: usize,
    /// The line as read, indentation included
    pub text: String,
    pub token: LineToken,
    /// The converter delivered this line with a trailing hard line break
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hard_break: bool,
}

impl Line {
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.token == LineToken::Blank
    }
}

/// The two kinds of embedded checkbox controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlKind {
    /// Keyed by a unique `id`, toggles a related group
    Identity,
    /// Keyed by a shared group `name`, used for tallying
    Name,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Control {
    pub kind: ControlKind,
    pub key: String,
}

/// `[text](target){ #annotation }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub text: String,
    pub target: String,
    /// Identifier of a trailing attribute annotation, `#` included
    pub annotation: Option<String>,
}

/// A piece of a line after inline scanning
///
/// Controls and links keep the exact source text they were scanned from so a codec can
/// re-emit the tokens it does not handle untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineToken {
    Text(String),
    Control { control: Control, raw: String },
    Link { link: Link, raw: String },
}

impl InlineToken {
    pub fn raw(&self) -> &str {
        match self {
            InlineToken::Text(text) => text,
            InlineToken::Control { raw, .. } | InlineToken::Link { raw, .. } => raw,
        }
    }
}

/// Concatenate tokens, rendering each through `render` or falling back to its raw text.
pub fn render_tokens<F>(tokens: &[InlineToken], mut render: F) -> String
where
    F: FnMut(&InlineToken) -> Option<String>,
{
    let mut out = String::new();
    for token in tokens {
        match render(token) {
            Some(text) => out.push_str(&text),
            None => out.push_str(token.raw()),
        }
    }
    out
}

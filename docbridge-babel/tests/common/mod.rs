//! Shared fixtures and a simulated rich-text converter.
//!
//! `SimulatedConverter` mimics what a markdown → docx → markdown trip does to the linear
//! document, without needing pandoc: consecutive lines are re-wrapped into one paragraph line
//! unless the earlier one ends in a hard break, runs of blank lines collapse to one, HTML
//! entities come back as escaped punctuation and literal `|`, `_`, `[`, `]`, `{`, `}` are
//! backslash-escaped.

use docbridge_babel::{BridgeError, Converter, Grammar, UnitRegistry, UnitText};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(([^)\s]*)\)").unwrap());

pub const INTRO: &str = r#"# Introduction

Welcome. See [setup](guide/setup.md#install){ #to-setup } and [refs](refs.md).

/// details | Why this matters
    type: info
    open: true

Short answer first.
///

/// html | ul.tasklist

  /// html | li

    <input type='checkbox' checked id="cb-1" class="cb-sa" onchange="toggleCheckboxes(event)"/> I agree with the premise
  ///

  /// html | li

    <input type='checkbox' checked name="pledge_alpha" class="data-input" /> I will share it
  ///

///
"#;

pub const SETUP: &str = r#"# Setup

## Install {#install}

Run the installer. Back to [the introduction](intro.md).

Jump to [install](#install) on this page, or to [the top](guide/setup.md).

/// html | div.note

    Prefer the stable channel.

///
"#;

pub const REFS: &str = r#"# References

Pandoc user guide: <https://pandoc.org/MANUAL.html>

See also [CommonMark](https://commonmark.org/).
"#;

pub fn registry() -> UnitRegistry {
    UnitRegistry::new(["intro.md", "guide/setup.md", "refs.md"]).unwrap()
}

pub fn grammar() -> Grammar {
    Grammar::default()
}

pub fn fixture_units() -> Vec<UnitText> {
    vec![
        UnitText::new("intro.md", INTRO),
        UnitText::new("guide/setup.md", SETUP),
        UnitText::new("refs.md", REFS),
    ]
}

/// Write the fixture units under `docs_dir`
pub fn write_fixture_units(docs_dir: &Path) {
    for unit in fixture_units() {
        let path = docs_dir.join(&unit.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, unit.text).unwrap();
    }
}

/// Drop blank lines and trailing whitespace, for comparisons that ignore spacing
pub fn normalized(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converter that stores the linear text as the "document" and re-reads it lossily
#[derive(Debug, Default)]
pub struct SimulatedConverter;

impl Converter for SimulatedConverter {
    fn name(&self) -> &str {
        "simulated"
    }

    fn render(&self, linear: &str, _source_format: &str) -> Result<Vec<u8>, BridgeError> {
        Ok(linear.as_bytes().to_vec())
    }

    fn extract(&self, document: &Path) -> Result<String, BridgeError> {
        let text = fs::read_to_string(document)
            .map_err(|e| BridgeError::Converter(format!("cannot read {}: {e}", document.display())))?;
        Ok(simulate_round_trip(&text))
    }
}

/// What the linear document looks like after a trip through a word-processor format
pub fn simulate_round_trip(linear: &str) -> String {
    let mut paragraphs: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for line in linear.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }
        match current.last_mut() {
            Some(previous) if !previous.ends_with('\\') => {
                previous.push(' ');
                previous.push_str(line.trim_start());
            }
            _ => current.push(line.to_string()),
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    let mut out = paragraphs
        .iter()
        .map(|paragraph| {
            paragraph
                .iter()
                .map(|line| escape_line(line))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    out.push('\n');
    out
}

fn escape_line(line: &str) -> String {
    let line = line.replace("&lt;", "\\<").replace("&gt;", "\\>");
    let mut out = String::new();
    let mut last = 0;
    for caps in LINK.captures_iter(&line) {
        let whole = caps.get(0).unwrap();
        out.push_str(&escape_text(&line[last..whole.start()], true));
        out.push('[');
        out.push_str(&escape_text(&caps[1], false));
        out.push_str("](");
        out.push_str(&caps[2]);
        out.push(')');
        last = whole.end();
    }
    out.push_str(&escape_text(&line[last..], true));
    out
}

fn escape_text(text: &str, brackets: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '|' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(ch);
            }
            '[' | ']' if brackets => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

#[test]
fn simulation_rewraps_and_escapes() {
    let linear = "One\ntwo ///\n\n\n\n[cb-1] Yes\\\n/// html | li\n\nSee [a_b { #c }](#x_y) and x_y";
    assert_eq!(
        simulate_round_trip(linear),
        "One two ///\n\n\\[cb-1\\] Yes\\\n/// html \\| li\n\nSee [a\\_b \\{ #c \\}](#x_y) and x\\_y\n"
    );
}

#[test]
fn simulation_turns_entities_into_escapes() {
    assert_eq!(simulate_round_trip("&lt;b&gt;"), "\\<b\\>\n");
}

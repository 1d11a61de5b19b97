//! Rebuilds the nested, multi-unit source form from a linear document.
//!
//! # The High-Level Concept
//!
//! The linear document comes back from the external converter with all indentation gone and
//! with the converter's own habits applied: punctuation escaped, hard line breaks spelled as a
//! trailing `\`, and an end marker sometimes glued to the end of the preceding paragraph. The
//! reconstruction undoes those habits, splits the text at unit boundary markers, rebuilds each
//! unit's block tree, and renders the tree back with the indentation each block type gives its
//! children.
//!
//! # The Algorithm
//!
//! 1. **Pre-pass:** a line ending in an end marker (and not consisting of one) is split in two.
//! 2. **Split:** each line is unescaped, its hard break removed and remembered, and then
//!    classified. A unit boundary switches the current unit; a boundary naming a unit outside
//!    the registry is reported and its content dropped. Text before the first boundary is
//!    ignored.
//! 3. **Tree:** each unit's lines become a [`UnitTree`], clamping stray end markers at depth
//!    zero and closing blocks left open.
//! 4. **Render:** walking the tree with an indent frame per block:
//!    - a start marker is emitted at the enclosing indent, its children at
//!      `indent + Grammar::child_step`;
//!    - an end marker is emitted at the enclosing indent (the parent's, once popped);
//!    - inside a collapsible section, metadata goes one level deeper than the section and
//!      other lines are taken as they are;
//!    - inside any other block, content loses its own leading whitespace and takes the frame's
//!      indent;
//!    - at the root, lines keep their own whitespace.
//! 5. **Clean:** leading blank lines are dropped and the pairs the export had to pull apart are
//!    put back together (see [`clean`]).

use crate::common::controls::starts_with_control;
use crate::common::escape::unescape_line;
use crate::grammar::Grammar;
use crate::ir::lexer::{boundary_name, classify_line, BLOCK_SIGIL};
use crate::ir::nodes::{Block, Malformation, Node, Recovered, UnitTree};
use crate::ir::tokens::{Line, LineToken};
use crate::registry::UnitRegistry;
use once_cell::sync::Lazy;
use regex::Regex;

static GLUED_END_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s///\s*$").unwrap());

/// The reconstructed lines of one unit, before inline decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedUnit {
    pub name: String,
    pub lines: Vec<String>,
}

/// A line rendered back to source indentation, still carrying its classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub text: String,
    pub token: LineToken,
    pub hard_break: bool,
}

impl RenderedLine {
    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Reconstruct every registered unit present in a linear document, in registry order
pub fn reconstruct(
    linear: &str,
    registry: &UnitRegistry,
    grammar: &Grammar,
) -> Recovered<Vec<ReconstructedUnit>> {
    let mut issues = Vec::new();
    let segments = split_units(linear, registry, grammar, &mut issues);

    let mut units = Vec::new();
    for name in registry.names() {
        let Some((_, lines)) = segments.iter().find(|(unit, _)| unit == name) else {
            issues.push(Malformation::MissingUnit {
                unit: name.to_string(),
            });
            continue;
        };
        let tree = UnitTree::from_lines(name, lines.clone()).into_value_collecting(&mut issues);
        units.push(ReconstructedUnit {
            name: name.to_string(),
            lines: clean(render_tree(&tree, grammar), grammar),
        });
    }

    Recovered::with_issues(units, issues)
}

/// Split off end markers the converter glued to the end of a paragraph
pub fn split_glued_end_markers(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for line in text.split('\n') {
        if line.trim() != BLOCK_SIGIL && GLUED_END_MARKER.is_match(line) {
            if let Some(idx) = line.rfind(BLOCK_SIGIL) {
                lines.push(line[..idx].trim_end().to_string());
                lines.push(line[idx..].to_string());
                continue;
            }
        }
        lines.push(line.to_string());
    }
    lines
}

/// Unit segments in order of first appearance; a repeated boundary continues its unit
fn split_units(
    linear: &str,
    registry: &UnitRegistry,
    grammar: &Grammar,
    issues: &mut Vec<Malformation>,
) -> Vec<(String, Vec<Line>)> {
    let mut segments: Vec<(String, Vec<Line>)> = Vec::new();
    let mut current: Option<usize> = None;

    let normalized = linear.replace("\r\n", "\n");
    for (idx, raw) in split_glued_end_markers(&normalized).into_iter().enumerate() {
        let number = idx + 1;
        let (text, hard_break) = unescape_line(&raw);

        if let Some(name) = boundary_name(&text) {
            current = if registry.contains(name) {
                tracing::debug!(unit = name, line = number, "unit boundary");
                Some(segment_index(&mut segments, name))
            } else {
                issues.push(Malformation::UnknownUnitBoundary {
                    name: name.to_string(),
                    line: number,
                });
                None
            };
            continue;
        }

        let Some(segment) = current else {
            continue;
        };
        let token = classify_line(&text, grammar);
        segments[segment].1.push(Line {
            number,
            text,
            token,
            hard_break,
        });
    }
    segments
}

fn segment_index(segments: &mut Vec<(String, Vec<Line>)>, name: &str) -> usize {
    match segments.iter().position(|(unit, _)| unit == name) {
        Some(idx) => idx,
        None => {
            segments.push((name.to_string(), Vec::new()));
            segments.len() - 1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Collapsible,
    Indented,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    indent: usize,
    kind: FrameKind,
}

/// Render a unit tree at source indentation
pub fn render_tree(tree: &UnitTree, grammar: &Grammar) -> Vec<RenderedLine> {
    let mut renderer = Renderer {
        grammar,
        out: Vec::new(),
    };
    let root = Frame {
        indent: 0,
        kind: FrameKind::Root,
    };
    renderer.nodes(&tree.children, root);
    renderer.out
}

struct Renderer<'g> {
    grammar: &'g Grammar,
    out: Vec<RenderedLine>,
}

impl Renderer<'_> {
    fn nodes(&mut self, nodes: &[Node], frame: Frame) {
        for node in nodes {
            match node {
                Node::Line(line) => self.line(line, frame),
                Node::Block(block) => self.block(block, frame),
                Node::StrayEnd(line) => self.emit(frame.indent, line.trimmed(), line),
            }
        }
    }

    fn block(&mut self, block: &Block, frame: Frame) {
        self.emit(frame.indent, block.marker(), &block.start);

        let kind = if self.grammar.is_collapsible(&block.tag) {
            FrameKind::Collapsible
        } else {
            FrameKind::Indented
        };
        let child = Frame {
            indent: frame.indent + self.grammar.child_step(&block.tag, &block.parameter),
            kind,
        };
        self.nodes(&block.children, child);

        if let Some(end) = &block.end {
            self.emit(frame.indent, end.trimmed(), end);
        }
    }

    fn line(&mut self, line: &Line, frame: Frame) {
        if line.is_blank() {
            return self.emit(0, "", line);
        }
        match frame.kind {
            FrameKind::Root => self.emit(0, &line.text, line),
            FrameKind::Collapsible => match line.token {
                LineToken::Metadata { .. } => self.emit(
                    frame.indent + self.grammar.indent_width,
                    line.text.trim_start(),
                    line,
                ),
                _ => self.emit(frame.indent, &line.text, line),
            },
            FrameKind::Indented => self.emit(frame.indent, line.text.trim_start(), line),
        }
    }

    fn emit(&mut self, indent: usize, text: &str, line: &Line) {
        self.out.push(RenderedLine {
            text: format!("{}{text}", " ".repeat(indent)),
            token: line.token.clone(),
            hard_break: line.hard_break,
        });
    }
}

/// Drop leading blank lines and re-merge what the export separated for the converter's sake.
///
/// Looking past blank lines to the next non-blank line:
///
/// - a collapsible start followed by its kind line: the blanks between them go;
/// - a kind line followed by a state line: the two become adjacent;
/// - a metadata line followed by text: exactly one blank line between them;
/// - a list-item start directly followed by text: a blank line is inserted;
/// - a control line that arrived with a hard break, followed by text after blank lines: the
///   blanks go, since the break only existed to keep the lines apart during export.
pub fn clean(lines: Vec<RenderedLine>, grammar: &Grammar) -> Vec<String> {
    let first = lines
        .iter()
        .position(|line| !line.is_blank())
        .unwrap_or(lines.len());
    let lines = &lines[first..];

    let mut cleaned = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = &lines[i];
        if let Some(next) = next_non_blank(lines, i + 1) {
            let following = &lines[next];

            if is_collapsible_start(line, grammar)
                && is_metadata(following, Some(grammar.kind_key.as_str()))
            {
                cleaned.push(line.text.clone());
                i = next;
                continue;
            }
            if is_metadata(line, Some(grammar.kind_key.as_str()))
                && is_metadata(following, Some(grammar.state_key.as_str()))
            {
                cleaned.push(line.text.clone());
                cleaned.push(following.text.clone());
                i = next + 1;
                continue;
            }
            if is_metadata(line, None)
                && !is_metadata(following, Some(grammar.state_key.as_str()))
                && !is_marker(following)
            {
                cleaned.push(line.text.clone());
                cleaned.push(String::new());
                i = next;
                continue;
            }
            if is_list_item_start(line, grammar) {
                cleaned.push(line.text.clone());
                if lines.get(i + 1).is_some_and(|after| !after.is_blank()) {
                    cleaned.push(String::new());
                }
                i += 1;
                continue;
            }
            if line.hard_break
                && next > i + 1
                && starts_with_control(line.text.trim(), &grammar.controls)
            {
                cleaned.push(line.text.clone());
                i = next;
                continue;
            }
        }
        cleaned.push(line.text.clone());
        i += 1;
    }
    cleaned
}

fn next_non_blank(lines: &[RenderedLine], from: usize) -> Option<usize> {
    (from..lines.len()).find(|&idx| !lines[idx].is_blank())
}

fn is_metadata(line: &RenderedLine, wanted: Option<&str>) -> bool {
    match (&line.token, wanted) {
        (LineToken::Metadata { key, .. }, Some(wanted)) => key == wanted,
        (LineToken::Metadata { .. }, None) => true,
        _ => false,
    }
}

fn is_marker(line: &RenderedLine) -> bool {
    matches!(line.token, LineToken::BlockStart { .. } | LineToken::BlockEnd)
}

fn is_collapsible_start(line: &RenderedLine, grammar: &Grammar) -> bool {
    matches!(&line.token, LineToken::BlockStart { tag, .. } if grammar.is_collapsible(tag))
}

fn is_list_item_start(line: &RenderedLine, grammar: &Grammar) -> bool {
    matches!(
        &line.token,
        LineToken::BlockStart { tag, parameter } if grammar.is_list_item(tag, parameter)
    )
}

//! Flattens a unit's block tree into text the external converter can carry.
//!
//! # The High-Level Concept
//!
//! Rich-text formats have no notion of indentation as structure: leading whitespace is either
//! dropped or turns a paragraph into a code block. So before export every line gives up the
//! indentation that belongs to the blocks enclosing it, and block identity is carried by the
//! bare start and end markers instead.
//!
//! The converter is also free to join adjacent lines into one paragraph. Lines that must stay on
//! their own line are protected in one of two ways:
//!
//! - markers and metadata lines are followed by a blank separator line, which always ends the
//!   paragraph, and a start marker is also preceded by one;
//! - a control line directly followed by text receives a trailing hard line break (`\`), which
//!   keeps both lines in the same paragraph but on separate lines.
//!
//! A trailing `\` is only a line break at the end of paragraph text. After a heading, a fence or
//! a table row it is literal, which is why start markers get a separator line instead.
//!
//! # The Algorithm
//!
//! Walking the tree with the nesting depth of each node:
//!
//! 1. **Block start:** emit a blank line unless the previous line already is one, then the
//!    marker without indentation, then a blank line, then walk the children one level deeper.
//! 2. **Block end:** emit the marker without indentation, then a blank line. A block left open
//!    at the end of the unit gets no end marker; an end marker that closed nothing is emitted
//!    at depth zero.
//! 3. **Content:** strip `depth × indent_width` columns. A line indented less than that loses
//!    all of its leading whitespace instead (blank lines become empty).
//! 4. **Metadata:** as content, followed by a blank line.
//!
//! Only after the whole unit is flattened are `<` and `>` escaped, so the column arithmetic
//! never sees entity text.

use crate::common::controls::starts_with_control;
use crate::common::escape::{escape_html, HARD_BREAK};
use crate::grammar::Grammar;
use crate::ir::lexer::lex_source;
use crate::ir::nodes::{Block, Node, Recovered, UnitTree};
use crate::ir::tokens::{Line, LineToken};

/// Flatten a unit's source text, escaping raw markup in the result
pub fn flatten_unit(text: &str, unit: &str, grammar: &Grammar) -> Recovered<String> {
    let lines = lex_source(text, grammar);
    UnitTree::from_lines(unit, lines)
        .map(|tree| escape_html(&flatten_tree(&tree, grammar).join("\n")))
}

/// Flatten a unit tree into linear lines (no escaping)
pub fn flatten_tree(tree: &UnitTree, grammar: &Grammar) -> Vec<String> {
    let mut flattener = Flattener {
        grammar,
        lines: Vec::new(),
        after_control: false,
    };
    flattener.nodes(&tree.children, 0);
    flattener.lines
}

struct Flattener<'g> {
    grammar: &'g Grammar,
    lines: Vec<String>,
    /// The last emitted line is content starting with a control
    after_control: bool,
}

impl Flattener<'_> {
    fn nodes(&mut self, nodes: &[Node], depth: usize) {
        for node in nodes {
            match node {
                Node::Line(line) => self.line(line, depth),
                Node::Block(block) => self.block(block, depth),
                Node::StrayEnd(line) => self.marker(line.trimmed(), false),
            }
        }
    }

    fn block(&mut self, block: &Block, depth: usize) {
        self.marker(block.marker(), true);
        self.nodes(&block.children, depth + 1);
        if let Some(end) = &block.end {
            self.marker(end.trimmed(), false);
        }
    }

    fn marker(&mut self, marker: &str, opens: bool) {
        if opens {
            self.separate_previous();
        }
        self.push(marker.to_string());
        self.push(String::new());
    }

    fn line(&mut self, line: &Line, depth: usize) {
        let text = self.unindent(&line.text, depth);
        let trimmed = text.trim();

        if !trimmed.is_empty() && self.after_control {
            self.break_previous();
        }
        let is_control = starts_with_control(trimmed, &self.grammar.controls);
        let is_metadata = matches!(line.token, LineToken::Metadata { .. });

        self.push(text);
        if is_metadata {
            self.push(String::new());
        } else {
            self.after_control = is_control;
        }
    }

    fn unindent(&self, text: &str, depth: usize) -> String {
        let strip = depth * self.grammar.indent_width;
        let leading = text.len() - text.trim_start_matches(' ').len();
        if leading >= strip {
            text[strip..].to_string()
        } else if text.trim().is_empty() {
            String::new()
        } else {
            text.trim_start().to_string()
        }
    }

    fn push(&mut self, text: String) {
        self.after_control = false;
        self.lines.push(text);
    }

    /// Make sure a blank line sits between the previous line and the next one
    fn separate_previous(&mut self) {
        if self.lines.last().is_some_and(|previous| !previous.trim().is_empty()) {
            self.push(String::new());
        }
    }

    /// End the previous line with a hard break, unless it is blank or already has one
    fn break_previous(&mut self) {
        let Some(previous) = self.lines.last_mut() else {
            return;
        };
        let kept = previous.trim_end().len();
        if kept == 0 || previous.ends_with(HARD_BREAK) {
            return;
        }
        previous.truncate(kept);
        previous.push(HARD_BREAK);
    }
}

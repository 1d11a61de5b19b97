//! Block tree of a single unit and the recoverable-error channel.
//!
//! A unit is a sequence of [`Node`]s. Blocks own their children, so nesting depth is a
//! property of the position in the tree and never stored. The tree is built once per unit and
//! both the flattening and the reconstruction engine render it back to text.
//!
//! Malformed markup never fails the build: an end marker with nothing open becomes a
//! [`Node::StrayEnd`] at the root (depth stays at zero), and blocks still open at the end of the
//! unit are closed implicitly. Each such repair is reported as a [`Malformation`].

use crate::ir::tokens::{Line, LineToken};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "kebab-case")]
pub enum Node {
    Line(Line),
    Block(Block),
    /// An end marker that did not close anything
    StrayEnd(Line),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub tag: String,
    pub parameter: String,
    /// The start marker line
    pub start: Line,
    pub children: Vec<Node>,
    /// The end marker line; `None` when the unit ended with the block still open
    pub end: Option<Line>,
}

impl Block {
    /// Start marker without indentation
    pub fn marker(&self) -> &str {
        self.start.trimmed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitTree {
    pub unit: String,
    pub children: Vec<Node>,
}

/// A structural problem that was repaired instead of failing the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Malformation {
    /// An end marker with no open block; depth was clamped at zero
    UnmatchedEnd { unit: String, line: usize },
    /// A block still open when the unit ended
    UnclosedBlock {
        unit: String,
        tag: String,
        line: usize,
    },
    /// A unit boundary naming a unit outside the registry; its content was dropped
    UnknownUnitBoundary { name: String, line: usize },
    /// A registered unit never appeared in the linear document
    MissingUnit { unit: String },
}

impl fmt::Display for Malformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformation::UnmatchedEnd { unit, line } => {
                write!(f, "{unit}:{line}: end marker without an open block")
            }
            Malformation::UnclosedBlock { unit, tag, line } => {
                write!(f, "{unit}:{line}: block '{tag}' is never closed")
            }
            Malformation::UnknownUnitBoundary { name, line } => {
                write!(f, "line {line}: boundary for unregistered unit '{name}'")
            }
            Malformation::MissingUnit { unit } => {
                write!(f, "unit '{unit}' is missing from the document")
            }
        }
    }
}

/// Best-effort output together with the repairs made to produce it
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered<T> {
    pub value: T,
    pub issues: Vec<Malformation>,
}

impl<T> Recovered<T> {
    pub fn clean(value: T) -> Self {
        Recovered {
            value,
            issues: Vec::new(),
        }
    }

    pub fn with_issues(value: T, issues: Vec<Malformation>) -> Self {
        Recovered { value, issues }
    }

    /// No repair was needed
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Recovered<U> {
        Recovered {
            value: f(self.value),
            issues: self.issues,
        }
    }

    /// Move the issues into `sink` and return the value
    pub fn into_value_collecting(self, sink: &mut Vec<Malformation>) -> T {
        sink.extend(self.issues);
        self.value
    }
}

impl UnitTree {
    /// Build the tree of a unit from its classified lines
    ///
    /// Unit boundary tokens are not expected here; they are treated as content.
    pub fn from_lines(unit: &str, lines: Vec<Line>) -> Recovered<UnitTree> {
        let mut issues = Vec::new();
        let mut root: Vec<Node> = Vec::new();
        let mut open: Vec<Block> = Vec::new();

        for line in lines {
            match line.token.clone() {
                LineToken::BlockStart { tag, parameter } => {
                    open.push(Block {
                        tag,
                        parameter,
                        start: line,
                        children: Vec::new(),
                        end: None,
                    });
                }
                LineToken::BlockEnd => match open.pop() {
                    Some(mut block) => {
                        block.end = Some(line);
                        attach(&mut root, &mut open, Node::Block(block));
                    }
                    None => {
                        issues.push(Malformation::UnmatchedEnd {
                            unit: unit.to_string(),
                            line: line.number,
                        });
                        root.push(Node::StrayEnd(line));
                    }
                },
                _ => attach(&mut root, &mut open, Node::Line(line)),
            }
        }

        // Close whatever is left, innermost first
        while let Some(block) = open.pop() {
            issues.push(Malformation::UnclosedBlock {
                unit: unit.to_string(),
                tag: block.tag.clone(),
                line: block.start.number,
            });
            attach(&mut root, &mut open, Node::Block(block));
        }
        issues.sort_by_key(malformation_line);

        Recovered::with_issues(
            UnitTree {
                unit: unit.to_string(),
                children: root,
            },
            issues,
        )
    }

    /// Deepest block nesting in the tree
    pub fn max_depth(&self) -> usize {
        fn depth(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|node| match node {
                    Node::Block(block) => 1 + depth(&block.children),
                    _ => 0,
                })
                .max()
                .unwrap_or(0)
        }
        depth(&self.children)
    }
}

fn attach(root: &mut Vec<Node>, open: &mut [Block], node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}

fn malformation_line(issue: &Malformation) -> usize {
    match issue {
        Malformation::UnmatchedEnd { line, .. }
        | Malformation::UnclosedBlock { line, .. }
        | Malformation::UnknownUnitBoundary { line, .. } => *line,
        Malformation::MissingUnit { .. } => 0,
    }
}

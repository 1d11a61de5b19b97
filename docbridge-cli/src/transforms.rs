//! CLI-specific inspection views
//!
//! Each view shows one stage of the export pipeline for a single unit file, so markup can be
//! debugged before it is sent through a round trip:
//!
//! - `tokens-json`: the classified line tokens
//! - `tokens-simple`: one line per token, `<line> <kind> <text>`
//! - `tree-json`: the block tree built from those tokens
//! - `flat`: the unit as it will appear in the linear document (links and controls encoded)
//!
//! Example: `docbridge inspect docs/validity.md tree-json`

use docbridge_babel::ir::lexer::lex_source;
use docbridge_babel::ir::nodes::UnitTree;
use docbridge_babel::ir::tokens::{Line, LineToken};
use docbridge_babel::transforms::export_unit;
use docbridge_babel::{Grammar, Malformation, UnitRegistry};

/// All available inspection views
pub const AVAILABLE_TRANSFORMS: &[&str] = &["tokens-json", "tokens-simple", "tree-json", "flat"];

pub const DEFAULT_TRANSFORM: &str = "tokens-simple";

/// Output of a view together with the repairs the view had to make
#[derive(Debug)]
pub struct Inspection {
    pub output: String,
    pub issues: Vec<Malformation>,
}

/// Execute a named view on the text of `unit`
pub fn execute_transform(
    source: &str,
    unit: &str,
    transform_name: &str,
    registry: &UnitRegistry,
    grammar: &Grammar,
) -> Result<Inspection, String> {
    match transform_name {
        "tokens-json" => {
            let lines = lex_source(source, grammar);
            Ok(Inspection {
                output: to_json(&lines)?,
                issues: Vec::new(),
            })
        }
        "tokens-simple" => {
            let lines = lex_source(source, grammar);
            Ok(Inspection {
                output: tokens_to_simple(&lines),
                issues: Vec::new(),
            })
        }
        "tree-json" => {
            let tree = UnitTree::from_lines(unit, lex_source(source, grammar));
            Ok(Inspection {
                output: to_json(&tree.value)?,
                issues: tree.issues,
            })
        }
        "flat" => {
            let flat = export_unit(unit, source, registry, grammar);
            let mut output = flat.value;
            output.push('\n');
            Ok(Inspection {
                output,
                issues: flat.issues,
            })
        }
        _ => Err(format!(
            "Unknown transform '{transform_name}'. Available: {}",
            AVAILABLE_TRANSFORMS.join(", ")
        )),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|mut json| {
            json.push('\n');
            json
        })
        .map_err(|e| format!("JSON serialization failed: {e}"))
}

fn tokens_to_simple(lines: &[Line]) -> String {
    let mut out = String::new();
    for line in lines {
        let kind = match &line.token {
            LineToken::UnitBoundary { name } => format!("UnitBoundary({name})"),
            LineToken::BlockStart { tag, parameter } if parameter.is_empty() => {
                format!("BlockStart({tag})")
            }
            LineToken::BlockStart { tag, parameter } => format!("BlockStart({tag} | {parameter})"),
            LineToken::BlockEnd => "BlockEnd".to_string(),
            LineToken::Metadata { key, value } => format!("Metadata({key} {value})"),
            LineToken::Blank => "Blank".to_string(),
            LineToken::Content => "Content".to_string(),
        };
        out.push_str(&format!("{:>4} {kind:<28} {}\n", line.number, line.text.trim_end()));
    }
    out
}

//! Inline control codec
//!
//! Export replaces each recognised `<input>` element with a bracket token holding only its key
//! (`[cb-1-1]`, `[pledge_1_2]`). Import rebuilds the canonical element from the key alone.
//!
//! The rebuilt element is always the canonical one: checked, with the fixed class for its kind
//! and, for identity-keyed controls, the toggle hook. Any other variation in the original
//! element (attribute order, an unchecked state, a different class) does not survive.

use crate::grammar::ControlRules;
use crate::ir::lexer::{scan_linear, scan_source};
use crate::ir::tokens::{render_tokens, Control, ControlKind, InlineToken};

/// Replace source `<input>` controls with bracket tokens
pub fn encode(text: &str, rules: &ControlRules) -> String {
    let tokens = scan_source(text, rules);
    render_tokens(&tokens, |token| match token {
        InlineToken::Control { control, .. } => Some(bracket(control)),
        _ => None,
    })
}

/// Replace bracket tokens with canonical `<input>` controls
pub fn decode(text: &str, rules: &ControlRules) -> String {
    let tokens = scan_linear(text, rules);
    render_tokens(&tokens, |token| match token {
        InlineToken::Control { control, .. } => Some(canonical(control, rules)),
        _ => None,
    })
}

/// `[key]`
pub fn bracket(control: &Control) -> String {
    format!("[{}]", control.key)
}

/// The canonical source element for a control
pub fn canonical(control: &Control, rules: &ControlRules) -> String {
    match control.kind {
        ControlKind::Identity => format!(
            "<input type='checkbox' checked id=\"{}\" class=\"{}\" onchange=\"{}\"/>",
            control.key, rules.identity_class, rules.toggle_hook
        ),
        ControlKind::Name => format!(
            "<input type='checkbox' checked name=\"{}\" class=\"{}\" />",
            control.key, rules.name_class
        ),
    }
}

/// Whether a trimmed line starts with a control, in either spelling
pub fn starts_with_control(trimmed: &str, rules: &ControlRules) -> bool {
    if trimmed.starts_with("<input") {
        return true;
    }
    [&rules.identity_prefix, &rules.name_prefix]
        .iter()
        .filter(|prefix| !prefix.is_empty())
        .any(|prefix| {
            trimmed
                .strip_prefix('[')
                .is_some_and(|rest| rest.starts_with(prefix.as_str()))
        })
}

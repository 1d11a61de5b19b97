//! Escaping on the way out, unescaping on the way back.

/// Escapes the converter applies to literal punctuation, and what they stand for
const CONVERTER_ESCAPES: [(&str, &str); 8] = [
    (r"\|", "|"),
    (r"\<", "<"),
    (r"\>", ">"),
    (r"\_", "_"),
    (r"\[", "["),
    (r"\]", "]"),
    (r"\{", "{"),
    (r"\}", "}"),
];

const NO_BREAK_SPACE: char = '\u{00A0}';

/// Hard line break marker at the end of a converter line
pub const HARD_BREAK: char = '\\';

/// Make raw markup visible as text: `<` and `>` become entities
pub fn escape_html(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Undo the converter's escaping on one line.
///
/// Returns the line and whether it ended in a hard line break, which is removed.
pub fn unescape_line(line: &str) -> (String, bool) {
    let mut out = CONVERTER_ESCAPES
        .iter()
        .fold(line.to_string(), |acc, (escaped, plain)| {
            acc.replace(escaped, plain)
        })
        .replace(NO_BREAK_SPACE, " ");

    let hard_break = out.ends_with(HARD_BREAK);
    if hard_break {
        out.pop();
    }
    (out, hard_break)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_angle_brackets_only() {
        assert_eq!(
            escape_html("<input id=\"x\"> & [a](b)"),
            "&lt;input id=\"x\"&gt; & [a](b)"
        );
    }

    #[test]
    fn unescapes_converter_punctuation() {
        let (line, hard_break) = unescape_line(r"/// html \| ul.tasklist");
        assert_eq!(line, "/// html | ul.tasklist");
        assert!(!hard_break);

        let (line, _) = unescape_line(r"\[cb-1\] x\_y \{ #a \} \<b\>");
        assert_eq!(line, "[cb-1] x_y { #a } <b>");
    }

    #[test]
    fn replaces_no_break_spaces() {
        assert_eq!(unescape_line("a\u{00A0}b").0, "a b");
    }

    #[test]
    fn strips_hard_break() {
        assert_eq!(
            unescape_line(r"\[cb-1\] Agree\"),
            ("[cb-1] Agree".to_string(), true)
        );
    }
}

//! Property tests for the inline codecs

use crate::common::registry;
use docbridge_babel::common::{controls, links};
use docbridge_babel::ControlRules;
use proptest::prelude::*;

const UNITS: [&str; 3] = ["intro.md", "guide/setup.md", "refs.md"];

fn link_text() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{0,12}"
}

fn maybe_anchor() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Za-z0-9_:%+.~-]{1,12}")
}

/// A source `<input>` element in one of the spellings authors actually use
fn input_element() -> impl Strategy<Value = String> {
    (
        any::<bool>(),
        "[a-z0-9][a-z0-9-]{0,6}",
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(identity, key, checked, single_quotes, key_first)| {
            let q = if single_quotes { '\'' } else { '"' };
            let key_attr = if identity {
                format!("id={q}cb-{key}{q}")
            } else {
                format!("name={q}pledge_{key}{q}")
            };
            let type_attr = format!("type={q}checkbox{q}");
            let checked = if checked { " checked" } else { "" };
            if key_first {
                format!("<input {key_attr} {type_attr}{checked}>")
            } else {
                format!("<input {type_attr}{checked} {key_attr} />")
            }
        })
}

proptest! {
    #[test]
    fn links_between_units_survive_encoding(
        text in link_text(),
        current in 0usize..3,
        target in 0usize..3,
        anchor in maybe_anchor(),
    ) {
        prop_assume!(current != target);
        let registry = registry();
        let rules = ControlRules::default();
        let target = match &anchor {
            Some(anchor) => format!("{}#{anchor}", UNITS[target]),
            None => UNITS[target].to_string(),
        };
        let source = format!("See [{text}]({target}) here.");

        let encoded = links::encode(&source, UNITS[current], &registry, &rules);
        prop_assert!(encoded.contains("](#"), "unit name left in {encoded}");
        prop_assert_eq!(links::decode(&encoded, UNITS[current], &registry, &rules), source);
    }

    #[test]
    fn bare_references_to_the_current_unit_survive(text in link_text(), current in 0usize..3) {
        let registry = registry();
        let rules = ControlRules::default();
        let source = format!("[{text}]({})", UNITS[current]);

        let encoded = links::encode(&source, UNITS[current], &registry, &rules);
        prop_assert_eq!(links::decode(&encoded, UNITS[current], &registry, &rules), source);
    }

    #[test]
    fn anchored_references_to_the_current_unit_become_local(
        text in link_text(),
        current in 0usize..3,
        anchor in "[a-z][a-z0-9-]{0,10}",
    ) {
        let registry = registry();
        prop_assume!(registry.anchor(UNITS[current]) != Some(anchor.as_str()));
        let rules = ControlRules::default();
        let source = format!("[{text}]({}#{anchor})", UNITS[current]);

        let encoded = links::encode(&source, UNITS[current], &registry, &rules);
        prop_assert_eq!(
            links::decode(&encoded, UNITS[current], &registry, &rules),
            format!("[{text}](#{anchor})")
        );
    }

    #[test]
    fn absolute_urls_pass_through(text in link_text(), path in "[a-z]{1,8}") {
        let registry = registry();
        let rules = ControlRules::default();
        let source = format!("[{text}](https://example.org/{path}.md)");

        let encoded = links::encode(&source, "intro.md", &registry, &rules);
        prop_assert_eq!(&encoded, &source);
        prop_assert_eq!(links::decode(&encoded, "intro.md", &registry, &rules), source);
    }

    #[test]
    fn control_canonicalisation_is_idempotent(element in input_element(), tail in "[a-z ]{0,10}") {
        let rules = ControlRules::default();
        let source = format!("{element} {tail}");

        let once = controls::decode(&controls::encode(&source, &rules), &rules);
        let twice = controls::decode(&controls::encode(&once, &rules), &rules);
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.starts_with("<input type='checkbox' checked "));
    }

    #[test]
    fn encoded_controls_carry_only_the_key(element in input_element()) {
        let rules = ControlRules::default();
        let encoded = controls::encode(&element, &rules);

        prop_assert!(encoded.starts_with('[') && encoded.ends_with(']'));
        prop_assert!(!encoded.contains('<'));
    }
}

//! Whole-document round trips
//!
//! Export a unit set, put the linear document through the simulated converter and import it
//! again. Canonical fixtures (one line per paragraph, canonical controls, blank lines where the
//! import puts them) must come back byte for byte; everything else must come back with the same
//! non-blank lines.

use crate::common::{
    fixture_units, grammar, normalized, registry, simulate_round_trip, write_fixture_units,
    SimulatedConverter, INTRO, REFS, SETUP,
};
use docbridge_babel::{
    export, export_linear, import, import_linear, ExportSpec, Grammar, ImportSpec, Malformation,
    UnitRegistry, UnitText,
};
use insta::assert_snapshot;
use std::fs;
use tempfile::tempdir;

const IDENTITY_CONTROL: &str =
    "<input type='checkbox' checked id=\"cb-1\" class=\"cb-sa\" onchange=\"toggleCheckboxes(event)\"/>";

fn pair_registry() -> UnitRegistry {
    UnitRegistry::new(["a.md", "b.md"]).unwrap()
}

/// Export, simulate the converter, import
fn through_converter(units: &[UnitText], registry: &UnitRegistry) -> Vec<UnitText> {
    let grammar = Grammar::default();
    let linear = export_linear(units, registry, &grammar).unwrap();
    let returned = simulate_round_trip(&linear.value);
    let imported = import_linear(&returned, registry, &grammar);
    assert!(
        imported.issues.is_empty(),
        "unexpected repairs: {:?}",
        imported.issues
    );
    imported.value
}

fn scenario_unit() -> String {
    format!("Intro\n/// details | Summary\n    type: info\n{IDENTITY_CONTROL} Agree\nMore text\n///\nSee [Go](b.md#x){{ #y }}\n")
}

#[test]
fn test_canonical_fixtures_round_trip_exactly() {
    let units = through_converter(&fixture_units(), &registry());

    assert_eq!(units.len(), 3);
    assert_eq!(units[0], UnitText::new("intro.md", INTRO));
    assert_eq!(units[1], UnitText::new("guide/setup.md", SETUP));
    assert_eq!(units[2], UnitText::new("refs.md", REFS));
}

#[test]
fn test_free_form_unit_keeps_its_lines() {
    let units = [
        UnitText::new("a.md", scenario_unit()),
        UnitText::new("b.md", "Back to [A](a.md)\n"),
    ];
    let restored = through_converter(&units, &pair_registry());

    assert_eq!(normalized(&restored[0].text), normalized(&units[0].text));
    assert_eq!(restored[1].text, "Back to [A](a.md)\n");
}

#[test]
fn test_scenario_restores_link_annotation_and_metadata() {
    let units = [
        UnitText::new("a.md", scenario_unit()),
        UnitText::new("b.md", "Beta\n"),
    ];
    let restored = through_converter(&units, &pair_registry());
    let text = &restored[0].text;

    assert!(text.contains("See [Go](b.md#x){ #y }"));
    assert!(text.contains("/// details | Summary\n    type: info\n"));
    assert!(text.contains(&format!("{IDENTITY_CONTROL} Agree\nMore text\n///")));
}

#[test]
fn test_linear_document_snapshot() {
    let units = [
        UnitText::new("a.md", scenario_unit()),
        UnitText::new("b.md", "Back to [A](a.md)\n"),
    ];
    let linear = export_linear(&units, &pair_registry(), &Grammar::default()).unwrap();
    assert!(linear.is_clean());

    assert_snapshot!(linear.value.trim(), @r"
    **=== FILE: a.md ===** {#a-md}

    Intro

    /// details | Summary

    type: info

    [cb-1] Agree\
    More text
    ///

    See [Go { #y }](#b_md__x)


    **=== FILE: b.md ===** {#b-md}

    Back to [A](#a_md)
    ");
}

#[test]
fn test_heading_directly_before_a_block_gains_no_backslash() {
    let units = [
        UnitText::new("a.md", "# Intro\n/// details | S\nBody\n///\n"),
        UnitText::new("b.md", "Beta\n"),
    ];
    let restored = through_converter(&units, &pair_registry());

    assert!(!restored[0].text.contains('\\'), "{}", restored[0].text);
    assert!(restored[0].text.starts_with("# Intro\n"));
    assert_eq!(normalized(&restored[0].text), normalized(&units[0].text));
}

#[test]
fn test_extra_end_markers_are_clamped() {
    let units = [
        UnitText::new("a.md", "Text\n///\n///\nMore\n"),
        UnitText::new("b.md", "Beta\n"),
    ];
    let grammar = Grammar::default();
    let linear = export_linear(&units, &pair_registry(), &grammar).unwrap();
    assert_eq!(linear.issues.len(), 2);
    assert!(linear
        .issues
        .iter()
        .all(|issue| matches!(issue, Malformation::UnmatchedEnd { unit, .. } if unit == "a.md")));

    let imported = import_linear(&simulate_round_trip(&linear.value), &pair_registry(), &grammar);
    assert_eq!(imported.issues.len(), 2);
    assert_eq!(normalized(&imported.value[0].text), "Text\n///\n///\nMore");
    assert_eq!(imported.value[1].text, "Beta\n");
}

#[test]
fn test_unclosed_block_is_reported_and_kept() {
    let units = [
        UnitText::new("a.md", "/// html | div\n    Inside\n"),
        UnitText::new("b.md", "Beta\n"),
    ];
    let grammar = Grammar::default();
    let linear = export_linear(&units, &pair_registry(), &grammar).unwrap();
    assert!(matches!(
        linear.issues.as_slice(),
        [Malformation::UnclosedBlock { tag, line: 1, .. }] if tag == "html"
    ));

    let imported = import_linear(&linear.value, &pair_registry(), &grammar);
    assert_eq!(imported.value[0].text, "/// html | div\n\n    Inside\n");
}

#[test]
fn test_blank_runs_collapse_on_import() {
    let units = [
        UnitText::new("a.md", "One\n\n\n\n\nTwo\n\n\n"),
        UnitText::new("b.md", "Beta"),
    ];
    let grammar = Grammar::default();
    let linear = export_linear(&units, &pair_registry(), &grammar).unwrap();
    let imported = import_linear(&linear.value, &pair_registry(), &grammar).value;

    assert_eq!(imported[0].text, "One\n\nTwo\n");
    assert_eq!(imported[1].text, "Beta\n");
}

#[test]
fn test_units_missing_from_the_document_are_reported() {
    let returned = "**=== FILE: b.md ===** {#b-md}\n\nOnly beta survived\n";
    let imported = import_linear(returned, &pair_registry(), &Grammar::default());

    assert_eq!(imported.value, vec![UnitText::new("b.md", "Only beta survived\n")]);
    assert_eq!(
        imported.issues,
        vec![Malformation::MissingUnit {
            unit: "a.md".to_string()
        }]
    );
    assert_eq!(
        serde_json::to_value(&imported.issues[0]).unwrap(),
        serde_json::json!({ "kind": "missing-unit", "unit": "a.md" })
    );
}

#[test]
fn test_windows_line_endings_are_accepted() {
    let returned = "**=== FILE: a.md ===**\r\n\r\nAlpha \\| one\r\n**=== FILE: b.md ===**\r\nBeta\r\n";
    let imported = import_linear(returned, &pair_registry(), &Grammar::default());

    assert!(imported.is_clean());
    assert_eq!(imported.value[0].text, "Alpha | one\n");
    assert_eq!(imported.value[1].text, "Beta\n");
}

#[test]
fn test_publish_round_trip_through_files() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    write_fixture_units(&docs);
    let document = dir.path().join("review.docx");
    let registry = registry();
    let grammar = grammar();

    let mut events = Vec::new();
    let spec = ExportSpec::new(&registry, &grammar, &docs, &document)
        .with_debug_output(dir.path().join("debug_combined.md"));
    let report = export(&spec, &SimulatedConverter, |event| events.push(event.to_string())).unwrap();

    assert!(report.issues.is_empty());
    assert_eq!(
        fs::read_to_string(dir.path().join("debug_combined.md")).unwrap(),
        report.linear
    );
    assert_eq!(
        events,
        [
            "Processing intro.md...".to_string(),
            "Processing guide/setup.md...".to_string(),
            "Processing refs.md...".to_string(),
            "Converting to DOCX...".to_string(),
            format!("Created {}", document.display()),
        ]
    );

    fs::write(docs.join("intro.md"), "edited away\n").unwrap();
    fs::remove_file(docs.join("guide/setup.md")).unwrap();

    let mut events = Vec::new();
    let spec = ImportSpec::new(&registry, &grammar, &document, &docs)
        .with_debug_output(dir.path().join("debug_import_full.md"));
    let report = import(&spec, &SimulatedConverter, |event| events.push(event.to_string())).unwrap();

    assert!(report.issues.is_empty());
    assert_eq!(report.written.len(), 3);
    assert_eq!(events.first().map(String::as_str), Some("Converting DOCX to linear text..."));
    assert_eq!(events.last().map(String::as_str), Some("Import complete."));
    assert_eq!(fs::read_to_string(docs.join("intro.md")).unwrap(), INTRO);
    assert_eq!(fs::read_to_string(docs.join("guide/setup.md")).unwrap(), SETUP);
    assert_eq!(fs::read_to_string(docs.join("refs.md")).unwrap(), REFS);
    assert!(dir.path().join("debug_import_full.md").is_file());
}

//! The pandoc converter against a stub binary

#[cfg(all(unix, feature = "native-export"))]
mod unix {
    use crate::common::{fixture_units, grammar, registry};
    use docbridge_babel::formats::pandoc::PANDOC_BIN_VAR;
    use docbridge_babel::formats::PandocConverter;
    use docbridge_babel::{export_linear, import_linear, BridgeError, Converter};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn write_stub_pandoc() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let script_path = dir.path().join("fake-pandoc.sh");
        let script = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/calls.log"
INPUT="$1"
OUTPUT=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o)
      OUTPUT="$2"
      shift
      ;;
  esac
  shift
done
if [ ! -f "$INPUT" ]; then
  echo "cannot open $INPUT" >&2
  exit 2
fi
if [ -n "$OUTPUT" ]; then
  cp "$INPUT" "$OUTPUT"
else
  cat "$INPUT"
fi
exit 0
"#;
        fs::write(&script_path, script).unwrap();
        let mut perms = fs::metadata(&script_path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script_path, perms).unwrap();
        (dir, script_path)
    }

    #[test]
    fn pandoc_converter_uses_stub() {
        let (stub_dir, pandoc_stub) = write_stub_pandoc();
        let prev = std::env::var(PANDOC_BIN_VAR).ok();
        std::env::set_var(PANDOC_BIN_VAR, &pandoc_stub);

        let registry = registry();
        let grammar = grammar();
        let converter = PandocConverter::new().with_binary("/nonexistent/pandoc");
        let linear = export_linear(&fixture_units(), &registry, &grammar)
            .unwrap()
            .value;

        let bytes = converter.render(&linear, "markdown").unwrap();
        assert_eq!(String::from_utf8(bytes.clone()).unwrap(), linear);

        let work = tempdir().unwrap();
        let document = work.path().join("review.docx");
        fs::write(&document, &bytes).unwrap();
        let returned = converter.extract(&document).unwrap();
        let imported = import_linear(&returned, &registry, &grammar);
        assert!(imported.is_clean());
        // without a real converter the entities escaped on export stay entities
        assert_eq!(&imported.value[..2], &fixture_units()[..2]);
        assert!(imported.value[2].text.contains("&lt;https://pandoc.org/MANUAL.html&gt;"));

        let missing = converter.extract(&work.path().join("absent.docx"));
        assert!(matches!(missing, Err(BridgeError::Converter(message)) if message.contains("cannot open")));

        let calls = fs::read_to_string(stub_dir.path().join("calls.log")).unwrap();
        let calls: Vec<&str> = calls.lines().collect();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].contains("-f markdown -t docx -o "));
        assert!(calls[1].ends_with("-f docx -t markdown --wrap=none"));

        if let Some(prev) = prev {
            std::env::set_var(PANDOC_BIN_VAR, prev);
        } else {
            std::env::remove_var(PANDOC_BIN_VAR);
        }
    }
}

#[cfg(not(all(unix, feature = "native-export")))]
#[test]
fn pandoc_stub_skipped() {
    eprintln!("Skipping pandoc tests (native-export feature or Unix required)");
}

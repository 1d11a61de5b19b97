//! Pandoc-backed converter.
//!
//! Shells out to a `pandoc` binary for both directions:
//!
//!     export:  pandoc <linear.md> -f markdown -t docx -o <out.docx>
//!     import:  pandoc <in.docx> -f docx -t markdown --wrap=none
//!
//! The binary is looked up at call time: `DOCBRIDGE_PANDOC_BIN` first, then the configured
//! path, then `pandoc` on the `PATH`.

use crate::converter::Converter;
use crate::error::BridgeError;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;
use which::which;

/// Environment variable overriding the pandoc binary
pub const PANDOC_BIN_VAR: &str = "DOCBRIDGE_PANDOC_BIN";

/// Converter implementation that shells out to pandoc.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    binary: Option<PathBuf>,
    rich_format: String,
    linear_format: String,
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self {
            binary: None,
            rich_format: "docx".to_string(),
            linear_format: "markdown".to_string(),
        }
    }
}

impl PandocConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this binary unless `DOCBRIDGE_PANDOC_BIN` is set
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = Some(binary.into());
        self
    }

    /// Rich-text format written on export and read on import (default `docx`)
    pub fn with_rich_format(mut self, format: impl Into<String>) -> Self {
        self.rich_format = format.into();
        self
    }

    /// Text format requested on import (default `markdown`)
    pub fn with_linear_format(mut self, format: impl Into<String>) -> Self {
        self.linear_format = format.into();
        self
    }

    fn resolve_binary(&self) -> Result<PathBuf, BridgeError> {
        if let Some(path) = env::var_os(PANDOC_BIN_VAR) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        if let Some(path) = &self.binary {
            return Ok(path.clone());
        }
        which("pandoc").map_err(|_| {
            BridgeError::Configuration(format!(
                "pandoc not found; install it or set {PANDOC_BIN_VAR} or converter.binary"
            ))
        })
    }
}

impl Converter for PandocConverter {
    fn name(&self) -> &str {
        "pandoc"
    }

    fn description(&self) -> &str {
        "Rich-text conversion via the pandoc binary"
    }

    fn render(&self, linear: &str, source_format: &str) -> Result<Vec<u8>, BridgeError> {
        let pandoc = self.resolve_binary()?;
        let temp_dir =
            tempdir().map_err(|e| BridgeError::Converter(format!("Temp dir error: {e}")))?;
        let input = temp_dir.path().join("linear.md");
        let output = temp_dir.path().join(format!("document.{}", self.rich_format));
        fs::write(&input, linear).map_err(|e| BridgeError::io(&input, e))?;

        tracing::debug!(binary = %pandoc.display(), from = source_format, to = %self.rich_format, "rendering");
        let status = Command::new(&pandoc)
            .arg(&input)
            .arg("-f")
            .arg(source_format)
            .arg("-t")
            .arg(&self.rich_format)
            .arg("-o")
            .arg(&output)
            .status()
            .map_err(|e| launch_error(&pandoc, e))?;

        if !status.success() {
            return Err(BridgeError::Converter(format!(
                "pandoc exited with status {status}"
            )));
        }

        fs::read(&output).map_err(|e| BridgeError::io(&output, e))
    }

    fn extract(&self, document: &Path) -> Result<String, BridgeError> {
        let pandoc = self.resolve_binary()?;

        tracing::debug!(binary = %pandoc.display(), document = %document.display(), "extracting");
        let output = Command::new(&pandoc)
            .arg(document)
            .arg("-f")
            .arg(&self.rich_format)
            .arg("-t")
            .arg(&self.linear_format)
            .arg("--wrap=none")
            .output()
            .map_err(|e| launch_error(&pandoc, e))?;

        if !output.status.success() {
            return Err(BridgeError::Converter(format!(
                "pandoc exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| BridgeError::Converter(format!("pandoc produced invalid UTF-8: {e}")))
    }
}

fn launch_error(pandoc: &Path, err: std::io::Error) -> BridgeError {
    BridgeError::Converter(format!(
        "Failed to launch pandoc ({}): {err}",
        pandoc.display()
    ))
}

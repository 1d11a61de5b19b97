//! File-level export and import pipelines.
//!
//! Wraps the in-memory transforms with everything that touches the outside world: reading the
//! unit files, writing the debug copy of the linear document, calling the converter and writing
//! the results back.
//!
//! Both pipelines fail before writing anything when an input is missing. Import stages every
//! reconstructed unit in a temporary file next to its target and only then renames the staged
//! files into place, so a unit file is either left as it was or fully replaced.
//!
//! ```ignore
//! let spec = ExportSpec::new(&registry, &grammar, "docs", "manifesto.docx")
//!     .with_debug_output("debug_combined.md");
//! let report = export(&spec, &PandocConverter::new(), |event| println!("{event}"))?;
//! ```

use crate::converter::Converter;
use crate::error::BridgeError;
use crate::grammar::Grammar;
use crate::ir::nodes::Malformation;
use crate::registry::UnitRegistry;
use crate::transforms::{export_linear, import_linear, UnitText};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Progress of a running export or import, reported per stage and per unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// A unit is being read and flattened
    ProcessingUnit(String),
    /// The linear document is handed to the converter
    Converting { to: String },
    /// The rich-text document was written
    Created(PathBuf),
    /// The rich-text document is read back by the converter
    Extracting { from: String },
    /// A unit was reconstructed and is queued for writing
    RestoringUnit(String),
    /// All unit files were written
    ImportComplete,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::ProcessingUnit(name) => write!(f, "Processing {name}..."),
            Progress::Converting { to } => write!(f, "Converting to {}...", to.to_uppercase()),
            Progress::Created(path) => write!(f, "Created {}", path.display()),
            Progress::Extracting { from } => {
                write!(f, "Converting {} to linear text...", from.to_uppercase())
            }
            Progress::RestoringUnit(name) => write!(f, "Restoring {name}..."),
            Progress::ImportComplete => write!(f, "Import complete."),
        }
    }
}

/// Specifies an export run.
#[derive(Debug)]
pub struct ExportSpec<'a> {
    pub registry: &'a UnitRegistry,
    pub grammar: &'a Grammar,
    /// Directory holding the unit files
    pub docs_dir: PathBuf,
    /// Rich-text file to create
    pub output: PathBuf,
    /// Where to keep a copy of the linear document handed to the converter
    pub debug_output: Option<PathBuf>,
    /// Format tag the converter reads the linear document as
    pub source_format: String,
    /// Format named in progress messages
    pub target_format: String,
}

impl<'a> ExportSpec<'a> {
    pub fn new(
        registry: &'a UnitRegistry,
        grammar: &'a Grammar,
        docs_dir: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Self {
        Self {
            registry,
            grammar,
            docs_dir: docs_dir.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            debug_output: None,
            source_format: "markdown".to_string(),
            target_format: "docx".to_string(),
        }
    }

    pub fn with_debug_output(mut self, path: impl AsRef<Path>) -> Self {
        self.debug_output = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_source_format(mut self, format: impl Into<String>) -> Self {
        self.source_format = format.into();
        self
    }

    pub fn with_target_format(mut self, format: impl Into<String>) -> Self {
        self.target_format = format.into();
        self
    }
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// The rich-text file that was written
    pub output: PathBuf,
    /// The linear document exactly as handed to the converter
    pub linear: String,
    /// Structural repairs made while flattening
    pub issues: Vec<Malformation>,
}

/// Read every unit, build the linear document and have the converter write the rich-text file.
pub fn export<F>(
    spec: &ExportSpec<'_>,
    converter: &dyn Converter,
    mut progress: F,
) -> Result<ExportReport, BridgeError>
where
    F: FnMut(&Progress),
{
    let paths = unit_paths(spec.registry, &spec.docs_dir);
    if let Some((_, missing)) = paths.iter().find(|(_, path)| !path.is_file()) {
        return Err(BridgeError::Configuration(format!(
            "input file '{}' not found",
            missing.display()
        )));
    }

    let mut units = Vec::with_capacity(paths.len());
    for (name, path) in &paths {
        progress(&Progress::ProcessingUnit(name.clone()));
        let text = fs::read_to_string(path).map_err(|e| BridgeError::io(path, e))?;
        units.push(UnitText::new(name.as_str(), text));
    }

    let recovered = export_linear(&units, spec.registry, spec.grammar)?;
    report_issues(&recovered.issues);
    let linear = recovered.value;

    if let Some(debug) = &spec.debug_output {
        write_file(debug, linear.as_bytes())?;
    }

    progress(&Progress::Converting {
        to: spec.target_format.clone(),
    });
    let bytes = converter.render(&linear, &spec.source_format)?;
    write_file(&spec.output, &bytes)?;
    progress(&Progress::Created(spec.output.clone()));

    Ok(ExportReport {
        output: spec.output.clone(),
        linear,
        issues: recovered.issues,
    })
}

/// Specifies an import run.
#[derive(Debug)]
pub struct ImportSpec<'a> {
    pub registry: &'a UnitRegistry,
    pub grammar: &'a Grammar,
    /// Rich-text file to read
    pub input: PathBuf,
    /// Directory the unit files are written to
    pub docs_dir: PathBuf,
    /// Where to keep a copy of the converter's linear output
    pub debug_output: Option<PathBuf>,
    /// Format named in progress messages
    pub source_format: String,
}

impl<'a> ImportSpec<'a> {
    pub fn new(
        registry: &'a UnitRegistry,
        grammar: &'a Grammar,
        input: impl AsRef<Path>,
        docs_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            registry,
            grammar,
            input: input.as_ref().to_path_buf(),
            docs_dir: docs_dir.as_ref().to_path_buf(),
            debug_output: None,
            source_format: "docx".to_string(),
        }
    }

    pub fn with_debug_output(mut self, path: impl AsRef<Path>) -> Self {
        self.debug_output = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_source_format(mut self, format: impl Into<String>) -> Self {
        self.source_format = format.into();
        self
    }
}

/// Result of a successful import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// Unit files that were replaced, in registry order
    pub written: Vec<PathBuf>,
    /// Structural repairs and units that could not be found
    pub issues: Vec<Malformation>,
}

/// Have the converter read the rich-text file back, rebuild every unit and replace the unit files.
pub fn import<F>(
    spec: &ImportSpec<'_>,
    converter: &dyn Converter,
    mut progress: F,
) -> Result<ImportReport, BridgeError>
where
    F: FnMut(&Progress),
{
    if !spec.input.is_file() {
        return Err(BridgeError::Configuration(format!(
            "input file '{}' not found",
            spec.input.display()
        )));
    }

    progress(&Progress::Extracting {
        from: spec.source_format.clone(),
    });
    let linear = converter.extract(&spec.input)?;
    if let Some(debug) = &spec.debug_output {
        write_file(debug, linear.as_bytes())?;
    }

    let recovered = import_linear(&linear, spec.registry, spec.grammar);
    report_issues(&recovered.issues);

    let mut staged = Vec::with_capacity(recovered.value.len());
    for unit in &recovered.value {
        progress(&Progress::RestoringUnit(unit.name.clone()));
        let path = spec.docs_dir.join(&unit.name);
        let file = stage_file(&path, unit.text.as_bytes())?;
        staged.push((path, file));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (path, file) in staged {
        file.persist(&path).map_err(|e| BridgeError::io(&path, e.error))?;
        written.push(path);
    }
    progress(&Progress::ImportComplete);

    Ok(ImportReport {
        written,
        issues: recovered.issues,
    })
}

fn unit_paths(registry: &UnitRegistry, docs_dir: &Path) -> Vec<(String, PathBuf)> {
    registry
        .names()
        .map(|name| (name.to_string(), docs_dir.join(name)))
        .collect()
}

fn report_issues(issues: &[Malformation]) {
    for issue in issues {
        tracing::warn!("{issue}");
    }
}

/// Write `bytes` to a temporary file in the directory of `path`, ready to be renamed over it
fn stage_file(path: &Path, bytes: &[u8]) -> Result<NamedTempFile, BridgeError> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| BridgeError::io(parent, e))?;
            parent
        }
        None => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(|e| BridgeError::io(dir, e))?;
    file.write_all(bytes)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| BridgeError::io(path, e))?;
    Ok(file)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), BridgeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BridgeError::io(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| BridgeError::io(path, e))
}

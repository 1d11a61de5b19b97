//! External converter boundary
//!
//! The rich-text reader/writer is an opaque collaborator. Export hands it the linear document
//! and gets the rich-text file back as bytes; import hands it a rich-text file and gets linear
//! text back. Anything the converter does to whitespace, escaping or paragraph boundaries is
//! undone by the reconstruction engine, never here.

use crate::error::BridgeError;
use std::path::Path;

/// Trait for external rich-text converters
///
/// # Examples
///
/// ```ignore
/// struct Passthrough;
///
/// impl Converter for Passthrough {
///     fn name(&self) -> &str {
///         "passthrough"
///     }
///
///     fn render(&self, linear: &str, _source_format: &str) -> Result<Vec<u8>, BridgeError> {
///         Ok(linear.as_bytes().to_vec())
///     }
///
///     fn extract(&self, document: &Path) -> Result<String, BridgeError> {
///         std::fs::read_to_string(document).map_err(|e| BridgeError::Converter(e.to_string()))
///     }
/// }
/// ```
pub trait Converter: Send + Sync {
    /// The name of this converter (e.g., "pandoc")
    fn name(&self) -> &str;

    /// Optional description of this converter
    fn description(&self) -> &str {
        ""
    }

    /// Convert linear text, written in `source_format`, into the rich-text format
    fn render(&self, linear: &str, source_format: &str) -> Result<Vec<u8>, BridgeError>;

    /// Read a rich-text file back as linear text without line wrapping
    fn extract(&self, document: &Path) -> Result<String, BridgeError>;
}

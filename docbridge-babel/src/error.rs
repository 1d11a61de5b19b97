//! Error types for export and import runs

use std::fmt;
use std::path::PathBuf;

/// Fatal errors that abort an export or import run.
///
/// Structural problems in the markup are not errors: they are recovered locally and reported
/// through [`crate::ir::nodes::Recovered`]. Unresolvable references are never errors either.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// A required resource (input file, converter binary, unit list) is missing or invalid
    Configuration(String),
    /// Reading or writing a file failed
    Io { path: PathBuf, message: String },
    /// The external rich-text converter failed
    Converter(String),
    /// A unit name was requested that the registry does not know
    UnknownUnit(String),
}

impl BridgeError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        BridgeError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            BridgeError::Io { path, message } => {
                write!(f, "I/O error on '{}': {message}", path.display())
            }
            BridgeError::Converter(msg) => write!(f, "Converter error: {msg}"),
            BridgeError::UnknownUnit(name) => write!(f, "Unit '{name}' is not registered"),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Reasons a unit list is rejected by [`crate::registry::UnitRegistry::new`].
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// No units were given
    Empty,
    /// The name is empty or contains characters the unit boundary marker cannot carry
    InvalidName(String),
    /// The same name appears twice
    DuplicateName(String),
    /// Two names derive the same anchor
    AnchorCollision { first: String, second: String },
    /// Two encoded names are equal, or one is a `__`-separated prefix of the other
    EncodedCollision { first: String, second: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Empty => write!(f, "unit registry is empty"),
            RegistryError::InvalidName(name) => write!(f, "invalid unit name '{name}'"),
            RegistryError::DuplicateName(name) => write!(f, "unit '{name}' is listed twice"),
            RegistryError::AnchorCollision { first, second } => {
                write!(f, "units '{first}' and '{second}' derive the same anchor")
            }
            RegistryError::EncodedCollision { first, second } => write!(
                f,
                "encoded names of units '{first}' and '{second}' are ambiguous"
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<RegistryError> for BridgeError {
    fn from(err: RegistryError) -> Self {
        BridgeError::Configuration(err.to_string())
    }
}

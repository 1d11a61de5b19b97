//! Shared configuration loader for the docbridge toolchain.
//!
//! `defaults/docbridge.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`DocbridgeConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use docbridge_babel::{ControlRules, Grammar, RegistryError, UnitRegistry};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/docbridge.default.toml");

/// Top-level configuration consumed by docbridge applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DocbridgeConfig {
    pub project: ProjectConfig,
    pub debug: DebugConfig,
    pub converter: ConverterConfig,
    pub grammar: GrammarConfig,
    pub controls: ControlsConfig,
}

/// The document set and where it lives.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub docs_dir: PathBuf,
    pub units: Vec<String>,
    pub document: PathBuf,
}

/// Where the linear document is kept for inspection.
#[derive(Debug, Clone, Deserialize)]
pub struct DebugConfig {
    pub export_path: PathBuf,
    pub import_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConverterConfig {
    #[serde(default)]
    pub binary: Option<PathBuf>,
    pub source_format: String,
    pub target_format: String,
}

/// Mirrors the markup conventions of [`Grammar`].
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarConfig {
    pub indent_width: usize,
    pub collapsible_tag: String,
    pub container_tag: String,
    pub list_container: String,
    pub list_item: String,
    pub kind_key: String,
    pub state_key: String,
}

/// Mirrors [`ControlRules`].
#[derive(Debug, Clone, Deserialize)]
pub struct ControlsConfig {
    pub identity_prefix: String,
    pub name_prefix: String,
    pub identity_class: String,
    pub name_class: String,
    pub toggle_hook: String,
}

impl From<&ControlsConfig> for ControlRules {
    fn from(config: &ControlsConfig) -> Self {
        ControlRules {
            identity_prefix: config.identity_prefix.clone(),
            name_prefix: config.name_prefix.clone(),
            identity_class: config.identity_class.clone(),
            name_class: config.name_class.clone(),
            toggle_hook: config.toggle_hook.clone(),
        }
    }
}

impl From<&DocbridgeConfig> for Grammar {
    fn from(config: &DocbridgeConfig) -> Self {
        let grammar = &config.grammar;
        Grammar {
            indent_width: grammar.indent_width,
            collapsible_tag: grammar.collapsible_tag.clone(),
            container_tag: grammar.container_tag.clone(),
            list_container: grammar.list_container.clone(),
            list_item: grammar.list_item.clone(),
            kind_key: grammar.kind_key.clone(),
            state_key: grammar.state_key.clone(),
            controls: ControlRules::from(&config.controls),
        }
    }
}

impl DocbridgeConfig {
    /// Build the unit registry, rejecting ambiguous unit lists.
    pub fn registry(&self) -> Result<UnitRegistry, RegistryError> {
        UnitRegistry::new(self.project.units.iter().cloned())
    }

    pub fn grammar(&self) -> Grammar {
        Grammar::from(self)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<DocbridgeConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DocbridgeConfig, ConfigError> {
    Loader::new().build()
}

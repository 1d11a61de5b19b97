//! Round-tripping of multi-unit block markup through a rich-text editing format
//!
//!     A document set is a fixed, ordered list of units written in an indentation-sensitive
//!     markup: `///` directive blocks nested by indentation, embedded checkbox controls and links
//!     between units. Reviewers want to edit it in a word processor, which knows nothing about
//!     any of that and is free to rewrap, re-escape and re-paragraph whatever it is given.
//!
//!     Export flattens every unit into one linear document the converter can carry without
//!     losing structure; import takes the converter's output and rebuilds the units.
//!
//!     This is a pure lib: it powers docbridge-cli but never prints, never exits and reads no
//!     environment apart from converter binary discovery.
//!
//! Architecture
//!
//!     .
//!     ├── error.rs                # BridgeError, RegistryError
//!     ├── registry.rs             # UnitRegistry: unit names, anchors, encoded names
//!     ├── grammar.rs              # Markup conventions (tags, metadata keys, control prefixes)
//!     ├── ir                      # Typed tokens, the lexer and the per-unit block tree
//!     ├── common                  # Inline codecs and the two engines
//!     │   ├── controls.rs         # <input> ⇄ [key]
//!     │   ├── attributes.rs       # [t](u){ #id } ⇄ [t { #id }](u)
//!     │   ├── links.rs            # unit references ⇄ flat anchors
//!     │   ├── escape.rs
//!     │   ├── nested_to_flat.rs   # export engine
//!     │   └── flat_to_nested.rs   # import engine
//!     ├── converter.rs            # Converter trait (the external rich-text tool)
//!     ├── formats/pandoc          # Converter shelling out to pandoc
//!     ├── transforms.rs           # In-memory export/import of a whole unit set
//!     └── publish.rs              # File-level pipelines
//!
//! Core Algorithms
//!
//!     Both directions share one tokenizer (./ir/lexer.rs) and one block tree (./ir/nodes.rs).
//!     Flattening (./common/nested_to_flat.rs) walks the tree and drops the indentation owned by
//!     enclosing blocks. Reconstruction (./common/flat_to_nested.rs) rebuilds the tree from the
//!     converter's output and renders it with the indentation each block type gives its
//!     children.
//!
//!     Malformed markup is never fatal. Repairs (stray end markers, unclosed blocks, unknown or
//!     missing units) travel next to the output as `Recovered<T>`, so callers decide whether to
//!     warn or refuse.

pub mod common;
pub mod converter;
pub mod error;
pub mod formats;
pub mod grammar;
pub mod ir;
pub mod publish;
pub mod registry;
pub mod transforms;

pub use converter::Converter;
pub use error::{BridgeError, RegistryError};
pub use grammar::{ControlRules, Grammar};
pub use ir::nodes::{Malformation, Recovered};
pub use publish::{export, import, ExportReport, ExportSpec, ImportReport, ImportSpec, Progress};
pub use registry::UnitRegistry;
pub use transforms::{export_linear, import_linear, UnitText};

//! Converter implementations
//!
//! Concrete [`crate::converter::Converter`]s that talk to an external rich-text tool.

#[cfg(feature = "native-export")]
pub mod pandoc;

#[cfg(feature = "native-export")]
pub use pandoc::PandocConverter;

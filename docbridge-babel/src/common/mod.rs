//! The two engines and the inline codecs they share.
//!
//! `nested_to_flat` and `flat_to_nested` move whole units between source form and the linear
//! document. `links`, `attributes` and `controls` rewrite inline syntax within a line, and
//! `escape` handles the character-level differences between the two spellings.

pub mod attributes;
pub mod controls;
pub mod escape;
pub mod flat_to_nested;
pub mod links;
pub mod nested_to_flat;

//! Intermediate representation shared by both directions
//!
//! - `tokens`: typed line and inline tokens
//! - `lexer`: classification of lines and scanning of inline syntax into tokens
//! - `nodes`: the per-unit block tree and the recoverable-error channel

pub mod lexer;
pub mod nodes;
pub mod tokens;

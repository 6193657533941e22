//! Trellis Parser
//!
//! This crate parses selection fragments, the text form clients use to say
//! which fields of a node they want back:
//! - Selection sets (`{ id title category { id } }`) with aliases
//! - Field arguments written as GraphQL-style values, read into JSON
//! - Optional `fragment Name on Node` headers
//! - Error handling with location information

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::*;
pub use error::*;
pub use parser::{parse_fragment, parse_selection_set, Parser};

//! Trellis Core Types
//!
//! This crate provides the foundational types used throughout Trellis:
//! - Leaf values (the Value enum with all scalar and enum types)
//! - Leaf types, their filter/sort capabilities and the value codec
//! - Input paths and input validation errors
//! - "Did you mean" suggestions for unknown names

mod error;
mod leaf_type;
mod path;
mod suggest;
mod value;

pub use error::*;
pub use leaf_type::*;
pub use path::*;
pub use suggest::did_you_mean;
pub use value::*;

//! Trellis SQL
//!
//! Compiles filters, orderings and selections on a schema into relational
//! statements, and reads result rows back into node values.
//!
//! Responsibilities:
//! - Build the join graph of a statement, sharing joins per relation
//! - Read reference-only filters and selections off foreign-key columns
//! - Group rows when to-many joins may repeat them
//! - Rebuild nested node values from flat rows, deferring to-many edges
//! - Run statements through an [`Executor`] supplied by the host
//!
//! Statements use backtick-quoted identifiers and inline literals. Projected
//! columns are named `<table alias>.<column>`, and join aliases follow the
//! path from the root, e.g. `article>category>parent`.

mod builder;
mod condition;
mod connector;
mod error;
mod plan;
mod projection;
mod table;

pub use builder::{CountStatement, FindArgs, Statement, StatementBuilder};
pub use connector::{Connector, Executor};
pub use error::{
    ConnectorError, ConnectorResult, RowError, RowResult, StatementError, StatementResult,
};
pub use plan::{NodePlan, RawRow};
pub use projection::split_reference_selections;

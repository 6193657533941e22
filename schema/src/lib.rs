//! Trellis Schema
//!
//! The node graph and everything derived from it.
//!
//! Responsibilities:
//! - Declare nodes, leaves, edges, unique constraints and custom fields
//! - Resolve references and reverse edges once, in a two-phase build
//! - Parse client filters into an optimized boolean-algebra AST
//! - Parse orderings and unique lookups
//! - Parse selection fragments into mergeable selection trees

mod builder;
mod config;
mod edge;
mod error;
mod filter;
#[cfg(any(test, feature = "fixture"))]
pub mod fixture;
mod input;
mod leaf;
mod naming;
mod node;
mod record;
mod reverse_edge;
mod schema;
mod selection;
mod unique;

pub use builder::{CustomFieldDef, EdgeDef, NodeBuilder, SchemaBuilder};
pub use config::{ComponentConfig, EdgeConfig, LeafConfig, NodeConfig, SchemaConfig};
pub use edge::{Edge, ReferenceColumn};
pub use error::{SchemaError, SchemaResult, SelectionError, SelectionResult};
pub use filter::{EdgeFilter, Filter, LeafFilter, Operand, ReverseEdgeFilter};
pub use input::{
    Direction, EdgeOperator, FilterField, LogicalOperator, OrderByInput, Ordering,
    ReverseEdgeOperator, WhereInput, WhereUniqueInput,
};
pub use leaf::Leaf;
pub use node::{Component, CustomField, CustomResolver, Node, NodeId};
pub use record::{DeferredReverseEdge, FieldValue, NodeValue};
pub use reverse_edge::ReverseEdge;
pub use schema::Schema;
pub use selection::{is_reference_selection, merge_selection, ReverseEdgeArgs, Selection};
pub use unique::UniqueConstraint;

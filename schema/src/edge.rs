//! Edges and their foreign-key columns.

use crate::NodeId;
use trellis_core::LeafType;

/// A reference from one node to another, resolved through one of the
/// target's unique constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Edge name.
    pub name: String,
    /// Target node.
    pub to: NodeId,
    /// Index of the referenced unique constraint on the target.
    pub reference: usize,
    pub nullable: bool,
    pub immutable: bool,
    pub public: bool,
    /// Prefix of the foreign-key columns.
    pub column: String,
    /// Foreign-key columns, one per leaf reached through the reference.
    pub reference_columns: Vec<ReferenceColumn>,
}

impl Edge {
    /// Whether a row's edge value is null can be read off a single
    /// non-nullable foreign-key column.
    pub fn has_non_nullable_column(&self) -> bool {
        self.reference_columns.iter().any(|c| !c.nullable)
    }
}

/// A column holding one leaf of a unique constraint, possibly reached
/// through nested edges.
///
/// Used both for a node's own unique constraint columns and for an edge's
/// foreign-key columns, in which case `column` lives in the edge's table and
/// `referenced_column` in the target's.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceColumn {
    pub column: String,
    pub referenced_column: String,
    /// Component names from the constraint down to the leaf, e.g.
    /// `["article", "id"]`.
    pub path: Vec<String>,
    pub leaf_type: LeafType,
    pub nullable: bool,
}

impl ReferenceColumn {
    /// The column as seen through an edge named with `prefix`.
    pub(crate) fn through_edge(&self, prefix: &str, nullable: bool) -> Self {
        Self {
            column: format!("{}_{}", prefix, self.column),
            referenced_column: self.column.clone(),
            path: self.path.clone(),
            leaf_type: self.leaf_type.clone(),
            nullable: nullable || self.nullable,
        }
    }
}

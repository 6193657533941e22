//! Reverse edges, derived from the edges pointing at a node.

use crate::NodeId;

/// The inverse view of an edge, owned by the edge's target.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseEdge {
    pub name: String,
    /// Node declaring the forward edge.
    pub head: NodeId,
    /// Forward edge name on `head`.
    pub edge: String,
    /// At most one head per target: the edge alone forms a unique constraint.
    pub unique: bool,
    pub public: bool,
}

impl ReverseEdge {
    /// Name of the count field (`<name>Count`) of a to-many reverse edge.
    pub fn count_name(&self) -> Option<String> {
        (!self.unique).then(|| format!("{}Count", self.name))
    }
}

//! The Schema - immutable node graph lookup.

use crate::{Node, NodeId};
use std::collections::HashMap;

/// The built node graph. Immutable after construction.
#[derive(Debug)]
pub struct Schema {
    /// Nodes, indexed by id.
    nodes: Vec<Node>,
    /// Node id lookup by name.
    node_names: HashMap<String, NodeId>,
}

impl Schema {
    pub(crate) fn new(nodes: Vec<Node>) -> Self {
        let node_names = nodes
            .iter()
            .map(|node| (node.name.clone(), node.id))
            .collect();
        Self { nodes, node_names }
    }

    /// Get a node by id.
    ///
    /// # Panics
    /// If the id was not issued by the builder of this schema.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Get a node by name.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.node_names.get(name).map(|id| self.node(*id))
    }

    /// Get a node id by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_names.get(name).copied()
    }

    /// All nodes, in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}

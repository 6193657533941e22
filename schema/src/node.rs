//! Nodes and their components.

use crate::{
    Edge, Leaf, NodeValue, OrderByInput, ReferenceColumn, ReverseEdge, Selection,
    UniqueConstraint, WhereInput, WhereUniqueInput,
};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use trellis_core::Value;

/// Identifier of a node within its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A leaf or an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Leaf(Leaf),
    Edge(Edge),
}

impl Component {
    pub fn name(&self) -> &str {
        match self {
            Component::Leaf(leaf) => &leaf.name,
            Component::Edge(edge) => &edge.name,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Component::Leaf(leaf) => leaf.nullable,
            Component::Edge(edge) => edge.nullable,
        }
    }

    pub fn is_immutable(&self) -> bool {
        match self {
            Component::Leaf(leaf) => leaf.immutable,
            Component::Edge(edge) => edge.immutable,
        }
    }

    pub fn is_public(&self) -> bool {
        match self {
            Component::Leaf(leaf) => leaf.public,
            Component::Edge(edge) => edge.public,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Component::Leaf(leaf) => Some(leaf),
            Component::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Component::Edge(edge) => Some(edge),
            Component::Leaf(_) => None,
        }
    }
}

/// Computes a custom field's value from the record it belongs to.
pub type CustomResolver = Arc<dyn Fn(&NodeValue) -> Value + Send + Sync>;

/// A derived field computed from other fields of the same node.
#[derive(Clone)]
pub struct CustomField {
    pub name: String,
    pub public: bool,
    /// Selections the resolver reads, merged in before the field itself.
    pub dependencies: Vec<Selection>,
    pub resolver: CustomResolver,
}

impl fmt::Debug for CustomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomField")
            .field("name", &self.name)
            .field("public", &self.public)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// A node: an entity type with its components, constraints and grammars.
///
/// Nodes are only created by [`SchemaBuilder`](crate::SchemaBuilder) and
/// never change once the schema is built.
#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) plural: String,
    pub(crate) table: String,
    pub(crate) public: bool,
    pub(crate) immutable: bool,
    pub(crate) components: IndexMap<String, Component>,
    pub(crate) unique_constraints: Vec<UniqueConstraint>,
    pub(crate) reverse_edges: IndexMap<String, ReverseEdge>,
    pub(crate) custom_fields: IndexMap<String, CustomField>,
    pub(crate) where_input: WhereInput,
    pub(crate) where_unique_input: WhereUniqueInput,
    pub(crate) order_by_input: OrderByInput,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plural(&self) -> &str {
        &self.plural
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    // ==================== Components ====================

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    pub fn leaf(&self, name: &str) -> Option<&Leaf> {
        self.component(name).and_then(Component::as_leaf)
    }

    pub fn edge(&self, name: &str) -> Option<&Edge> {
        self.component(name).and_then(Component::as_edge)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.components().filter_map(Component::as_leaf)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.components().filter_map(Component::as_edge)
    }

    /// Look up a leaf that the grammar has already validated.
    ///
    /// # Panics
    /// If the node has no such leaf.
    pub fn expect_leaf(&self, name: &str) -> &Leaf {
        match self.leaf(name) {
            Some(leaf) => leaf,
            None => panic!("node '{}' has no leaf '{}'", self.name, name),
        }
    }

    /// Look up an edge that the grammar has already validated.
    ///
    /// # Panics
    /// If the node has no such edge.
    pub fn expect_edge(&self, name: &str) -> &Edge {
        match self.edge(name) {
            Some(edge) => edge,
            None => panic!("node '{}' has no edge '{}'", self.name, name),
        }
    }

    // ==================== Unique constraints ====================

    /// The first unique constraint.
    pub fn identifier(&self) -> &UniqueConstraint {
        &self.unique_constraints[0]
    }

    pub fn unique_constraints(&self) -> &[UniqueConstraint] {
        &self.unique_constraints
    }

    /// Columns of this node's table holding the given unique constraint,
    /// with edge components flattened to their foreign-key columns.
    pub fn unique_columns(&self, index: usize) -> Vec<ReferenceColumn> {
        let mut columns = Vec::new();
        for name in &self.unique_constraints[index].components {
            match &self.components[name] {
                Component::Leaf(leaf) => columns.push(ReferenceColumn {
                    column: leaf.column.clone(),
                    referenced_column: leaf.column.clone(),
                    path: vec![leaf.name.clone()],
                    leaf_type: leaf.leaf_type.clone(),
                    nullable: leaf.nullable,
                }),
                Component::Edge(edge) => {
                    columns.extend(edge.reference_columns.iter().map(|c| {
                        let mut path = vec![edge.name.clone()];
                        path.extend(c.path.iter().cloned());
                        ReferenceColumn {
                            column: c.column.clone(),
                            referenced_column: c.column.clone(),
                            path,
                            leaf_type: c.leaf_type.clone(),
                            nullable: c.nullable,
                        }
                    }))
                }
            }
        }
        columns
    }

    pub fn identifier_columns(&self) -> Vec<ReferenceColumn> {
        self.unique_columns(0)
    }

    // ==================== Derived fields ====================

    pub fn reverse_edges(&self) -> impl Iterator<Item = &ReverseEdge> {
        self.reverse_edges.values()
    }

    pub fn reverse_edge(&self, name: &str) -> Option<&ReverseEdge> {
        self.reverse_edges.get(name)
    }

    /// # Panics
    /// If the node has no such reverse edge.
    pub fn expect_reverse_edge(&self, name: &str) -> &ReverseEdge {
        match self.reverse_edge(name) {
            Some(reverse_edge) => reverse_edge,
            None => panic!("node '{}' has no reverse edge '{}'", self.name, name),
        }
    }

    pub fn custom_fields(&self) -> impl Iterator<Item = &CustomField> {
        self.custom_fields.values()
    }

    pub fn custom_field(&self, name: &str) -> Option<&CustomField> {
        self.custom_fields.get(name)
    }

    /// Every field name a selection may use, for suggestions.
    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.keys().cloned().collect();
        for reverse_edge in self.reverse_edges() {
            names.push(reverse_edge.name.clone());
            names.extend(reverse_edge.count_name());
        }
        names.extend(self.custom_fields.keys().cloned());
        names
    }

    // ==================== Grammars ====================

    /// Filter grammar of this node.
    pub fn where_input(&self) -> &WhereInput {
        &self.where_input
    }

    /// Unique lookup grammar of this node.
    pub fn where_unique_input(&self) -> &WhereUniqueInput {
        &self.where_unique_input
    }

    /// Ordering grammar of this node.
    pub fn order_by_input(&self) -> &OrderByInput {
        &self.order_by_input
    }
}

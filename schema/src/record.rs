//! Reconstructed node values.

use crate::{Component, Filter, Node, NodeId, ReverseEdgeArgs, Schema};
use indexmap::IndexMap;
use trellis_core::Value;

/// The fields of one node instance, keyed by selection key, in selection order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeValue {
    fields: IndexMap<String, FieldValue>,
}

/// The value of one selected field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A leaf or custom field value.
    Leaf(Value),
    /// An edge or unique reverse edge; `None` when unset.
    Node(Option<NodeValue>),
    /// Whether an edge or unique reverse edge is set.
    Exists(bool),
    Count(u64),
    /// A to-many reverse edge, to be read with a further query.
    Deferred(DeferredReverseEdge),
}

impl NodeValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn leaf(&self, key: &str) -> Option<&Value> {
        match self.get(key)? {
            FieldValue::Leaf(value) => Some(value),
            _ => None,
        }
    }

    pub fn node(&self, key: &str) -> Option<&NodeValue> {
        match self.get(key)? {
            FieldValue::Node(value) => value.as_ref(),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A to-many reverse edge left unread by the statement that loaded its owner.
///
/// Reading it means querying `node` (the head of the reverse edge) with
/// [`filter`](Self::filter) and the ordering/pagination in `args`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredReverseEdge {
    /// Head node of the reverse edge.
    pub node: NodeId,
    pub reverse_edge: String,
    /// Forward edge on the head node.
    pub edge: String,
    /// The owner's reference constraint values.
    pub parent: NodeValue,
    pub args: ReverseEdgeArgs,
}

impl DeferredReverseEdge {
    /// `edge = parent AND where`, optimized.
    pub fn filter(&self, schema: &Schema) -> Filter {
        let head = schema.node(self.node);
        let edge = head.expect_edge(&self.edge);
        let target = schema.node(edge.to);
        let reference = &target.unique_constraints()[edge.reference].components;
        let identity = identity_filter(target, reference, &self.parent, schema);

        Filter::and([Filter::edge(&self.edge, identity), self.args.filter.clone()])
            .optimize(schema, head)
    }
}

/// Equality on the given components, read from `value`.
fn identity_filter(node: &Node, components: &[String], value: &NodeValue, schema: &Schema) -> Filter {
    Filter::and(components.iter().map(|name| match &node.components[name] {
        Component::Leaf(_) => Filter::eq(name, value.leaf(name).cloned().unwrap_or(Value::Null)),
        Component::Edge(edge) => match value.node(name) {
            Some(nested) => {
                let target = schema.node(edge.to);
                let reference = &target.unique_constraints()[edge.reference].components;
                Filter::edge(name, identity_filter(target, reference, nested, schema))
            }
            None => Filter::not(Filter::edge(name, Filter::Boolean(true))),
        },
    }))
}

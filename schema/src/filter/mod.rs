//! The filter AST.
//!
//! A filter is a boolean-algebra tree relative to one node: leaf comparisons
//! on that node, edge filters stepping to the edge's target and reverse-edge
//! filters stepping to the reverse edge's head. Negated edge forms (`_not`,
//! `_is_null`, `_none`, `_every`) are all expressed with [`Filter::Not`].

mod optimize;

use crate::{Edge, Schema};
use std::fmt;
use trellis_core::{LeafOperator, Value};

/// A filter over one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Boolean(bool),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Leaf(LeafFilter),
    /// Holds when the edge is set and its target matches the child filter.
    Edge(EdgeFilter),
    /// Holds when some head node pointing here matches the child filter.
    ReverseEdge(ReverseEdgeFilter),
}

/// A comparison on one leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafFilter {
    pub leaf: String,
    pub operator: LeafOperator,
    pub operand: Operand,
}

/// Right-hand side of a leaf comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    List(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeFilter {
    pub edge: String,
    pub filter: Box<Filter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseEdgeFilter {
    pub reverse_edge: String,
    pub filter: Box<Filter>,
}

impl Filter {
    pub fn and(children: impl IntoIterator<Item = Filter>) -> Filter {
        Filter::And(children.into_iter().collect())
    }

    pub fn or(children: impl IntoIterator<Item = Filter>) -> Filter {
        Filter::Or(children.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Filter {
        Filter::Not(Box::new(filter))
    }

    pub fn leaf(leaf: impl Into<String>, operator: LeafOperator, operand: Operand) -> Filter {
        Filter::Leaf(LeafFilter {
            leaf: leaf.into(),
            operator,
            operand,
        })
    }

    /// `leaf = value`.
    pub fn eq(leaf: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::leaf(leaf, LeafOperator::Eq, Operand::Value(value.into()))
    }

    pub fn edge(edge: impl Into<String>, filter: Filter) -> Filter {
        Filter::Edge(EdgeFilter {
            edge: edge.into(),
            filter: Box::new(filter),
        })
    }

    pub fn reverse_edge(reverse_edge: impl Into<String>, filter: Filter) -> Filter {
        Filter::ReverseEdge(ReverseEdgeFilter {
            reverse_edge: reverse_edge.into(),
            filter: Box::new(filter),
        })
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Filter::Boolean(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Filter::Boolean(false))
    }

    /// Whether this filter, placed on `edge`, only reads components of the
    /// edge's reference constraint, so it can be evaluated on the edge's
    /// foreign-key columns without joining the target.
    ///
    /// Nested edge filters are judged against their own reference; reverse
    /// edge filters never qualify.
    pub fn is_reference_filter(&self, schema: &Schema, edge: &Edge) -> bool {
        let target = schema.node(edge.to);
        let reference = &target.unique_constraints()[edge.reference];

        match self {
            Filter::Boolean(_) => true,
            Filter::And(children) | Filter::Or(children) => children
                .iter()
                .all(|child| child.is_reference_filter(schema, edge)),
            Filter::Not(inner) => inner.is_reference_filter(schema, edge),
            Filter::Leaf(leaf) => reference.contains(&leaf.leaf),
            Filter::Edge(nested) => {
                reference.contains(&nested.edge)
                    && nested
                        .filter
                        .is_reference_filter(schema, target.expect_edge(&nested.edge))
            }
            Filter::ReverseEdge(_) => false,
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Filter::Boolean(true)
    }
}

/// Canonical text form. Structurally equal filters print identically, so the
/// text serves as a key for sharing joins.
impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Boolean(b) => write!(f, "{}", b),
            Filter::And(children) => write_group(f, "AND", children),
            Filter::Or(children) => write_group(f, "OR", children),
            Filter::Not(inner) => write!(f, "NOT({})", inner),
            Filter::Leaf(leaf) => {
                write!(f, "{}{}:", leaf.leaf, leaf.operator.suffix())?;
                match &leaf.operand {
                    Operand::Value(value) => write!(f, "{}", value),
                    Operand::List(values) => {
                        write!(f, "[")?;
                        for (i, value) in values.iter().enumerate() {
                            if i > 0 {
                                write!(f, ",")?;
                            }
                            write!(f, "{}", value)?;
                        }
                        write!(f, "]")
                    }
                }
            }
            Filter::Edge(edge) => write!(f, "{}{{{}}}", edge.edge, edge.filter),
            Filter::ReverseEdge(reverse) => {
                write!(f, "{}{{{}}}", reverse.reverse_edge, reverse.filter)
            }
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, operator: &str, children: &[Filter]) -> fmt::Result {
    write!(f, "{}(", operator)?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}

//! Boolean-algebra simplification of filters.
//!
//! One pass rewrites the tree bottom-up; passes repeat until nothing changes.
//! Laws applied: idempotence, identity, annihilation, associativity (one level
//! per pass), double negation, boolean negation, `in`/`not_in` list dedup and
//! edge collapse when the child filter is constant.

use super::{EdgeFilter, Filter, LeafFilter, Operand, ReverseEdgeFilter};
use crate::{Node, Schema};
use tracing::trace;
use trellis_core::LeafOperator;

impl Filter {
    /// Simplify a filter over `node` to its fixed point.
    pub fn optimize(self, schema: &Schema, node: &Node) -> Filter {
        let mut current = self;
        let mut passes = 0usize;
        loop {
            let next = current.clone().pass(schema, node);
            passes += 1;
            if next == current {
                trace!(node = node.name(), passes, filter = %next, "filter optimized");
                return next;
            }
            current = next;
        }
    }

    fn pass(self, schema: &Schema, node: &Node) -> Filter {
        match self {
            Filter::Boolean(b) => Filter::Boolean(b),
            Filter::Leaf(leaf) => optimize_leaf(leaf),
            Filter::Not(inner) => match inner.pass(schema, node) {
                Filter::Boolean(b) => Filter::Boolean(!b),
                Filter::Not(x) => *x,
                other => Filter::not(other),
            },
            Filter::And(children) => optimize_logical(children, true, schema, node),
            Filter::Or(children) => optimize_logical(children, false, schema, node),
            Filter::Edge(EdgeFilter { edge, filter }) => {
                let definition = node.expect_edge(&edge);
                let target = schema.node(definition.to);
                match filter.pass(schema, target) {
                    Filter::Boolean(false) => Filter::Boolean(false),
                    // A non-nullable edge always has a target.
                    Filter::Boolean(true) if !definition.nullable => Filter::Boolean(true),
                    child => Filter::edge(edge, child),
                }
            }
            Filter::ReverseEdge(ReverseEdgeFilter {
                reverse_edge,
                filter,
            }) => {
                let head = schema.node(node.expect_reverse_edge(&reverse_edge).head);
                match filter.pass(schema, head) {
                    Filter::Boolean(false) => Filter::Boolean(false),
                    child => Filter::reverse_edge(reverse_edge, child),
                }
            }
        }
    }
}

fn optimize_leaf(leaf: LeafFilter) -> Filter {
    let LeafFilter {
        leaf,
        operator,
        operand,
    } = leaf;

    let values = match operand {
        Operand::List(values) if operator.is_list() => values,
        operand => return Filter::leaf(leaf, operator, operand),
    };

    let mut unique = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }

    match (operator, unique.len()) {
        (LeafOperator::In, 0) => Filter::Boolean(false),
        (LeafOperator::NotIn, 0) => Filter::Boolean(true),
        (LeafOperator::In, 1) => {
            Filter::leaf(leaf, LeafOperator::Eq, Operand::Value(unique.remove(0)))
        }
        (LeafOperator::NotIn, 1) => {
            Filter::leaf(leaf, LeafOperator::Not, Operand::Value(unique.remove(0)))
        }
        _ => Filter::leaf(leaf, operator, Operand::List(unique)),
    }
}

/// `AND` when `conjunction`, else `OR`. The identity element of `AND` is
/// `true`, its annihilator `false`; the other way round for `OR`.
fn optimize_logical(
    children: Vec<Filter>,
    conjunction: bool,
    schema: &Schema,
    node: &Node,
) -> Filter {
    let identity = conjunction;
    let mut kept: Vec<Filter> = Vec::with_capacity(children.len());

    for child in children {
        match child.pass(schema, node) {
            Filter::Boolean(b) if b == identity => {}
            Filter::Boolean(_) => return Filter::Boolean(!identity),
            Filter::And(grandchildren) if conjunction => {
                for grandchild in grandchildren {
                    push_unique(&mut kept, grandchild);
                }
            }
            Filter::Or(grandchildren) if !conjunction => {
                for grandchild in grandchildren {
                    push_unique(&mut kept, grandchild);
                }
            }
            other => push_unique(&mut kept, other),
        }
    }

    match kept.len() {
        0 => Filter::Boolean(identity),
        1 => kept.remove(0),
        _ if conjunction => Filter::And(kept),
        _ => Filter::Or(kept),
    }
}

fn push_unique(kept: &mut Vec<Filter>, filter: Filter) {
    if !kept.contains(&filter) {
        kept.push(filter);
    }
}

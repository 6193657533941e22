//! WhereInput: the filter grammar of a node.

use super::unknown_keys;
use crate::{Filter, Leaf, Node, NodeId, Operand, Schema};
use indexmap::IndexMap;
use serde_json::Value as Json;
use trellis_core::{json_kind, InputError, InputResult, LeafOperator, Path, Value};

/// Operators on an edge or a unique reverse edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOperator {
    Eq,
    Not,
    IsNull,
}

/// Operators on a reverse edge. `Eq`, `Not` and `IsNull` apply to unique
/// reverse edges, the others to to-many ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverseEdgeOperator {
    Eq,
    Not,
    IsNull,
    Some,
    None,
    Every,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
    Not,
}

/// What one filter key means.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterField {
    Leaf {
        leaf: String,
        operator: LeafOperator,
    },
    LeafIsNull {
        leaf: String,
    },
    Edge {
        edge: String,
        operator: EdgeOperator,
    },
    ReverseEdge {
        reverse_edge: String,
        operator: ReverseEdgeOperator,
    },
    Logical(LogicalOperator),
}

/// The filter grammar of one node: every accepted key and its meaning.
#[derive(Debug, Clone)]
pub struct WhereInput {
    node: NodeId,
    fields: IndexMap<String, FilterField>,
}

impl WhereInput {
    pub(crate) fn empty(node: NodeId) -> Self {
        Self {
            node,
            fields: IndexMap::new(),
        }
    }

    /// Derive the grammar from a node whose reverse edges are resolved.
    pub(crate) fn new(node: &Node) -> Self {
        let mut fields = IndexMap::new();

        for leaf in node.leaves() {
            for operator in leaf.operators() {
                fields.insert(
                    format!("{}{}", leaf.name, operator.suffix()),
                    FilterField::Leaf {
                        leaf: leaf.name.clone(),
                        operator: *operator,
                    },
                );
            }
            if leaf.nullable && leaf.supports(LeafOperator::Eq) && leaf.supports(LeafOperator::Not)
            {
                fields.insert(
                    format!("{}_is_null", leaf.name),
                    FilterField::LeafIsNull {
                        leaf: leaf.name.clone(),
                    },
                );
            }
        }

        for edge in node.edges() {
            let mut operators = vec![("", EdgeOperator::Eq), ("_not", EdgeOperator::Not)];
            if edge.nullable {
                operators.push(("_is_null", EdgeOperator::IsNull));
            }
            for (suffix, operator) in operators {
                fields.insert(
                    format!("{}{}", edge.name, suffix),
                    FilterField::Edge {
                        edge: edge.name.clone(),
                        operator,
                    },
                );
            }
        }

        for reverse_edge in node.reverse_edges() {
            let operators: &[(&str, ReverseEdgeOperator)] = if reverse_edge.unique {
                &[
                    ("", ReverseEdgeOperator::Eq),
                    ("_not", ReverseEdgeOperator::Not),
                    ("_is_null", ReverseEdgeOperator::IsNull),
                ]
            } else {
                &[
                    ("_some", ReverseEdgeOperator::Some),
                    ("_none", ReverseEdgeOperator::None),
                    ("_every", ReverseEdgeOperator::Every),
                ]
            };
            for (suffix, operator) in operators {
                fields.insert(
                    format!("{}{}", reverse_edge.name, suffix),
                    FilterField::ReverseEdge {
                        reverse_edge: reverse_edge.name.clone(),
                        operator: *operator,
                    },
                );
            }
        }

        for (key, operator) in [
            ("AND", LogicalOperator::And),
            ("OR", LogicalOperator::Or),
            ("NOT", LogicalOperator::Not),
        ] {
            fields.insert(key.to_string(), FilterField::Logical(operator));
        }

        Self {
            node: node.id(),
            fields,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Accepted keys, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + Clone {
        self.fields.keys().map(String::as_str)
    }

    pub fn field(&self, key: &str) -> Option<&FilterField> {
        self.fields.get(key)
    }

    /// Parse and optimize a client filter.
    ///
    /// `None` (absent), `true` and `{}` match everything; `null` and `false`
    /// match nothing.
    pub fn parse(&self, schema: &Schema, raw: Option<&Json>, path: &Path) -> InputResult<Filter> {
        let filter = self.parse_raw(schema, raw, path)?;
        Ok(filter.optimize(schema, schema.node(self.node)))
    }

    fn parse_raw(&self, schema: &Schema, raw: Option<&Json>, path: &Path) -> InputResult<Filter> {
        let map = match raw {
            None | Some(Json::Bool(true)) => return Ok(Filter::Boolean(true)),
            Some(Json::Null) | Some(Json::Bool(false)) => return Ok(Filter::Boolean(false)),
            Some(Json::Object(map)) => map,
            Some(other) => {
                return Err(InputError::invalid_type(
                    path.clone(),
                    "a filter object",
                    json_kind(other),
                ))
            }
        };

        let unknown: Vec<String> = map
            .keys()
            .filter(|key| !self.fields.contains_key(*key))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(unknown_keys(path, unknown, self.keys()));
        }

        let node = schema.node(self.node);
        let mut children = Vec::with_capacity(map.len());
        for (key, value) in map {
            let path = path.child(key);
            children.push(self.parse_field(schema, node, &self.fields[key], value, &path)?);
        }
        Ok(Filter::And(children))
    }

    fn parse_field(
        &self,
        schema: &Schema,
        node: &Node,
        field: &FilterField,
        value: &Json,
        path: &Path,
    ) -> InputResult<Filter> {
        match field {
            FilterField::Leaf { leaf, operator } => {
                parse_leaf(node.expect_leaf(leaf), *operator, value, path)
            }
            FilterField::LeafIsNull { leaf } => {
                let operator = if expect_bool(value, path)? {
                    LeafOperator::Eq
                } else {
                    LeafOperator::Not
                };
                Ok(Filter::leaf(leaf, operator, Operand::Value(Value::Null)))
            }
            FilterField::Edge { edge, operator } => {
                let definition = node.expect_edge(edge);
                let target = schema.node(definition.to);
                parse_to_one(
                    schema,
                    target,
                    |child| Filter::edge(edge, child),
                    definition.nullable,
                    *operator,
                    value,
                    path,
                )
            }
            FilterField::ReverseEdge {
                reverse_edge,
                operator,
            } => {
                let head = schema.node(node.expect_reverse_edge(reverse_edge).head);
                let wrap = |child| Filter::reverse_edge(reverse_edge, child);
                let nested = |value| head.where_input.parse_raw(schema, Some(value), path);
                match operator {
                    ReverseEdgeOperator::Eq => {
                        parse_to_one(schema, head, wrap, true, EdgeOperator::Eq, value, path)
                    }
                    ReverseEdgeOperator::Not => {
                        parse_to_one(schema, head, wrap, true, EdgeOperator::Not, value, path)
                    }
                    ReverseEdgeOperator::IsNull => {
                        parse_to_one(schema, head, wrap, true, EdgeOperator::IsNull, value, path)
                    }
                    ReverseEdgeOperator::Some => Ok(wrap(nested(value)?)),
                    ReverseEdgeOperator::None => Ok(Filter::not(wrap(nested(value)?))),
                    ReverseEdgeOperator::Every => {
                        Ok(Filter::not(wrap(Filter::not(nested(value)?))))
                    }
                }
            }
            FilterField::Logical(LogicalOperator::Not) => {
                Ok(Filter::not(self.parse_raw(schema, Some(value), path)?))
            }
            FilterField::Logical(operator) => {
                let children = match value {
                    Json::Array(items) => items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| self.parse_raw(schema, Some(item), &path.index(i)))
                        .collect::<InputResult<Vec<_>>>()?,
                    single => vec![self.parse_raw(schema, Some(single), path)?],
                };
                Ok(match operator {
                    LogicalOperator::And => Filter::And(children),
                    _ => Filter::Or(children),
                })
            }
        }
    }
}

/// An edge or unique reverse edge: at most one related node.
fn parse_to_one(
    schema: &Schema,
    target: &Node,
    wrap: impl Fn(Filter) -> Filter,
    nullable: bool,
    operator: EdgeOperator,
    value: &Json,
    path: &Path,
) -> InputResult<Filter> {
    let exists = wrap(Filter::Boolean(true));
    match operator {
        EdgeOperator::IsNull => Ok(if expect_bool(value, path)? {
            Filter::not(exists)
        } else {
            exists
        }),
        EdgeOperator::Eq | EdgeOperator::Not if value.is_null() && !nullable => {
            Err(InputError::non_null(path.clone()))
        }
        EdgeOperator::Eq if value.is_null() => Ok(Filter::not(exists)),
        EdgeOperator::Not if value.is_null() => Ok(exists),
        EdgeOperator::Eq => Ok(wrap(target.where_input.parse_raw(schema, Some(value), path)?)),
        EdgeOperator::Not => Ok(Filter::not(wrap(
            target.where_input.parse_raw(schema, Some(value), path)?,
        ))),
    }
}

fn parse_leaf(leaf: &Leaf, operator: LeafOperator, value: &Json, path: &Path) -> InputResult<Filter> {
    if operator.is_list() {
        let items = match value {
            // A null list is the same as leaving the key out.
            Json::Null => return Ok(Filter::Boolean(true)),
            Json::Array(items) => items,
            other => {
                return Err(InputError::invalid_type(
                    path.clone(),
                    format!("a list of {}", leaf.leaf_type),
                    json_kind(other),
                ))
            }
        };
        let values = items
            .iter()
            .enumerate()
            .map(|(i, item)| parse_leaf_value(leaf, item, &path.index(i)))
            .collect::<InputResult<Vec<_>>>()?;
        return Ok(Filter::leaf(&leaf.name, operator, Operand::List(values)));
    }

    if value.is_null() && !operator.accepts_null() {
        return Err(InputError::non_null(path.clone()));
    }
    let value = parse_leaf_value(leaf, value, path)?;
    Ok(Filter::leaf(&leaf.name, operator, Operand::Value(value)))
}

fn parse_leaf_value(leaf: &Leaf, raw: &Json, path: &Path) -> InputResult<Value> {
    let value = leaf.leaf_type.parse_value(raw, path)?;
    if value.is_null() && !leaf.nullable {
        return Err(InputError::non_null(path.clone()));
    }
    Ok(value)
}

fn expect_bool(value: &Json, path: &Path) -> InputResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| InputError::invalid_type(path.clone(), "Boolean", json_kind(value)))
}

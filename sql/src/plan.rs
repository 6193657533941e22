//! Row reconstruction plans.
//!
//! A plan is built alongside the SQL of a statement and records, for every
//! selected field, which projected columns hold its value. Reading a row
//! walks the plan and rebuilds the nested node value.

use crate::{RowError, RowResult};
use indexmap::IndexMap;
use serde_json::Value as Json;
use trellis_core::{LeafType, Path, Value};
use trellis_schema::{
    CustomField, DeferredReverseEdge, FieldValue, NodeId, NodeValue, ReverseEdgeArgs,
};

/// One result row, keyed by projected column name.
pub type RawRow = serde_json::Map<String, Json>;

/// How one node value is rebuilt from a row.
#[derive(Debug, Clone)]
pub struct NodePlan {
    pub(crate) node: NodeId,
    pub(crate) fields: Vec<FieldPlan>,
}

/// Decides whether an edge or unique reverse edge is set.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Probe {
    /// Set whenever its owner is.
    Always,
    /// Set iff the column is not null.
    NotNull(String),
    /// Set iff the boolean column holds true.
    Flag(String),
}

/// A column holding one component of a unique constraint, located by its
/// path of component names.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PathColumn {
    pub path: Vec<String>,
    pub column: String,
    pub leaf_type: LeafType,
}

#[derive(Debug, Clone)]
pub(crate) enum FieldPlan {
    Leaf {
        key: String,
        column: String,
        leaf_type: LeafType,
    },
    Node {
        key: String,
        probe: Probe,
        plan: NodePlan,
    },
    Exists {
        key: String,
        probe: Probe,
    },
    Count {
        key: String,
        column: String,
    },
    Deferred {
        key: String,
        head: NodeId,
        reverse_edge: String,
        edge: String,
        /// The owner's reference constraint columns.
        parent: Vec<PathColumn>,
        args: ReverseEdgeArgs,
    },
    Custom {
        key: String,
        field: CustomField,
    },
}

impl FieldPlan {
    pub fn key(&self) -> &str {
        match self {
            FieldPlan::Leaf { key, .. }
            | FieldPlan::Node { key, .. }
            | FieldPlan::Exists { key, .. }
            | FieldPlan::Count { key, .. }
            | FieldPlan::Deferred { key, .. }
            | FieldPlan::Custom { key, .. } => key,
        }
    }
}

impl NodePlan {
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Rebuild the node value held by `row`.
    pub fn read(&self, row: &RawRow) -> RowResult<NodeValue> {
        let mut value = NodeValue::new();
        let mut has_custom = false;
        for field in &self.fields {
            match field {
                FieldPlan::Custom { .. } => has_custom = true,
                other => value.insert(other.key(), read_field(other, row)?),
            }
        }
        if !has_custom {
            return Ok(value);
        }

        // Custom fields see every other field, and the result keeps the
        // selection order.
        let mut ordered = NodeValue::new();
        for field in &self.fields {
            let field_value = match field {
                FieldPlan::Custom { field, .. } => FieldValue::Leaf((field.resolver)(&value)),
                other => match value.get(other.key()) {
                    Some(field_value) => field_value.clone(),
                    None => continue,
                },
            };
            ordered.insert(field.key(), field_value);
        }
        Ok(ordered)
    }
}

fn read_field(field: &FieldPlan, row: &RawRow) -> RowResult<FieldValue> {
    Ok(match field {
        FieldPlan::Leaf {
            column, leaf_type, ..
        } => FieldValue::Leaf(read_leaf(row, column, leaf_type)?),
        FieldPlan::Node { probe, plan, .. } => match is_set(probe, row)? {
            true => FieldValue::Node(Some(plan.read(row)?)),
            false => FieldValue::Node(None),
        },
        FieldPlan::Exists { probe, .. } => FieldValue::Exists(is_set(probe, row)?),
        FieldPlan::Count { column, .. } => FieldValue::Count(read_count(row, column)?),
        FieldPlan::Deferred {
            head,
            reverse_edge,
            edge,
            parent,
            args,
            ..
        } => {
            let columns: Vec<&PathColumn> = parent.iter().collect();
            FieldValue::Deferred(DeferredReverseEdge {
                node: *head,
                reverse_edge: reverse_edge.clone(),
                edge: edge.clone(),
                parent: read_reference(&columns, 0, row)?,
                args: args.clone(),
            })
        }
        FieldPlan::Custom { field, .. } => {
            unreachable!("custom field '{}' is resolved after its record", field.name)
        }
    })
}

fn cell<'r>(row: &'r RawRow, column: &str) -> RowResult<&'r Json> {
    row.get(column)
        .ok_or_else(|| RowError::missing_column(column))
}

fn read_leaf(row: &RawRow, column: &str, leaf_type: &LeafType) -> RowResult<Value> {
    leaf_type
        .parse_column(cell(row, column)?, &Path::key(column))
        .map_err(|source| RowError::invalid_cell(column, source))
}

pub(crate) fn read_count(row: &RawRow, column: &str) -> RowResult<u64> {
    let raw = cell(row, column)?;
    let count = match raw {
        Json::Number(n) => n.as_u64(),
        Json::String(s) => s.parse().ok(),
        _ => None,
    };
    count.ok_or_else(|| RowError::invalid_count(column, raw.to_string()))
}

fn is_set(probe: &Probe, row: &RawRow) -> RowResult<bool> {
    match probe {
        Probe::Always => Ok(true),
        Probe::NotNull(column) => Ok(!cell(row, column)?.is_null()),
        Probe::Flag(column) => Ok(read_leaf(row, column, &LeafType::Boolean)? == Value::Bool(true)),
    }
}

/// Rebuild a unique constraint value from its columns. An edge component
/// whose columns are all null is unset.
fn read_reference(columns: &[&PathColumn], depth: usize, row: &RawRow) -> RowResult<NodeValue> {
    let mut value = NodeValue::new();
    let mut nested: IndexMap<&str, Vec<&PathColumn>> = IndexMap::new();
    for &column in columns {
        let name = &column.path[depth];
        if column.path.len() == depth + 1 {
            let leaf = read_leaf(row, &column.column, &column.leaf_type)?;
            value.insert(name.as_str(), FieldValue::Leaf(leaf));
        } else {
            nested.entry(name.as_str()).or_default().push(column);
        }
    }
    for (name, group) in nested {
        let mut set = false;
        for column in &group {
            set |= !cell(row, &column.column)?.is_null();
        }
        let edge = match set {
            true => Some(read_reference(&group, depth + 1, row)?),
            false => None,
        };
        value.insert(name, FieldValue::Node(edge));
    }
    Ok(value)
}

//! Selection trees.
//!
//! A selection tree says which fields of a node to read. Each selection is
//! keyed by its alias or name; selections sharing a key are merged.

mod parse;

use crate::{Edge, Filter, Ordering, Schema, SelectionError, SelectionResult};

/// Arguments of a to-many reverse edge selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReverseEdgeArgs {
    pub filter: Filter,
    pub order_by: Vec<Ordering>,
    pub first: Option<u64>,
    pub skip: Option<u64>,
}

/// One requested field.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Leaf {
        alias: Option<String>,
        leaf: String,
    },
    /// An edge with a sub-selection on its target.
    Edge {
        alias: Option<String>,
        edge: String,
        selections: Vec<Selection>,
    },
    /// An edge without sub-selection: whether it is set.
    EdgeExistence {
        alias: Option<String>,
        edge: String,
    },
    /// A to-many reverse edge, read later through a deferred query.
    ReverseEdge {
        alias: Option<String>,
        reverse_edge: String,
        args: ReverseEdgeArgs,
        selections: Vec<Selection>,
    },
    ReverseEdgeCount {
        alias: Option<String>,
        reverse_edge: String,
        filter: Filter,
    },
    UniqueReverseEdge {
        alias: Option<String>,
        reverse_edge: String,
        selections: Vec<Selection>,
    },
    UniqueReverseEdgeExistence {
        alias: Option<String>,
        reverse_edge: String,
    },
    Custom {
        alias: Option<String>,
        field: String,
    },
}

impl Selection {
    pub fn leaf(leaf: impl Into<String>) -> Self {
        Selection::Leaf {
            alias: None,
            leaf: leaf.into(),
        }
    }

    pub fn edge(edge: impl Into<String>, selections: Vec<Selection>) -> Self {
        Selection::Edge {
            alias: None,
            edge: edge.into(),
            selections,
        }
    }

    /// Name of the selected field (for counts, `<reverse edge>Count`).
    pub fn name(&self) -> String {
        match self {
            Selection::Leaf { leaf, .. } => leaf.clone(),
            Selection::Edge { edge, .. } | Selection::EdgeExistence { edge, .. } => edge.clone(),
            Selection::ReverseEdge { reverse_edge, .. }
            | Selection::UniqueReverseEdge { reverse_edge, .. }
            | Selection::UniqueReverseEdgeExistence { reverse_edge, .. } => reverse_edge.clone(),
            Selection::ReverseEdgeCount { reverse_edge, .. } => format!("{}Count", reverse_edge),
            Selection::Custom { field, .. } => field.clone(),
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            Selection::Leaf { alias, .. }
            | Selection::Edge { alias, .. }
            | Selection::EdgeExistence { alias, .. }
            | Selection::ReverseEdge { alias, .. }
            | Selection::ReverseEdgeCount { alias, .. }
            | Selection::UniqueReverseEdge { alias, .. }
            | Selection::UniqueReverseEdgeExistence { alias, .. }
            | Selection::Custom { alias, .. } => alias.as_deref(),
        }
    }

    /// The key the value is returned under: the alias, else the name.
    pub fn key(&self) -> String {
        self.alias().map(str::to_string).unwrap_or_else(|| self.name())
    }

    pub fn selections(&self) -> Option<&[Selection]> {
        match self {
            Selection::Edge { selections, .. }
            | Selection::ReverseEdge { selections, .. }
            | Selection::UniqueReverseEdge { selections, .. } => Some(selections),
            _ => None,
        }
    }

    fn selections_mut(&mut self) -> Option<&mut Vec<Selection>> {
        match self {
            Selection::Edge { selections, .. }
            | Selection::ReverseEdge { selections, .. }
            | Selection::UniqueReverseEdge { selections, .. } => Some(selections),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Selection::Leaf { .. } => "leaf",
            Selection::Edge { .. } => "edge",
            Selection::EdgeExistence { .. } => "edge existence",
            Selection::ReverseEdge { .. } => "reverse edge",
            Selection::ReverseEdgeCount { .. } => "reverse edge count",
            Selection::UniqueReverseEdge { .. } => "unique reverse edge",
            Selection::UniqueReverseEdgeExistence { .. } => "unique reverse edge existence",
            Selection::Custom { .. } => "custom field",
        }
    }

    /// Kind, name and arguments: two selections merge iff their signatures match.
    fn signature(&self) -> String {
        match self {
            Selection::ReverseEdge { args, .. } => {
                format!("{} {} {:?}", self.kind(), self.name(), args)
            }
            Selection::ReverseEdgeCount { filter, .. } => {
                format!("{} {} {{ filter: {} }}", self.kind(), self.name(), filter)
            }
            _ => format!("{} {}", self.kind(), self.name()),
        }
    }

    fn can_merge_with(&self, other: &Selection) -> bool {
        match (self, other) {
            (
                Selection::ReverseEdge {
                    reverse_edge: a,
                    args: args_a,
                    ..
                },
                Selection::ReverseEdge {
                    reverse_edge: b,
                    args: args_b,
                    ..
                },
            ) => a == b && args_a == args_b,
            (
                Selection::ReverseEdgeCount {
                    reverse_edge: a,
                    filter: filter_a,
                    ..
                },
                Selection::ReverseEdgeCount {
                    reverse_edge: b,
                    filter: filter_b,
                    ..
                },
            ) => a == b && filter_a == filter_b,
            _ => {
                std::mem::discriminant(self) == std::mem::discriminant(other)
                    && self.name() == other.name()
            }
        }
    }
}

/// Add `selection` to `selections`, merging it into an existing selection
/// with the same key.
///
/// Edge-like selections merge their children recursively; selections whose
/// kind, target or arguments differ conflict.
pub fn merge_selection(selections: &mut Vec<Selection>, selection: Selection) -> SelectionResult<()> {
    let key = selection.key();
    let Some(existing) = selections.iter_mut().find(|s| s.key() == key) else {
        selections.push(selection);
        return Ok(());
    };

    if !existing.can_merge_with(&selection) {
        return Err(SelectionError::merge_conflict(
            key,
            existing.signature(),
            selection.signature(),
        ));
    }

    if let (Some(into), Some(children)) = (existing.selections_mut(), selection.selections()) {
        for child in children.iter().cloned() {
            merge_selection(into, child)?;
        }
    }
    Ok(())
}

/// Whether `selections`, made under `edge`, only read components of the
/// edge's reference constraint, so they can be served from the edge's
/// foreign-key columns.
pub fn is_reference_selection(schema: &Schema, edge: &Edge, selections: &[Selection]) -> bool {
    let target = schema.node(edge.to);
    let reference = &target.unique_constraints()[edge.reference];

    selections.iter().all(|selection| match selection {
        Selection::Leaf { leaf, .. } => reference.contains(leaf),
        Selection::EdgeExistence { edge: nested, .. } => reference.contains(nested),
        Selection::Edge {
            edge: nested,
            selections,
            ..
        } => {
            reference.contains(nested)
                && is_reference_selection(schema, target.expect_edge(nested), selections)
        }
        _ => false,
    })
}

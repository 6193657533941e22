//! Resolving parsed fragments against a node.

use super::{merge_selection, ReverseEdgeArgs, Selection};
use crate::input::unknown_keys;
use crate::{Component, Node, Schema, SelectionResult};
use serde_json::{Map, Value as Json};
use trellis_core::{did_you_mean, json_kind, InputError, InputResult, Path};
use trellis_parser::{parse_fragment, Field, SelectionSet};

const REVERSE_EDGE_ARGUMENTS: [&str; 4] = ["where", "orderBy", "first", "skip"];
const COUNT_ARGUMENTS: [&str; 1] = ["where"];

impl Node {
    /// Parse a fragment, e.g. `{ id category { id } }`, into a selection tree
    /// on this node.
    pub fn parse_selections(&self, schema: &Schema, fragment: &str) -> SelectionResult<Vec<Selection>> {
        let fragment = parse_fragment(fragment)?;
        if let Some(condition) = &fragment.type_condition {
            if condition != &self.name {
                return Err(InputError::invalid_value(
                    Path::root(),
                    format!("fragment on '{}' cannot select from '{}'", condition, self.name),
                )
                .into());
            }
        }
        self.parse_selection_set(schema, &fragment.selection_set)
    }

    /// Resolve an already-parsed selection set.
    pub fn parse_selection_set(
        &self,
        schema: &Schema,
        set: &SelectionSet,
    ) -> SelectionResult<Vec<Selection>> {
        self.resolve_set(schema, set, &Path::root(), true)
    }

    /// `allow_custom` is false while resolving custom field dependencies.
    pub(crate) fn resolve_set(
        &self,
        schema: &Schema,
        set: &SelectionSet,
        path: &Path,
        allow_custom: bool,
    ) -> SelectionResult<Vec<Selection>> {
        let mut selections = Vec::with_capacity(set.fields.len());
        for field in &set.fields {
            let path = path.child(field.response_key());
            for selection in self.resolve_field(schema, field, &path, allow_custom)? {
                merge_selection(&mut selections, selection)?;
            }
        }
        Ok(selections)
    }

    fn resolve_field(
        &self,
        schema: &Schema,
        field: &Field,
        path: &Path,
        allow_custom: bool,
    ) -> SelectionResult<Vec<Selection>> {
        let alias = field.alias.clone();

        if let Some(component) = self.component(&field.name) {
            check_arguments(field, &[], path)?;
            let selection = match component {
                Component::Leaf(leaf) => {
                    no_sub_selection(field, path)?;
                    Selection::Leaf {
                        alias,
                        leaf: leaf.name.clone(),
                    }
                }
                Component::Edge(edge) => match &field.selection_set {
                    Some(set) => Selection::Edge {
                        alias,
                        edge: edge.name.clone(),
                        selections: schema
                            .node(edge.to)
                            .resolve_set(schema, set, path, allow_custom)?,
                    },
                    None => Selection::EdgeExistence {
                        alias,
                        edge: edge.name.clone(),
                    },
                },
            };
            return Ok(vec![selection]);
        }

        if let Some(reverse_edge) = self.reverse_edge(&field.name) {
            let head = schema.node(reverse_edge.head);
            let name = reverse_edge.name.clone();

            if reverse_edge.unique {
                check_arguments(field, &[], path)?;
                let selection = match &field.selection_set {
                    Some(set) => Selection::UniqueReverseEdge {
                        alias,
                        reverse_edge: name,
                        selections: head.resolve_set(schema, set, path, allow_custom)?,
                    },
                    None => Selection::UniqueReverseEdgeExistence {
                        alias,
                        reverse_edge: name,
                    },
                };
                return Ok(vec![selection]);
            }

            let Some(set) = &field.selection_set else {
                return Err(InputError::invalid_value(
                    path.clone(),
                    format!("'{}' needs a sub-selection", name),
                )
                .into());
            };
            check_arguments(field, &REVERSE_EDGE_ARGUMENTS, path)?;
            let args = reverse_edge_args(schema, head, &field.arguments, path)?;
            return Ok(vec![Selection::ReverseEdge {
                alias,
                reverse_edge: name,
                args,
                selections: head.resolve_set(schema, set, path, allow_custom)?,
            }]);
        }

        let counted = field
            .name
            .strip_suffix("Count")
            .and_then(|name| self.reverse_edge(name))
            .filter(|reverse_edge| !reverse_edge.unique);
        if let Some(reverse_edge) = counted {
            check_arguments(field, &COUNT_ARGUMENTS, path)?;
            no_sub_selection(field, path)?;
            let head = schema.node(reverse_edge.head);
            let filter = head.where_input().parse(
                schema,
                field.arguments.get("where"),
                &path.child("where"),
            )?;
            return Ok(vec![Selection::ReverseEdgeCount {
                alias,
                reverse_edge: reverse_edge.name.clone(),
                filter,
            }]);
        }

        if allow_custom {
            if let Some(custom) = self.custom_field(&field.name) {
                check_arguments(field, &[], path)?;
                no_sub_selection(field, path)?;
                let mut selections = custom.dependencies.clone();
                selections.push(Selection::Custom {
                    alias,
                    field: custom.name.clone(),
                });
                return Ok(selections);
            }
        }

        let names = self.field_names();
        Err(InputError::unknown_field(
            path.clone(),
            &field.name,
            did_you_mean(&field.name, names.iter().map(String::as_str)),
        )
        .into())
    }
}

fn check_arguments(field: &Field, allowed: &[&str], path: &Path) -> InputResult<()> {
    let unknown: Vec<String> = field
        .arguments
        .keys()
        .filter(|name| !allowed.contains(&name.as_str()))
        .cloned()
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(unknown_keys(path, unknown, allowed.iter().copied()))
    }
}

fn no_sub_selection(field: &Field, path: &Path) -> InputResult<()> {
    match field.selection_set {
        Some(_) => Err(InputError::invalid_value(
            path.clone(),
            format!("'{}' has no fields to select", field.name),
        )),
        None => Ok(()),
    }
}

fn reverse_edge_args(
    schema: &Schema,
    head: &Node,
    arguments: &Map<String, Json>,
    path: &Path,
) -> InputResult<ReverseEdgeArgs> {
    Ok(ReverseEdgeArgs {
        filter: head
            .where_input()
            .parse(schema, arguments.get("where"), &path.child("where"))?,
        order_by: head
            .order_by_input()
            .parse(arguments.get("orderBy"), &path.child("orderBy"))?,
        first: count_argument(arguments.get("first"), &path.child("first"))?,
        skip: count_argument(arguments.get("skip"), &path.child("skip"))?,
    })
}

fn count_argument(raw: Option<&Json>, path: &Path) -> InputResult<Option<u64>> {
    match raw {
        None | Some(Json::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            InputError::invalid_type(path.clone(), "a non-negative Int", json_kind(value))
        }),
    }
}

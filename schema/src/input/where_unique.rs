//! WhereUniqueInput: look up one node by one of its unique constraints.

use super::unknown_keys;
use crate::{Component, Filter, Node, NodeId, Schema};
use serde_json::{Map, Value as Json};
use trellis_core::{json_kind, InputError, InputResult, Path};

#[derive(Debug, Clone)]
pub struct WhereUniqueInput {
    node: NodeId,
}

impl WhereUniqueInput {
    pub(crate) fn new(node: NodeId) -> Self {
        Self { node }
    }

    /// Parse `{ <component>: value, ... }` into the equivalent filter.
    ///
    /// The first unique constraint whose components are all given is used;
    /// keys outside it are rejected. Edge components take the target's
    /// reference components as a nested object.
    pub fn parse(&self, schema: &Schema, raw: &Json, path: &Path) -> InputResult<Filter> {
        let node = schema.node(self.node);
        let map = expect_object(raw, path)?;

        let constraint = node
            .unique_constraints()
            .iter()
            .find(|c| c.components.iter().all(|name| map.contains_key(name)));

        let Some(constraint) = constraint else {
            let unknown: Vec<String> = map
                .keys()
                .filter(|key| !node.unique_constraints().iter().any(|c| c.contains(key)))
                .cloned()
                .collect();
            if !unknown.is_empty() {
                let known = node
                    .unique_constraints()
                    .iter()
                    .flat_map(|c| c.components.iter().map(String::as_str));
                return Err(unknown_keys(path, unknown, known));
            }
            let alternatives: Vec<String> = node
                .unique_constraints()
                .iter()
                .map(|c| format!("({})", c.describe()))
                .collect();
            return Err(InputError::invalid_value(
                path.clone(),
                format!(
                    "expected the components of one unique constraint of {}: {}",
                    node.name(),
                    alternatives.join(" | ")
                ),
            ));
        };

        let filter = parse_components(schema, node, &constraint.components, map, path)?;
        Ok(filter.optimize(schema, node))
    }
}

fn parse_components(
    schema: &Schema,
    node: &Node,
    components: &[String],
    map: &Map<String, Json>,
    path: &Path,
) -> InputResult<Filter> {
    let extra: Vec<String> = map
        .keys()
        .filter(|key| !components.contains(key))
        .cloned()
        .collect();
    if !extra.is_empty() {
        return Err(unknown_keys(
            path,
            extra,
            components.iter().map(String::as_str),
        ));
    }

    let mut children = Vec::with_capacity(components.len());
    for name in components {
        let path = path.child(name);
        let Some(value) = map.get(name) else {
            return Err(InputError::non_null(path));
        };

        let child = match &node.components[name] {
            Component::Leaf(leaf) => {
                let value = leaf.leaf_type.parse_value(value, &path)?;
                if value.is_null() && !leaf.nullable {
                    return Err(InputError::non_null(path));
                }
                Filter::eq(name, value)
            }
            Component::Edge(edge) if value.is_null() => {
                if !edge.nullable {
                    return Err(InputError::non_null(path));
                }
                Filter::not(Filter::edge(name, Filter::Boolean(true)))
            }
            Component::Edge(edge) => {
                let target = schema.node(edge.to);
                let reference = &target.unique_constraints()[edge.reference];
                let nested = expect_object(value, &path)?;
                Filter::edge(
                    name,
                    parse_components(schema, target, &reference.components, nested, &path)?,
                )
            }
        };
        children.push(child);
    }
    Ok(Filter::And(children))
}

fn expect_object<'a>(raw: &'a Json, path: &Path) -> InputResult<&'a Map<String, Json>> {
    raw.as_object().ok_or_else(|| {
        InputError::invalid_type(path.clone(), "a unique lookup object", json_kind(raw))
    })
}

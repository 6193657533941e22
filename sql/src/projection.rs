//! Selections compiled to projected columns and a reconstruction plan.

use crate::condition::Conditions;
use crate::plan::{FieldPlan, NodePlan, PathColumn, Probe};
use crate::table::{
    column_key, edge_join_condition, qualified, quote, reverse_join_condition, JoinKey,
    TableReference,
};
use indexmap::IndexMap;
use trellis_schema::{
    is_reference_selection, CustomField, Edge, Filter, Node, ReferenceColumn, Schema, Selection,
};

/// Split the selections made under `edge` into those served by the edge's
/// foreign-key columns and those that need the target joined.
///
/// Custom fields read nothing themselves and stay on the inlined side.
pub fn split_reference_selections(
    schema: &Schema,
    edge: &Edge,
    selections: &[Selection],
) -> (Vec<Selection>, Vec<Selection>) {
    selections.iter().cloned().partition(|selection| {
        matches!(selection, Selection::Custom { .. })
            || is_reference_selection(schema, edge, std::slice::from_ref(selection))
    })
}

/// The projected columns of a statement, keyed by the name each is
/// returned under.
pub(crate) struct Projection<'s> {
    schema: &'s Schema,
    columns: IndexMap<String, String>,
}

impl<'s> Projection<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            columns: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The `SELECT` list.
    pub fn render(&self) -> String {
        self.columns
            .iter()
            .map(|(key, expression)| format!("{} AS {}", expression, quote(key)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Project a column of `alias`, returning its key.
    pub fn column(&mut self, alias: &str, column: &str) -> String {
        let key = column_key(alias, column);
        self.columns
            .entry(key.clone())
            .or_insert_with(|| qualified(alias, column));
        key
    }

    fn expression(&mut self, key: String, expression: String) -> String {
        self.columns.entry(key.clone()).or_insert(expression);
        key
    }

    /// Project `selections` made on the node of `table`.
    pub fn select(&mut self, table: &mut TableReference, selections: &[Selection]) -> NodePlan {
        let schema = self.schema;
        let node = schema.node(table.node());
        let mut fields = Vec::with_capacity(selections.len());

        for selection in selections {
            let key = selection.key();
            let field = match selection {
                Selection::Leaf { leaf, .. } => {
                    let leaf = node.expect_leaf(leaf);
                    FieldPlan::Leaf {
                        key,
                        column: self.column(table.alias(), &leaf.column),
                        leaf_type: leaf.leaf_type.clone(),
                    }
                }
                Selection::Edge {
                    edge, selections, ..
                } => {
                    let edge = node.expect_edge(edge);
                    FieldPlan::Node {
                        key,
                        probe: self.edge_probe(table.alias(), edge),
                        plan: self.edge(table, edge, selections),
                    }
                }
                Selection::EdgeExistence { edge, .. } => FieldPlan::Exists {
                    key,
                    probe: self.edge_probe(table.alias(), node.expect_edge(edge)),
                },
                Selection::UniqueReverseEdge {
                    reverse_edge,
                    selections,
                    ..
                } => {
                    let (probe, join) = self.unique_reverse_edge(table, node, reverse_edge);
                    FieldPlan::Node {
                        key,
                        probe,
                        plan: self.select(join, selections),
                    }
                }
                Selection::UniqueReverseEdgeExistence { reverse_edge, .. } => FieldPlan::Exists {
                    key,
                    probe: self.unique_reverse_edge(table, node, reverse_edge).0,
                },
                Selection::ReverseEdge {
                    reverse_edge, args, ..
                } => {
                    let reverse_edge = node.expect_reverse_edge(reverse_edge);
                    let head = schema.node(reverse_edge.head);
                    let edge = head.expect_edge(&reverse_edge.edge);
                    let parent = node
                        .unique_columns(edge.reference)
                        .into_iter()
                        .map(|c| PathColumn {
                            column: self.column(table.alias(), &c.column),
                            path: c.path,
                            leaf_type: c.leaf_type,
                        })
                        .collect();
                    FieldPlan::Deferred {
                        key,
                        head: head.id(),
                        reverse_edge: reverse_edge.name.clone(),
                        edge: edge.name.clone(),
                        parent,
                        args: args.clone(),
                    }
                }
                Selection::ReverseEdgeCount {
                    reverse_edge,
                    filter,
                    ..
                } => {
                    let expression = self.count(table.alias(), node, reverse_edge, filter);
                    let column = self.expression(format!("{}.#{}", table.alias(), key), expression);
                    FieldPlan::Count { key, column }
                }
                Selection::Custom { field, .. } => FieldPlan::Custom {
                    key,
                    field: custom_field(node, field),
                },
            };
            fields.push(field);
        }

        NodePlan {
            node: node.id(),
            fields,
        }
    }

    /// Probe for a to-one edge: nullable edges get a flag column computed
    /// from the foreign keys.
    fn edge_probe(&mut self, alias: &str, edge: &Edge) -> Probe {
        self.inline_probe(alias, edge, &[])
    }

    fn inline_probe(&mut self, alias: &str, root: &Edge, path: &[String]) -> Probe {
        let schema = self.schema;
        let nullable = match path.last() {
            None => root.nullable,
            Some(_) => {
                let mut node = schema.node(root.to);
                let mut edge = root;
                for name in path {
                    edge = node.expect_edge(name);
                    node = schema.node(edge.to);
                }
                edge.nullable
            }
        };
        if !nullable {
            return Probe::Always;
        }

        let conditions: Vec<String> = root
            .reference_columns
            .iter()
            .filter(|c| c.path.starts_with(path))
            .map(|c| format!("{} IS NOT NULL", qualified(alias, &c.column)))
            .collect();
        let mut key = format!("{}.{}", alias, root.name);
        for name in path {
            key.push('.');
            key.push_str(name);
        }
        key.push('?');
        let expression = format!("({})", conditions.join(" OR "));
        Probe::Flag(self.expression(key, expression))
    }

    fn edge(&mut self, table: &mut TableReference, edge: &Edge, selections: &[Selection]) -> NodePlan {
        let schema = self.schema;
        let target = schema.node(edge.to);
        let (inlined, residual) = split_reference_selections(schema, edge, selections);

        let mut fields = self.inline(table.alias(), edge, &[], target, &inlined);
        if !residual.is_empty() {
            let join = table.join(JoinKey::to_one(&edge.name), target, false, |parent, alias| {
                edge_join_condition(edge, parent, alias)
            });
            fields.extend(self.select(join, &residual).fields);
            fields.sort_by_key(|field| {
                selections
                    .iter()
                    .position(|s| s.key() == field.key())
                    .unwrap_or(usize::MAX)
            });
        }

        NodePlan {
            node: target.id(),
            fields,
        }
    }

    /// Fields of `node` read from the foreign-key columns of `root`; `path`
    /// locates `node` inside the root edge's reference.
    fn inline(
        &mut self,
        alias: &str,
        root: &Edge,
        path: &[String],
        node: &Node,
        selections: &[Selection],
    ) -> Vec<FieldPlan> {
        let schema = self.schema;
        let mut fields = Vec::with_capacity(selections.len());
        for selection in selections {
            let key = selection.key();
            let field = match selection {
                Selection::Leaf { leaf, .. } => {
                    let column = reference_column(root, path, leaf);
                    FieldPlan::Leaf {
                        key,
                        column: self.column(alias, &column.column),
                        leaf_type: column.leaf_type.clone(),
                    }
                }
                Selection::EdgeExistence { edge, .. } => FieldPlan::Exists {
                    key,
                    probe: self.inline_probe(alias, root, &extend(path, edge)),
                },
                Selection::Edge {
                    edge, selections, ..
                } => {
                    let nested = extend(path, edge);
                    let target = schema.node(node.expect_edge(edge).to);
                    FieldPlan::Node {
                        key,
                        probe: self.inline_probe(alias, root, &nested),
                        plan: NodePlan {
                            node: target.id(),
                            fields: self.inline(alias, root, &nested, target, selections),
                        },
                    }
                }
                Selection::Custom { field, .. } => FieldPlan::Custom {
                    key,
                    field: custom_field(node, field),
                },
                other => panic!(
                    "'{}' cannot be read from the foreign keys of '{}'",
                    other.name(),
                    root.name
                ),
            };
            fields.push(field);
        }
        fields
    }

    fn unique_reverse_edge<'t>(
        &mut self,
        table: &'t mut TableReference,
        node: &Node,
        name: &str,
    ) -> (Probe, &'t mut TableReference) {
        let schema = self.schema;
        let reverse_edge = node.expect_reverse_edge(name);
        let head = schema.node(reverse_edge.head);
        let edge = head.expect_edge(&reverse_edge.edge);
        let join = table.join(JoinKey::to_one(name), head, false, |parent, alias| {
            reverse_join_condition(edge, parent, alias)
        });
        let identifier = &head.identifier_columns()[0];
        let probe = Probe::NotNull(self.column(join.alias(), &identifier.column));
        (probe, join)
    }

    /// Correlated `COUNT` over the head rows of a to-many reverse edge.
    fn count(&mut self, alias: &str, node: &Node, name: &str, filter: &Filter) -> String {
        let reverse_edge = node.expect_reverse_edge(name);
        let head = self.schema.node(reverse_edge.head);
        let edge = head.expect_edge(&reverse_edge.edge);

        let mut counted = TableReference::aliased(format!("{}>{}", alias, name), head);
        let mut condition = reverse_join_condition(edge, alias, counted.alias());
        let child = Conditions::new(self.schema).compile(&mut counted, filter);
        if child != "TRUE" {
            condition = format!("{} AND {}", condition, child);
        }
        format!(
            "(SELECT {} FROM {} WHERE {})",
            count_expression(&counted, head),
            counted.render(),
            condition
        )
    }
}

/// `COUNT(*)`, or a distinct count of identifiers when to-many joins may
/// repeat rows.
pub(crate) fn count_expression(table: &TableReference, node: &Node) -> String {
    if !table.has_to_many_join() {
        return "COUNT(*)".to_string();
    }
    let identifiers: Vec<String> = node
        .identifier_columns()
        .iter()
        .map(|c| qualified(table.alias(), &c.column))
        .collect();
    format!("COUNT(DISTINCT {})", identifiers.join(", "))
}

fn extend(path: &[String], name: &str) -> Vec<String> {
    let mut extended = path.to_vec();
    extended.push(name.to_string());
    extended
}

fn reference_column<'e>(root: &'e Edge, path: &[String], leaf: &str) -> &'e ReferenceColumn {
    let full = extend(path, leaf);
    match root.reference_columns.iter().find(|c| c.path == full) {
        Some(column) => column,
        None => panic!("'{}' is not part of the reference of '{}'", leaf, root.name),
    }
}

fn custom_field(node: &Node, name: &str) -> CustomField {
    match node.custom_field(name) {
        Some(field) => field.clone(),
        None => panic!("node '{}' has no custom field '{}'", node.name(), name),
    }
}

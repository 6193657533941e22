//! Filters compiled to SQL conditions.
//!
//! Every condition produced here is two-valued: comparisons on nullable
//! columns are guarded so that a `NULL` cell never leaks out as an unknown
//! truth value, and `NOT (...)` therefore negates exactly.

use crate::table::{edge_join_condition, qualified, reverse_join_condition, JoinKey, TableReference};
use trellis_core::{quote_string, LeafOperator, LeafType, Value};
use trellis_schema::{
    EdgeFilter, Filter, LeafFilter, Node, Operand, ReferenceColumn, ReverseEdgeFilter, Schema,
};

/// Where the leaves of the filtered node are read from.
enum Scope<'a> {
    /// The node's own table.
    Table,
    /// The foreign-key columns of an edge, for filters that only read the
    /// edge's reference constraint. `path` locates the filtered node inside
    /// the reference.
    Inline {
        alias: String,
        columns: &'a [ReferenceColumn],
        path: Vec<String>,
    },
}

impl Scope<'_> {
    fn columns_under(&self, path: &[String]) -> Vec<&ReferenceColumn> {
        match self {
            Scope::Table => Vec::new(),
            Scope::Inline { columns, .. } => {
                columns.iter().filter(|c| c.path.starts_with(path)).collect()
            }
        }
    }
}

/// Compiles filters against a table reference, adding the joins they need.
pub(crate) struct Conditions<'s> {
    schema: &'s Schema,
}

impl<'s> Conditions<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// The condition for `filter` on the node of `table`.
    pub fn compile(&self, table: &mut TableReference, filter: &Filter) -> String {
        let node = self.schema.node(table.node());
        self.condition(table, node, &Scope::Table, filter)
    }

    fn condition(&self, table: &mut TableReference, node: &Node, scope: &Scope, filter: &Filter) -> String {
        match filter {
            Filter::Boolean(true) => "TRUE".to_string(),
            Filter::Boolean(false) => "FALSE".to_string(),
            Filter::And(children) => self.group(table, node, scope, children, " AND ", "TRUE"),
            Filter::Or(children) => self.group(table, node, scope, children, " OR ", "FALSE"),
            Filter::Not(inner) => format!("NOT ({})", self.condition(table, node, scope, inner)),
            Filter::Leaf(leaf) => {
                let (column, nullable, leaf_type) = match scope {
                    Scope::Table => {
                        let def = node.expect_leaf(&leaf.leaf);
                        (
                            qualified(table.alias(), &def.column),
                            def.nullable,
                            def.leaf_type.clone(),
                        )
                    }
                    Scope::Inline { alias, path, .. } => {
                        let mut full = path.clone();
                        full.push(leaf.leaf.clone());
                        let column = scope
                            .columns_under(&full)
                            .into_iter()
                            .next()
                            .unwrap_or_else(|| {
                                panic!("'{}' is not part of the reference of '{}'", leaf.leaf, node.name())
                            });
                        // Nullable edges on the path are guarded by `edge_condition`.
                        let nullable = node.expect_leaf(&leaf.leaf).nullable;
                        (qualified(alias, &column.column), nullable, column.leaf_type.clone())
                    }
                };
                leaf_condition(&column, nullable, &leaf_type, leaf)
            }
            Filter::Edge(edge) => self.edge_condition(table, node, scope, edge),
            Filter::ReverseEdge(reverse) => self.reverse_edge_condition(table, node, reverse),
        }
    }

    fn group(
        &self,
        table: &mut TableReference,
        node: &Node,
        scope: &Scope,
        children: &[Filter],
        separator: &str,
        empty: &str,
    ) -> String {
        if children.is_empty() {
            return empty.to_string();
        }
        let parts: Vec<String> = children
            .iter()
            .map(|child| self.condition(table, node, scope, child))
            .collect();
        format!("({})", parts.join(separator))
    }

    fn edge_condition(&self, table: &mut TableReference, node: &Node, scope: &Scope, filter: &EdgeFilter) -> String {
        let edge = node.expect_edge(&filter.edge);
        let target = self.schema.node(edge.to);

        let inline = match scope {
            Scope::Table if filter.filter.is_reference_filter(self.schema, edge) => Scope::Inline {
                alias: table.alias().to_string(),
                columns: &edge.reference_columns,
                path: Vec::new(),
            },
            Scope::Table => {
                let join = table.join(JoinKey::to_one(&edge.name), target, false, |parent, alias| {
                    edge_join_condition(edge, parent, alias)
                });
                let probe = identity_probe(join.alias(), target);
                let child = self.condition(join, target, &Scope::Table, &filter.filter);
                return conjunction(probe, child);
            }
            Scope::Inline { alias, columns, path } => {
                let mut path = path.clone();
                path.push(edge.name.clone());
                Scope::Inline {
                    alias: alias.clone(),
                    columns: *columns,
                    path,
                }
            }
        };

        let child = self.condition(table, target, &inline, &filter.filter);
        match (&inline, edge.nullable) {
            (Scope::Inline { alias, path, .. }, true) => {
                let guard = any_not_null(alias, inline.columns_under(path).into_iter());
                conjunction(guard, child)
            }
            _ => child,
        }
    }

    fn reverse_edge_condition(&self, table: &mut TableReference, node: &Node, filter: &ReverseEdgeFilter) -> String {
        let reverse_edge = node.expect_reverse_edge(&filter.reverse_edge);
        let head = self.schema.node(reverse_edge.head);
        let edge = head.expect_edge(&reverse_edge.edge);

        if reverse_edge.unique {
            let join = table.join(
                JoinKey::to_one(&reverse_edge.name),
                head,
                false,
                |parent, alias| reverse_join_condition(edge, parent, alias),
            );
            let probe = identity_probe(join.alias(), head);
            let child = self.condition(join, head, &Scope::Table, &filter.filter);
            return conjunction(probe, child);
        }

        // The child filter goes into the join condition, so matching head
        // rows are the only ones joined.
        let key = JoinKey::keyed(&reverse_edge.name, filter.filter.to_string());
        let created = !table.has_join(&key);
        let join = table.join(key, head, true, |parent, alias| {
            reverse_join_condition(edge, parent, alias)
        });
        if created && !filter.filter.is_true() {
            let child = self.condition(join, head, &Scope::Table, &filter.filter);
            join.and_condition(&child);
        }
        identity_probe(join.alias(), head)
    }
}

/// Holds iff a row was joined for `alias`.
fn identity_probe(alias: &str, node: &Node) -> String {
    let identifier = &node.identifier_columns()[0];
    format!("{} IS NOT NULL", qualified(alias, &identifier.column))
}

/// Holds iff one of the columns is set.
fn any_not_null<'c>(alias: &str, columns: impl Iterator<Item = &'c ReferenceColumn>) -> String {
    let parts: Vec<String> = columns
        .map(|c| format!("{} IS NOT NULL", qualified(alias, &c.column)))
        .collect();
    match parts.len() {
        1 => parts.into_iter().collect(),
        _ => format!("({})", parts.join(" OR ")),
    }
}

fn conjunction(left: String, right: String) -> String {
    if right == "TRUE" {
        left
    } else {
        format!("({} AND {})", left, right)
    }
}

fn leaf_condition(column: &str, nullable: bool, leaf_type: &LeafType, filter: &LeafFilter) -> String {
    let literal = |value: &Value| leaf_type.to_sql_literal(value);

    // Guards for comparisons that hold on set cells only, and for negations
    // that also hold on unset ones.
    let set = |condition: String| match nullable {
        true => format!("({} IS NOT NULL AND {})", column, condition),
        false => condition,
    };
    let or_unset = |condition: String| match nullable {
        true => format!("({} IS NULL OR {})", column, condition),
        false => condition,
    };

    match (&filter.operand, filter.operator) {
        (Operand::Value(Value::Null), LeafOperator::Eq) => format!("{} IS NULL", column),
        (Operand::Value(Value::Null), LeafOperator::Not) => format!("{} IS NOT NULL", column),
        (Operand::Value(value), operator) => match operator {
            LeafOperator::Eq => set(format!("{} = {}", column, literal(value))),
            LeafOperator::Not => or_unset(format!("{} <> {}", column, literal(value))),
            LeafOperator::Gt => set(format!("{} > {}", column, literal(value))),
            LeafOperator::Gte => set(format!("{} >= {}", column, literal(value))),
            LeafOperator::Lt => set(format!("{} < {}", column, literal(value))),
            LeafOperator::Lte => set(format!("{} <= {}", column, literal(value))),
            LeafOperator::Contains | LeafOperator::StartsWith | LeafOperator::EndsWith => {
                set(format!("{} LIKE {}", column, like_pattern(value, operator)))
            }
            LeafOperator::NotContains | LeafOperator::NotStartsWith | LeafOperator::NotEndsWith => {
                or_unset(format!("{} NOT LIKE {}", column, like_pattern(value, operator)))
            }
            LeafOperator::In | LeafOperator::NotIn => {
                panic!("'{}' needs a list operand", operator)
            }
        },
        (Operand::List(values), operator) => {
            let has_null = values.iter().any(Value::is_null);
            let list: Vec<String> = values.iter().filter(|v| !v.is_null()).map(literal).collect();
            let list = format!("({})", list.join(", "));
            match (operator, has_null, values.len()) {
                (LeafOperator::In, _, 0) => "FALSE".to_string(),
                (LeafOperator::NotIn, _, 0) => "TRUE".to_string(),
                (LeafOperator::In, true, 1) => format!("{} IS NULL", column),
                (LeafOperator::NotIn, true, 1) => format!("{} IS NOT NULL", column),
                (LeafOperator::In, true, _) => format!("({} IS NULL OR {} IN {})", column, column, list),
                (LeafOperator::In, false, _) => set(format!("{} IN {}", column, list)),
                (LeafOperator::NotIn, true, _) => {
                    format!("({} IS NOT NULL AND {} NOT IN {})", column, column, list)
                }
                (LeafOperator::NotIn, false, _) => or_unset(format!("{} NOT IN {}", column, list)),
                (operator, _, _) => panic!("'{}' does not take a list operand", operator),
            }
        }
    }
}

/// A `LIKE` pattern literal; `%`, `_` and `\` in the value match themselves.
fn like_pattern(value: &Value, operator: LeafOperator) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let pattern = match operator {
        LeafOperator::StartsWith | LeafOperator::NotStartsWith => format!("{}%", escaped),
        LeafOperator::EndsWith | LeafOperator::NotEndsWith => format!("%{}", escaped),
        _ => format!("%{}%", escaped),
    };
    quote_string(&pattern)
}

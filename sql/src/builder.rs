//! The statement builder.

use crate::condition::Conditions;
use crate::plan::read_count;
use crate::projection::{count_expression, Projection};
use crate::table::{qualified, TableReference};
use crate::{NodePlan, RawRow, RowResult, StatementError, StatementResult};
use serde_json::Value as Json;
use tracing::debug;
use trellis_core::{did_you_mean, json_kind, InputError, InputResult, Path};
use trellis_schema::{
    DeferredReverseEdge, Filter, Node, NodeValue, Ordering, Schema, Selection,
};

const FIND_ARGUMENTS: [&str; 4] = ["where", "orderBy", "first", "skip"];

/// `OFFSET` needs a `LIMIT`; this one never binds.
const NO_LIMIT: u64 = u64::MAX;

/// Arguments of a find statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindArgs {
    pub filter: Filter,
    pub order_by: Vec<Ordering>,
    pub first: Option<u64>,
    pub skip: Option<u64>,
    pub selections: Vec<Selection>,
}

impl FindArgs {
    /// Select `selections` from every node.
    pub fn new(selections: Vec<Selection>) -> Self {
        Self {
            selections,
            ..Self::default()
        }
    }

    /// Parse client arguments `{ where, orderBy, first, skip }` and a
    /// selection fragment against `node`.
    pub fn parse(schema: &Schema, node: &Node, raw: &Json, fragment: &str) -> StatementResult<Self> {
        let arguments = match raw {
            Json::Null => serde_json::Map::new(),
            Json::Object(map) => map.clone(),
            other => {
                return Err(InputError::invalid_type(Path::root(), "an object", json_kind(other)).into())
            }
        };

        let unknown: Vec<String> = arguments
            .keys()
            .filter(|key| !FIND_ARGUMENTS.contains(&key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            let suggestions = unknown
                .iter()
                .flat_map(|key| did_you_mean(key, FIND_ARGUMENTS))
                .collect();
            return Err(InputError::unknown_keys(Path::root(), unknown, suggestions).into());
        }

        Ok(Self {
            filter: node
                .where_input()
                .parse(schema, arguments.get("where"), &Path::key("where"))?,
            order_by: node
                .order_by_input()
                .parse(arguments.get("orderBy"), &Path::key("orderBy"))?,
            first: count_argument(arguments.get("first"), &Path::key("first"))?,
            skip: count_argument(arguments.get("skip"), &Path::key("skip"))?,
            selections: node.parse_selections(schema, fragment)?,
        })
    }
}

fn count_argument(raw: Option<&Json>, path: &Path) -> InputResult<Option<u64>> {
    match raw {
        None | Some(Json::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            InputError::invalid_type(path.clone(), "a non-negative Int", json_kind(value))
        }),
    }
}

/// A compiled find statement with the plan to read its rows.
#[derive(Debug, Clone)]
pub struct Statement {
    sql: String,
    plan: NodePlan,
}

impl Statement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn plan(&self) -> &NodePlan {
        &self.plan
    }

    /// Rebuild the node value of one row.
    pub fn parse_row(&self, row: &RawRow) -> RowResult<NodeValue> {
        self.plan.read(row)
    }

    pub fn parse_rows(&self, rows: &[RawRow]) -> RowResult<Vec<NodeValue>> {
        rows.iter().map(|row| self.parse_row(row)).collect()
    }
}

/// A compiled count statement. Its single row holds the count under
/// [`CountStatement::COLUMN`].
#[derive(Debug, Clone, PartialEq)]
pub struct CountStatement {
    sql: String,
}

impl CountStatement {
    pub const COLUMN: &'static str = "count";

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parse_row(&self, row: &RawRow) -> RowResult<u64> {
        read_count(row, Self::COLUMN)
    }
}

/// Compiles filters, orderings and selections on a schema into statements.
///
/// Compilation is pure: the builder holds nothing but the schema, and one
/// builder can serve any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder<'s> {
    schema: &'s Schema,
}

impl<'s> StatementBuilder<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    fn node(&self, name: &str) -> StatementResult<&'s Node> {
        self.schema
            .node_by_name(name)
            .ok_or_else(|| StatementError::unknown_node(name))
    }

    /// `SELECT` the selections of the nodes matching the filter.
    pub fn find(&self, node: &str, args: &FindArgs) -> StatementResult<Statement> {
        Ok(self.find_node(self.node(node)?, args))
    }

    /// Count the nodes matching the filter.
    pub fn count(&self, node: &str, filter: &Filter) -> StatementResult<CountStatement> {
        let node = self.node(node)?;
        let mut root = TableReference::root(node);
        let condition = Conditions::new(self.schema).compile(&mut root, filter);

        let mut sql = format!(
            "SELECT {} AS `{}` FROM {}",
            count_expression(&root, node),
            CountStatement::COLUMN,
            root.render()
        );
        push_where(&mut sql, &condition);

        debug!(node = node.name(), joins = root.join_count(), "compiled count statement");
        Ok(CountStatement { sql })
    }

    /// Read a to-many reverse edge left unread by an earlier statement.
    pub fn find_deferred(&self, deferred: &DeferredReverseEdge, selections: &[Selection]) -> Statement {
        let head = self.schema.node(deferred.node);
        let args = FindArgs {
            filter: deferred.filter(self.schema),
            order_by: deferred.args.order_by.clone(),
            first: deferred.args.first,
            skip: deferred.args.skip,
            selections: selections.to_vec(),
        };
        self.find_node(head, &args)
    }

    fn find_node(&self, node: &Node, args: &FindArgs) -> Statement {
        let mut root = TableReference::root(node);
        let condition = Conditions::new(self.schema).compile(&mut root, &args.filter);

        let mut projection = Projection::new(self.schema);
        let plan = projection.select(&mut root, &args.selections);
        if projection.is_empty() {
            for column in node.identifier_columns() {
                projection.column(root.alias(), &column.column);
            }
        }

        let mut sql = format!("SELECT {} FROM {}", projection.render(), root.render());
        push_where(&mut sql, &condition);

        let grouped = root.has_to_many_join();
        if grouped {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by(&root).join(", "));
        }

        if !args.order_by.is_empty() {
            let orderings: Vec<String> = args
                .order_by
                .iter()
                .map(|ordering| {
                    let leaf = node.expect_leaf(&ordering.leaf);
                    format!(
                        "{} {}",
                        qualified(root.alias(), &leaf.column),
                        ordering.direction.as_sql()
                    )
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&orderings.join(", "));
        }

        match (args.first, args.skip) {
            (None, None) => {}
            (first, skip) => {
                sql.push_str(&format!(" LIMIT {}", first.unwrap_or(NO_LIMIT)));
                if let Some(skip) = skip {
                    sql.push_str(&format!(" OFFSET {}", skip));
                }
            }
        }

        debug!(
            node = node.name(),
            joins = root.join_count(),
            grouped,
            "compiled find statement"
        );
        Statement { sql, plan }
    }

    /// Identifier columns of the root and of every to-one join, so that
    /// each selected column is determined by the grouping.
    fn group_by(&self, root: &TableReference) -> Vec<String> {
        std::iter::once(root)
            .chain(root.to_one_joins())
            .flat_map(|table| {
                self.schema
                    .node(table.node())
                    .identifier_columns()
                    .into_iter()
                    .map(move |c| qualified(table.alias(), &c.column))
            })
            .collect()
    }
}

fn push_where(sql: &mut String, condition: &str) {
    if condition != "TRUE" {
        sql.push_str(" WHERE ");
        sql.push_str(condition);
    }
}

//! Table references: the root table of a statement and the joins hanging
//! off it.
//!
//! Joins are keyed by the relation they follow plus an optional
//! disambiguation key, so that every filter or selection stepping through
//! the same relation shares one alias. Only to-many reverse-edge filters
//! carry a key: their child filter lives in the join condition, so two
//! different child filters need two joins.

use indexmap::IndexMap;
use trellis_schema::{Edge, Node, NodeId};

/// Quote an identifier.
pub(crate) fn quote(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// `` `alias`.`column` ``
pub(crate) fn qualified(alias: &str, column: &str) -> String {
    format!("{}.{}", quote(alias), quote(column))
}

/// Name a projected column is returned under.
pub(crate) fn column_key(alias: &str, column: &str) -> String {
    format!("{}.{}", alias, column)
}

/// Condition joining the target of `edge`, aliased `alias`, to the table
/// holding the edge.
pub(crate) fn edge_join_condition(edge: &Edge, parent: &str, alias: &str) -> String {
    edge.reference_columns
        .iter()
        .map(|c| {
            format!(
                "{} = {}",
                qualified(alias, &c.referenced_column),
                qualified(parent, &c.column)
            )
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Condition joining the head of a reverse edge, aliased `alias`, to the
/// table the forward `edge` points at.
pub(crate) fn reverse_join_condition(edge: &Edge, parent: &str, alias: &str) -> String {
    edge.reference_columns
        .iter()
        .map(|c| {
            format!(
                "{} = {}",
                qualified(alias, &c.column),
                qualified(parent, &c.referenced_column)
            )
        })
        .collect::<Vec<_>>()
        .join(" AND ")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct JoinKey {
    pub relation: String,
    pub key: Option<String>,
}

impl JoinKey {
    /// The shared join through a to-one relation.
    pub fn to_one(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            key: None,
        }
    }

    pub fn keyed(relation: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            key: Some(key.into()),
        }
    }
}

/// A table in the `FROM` clause, with its nested joins.
#[derive(Debug, Clone)]
pub(crate) struct TableReference {
    alias: String,
    node: NodeId,
    table: String,
    /// Join condition; empty for the root.
    condition: String,
    /// Whether this table or one of its ancestors was reached through a
    /// to-many relation.
    is_to_many: bool,
    joins: IndexMap<JoinKey, TableReference>,
}

impl TableReference {
    /// The root table, aliased with the lower-cased node name.
    pub fn root(node: &Node) -> Self {
        Self::aliased(node.name().to_lowercase(), node)
    }

    pub fn aliased(alias: impl Into<String>, node: &Node) -> Self {
        Self {
            alias: alias.into(),
            node: node.id(),
            table: node.table().to_string(),
            condition: String::new(),
            is_to_many: false,
            joins: IndexMap::new(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn has_join(&self, key: &JoinKey) -> bool {
        self.joins.contains_key(key)
    }

    /// The join for `key`, created on first use. `condition` receives the
    /// parent and join aliases.
    pub fn join(
        &mut self,
        key: JoinKey,
        target: &Node,
        to_many: bool,
        condition: impl FnOnce(&str, &str) -> String,
    ) -> &mut TableReference {
        let siblings = self
            .joins
            .keys()
            .filter(|k| k.relation == key.relation)
            .count();
        let alias = match siblings {
            0 => format!("{}>{}", self.alias, key.relation),
            n => format!("{}>{}#{}", self.alias, key.relation, n),
        };
        let parent = self.alias.clone();
        let is_to_many = self.is_to_many || to_many;

        self.joins.entry(key).or_insert_with(|| {
            let mut join = TableReference::aliased(alias, target);
            join.condition = condition(&parent, &join.alias);
            join.is_to_many = is_to_many;
            join
        })
    }

    /// Append a conjunct to the join condition.
    pub fn and_condition(&mut self, condition: &str) {
        self.condition = format!("{} AND {}", self.condition, condition);
    }

    /// Whether any join below this table is to-many.
    pub fn has_to_many_join(&self) -> bool {
        self.joins
            .values()
            .any(|join| join.is_to_many || join.has_to_many_join())
    }

    /// Joins reached through to-one relations only, parents first.
    pub fn to_one_joins(&self) -> Vec<&TableReference> {
        let mut joins = Vec::new();
        for join in self.joins.values().filter(|join| !join.is_to_many) {
            joins.push(join);
            joins.extend(join.to_one_joins());
        }
        joins
    }

    pub fn join_count(&self) -> usize {
        self.joins
            .values()
            .map(|join| 1 + join.join_count())
            .sum()
    }

    /// Body of the `FROM` clause.
    pub fn render(&self) -> String {
        let mut sql = format!("{} AS {}", quote(&self.table), quote(&self.alias));
        for join in self.joins.values() {
            sql.push_str(" LEFT JOIN ");
            if join.joins.is_empty() {
                sql.push_str(&join.render());
            } else {
                sql.push('(');
                sql.push_str(&join.render());
                sql.push(')');
            }
            sql.push_str(" ON ");
            sql.push_str(&join.condition);
        }
        sql
    }
}

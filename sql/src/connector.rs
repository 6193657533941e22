//! The executor seam and the connector running statements through it.

use crate::{ConnectorError, ConnectorResult, FindArgs, RawRow, StatementBuilder};
use tracing::debug;
use trellis_schema::{DeferredReverseEdge, Filter, NodeValue, Schema, Selection};

/// Runs SQL against a backing store.
///
/// Connections and transactions belong to the implementor; a statement
/// runs on `connection` when one is given and on any connection otherwise.
#[allow(async_fn_in_trait)]
pub trait Executor {
    type Connection;
    type Error: std::error::Error + 'static;

    async fn query(
        &self,
        sql: &str,
        connection: Option<&mut Self::Connection>,
    ) -> Result<Vec<RawRow>, Self::Error>;
}

/// Compiles statements and runs them through an [`Executor`].
pub struct Connector<'s, E> {
    builder: StatementBuilder<'s>,
    executor: E,
}

impl<'s, E: Executor> Connector<'s, E> {
    pub fn new(schema: &'s Schema, executor: E) -> Self {
        Self {
            builder: StatementBuilder::new(schema),
            executor,
        }
    }

    pub fn builder(&self) -> &StatementBuilder<'s> {
        &self.builder
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub async fn find(
        &self,
        node: &str,
        args: &FindArgs,
        connection: Option<&mut E::Connection>,
    ) -> ConnectorResult<Vec<NodeValue>, E::Error> {
        let statement = self.builder.find(node, args)?;
        let rows = self.run(statement.sql(), connection).await?;
        Ok(statement.parse_rows(&rows)?)
    }

    pub async fn count(
        &self,
        node: &str,
        filter: &Filter,
        connection: Option<&mut E::Connection>,
    ) -> ConnectorResult<u64, E::Error> {
        let statement = self.builder.count(node, filter)?;
        let rows = self.run(statement.sql(), connection).await?;
        match rows.first() {
            Some(row) => Ok(statement.parse_row(row)?),
            None => Ok(0),
        }
    }

    /// Read a deferred to-many reverse edge.
    pub async fn resolve(
        &self,
        deferred: &DeferredReverseEdge,
        selections: &[Selection],
        connection: Option<&mut E::Connection>,
    ) -> ConnectorResult<Vec<NodeValue>, E::Error> {
        let statement = self.builder.find_deferred(deferred, selections);
        let rows = self.run(statement.sql(), connection).await?;
        Ok(statement.parse_rows(&rows)?)
    }

    async fn run(
        &self,
        sql: &str,
        connection: Option<&mut E::Connection>,
    ) -> ConnectorResult<Vec<RawRow>, E::Error> {
        let rows = self
            .executor
            .query(sql, connection)
            .await
            .map_err(ConnectorError::Executor)?;
        debug!(rows = rows.len(), "statement executed");
        Ok(rows)
    }
}

//! Statement, row and connector errors.

use thiserror::Error;
use trellis_core::InputError;
use trellis_schema::SelectionError;

/// Result type for statement compilation.
pub type StatementResult<T> = Result<T, StatementError>;

/// Result type for row reconstruction.
pub type RowResult<T> = Result<T, RowError>;

/// Result type for connector calls.
pub type ConnectorResult<T, E> = Result<T, ConnectorError<E>>;

/// Errors raised while compiling a statement from client input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatementError {
    #[error("unknown node: {name}")]
    UnknownNode { name: String },

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

impl StatementError {
    pub fn unknown_node(name: impl Into<String>) -> Self {
        Self::UnknownNode { name: name.into() }
    }
}

/// Errors raised while reading a result row back into node values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("row has no column \"{column}\"")]
    MissingColumn { column: String },

    #[error("column \"{column}\" holds an unreadable cell: {source}")]
    InvalidCell {
        column: String,
        #[source]
        source: InputError,
    },

    #[error("column \"{column}\" holds {found}, expected a count")]
    InvalidCount { column: String, found: String },
}

impl RowError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub fn invalid_cell(column: impl Into<String>, source: InputError) -> Self {
        Self::InvalidCell {
            column: column.into(),
            source,
        }
    }

    pub fn invalid_count(column: impl Into<String>, found: impl Into<String>) -> Self {
        Self::InvalidCount {
            column: column.into(),
            found: found.into(),
        }
    }
}

/// Errors raised by a [`Connector`](crate::Connector): compilation, row
/// reading, or the executor itself.
#[derive(Debug, Error)]
pub enum ConnectorError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Statement(#[from] StatementError),

    #[error(transparent)]
    Row(#[from] RowError),

    #[error("executor failed: {0}")]
    Executor(#[source] E),
}

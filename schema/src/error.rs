//! Schema construction and selection errors.

use thiserror::Error;
use trellis_core::InputError;
use trellis_parser::ParseError;

/// Result type for schema construction.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for selection parsing.
pub type SelectionResult<T> = Result<T, SelectionError>;

/// Errors raised while declaring or building a schema.
///
/// These are configuration errors: they surface once, when the schema is
/// built, and never at request time.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid node name '{0}': expected PascalCase letters and digits")]
    InvalidNodeName(String),

    #[error("duplicate node name: {0}")]
    DuplicateNodeName(String),

    #[error("node '{node}' has invalid plural '{plural}': it must be a valid node name distinct from the node name")]
    InvalidPlural { node: String, plural: String },

    #[error("node '{node}' has invalid component name '{name}': expected camelCase letters and digits")]
    InvalidComponentName { node: String, name: String },

    #[error("node '{node}' declares '{name}' more than once")]
    DuplicateComponent { node: String, name: String },

    #[error("node '{0}' has no components")]
    EmptyComponents(String),

    #[error("node '{0}' has no unique constraint to serve as its identifier")]
    MissingIdentifier(String),

    #[error("node '{0}' declares a unique constraint without components")]
    EmptyUniqueConstraint(String),

    #[error("unique constraint on '{node}' names unknown component '{component}'")]
    UnknownUniqueComponent { node: String, component: String },

    #[error("node '{node}' declares the unique constraint ({components}) more than once")]
    DuplicateUniqueConstraint { node: String, components: String },

    #[error("identifier of '{0}' is nullable")]
    NullableIdentifier(String),

    #[error("identifier of '{0}' is mutable")]
    MutableIdentifier(String),

    #[error("leaf '{node}.{leaf}' is part of a unique constraint but does not support equality")]
    UnfilterableUniqueLeaf { node: String, leaf: String },

    #[error("leaf '{node}.{leaf}' has unknown type '{type_name}'")]
    UnknownLeafType {
        node: String,
        leaf: String,
        type_name: String,
    },

    #[error("edge '{node}.{edge}' targets unknown node '{target}'")]
    UnknownEdgeTarget {
        node: String,
        edge: String,
        target: String,
    },

    #[error("edge '{node}.{edge}' references ({reference}), which is not a unique constraint of its target")]
    UnknownReference {
        node: String,
        edge: String,
        reference: String,
    },

    #[error("edge '{node}.{edge}' references a unique constraint containing itself")]
    SelfReferencingEdge { node: String, edge: String },

    #[error("edge '{node}.{edge}' is part of a reference cycle")]
    ReferenceCycle { node: String, edge: String },

    #[error("node '{node}' already has a field named '{name}' (reverse edge collision)")]
    ReverseEdgeCollision { node: String, name: String },

    #[error("custom field '{node}.{field}' has an invalid dependency: {reason}")]
    InvalidCustomFieldDependency {
        node: String,
        field: String,
        reason: String,
    },

    #[error("invalid schema configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

/// Errors raised while parsing a selection fragment against a node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("conflicting selections for \"{key}\": {left} versus {right}")]
    MergeConflict {
        key: String,
        left: String,
        right: String,
    },
}

impl SelectionError {
    pub fn merge_conflict(
        key: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::MergeConflict {
            key: key.into(),
            left: left.into(),
            right: right.into(),
        }
    }
}

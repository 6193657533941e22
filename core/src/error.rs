//! Input validation errors.

use crate::Path;
use thiserror::Error;

/// Result type for input parsing.
pub type InputResult<T> = Result<T, InputError>;

/// What went wrong while reading a client-supplied value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputErrorKind {
    #[error("unexpected extra key(s) {keys:?}{}", hint(.suggestions))]
    UnknownKeys {
        keys: Vec<String>,
        suggestions: Vec<String>,
    },

    #[error("unknown field '{name}'{}", hint(.suggestions))]
    UnknownField {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("expected {expected}, got {found}")]
    InvalidType { expected: String, found: String },

    #[error("expected a non-null value")]
    NonNullViolation,

    #[error("{message}")]
    InvalidValue { message: String },
}

fn hint(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(", did you mean {}?", suggestions.join(", "))
    }
}

/// An input error located by its path inside the input.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid value at \"{path}\": {kind}")]
pub struct InputError {
    pub path: Path,
    pub kind: InputErrorKind,
}

impl InputError {
    pub fn new(path: Path, kind: InputErrorKind) -> Self {
        Self { path, kind }
    }

    pub fn unknown_keys(path: Path, keys: Vec<String>, suggestions: Vec<String>) -> Self {
        Self::new(path, InputErrorKind::UnknownKeys { keys, suggestions })
    }

    pub fn unknown_field(path: Path, name: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self::new(
            path,
            InputErrorKind::UnknownField {
                name: name.into(),
                suggestions,
            },
        )
    }

    pub fn invalid_type(path: Path, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::new(
            path,
            InputErrorKind::InvalidType {
                expected: expected.into(),
                found: found.into(),
            },
        )
    }

    pub fn non_null(path: Path) -> Self {
        Self::new(path, InputErrorKind::NonNullViolation)
    }

    pub fn invalid_value(path: Path, message: impl Into<String>) -> Self {
        Self::new(
            path,
            InputErrorKind::InvalidValue {
                message: message.into(),
            },
        )
    }
}

/// Short description of a raw JSON value's shape, for error messages.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}

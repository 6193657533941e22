//! Leaf types: capabilities and the value codec.
//!
//! A leaf type knows which filter operators and orderings it supports, how to
//! read a client value, how to write a value back out, how to render it as a
//! SQL literal and how to read it back from a result cell. Reading a cell must
//! return exactly the value that was written, so every conversion here has a
//! matching inverse.

use crate::{json_kind, InputError, InputResult, Path, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;

const DATETIME_OUTPUT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const DATETIME_COLUMN: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Comparison operators a leaf filter can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafOperator {
    Eq,
    Not,
    In,
    NotIn,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
}

impl LeafOperator {
    pub const ALL: [LeafOperator; 14] = [
        LeafOperator::Eq,
        LeafOperator::Not,
        LeafOperator::In,
        LeafOperator::NotIn,
        LeafOperator::Gt,
        LeafOperator::Gte,
        LeafOperator::Lt,
        LeafOperator::Lte,
        LeafOperator::Contains,
        LeafOperator::NotContains,
        LeafOperator::StartsWith,
        LeafOperator::NotStartsWith,
        LeafOperator::EndsWith,
        LeafOperator::NotEndsWith,
    ];

    /// Suffix appended to the leaf name to form the filter key.
    pub fn suffix(self) -> &'static str {
        match self {
            LeafOperator::Eq => "",
            LeafOperator::Not => "_not",
            LeafOperator::In => "_in",
            LeafOperator::NotIn => "_not_in",
            LeafOperator::Gt => "_gt",
            LeafOperator::Gte => "_gte",
            LeafOperator::Lt => "_lt",
            LeafOperator::Lte => "_lte",
            LeafOperator::Contains => "_contains",
            LeafOperator::NotContains => "_not_contains",
            LeafOperator::StartsWith => "_starts_with",
            LeafOperator::NotStartsWith => "_not_starts_with",
            LeafOperator::EndsWith => "_ends_with",
            LeafOperator::NotEndsWith => "_not_ends_with",
        }
    }

    /// Operators taking a list of values.
    pub fn is_list(self) -> bool {
        matches!(self, LeafOperator::In | LeafOperator::NotIn)
    }

    /// Operators matching a substring pattern.
    pub fn is_pattern(self) -> bool {
        matches!(
            self,
            LeafOperator::Contains
                | LeafOperator::NotContains
                | LeafOperator::StartsWith
                | LeafOperator::NotStartsWith
                | LeafOperator::EndsWith
                | LeafOperator::NotEndsWith
        )
    }

    /// Operators accepting `null` as their operand (`IS [NOT] NULL`).
    pub fn accepts_null(self) -> bool {
        matches!(self, LeafOperator::Eq | LeafOperator::Not)
    }
}

impl fmt::Display for LeafOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LeafOperator::Eq => "eq",
            other => other.suffix().trim_start_matches('_'),
        };
        write!(f, "{}", name)
    }
}

/// An enumeration: a closed set of string values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// The type of a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafType {
    Boolean,
    Int,
    Float,
    String,
    /// Opaque string identifier.
    Id,
    /// Timestamp, exchanged as ISO-8601 with a `Z` marker and stored without zone.
    DateTime,
    Date,
    /// JSON object, stored as text; neither filterable nor sortable.
    Json,
    Enum(EnumType),
}

impl LeafType {
    /// Name of the type, as shown in error messages.
    pub fn name(&self) -> &str {
        match self {
            LeafType::Boolean => "Boolean",
            LeafType::Int => "Int",
            LeafType::Float => "Float",
            LeafType::String => "String",
            LeafType::Id => "ID",
            LeafType::DateTime => "DateTime",
            LeafType::Date => "Date",
            LeafType::Json => "JSONObject",
            LeafType::Enum(e) => &e.name,
        }
    }

    /// Look up a built-in scalar type by name.
    pub fn scalar(name: &str) -> Option<LeafType> {
        Some(match name {
            "Boolean" => LeafType::Boolean,
            "Int" => LeafType::Int,
            "Float" => LeafType::Float,
            "String" => LeafType::String,
            "ID" => LeafType::Id,
            "DateTime" => LeafType::DateTime,
            "Date" => LeafType::Date,
            "JSONObject" => LeafType::Json,
            _ => return None,
        })
    }

    /// Filter operators this type supports.
    pub fn operators(&self) -> &'static [LeafOperator] {
        use LeafOperator::*;
        match self {
            LeafType::Boolean => &[Eq, Not],
            LeafType::Id | LeafType::Enum(_) => &[Eq, Not, In, NotIn],
            LeafType::Int | LeafType::Float | LeafType::DateTime | LeafType::Date => {
                &[Eq, Not, In, NotIn, Gt, Gte, Lt, Lte]
            }
            LeafType::String => &LeafOperator::ALL,
            LeafType::Json => &[],
        }
    }

    pub fn supports(&self, operator: LeafOperator) -> bool {
        self.operators().contains(&operator)
    }

    pub fn is_sortable(&self) -> bool {
        !matches!(self, LeafType::Json)
    }

    // ==================== Codec ====================

    /// Read a client value. `null` is returned as [`Value::Null`]; callers
    /// enforce nullability.
    pub fn parse_value(&self, raw: &serde_json::Value, path: &Path) -> InputResult<Value> {
        use serde_json::Value as Json;

        let invalid = || InputError::invalid_type(path.clone(), self.name(), json_kind(raw));

        match (self, raw) {
            (_, Json::Null) => Ok(Value::Null),
            (LeafType::Boolean, Json::Bool(b)) => Ok(Value::Bool(*b)),
            (LeafType::Int, Json::Number(n)) => n.as_i64().map(Value::Int).ok_or_else(invalid),
            (LeafType::Float, Json::Number(n)) => {
                n.as_f64().map(Value::Float).ok_or_else(invalid)
            }
            (LeafType::String, Json::String(s)) => Ok(Value::String(s.clone())),
            (LeafType::Id, Json::String(s)) => {
                if s.is_empty() {
                    Err(InputError::invalid_value(path.clone(), "expected a non-empty ID"))
                } else {
                    Ok(Value::String(s.clone()))
                }
            }
            (LeafType::DateTime, Json::String(s)) => parse_datetime(s)
                .map(Value::DateTime)
                .ok_or_else(|| {
                    InputError::invalid_value(
                        path.clone(),
                        format!("expected an ISO-8601 date-time, got {:?}", s),
                    )
                }),
            (LeafType::Date, Json::String(s)) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map(Value::Date)
                .map_err(|_| {
                    InputError::invalid_value(
                        path.clone(),
                        format!("expected a YYYY-MM-DD date, got {:?}", s),
                    )
                }),
            (LeafType::Json, Json::Object(_)) => Ok(Value::Json(raw.clone())),
            (LeafType::Enum(e), Json::String(s)) => {
                if e.values.iter().any(|v| v == s) {
                    Ok(Value::String(s.clone()))
                } else {
                    Err(InputError::invalid_value(
                        path.clone(),
                        format!(
                            "expected one of {} ({}), got {:?}",
                            e.name,
                            e.values.join(", "),
                            s
                        ),
                    ))
                }
            }
            _ => Err(invalid()),
        }
    }

    /// Write a value out in its client form (inverse of [`parse_value`](Self::parse_value)).
    ///
    /// Every leaf type shares one output form per value variant, so this is
    /// also available untyped as `serde_json::Value::from(&value)`.
    pub fn serialize_value(&self, value: &Value) -> serde_json::Value {
        serde_json::Value::from(value)
    }

    /// Render a value as an inline SQL literal.
    pub fn to_sql_literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) if f.is_finite() => format!("{:?}", f),
            Value::Float(_) => "NULL".to_string(),
            Value::String(s) => quote_string(s),
            Value::DateTime(dt) => quote_string(&dt.format(DATETIME_COLUMN).to_string()),
            Value::Date(d) => quote_string(&d.format(DATE_FORMAT).to_string()),
            Value::Json(json) => quote_string(&json.to_string()),
        }
    }

    /// Read a result cell back into a value (inverse of [`to_sql_literal`](Self::to_sql_literal)).
    ///
    /// Drivers differ in how they hand cells over: booleans may arrive as
    /// `0`/`1`, numbers as strings, JSON documents as text and timestamps with
    /// or without a trailing zone marker.
    pub fn parse_column(&self, cell: &serde_json::Value, path: &Path) -> InputResult<Value> {
        use serde_json::Value as Json;

        let invalid = || InputError::invalid_type(path.clone(), self.name(), json_kind(cell));

        match (self, cell) {
            (_, Json::Null) => Ok(Value::Null),
            (LeafType::Boolean, Json::Bool(b)) => Ok(Value::Bool(*b)),
            (LeafType::Boolean, Json::Number(n)) => match n.as_i64() {
                Some(0) => Ok(Value::Bool(false)),
                Some(1) => Ok(Value::Bool(true)),
                _ => Err(invalid()),
            },
            (LeafType::Int, Json::Number(n)) => n.as_i64().map(Value::Int).ok_or_else(invalid),
            (LeafType::Int, Json::String(s)) => {
                s.parse().map(Value::Int).map_err(|_| invalid())
            }
            (LeafType::Float, Json::Number(n)) => {
                n.as_f64().map(Value::Float).ok_or_else(invalid)
            }
            (LeafType::Float, Json::String(s)) => {
                s.parse().map(Value::Float).map_err(|_| invalid())
            }
            (LeafType::String | LeafType::Id | LeafType::Enum(_), Json::String(s)) => {
                Ok(Value::String(s.clone()))
            }
            (LeafType::DateTime, Json::String(s)) => {
                let naive = s.strip_suffix('Z').unwrap_or(s);
                NaiveDateTime::parse_from_str(naive, DATETIME_COLUMN)
                    .or_else(|_| NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f"))
                    .map(Value::DateTime)
                    .map_err(|_| invalid())
            }
            (LeafType::Date, Json::String(s)) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map(Value::Date)
                .map_err(|_| invalid()),
            (LeafType::Json, Json::String(s)) => match serde_json::from_str(s) {
                Ok(json @ Json::Object(_)) => Ok(Value::Json(json)),
                _ => Err(invalid()),
            },
            (LeafType::Json, Json::Object(_)) => Ok(Value::Json(cell.clone())),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for LeafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => Json::from(*f),
            Value::String(s) => Json::String(s.clone()),
            Value::DateTime(dt) => Json::String(dt.format(DATETIME_OUTPUT).to_string()),
            Value::Date(d) => Json::String(d.format(DATE_FORMAT).to_string()),
            Value::Json(json) => json.clone(),
        }
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .map(truncate_to_millis)
}

/// Columns keep millisecond precision; values are truncated on the way in so
/// that reading them back yields the same value.
fn truncate_to_millis(dt: NaiveDateTime) -> NaiveDateTime {
    use chrono::Timelike;
    let millis = dt.nanosecond() / 1_000_000 * 1_000_000;
    dt.with_nanosecond(millis).unwrap_or(dt)
}

/// Quote a string literal, escaping quotes and backslashes.
pub fn quote_string(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        match c {
            '\'' => quoted.push_str("''"),
            '\\' => quoted.push_str("\\\\"),
            '\0' => quoted.push_str("\\0"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

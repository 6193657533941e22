//! Assertion types and builders for verifying step results.

use serde_json::Value as Json;
use trellis_sql::RawRow;

use crate::error::{ScenarioError, ScenarioResult};
use crate::scenario::Compiled;
use crate::value_ext::ToJson;

/// What a step's compiled statement must look like.
#[derive(Debug, Default)]
pub struct Assertion {
    pub sql: Option<String>,
    pub contains: Vec<String>,
    pub excludes: Vec<String>,

    /// Rows to feed the statement and the values they must read back as.
    pub reads: Option<(Vec<RawRow>, Json)>,

    pub error: Option<String>,
}

impl Assertion {
    pub fn new() -> Self {
        Self::default()
    }

    /// The exact statement text.
    pub fn sql(mut self, sql: &str) -> Self {
        self.sql = Some(sql.to_string());
        self
    }

    pub fn contains(mut self, fragment: &str) -> Self {
        self.contains.push(fragment.to_string());
        self
    }

    pub fn excludes(mut self, fragment: &str) -> Self {
        self.excludes.push(fragment.to_string());
        self
    }

    pub fn no_where(self) -> Self {
        self.excludes(" WHERE ")
    }

    pub fn where_clause(self, condition: &str) -> Self {
        self.contains(&format!(" WHERE {}", condition))
    }

    pub fn grouped_by(self, columns: &str) -> Self {
        self.contains(&format!(" GROUP BY {}", columns))
    }

    pub fn ungrouped(self) -> Self {
        self.excludes(" GROUP BY ")
    }

    /// Feed `rows` (a JSON array of objects) to the statement and expect
    /// `expected` back: an array of node values for finds, a number for
    /// counts.
    pub fn reads(mut self, rows: Json, expected: Json) -> Self {
        self.reads = Some((crate::rows(rows), expected));
        self
    }

    /// Expect compilation to fail with a message containing `message`.
    pub fn error(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    /// Verify the assertion against a compiled step.
    pub fn verify(&self, step: &str, result: &Result<Compiled, String>) -> ScenarioResult<()> {
        if let Some(expected) = &self.error {
            return match result {
                Err(message) if message.contains(expected.as_str()) => Ok(()),
                Err(message) => Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected error containing '{}', got: {}", expected, message),
                )),
                Ok(compiled) => Err(ScenarioError::assertion_failed(
                    step,
                    format!(
                        "expected error containing '{}', but compiled: {}",
                        expected,
                        compiled.sql()
                    ),
                )),
            };
        }

        let compiled = result
            .as_ref()
            .map_err(|message| ScenarioError::assertion_failed(step, format!("compilation failed: {}", message)))?;
        let sql = compiled.sql();

        if let Some(expected) = &self.sql {
            if sql != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected statement\n  {}\ngot\n  {}", expected, sql),
                ));
            }
        }
        for fragment in &self.contains {
            if !sql.contains(fragment.as_str()) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected '{}' in: {}", fragment, sql),
                ));
            }
        }
        for fragment in &self.excludes {
            if sql.contains(fragment.as_str()) {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("unexpected '{}' in: {}", fragment, sql),
                ));
            }
        }

        if let Some((rows, expected)) = &self.reads {
            let read = match compiled {
                Compiled::Find(statement) => statement.parse_rows(rows).map(|values| values.to_json()),
                Compiled::Count(statement) => match rows.first() {
                    Some(row) => statement.parse_row(row).map(Json::from),
                    None => Ok(Json::from(0)),
                },
            }
            .map_err(|e| ScenarioError::assertion_failed(step, format!("reading rows failed: {}", e)))?;

            if &read != expected {
                return Err(ScenarioError::assertion_failed(
                    step,
                    format!("expected rows to read as {}, got {}", expected, read),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_expectation() {
        let assertion = Assertion::new().error("unknown node");

        assert!(assertion
            .verify("s", &Err("unknown node 'Post'".to_string()))
            .is_ok());
        assert!(assertion.verify("s", &Err("other".to_string())).is_err());
    }

    #[test]
    fn test_reads_builds_rows() {
        let assertion = Assertion::new().reads(json!([{ "a": 1 }, 2]), json!([]));

        let (rows, _) = assertion.reads.unwrap();
        assert_eq!(rows.len(), 1);
    }
}

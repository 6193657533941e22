//! An in-memory [`Executor`] replaying canned rows.

use serde_json::Value as Json;
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;
use trellis_sql::{Executor, RawRow};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("no rows queued for statement: {sql}")]
    Exhausted { sql: String },
}

/// A unit of work; records the statements run on it.
#[derive(Debug, Default)]
pub struct Session {
    pub statements: Vec<String>,
}

/// Answers statements in order with the queued row sets and logs every
/// statement it sees.
#[derive(Debug, Default)]
pub struct MemoryStore {
    responses: Mutex<VecDeque<Vec<RawRow>>>,
    log: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the rows answering the next unanswered statement.
    pub fn respond(self, rows: Json) -> Self {
        self.responses
            .lock()
            .expect("store lock poisoned")
            .push_back(crate::rows(rows));
        self
    }

    /// Statements run so far, outside and inside sessions.
    pub fn statements(&self) -> Vec<String> {
        self.log.lock().expect("store lock poisoned").clone()
    }
}

impl Executor for MemoryStore {
    type Connection = Session;
    type Error = StoreError;

    async fn query(&self, sql: &str, session: Option<&mut Session>) -> Result<Vec<RawRow>, StoreError> {
        self.log.lock().expect("store lock poisoned").push(sql.to_string());
        if let Some(session) = session {
            session.statements.push(sql.to_string());
        }
        self.responses
            .lock()
            .expect("store lock poisoned")
            .pop_front()
            .ok_or_else(|| StoreError::Exhausted {
                sql: sql.to_string(),
            })
    }
}

/// Rows from a JSON array of objects. Anything else yields no rows.
pub fn rows(json: Json) -> Vec<RawRow> {
    match json {
        Json::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Json::Object(row) => Some(row),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[tokio::test]
    async fn test_responses_are_served_in_order() {
        let store = MemoryStore::new()
            .respond(json!([{ "a": 1 }]))
            .respond(json!([]));

        let first = store.query("SELECT 1", None).await;
        let second = store.query("SELECT 2", None).await;
        let third = store.query("SELECT 3", None).await;

        assert_eq!(first.unwrap().len(), 1);
        assert_eq!(second.unwrap().len(), 0);
        assert_eq!(
            third.unwrap_err(),
            StoreError::Exhausted {
                sql: "SELECT 3".into()
            }
        );
        assert_eq!(store.statements(), vec!["SELECT 1", "SELECT 2", "SELECT 3"]);
    }

    #[test]
    #[should_panic(expected = "store lock poisoned")]
    fn test_poisoned_store_fails_loudly() {
        // GIVEN a store whose queue lock was poisoned by a panicking writer
        let store = MemoryStore::new();
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store.responses.lock().unwrap();
            panic!("writer failed");
        }));

        // WHEN rows are queued THEN the failure names its cause
        let _ = store.respond(json!([]));
    }
}

//! Integration test framework for Trellis.
//!
//! Scenarios compile find and count requests against the blog fixture
//! schema and check the statements and the values read back
//! from canned rows. [`MemoryStore`] stands in for a database wherever the
//! async connector is exercised.

mod assertion;
mod blog;
mod error;
mod scenario;
mod store;
mod value_ext;

pub use assertion::Assertion;
pub use blog::blog;
pub use error::{ScenarioError, ScenarioResult};
pub use scenario::{Compiled, Request, Scenario, Step};
pub use store::{rows, MemoryStore, Session, StoreError};
pub use value_ext::ToJson;

use std::sync::Once;

/// Route `tracing` output to the test harness, filtered by `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub mod prelude {
    pub use crate::{
        blog, init_tracing, rows, Assertion, MemoryStore, Scenario, ScenarioError, Session,
        ToJson,
    };
    pub use serde_json::json;
    pub use trellis_schema::{FieldValue, NodeValue, Schema, Selection};
    pub use trellis_sql::{Connector, FindArgs, StatementBuilder};
}

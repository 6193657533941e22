//! Error types for scenario runs.

use thiserror::Error;
use trellis_schema::SchemaError;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("blog schema failed to build: {0}")]
    Schema(#[from] SchemaError),

    #[error("assertion failed in step '{step}': {message}")]
    AssertionFailed { step: String, message: String },
}

impl ScenarioError {
    pub fn assertion_failed(step: impl Into<String>, message: impl Into<String>) -> Self {
        ScenarioError::AssertionFailed {
            step: step.into(),
            message: message.into(),
        }
    }
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;

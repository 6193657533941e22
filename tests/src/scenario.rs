//! Scenario definitions and the runner.

use serde_json::Value as Json;
use tracing::info;
use trellis_core::Path;
use trellis_schema::Schema;
use trellis_sql::{CountStatement, FindArgs, Statement, StatementBuilder};

use crate::assertion::Assertion;
use crate::error::ScenarioResult;

/// What a step asks the statement builder for.
#[derive(Debug, Clone)]
pub enum Request {
    /// Client arguments `{ where, orderBy, first, skip }` and a selection
    /// fragment.
    Find {
        node: String,
        args: Json,
        fragment: String,
    },
    /// A client `where` input.
    Count { node: String, filter: Json },
}

/// A compiled request.
#[derive(Debug, Clone)]
pub enum Compiled {
    Find(Statement),
    Count(CountStatement),
}

impl Compiled {
    pub fn sql(&self) -> &str {
        match self {
            Compiled::Find(statement) => statement.sql(),
            Compiled::Count(statement) => statement.sql(),
        }
    }
}

#[derive(Debug)]
pub struct Step {
    pub name: String,
    pub request: Request,
    pub assertion: Assertion,
}

/// A named sequence of requests on the blog schema, each with its
/// assertion.
#[derive(Debug)]
pub struct Scenario {
    name: String,
    steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Add a find step.
    pub fn find<F>(mut self, step: &str, node: &str, args: Json, fragment: &str, assert: F) -> Self
    where
        F: FnOnce(Assertion) -> Assertion,
    {
        self.steps.push(Step {
            name: step.to_string(),
            request: Request::Find {
                node: node.to_string(),
                args,
                fragment: fragment.to_string(),
            },
            assertion: assert(Assertion::new()),
        });
        self
    }

    /// Add a count step.
    pub fn count<F>(mut self, step: &str, node: &str, filter: Json, assert: F) -> Self
    where
        F: FnOnce(Assertion) -> Assertion,
    {
        self.steps.push(Step {
            name: step.to_string(),
            request: Request::Count {
                node: node.to_string(),
                filter,
            },
            assertion: assert(Assertion::new()),
        });
        self
    }

    /// Compile every step and verify its assertion.
    pub fn run(&self) -> ScenarioResult<()> {
        crate::init_tracing();
        let schema = crate::blog()?;
        let builder = StatementBuilder::new(&schema);

        info!(scenario = %self.name, steps = self.steps.len(), "running scenario");
        for step in &self.steps {
            let compiled = compile(&schema, &builder, &step.request);
            step.assertion.verify(&step.name, &compiled)?;
        }
        Ok(())
    }
}

/// Compile one request; failures are reported as their display text.
fn compile(schema: &Schema, builder: &StatementBuilder, request: &Request) -> Result<Compiled, String> {
    let node_named = |name: &str| {
        schema
            .node_by_name(name)
            .ok_or_else(|| format!("unknown node '{}'", name))
    };

    match request {
        Request::Find {
            node,
            args,
            fragment,
        } => {
            let args = FindArgs::parse(schema, node_named(node)?, args, fragment)
                .map_err(|e| e.to_string())?;
            builder
                .find(node, &args)
                .map(Compiled::Find)
                .map_err(|e| e.to_string())
        }
        Request::Count { node, filter } => {
            let filter = node_named(node)?
                .where_input()
                .parse(schema, Some(filter), &Path::key("where"))
                .map_err(|e| e.to_string())?;
            builder
                .count(node, &filter)
                .map(Compiled::Count)
                .map_err(|e| e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scenario_collects_steps() {
        let scenario = Scenario::new("steps")
            .find("titles", "Article", json!({}), "{ title }", |a| a.no_where())
            .count("all", "Article", json!({}), |a| a.contains("COUNT(*)"));

        assert_eq!(scenario.name(), "steps");
        assert_eq!(
            scenario.steps().iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["titles", "all"]
        );
    }

    #[test]
    fn test_failed_assertion_names_the_step() {
        let err = Scenario::new("failing")
            .find("titles", "Article", json!({}), "{ title }", |a| a.contains("GROUP BY"))
            .run()
            .unwrap_err();

        assert!(err.to_string().starts_with("assertion failed in step 'titles'"));
    }
}

//! OrderByInput: `<leaf>_ASC` / `<leaf>_DESC` tokens.

use crate::Node;
use indexmap::IndexMap;
use serde_json::Value as Json;
use std::fmt;
use trellis_core::{did_you_mean, json_kind, InputError, InputResult, Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Sort by one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ordering {
    pub leaf: String,
    pub direction: Direction,
}

impl Ordering {
    pub fn asc(leaf: impl Into<String>) -> Self {
        Self {
            leaf: leaf.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(leaf: impl Into<String>) -> Self {
        Self {
            leaf: leaf.into(),
            direction: Direction::Desc,
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.leaf, self.direction.as_sql())
    }
}

/// The ordering grammar of one node.
#[derive(Debug, Clone, Default)]
pub struct OrderByInput {
    tokens: IndexMap<String, Ordering>,
}

impl OrderByInput {
    pub(crate) fn new(node: &Node) -> Self {
        let mut tokens = IndexMap::new();
        for leaf in node.leaves().filter(|leaf| leaf.is_sortable()) {
            for ordering in [Ordering::asc(&leaf.name), Ordering::desc(&leaf.name)] {
                tokens.insert(ordering.to_string(), ordering);
            }
        }
        Self { tokens }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    /// Parse one token or a list of tokens. Absent or `null` means no ordering.
    pub fn parse(&self, raw: Option<&Json>, path: &Path) -> InputResult<Vec<Ordering>> {
        let items: Vec<(Path, &Json)> = match raw {
            None | Some(Json::Null) => return Ok(Vec::new()),
            Some(Json::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| (path.index(i), item))
                .collect(),
            Some(single) => vec![(path.clone(), single)],
        };

        let mut orderings: Vec<Ordering> = Vec::with_capacity(items.len());
        for (path, item) in items {
            let token = item.as_str().ok_or_else(|| {
                InputError::invalid_type(path.clone(), "an ordering token", json_kind(item))
            })?;
            let ordering = self.tokens.get(token).ok_or_else(|| {
                InputError::unknown_field(path.clone(), token, did_you_mean(token, self.tokens()))
            })?;
            if orderings.iter().any(|o| o.leaf == ordering.leaf) {
                return Err(InputError::invalid_value(
                    path,
                    format!("'{}' is ordered more than once", ordering.leaf),
                ));
            }
            orderings.push(ordering.clone());
        }
        Ok(orderings)
    }
}

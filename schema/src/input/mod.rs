//! Client input grammars of a node: filters, unique lookups and orderings.
//!
//! Grammars are derived once per node when the schema is built; parsing is
//! then a lookup of each key in the node's grammar.

mod order_by;
mod where_input;
mod where_unique;

pub use order_by::{Direction, OrderByInput, Ordering};
pub use where_input::{EdgeOperator, FilterField, LogicalOperator, ReverseEdgeOperator, WhereInput};
pub use where_unique::WhereUniqueInput;

use trellis_core::{did_you_mean, InputError, Path};

/// Unknown-keys error for `unknown`, with suggestions drawn from `known`.
pub(crate) fn unknown_keys<'a>(
    path: &Path,
    unknown: Vec<String>,
    known: impl Iterator<Item = &'a str> + Clone,
) -> InputError {
    let mut suggestions: Vec<String> = Vec::new();
    for key in &unknown {
        for suggestion in did_you_mean(key, known.clone()) {
            if !suggestions.contains(&suggestion) {
                suggestions.push(suggestion);
            }
        }
    }
    InputError::unknown_keys(path.clone(), unknown, suggestions)
}

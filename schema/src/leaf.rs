//! Leaf components.

use crate::naming::snake_case;
use trellis_core::{LeafOperator, LeafType};

/// A scalar or enum component of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    /// Leaf name.
    pub name: String,
    /// Value type.
    pub leaf_type: LeafType,
    /// Whether the leaf may hold null.
    pub nullable: bool,
    /// Whether the leaf may not change after creation.
    pub immutable: bool,
    /// Whether the leaf is exposed to clients.
    pub public: bool,
    /// Column name in the node's table.
    pub column: String,
    filterable: Option<bool>,
    sortable: Option<bool>,
}

impl Leaf {
    pub fn new(name: impl Into<String>, leaf_type: LeafType) -> Self {
        let name = name.into();
        Self {
            column: snake_case(&name),
            name,
            leaf_type,
            nullable: false,
            immutable: false,
            public: true,
            filterable: None,
            sortable: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Override whether the leaf can be filtered on at all.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = Some(filterable);
        self
    }

    /// Override whether the leaf can be ordered by.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }

    /// Filter operators available on this leaf.
    pub fn operators(&self) -> &'static [LeafOperator] {
        match self.filterable {
            Some(false) => &[],
            _ => self.leaf_type.operators(),
        }
    }

    pub fn supports(&self, operator: LeafOperator) -> bool {
        self.operators().contains(&operator)
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable.unwrap_or_else(|| self.leaf_type.is_sortable())
    }
}

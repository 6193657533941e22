//! Unique constraints.

/// An ordered set of components identifying a node instance.
///
/// The derived flags hold when every component has the property.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueConstraint {
    pub components: Vec<String>,
    pub nullable: bool,
    pub immutable: bool,
    pub public: bool,
}

impl UniqueConstraint {
    pub fn contains(&self, component: &str) -> bool {
        self.components.iter().any(|c| c == component)
    }

    /// Human-readable form, e.g. `article, tag`.
    pub fn describe(&self) -> String {
        self.components.join(", ")
    }
}

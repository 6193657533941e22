//! Declarative schema configuration.
//!
//! Nodes can be declared in JSON instead of through the builder API:
//!
//! ```json
//! { "nodes": [{
//!     "name": "Tag",
//!     "components": {
//!         "id": { "kind": "leaf", "type": "ID", "immutable": true },
//!         "name": { "kind": "leaf", "type": "String" }
//!     },
//!     "uniques": [["id"], ["name"]]
//! }] }
//! ```
//!
//! Custom fields carry code and are attached afterwards with
//! [`SchemaBuilder::add_custom_field`].

use crate::{EdgeDef, Leaf, SchemaBuilder, SchemaError, SchemaResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use trellis_core::{EnumType, LeafType};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaConfig {
    pub nodes: Vec<NodeConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NodeConfig {
    pub name: String,
    #[serde(default)]
    pub plural: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default)]
    pub immutable: bool,
    pub components: IndexMap<String, ComponentConfig>,
    pub uniques: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ComponentConfig {
    Leaf(LeafConfig),
    Edge(EdgeConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafConfig {
    /// Built-in scalar name, or the enum's name when `enum` is given.
    #[serde(rename = "type")]
    pub leaf_type: String,
    #[serde(default, rename = "enum")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub immutable: bool,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub filterable: Option<bool>,
    #[serde(default)]
    pub sortable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeConfig {
    pub target: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub immutable: bool,
    #[serde(default = "default_true")]
    pub public: bool,
    #[serde(default)]
    pub column: Option<String>,
    /// Components of the referenced unique constraint.
    #[serde(default)]
    pub reference: Option<Vec<String>>,
    /// Name of the reverse edge on the target.
    #[serde(default)]
    pub reverse: Option<String>,
    #[serde(default = "default_true")]
    pub reverse_public: bool,
}

impl SchemaConfig {
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl LeafConfig {
    fn to_leaf(&self, node: &str, name: &str) -> SchemaResult<Leaf> {
        let leaf_type = match &self.enum_values {
            Some(values) => LeafType::Enum(EnumType::new(&self.leaf_type, values.iter())),
            None => LeafType::scalar(&self.leaf_type).ok_or_else(|| SchemaError::UnknownLeafType {
                node: node.to_string(),
                leaf: name.to_string(),
                type_name: self.leaf_type.clone(),
            })?,
        };

        let mut leaf = Leaf::new(name, leaf_type);
        if self.nullable {
            leaf = leaf.nullable();
        }
        if self.immutable {
            leaf = leaf.immutable();
        }
        if !self.public {
            leaf = leaf.private();
        }
        if let Some(column) = &self.column {
            leaf = leaf.column(column);
        }
        if let Some(filterable) = self.filterable {
            leaf = leaf.filterable(filterable);
        }
        if let Some(sortable) = self.sortable {
            leaf = leaf.sortable(sortable);
        }
        Ok(leaf)
    }
}

impl EdgeConfig {
    fn to_edge(&self, name: &str) -> EdgeDef {
        EdgeDef {
            name: name.to_string(),
            target: self.target.clone(),
            reference: self.reference.clone(),
            nullable: self.nullable,
            immutable: self.immutable,
            public: self.public,
            column: self.column.clone(),
            reverse_name: self.reverse.clone(),
            reverse_public: self.reverse_public,
        }
    }
}

impl SchemaBuilder {
    /// Declare every node of a configuration. The returned builder can take
    /// custom fields before being built.
    pub fn from_config(config: &SchemaConfig) -> SchemaResult<SchemaBuilder> {
        let mut builder = SchemaBuilder::new();
        for node in &config.nodes {
            let mut declaration = builder.add_node(&node.name);
            if let Some(plural) = &node.plural {
                declaration = declaration.plural(plural);
            }
            if let Some(table) = &node.table {
                declaration = declaration.table(table);
            }
            if !node.public {
                declaration = declaration.private();
            }
            if node.immutable {
                declaration = declaration.immutable();
            }
            for (name, component) in &node.components {
                declaration = match component {
                    ComponentConfig::Leaf(leaf) => declaration.leaf(leaf.to_leaf(&node.name, name)?),
                    ComponentConfig::Edge(edge) => declaration.edge(edge.to_edge(name)),
                };
            }
            for unique in &node.uniques {
                declaration = declaration.unique(unique.iter());
            }
            declaration.done()?;
        }
        Ok(builder)
    }
}

//! SchemaBuilder for constructing an immutable Schema.
//!
//! Building happens in two phases. `NodeBuilder::done` validates everything
//! local to one node; `SchemaBuilder::build` then resolves what spans nodes
//! (edge targets and references, foreign-key columns, reverse edges, input
//! grammars and custom field dependencies) and freezes the result.

use crate::naming::{is_valid_field_name, is_valid_node_name, lower_first, pluralize, snake_case};
use crate::{
    Component, CustomField, CustomResolver, Edge, Leaf, Node, NodeId, NodeValue, OrderByInput,
    ReferenceColumn, ReverseEdge, Schema, SchemaError, SchemaResult, UniqueConstraint, WhereInput,
    WhereUniqueInput,
};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use trellis_core::{LeafOperator, Path, Value};
use trellis_parser::parse_fragment;

// ==================== DECLARATIONS ====================

/// An edge as declared, before its target is resolved.
#[derive(Debug, Clone)]
pub struct EdgeDef {
    pub name: String,
    pub target: String,
    /// Components of the referenced unique constraint; the target's
    /// identifier when `None`.
    pub reference: Option<Vec<String>>,
    pub nullable: bool,
    pub immutable: bool,
    pub public: bool,
    pub column: Option<String>,
    pub reverse_name: Option<String>,
    pub reverse_public: bool,
}

impl EdgeDef {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            reference: None,
            nullable: false,
            immutable: false,
            public: true,
            column: None,
            reverse_name: None,
            reverse_public: true,
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

    /// Reference the target through the unique constraint made of `components`.
    pub fn references(mut self, components: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.reference = Some(components.into_iter().map(Into::into).collect());
        self
    }

    /// Prefix of the foreign-key columns.
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Name of the reverse edge on the target.
    pub fn reverse(mut self, name: impl Into<String>) -> Self {
        self.reverse_name = Some(name.into());
        self
    }

    pub fn private_reverse(mut self) -> Self {
        self.reverse_public = false;
        self
    }

    fn column_prefix(&self) -> String {
        self.column.clone().unwrap_or_else(|| snake_case(&self.name))
    }
}

/// A custom field as declared.
#[derive(Clone)]
pub struct CustomFieldDef {
    pub name: String,
    pub public: bool,
    /// Fragment on the owning node, e.g. `{ parent }`.
    pub depends_on: Option<String>,
    pub resolver: CustomResolver,
}

impl CustomFieldDef {
    pub fn new(
        name: impl Into<String>,
        resolver: impl Fn(&NodeValue) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            public: true,
            depends_on: None,
            resolver: Arc::new(resolver),
        }
    }

    pub fn depends_on(mut self, fragment: impl Into<String>) -> Self {
        self.depends_on = Some(fragment.into());
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }
}

impl fmt::Debug for CustomFieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFieldDef")
            .field("name", &self.name)
            .field("public", &self.public)
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
enum ComponentDef {
    Leaf(Leaf),
    Edge(EdgeDef),
}

impl ComponentDef {
    fn name(&self) -> &str {
        match self {
            ComponentDef::Leaf(leaf) => &leaf.name,
            ComponentDef::Edge(edge) => &edge.name,
        }
    }

    fn nullable(&self) -> bool {
        match self {
            ComponentDef::Leaf(leaf) => leaf.nullable,
            ComponentDef::Edge(edge) => edge.nullable,
        }
    }

    fn immutable(&self) -> bool {
        match self {
            ComponentDef::Leaf(leaf) => leaf.immutable,
            ComponentDef::Edge(edge) => edge.immutable,
        }
    }

    fn public(&self) -> bool {
        match self {
            ComponentDef::Leaf(leaf) => leaf.public,
            ComponentDef::Edge(edge) => edge.public,
        }
    }
}

/// A node that passed local validation.
#[derive(Debug)]
struct NodeDef {
    id: NodeId,
    name: String,
    plural: String,
    table: String,
    public: bool,
    immutable: bool,
    components: IndexMap<String, ComponentDef>,
    unique_constraints: Vec<UniqueConstraint>,
    custom_fields: Vec<CustomFieldDef>,
}

impl NodeDef {
    fn check_custom_field(&self, field: &CustomFieldDef) -> SchemaResult<()> {
        if !is_valid_field_name(&field.name) {
            return Err(SchemaError::InvalidComponentName {
                node: self.name.clone(),
                name: field.name.clone(),
            });
        }
        if self.components.contains_key(&field.name)
            || self.custom_fields.iter().any(|f| f.name == field.name)
        {
            return Err(SchemaError::DuplicateComponent {
                node: self.name.clone(),
                name: field.name.clone(),
            });
        }
        Ok(())
    }
}

// ==================== SCHEMA BUILDER ====================

/// Builder for constructing an immutable Schema.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    /// Nodes that passed local validation, indexed by id.
    nodes: Vec<NodeDef>,
    /// Node name to ID mapping.
    node_names: HashMap<String, NodeId>,
}

impl SchemaBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start declaring a node.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeBuilder<'_> {
        NodeBuilder {
            builder: self,
            name: name.into(),
            plural: None,
            table: None,
            public: true,
            immutable: false,
            components: Vec::new(),
            uniques: Vec::new(),
            custom_fields: Vec::new(),
        }
    }

    /// Attach a custom field to an already declared node.
    pub fn add_custom_field(&mut self, node: &str, field: CustomFieldDef) -> SchemaResult<()> {
        let id = self
            .node_names
            .get(node)
            .copied()
            .ok_or_else(|| SchemaError::InvalidCustomFieldDependency {
                node: node.to_string(),
                field: field.name.clone(),
                reason: format!("node '{}' is not declared", node),
            })?;
        let def = &mut self.nodes[id.index()];
        def.check_custom_field(&field)?;
        def.custom_fields.push(field);
        Ok(())
    }

    /// Build the immutable Schema.
    pub fn build(self) -> SchemaResult<Schema> {
        let targets = self.resolve_edge_targets()?;

        // Foreign-key columns, memoized per (node, edge).
        let mut columns: HashMap<(usize, String), Vec<ReferenceColumn>> = HashMap::new();
        let mut visiting: HashSet<(usize, String)> = HashSet::new();
        for (index, def) in self.nodes.iter().enumerate() {
            for component in def.components.values() {
                if let ComponentDef::Edge(edge) = component {
                    self.edge_columns(
                        &targets,
                        (index, edge.name.clone()),
                        &mut columns,
                        &mut visiting,
                    )?;
                }
            }
        }

        let mut nodes: Vec<Node> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, def)| {
                let components = def
                    .components
                    .values()
                    .map(|component| {
                        let resolved = match component {
                            ComponentDef::Leaf(leaf) => Component::Leaf(leaf.clone()),
                            ComponentDef::Edge(edge) => {
                                let key = (index, edge.name.clone());
                                let (to, reference) = targets[&key];
                                Component::Edge(Edge {
                                    name: edge.name.clone(),
                                    to,
                                    reference,
                                    nullable: edge.nullable,
                                    immutable: edge.immutable,
                                    public: edge.public,
                                    column: edge.column_prefix(),
                                    reference_columns: columns[&key].clone(),
                                })
                            }
                        };
                        (component.name().to_string(), resolved)
                    })
                    .collect();
                let custom_fields = def
                    .custom_fields
                    .iter()
                    .map(|field| {
                        let custom = CustomField {
                            name: field.name.clone(),
                            public: field.public,
                            dependencies: Vec::new(),
                            resolver: field.resolver.clone(),
                        };
                        (field.name.clone(), custom)
                    })
                    .collect();

                Node {
                    id: def.id,
                    name: def.name.clone(),
                    plural: def.plural.clone(),
                    table: def.table.clone(),
                    public: def.public,
                    immutable: def.immutable,
                    components,
                    unique_constraints: def.unique_constraints.clone(),
                    reverse_edges: IndexMap::new(),
                    custom_fields,
                    where_input: WhereInput::empty(def.id),
                    where_unique_input: WhereUniqueInput::new(def.id),
                    order_by_input: OrderByInput::default(),
                }
            })
            .collect();

        self.attach_reverse_edges(&mut nodes)?;

        for node in &mut nodes {
            node.where_input = WhereInput::new(node);
            node.order_by_input = OrderByInput::new(node);
        }

        let mut schema = Schema::new(nodes);
        self.resolve_custom_dependencies(&mut schema)?;

        debug!(
            nodes = schema.node_count(),
            reverse_edges = schema.nodes().map(|n| n.reverse_edges.len()).sum::<usize>(),
            "schema built"
        );
        Ok(schema)
    }

    /// Target node and referenced constraint index of every edge.
    fn resolve_edge_targets(&self) -> SchemaResult<HashMap<(usize, String), (NodeId, usize)>> {
        let mut targets = HashMap::new();
        for (index, def) in self.nodes.iter().enumerate() {
            for component in def.components.values() {
                let ComponentDef::Edge(edge) = component else {
                    continue;
                };
                let to = self.node_names.get(&edge.target).copied().ok_or_else(|| {
                    SchemaError::UnknownEdgeTarget {
                        node: def.name.clone(),
                        edge: edge.name.clone(),
                        target: edge.target.clone(),
                    }
                })?;
                let target = &self.nodes[to.index()];

                let reference = match &edge.reference {
                    None => 0,
                    Some(components) => {
                        let wanted: HashSet<&String> = components.iter().collect();
                        target
                            .unique_constraints
                            .iter()
                            .position(|c| c.components.iter().collect::<HashSet<_>>() == wanted)
                            .ok_or_else(|| SchemaError::UnknownReference {
                                node: def.name.clone(),
                                edge: edge.name.clone(),
                                reference: components.join(", "),
                            })?
                    }
                };

                if to == def.id && target.unique_constraints[reference].contains(&edge.name) {
                    return Err(SchemaError::SelfReferencingEdge {
                        node: def.name.clone(),
                        edge: edge.name.clone(),
                    });
                }

                targets.insert((index, edge.name.clone()), (to, reference));
            }
        }
        Ok(targets)
    }

    /// Foreign-key columns of one edge, resolving nested edges first.
    fn edge_columns(
        &self,
        targets: &HashMap<(usize, String), (NodeId, usize)>,
        key: (usize, String),
        memo: &mut HashMap<(usize, String), Vec<ReferenceColumn>>,
        visiting: &mut HashSet<(usize, String)>,
    ) -> SchemaResult<Vec<ReferenceColumn>> {
        if let Some(columns) = memo.get(&key) {
            return Ok(columns.clone());
        }
        let def = &self.nodes[key.0];
        if !visiting.insert(key.clone()) {
            return Err(SchemaError::ReferenceCycle {
                node: def.name.clone(),
                edge: key.1.clone(),
            });
        }

        let ComponentDef::Edge(edge) = &def.components[&key.1] else {
            unreachable!("edge columns requested for a leaf");
        };
        let (to, reference) = targets[&key];
        let target = &self.nodes[to.index()];
        let prefix = edge.column_prefix();

        // Columns of the referenced constraint, as stored in the target table.
        let mut referenced = Vec::new();
        for name in &target.unique_constraints[reference].components {
            match &target.components[name] {
                ComponentDef::Leaf(leaf) => referenced.push(ReferenceColumn {
                    column: leaf.column.clone(),
                    referenced_column: leaf.column.clone(),
                    path: vec![leaf.name.clone()],
                    leaf_type: leaf.leaf_type.clone(),
                    nullable: leaf.nullable,
                }),
                ComponentDef::Edge(_) => {
                    let nested =
                        self.edge_columns(targets, (to.index(), name.clone()), memo, visiting)?;
                    referenced.extend(nested.into_iter().map(|mut column| {
                        column.path.insert(0, name.clone());
                        column
                    }));
                }
            }
        }

        let columns: Vec<ReferenceColumn> = referenced
            .iter()
            .map(|column| column.through_edge(&prefix, edge.nullable))
            .collect();

        visiting.remove(&key);
        memo.insert(key, columns.clone());
        Ok(columns)
    }

    fn attach_reverse_edges(&self, nodes: &mut [Node]) -> SchemaResult<()> {
        let mut taken: Vec<HashSet<String>> = self
            .nodes
            .iter()
            .map(|def| {
                def.components
                    .keys()
                    .cloned()
                    .chain(def.custom_fields.iter().map(|f| f.name.clone()))
                    .collect()
            })
            .collect();

        for head in &self.nodes {
            for component in head.components.values() {
                let ComponentDef::Edge(edge) = component else {
                    continue;
                };
                let to = self.node_names[&edge.target];
                let unique = head
                    .unique_constraints
                    .iter()
                    .any(|c| c.components.len() == 1 && c.components[0] == edge.name);
                let name = edge.reverse_name.clone().unwrap_or_else(|| {
                    if unique {
                        lower_first(&head.name)
                    } else {
                        lower_first(&head.plural)
                    }
                });
                let reverse_edge = ReverseEdge {
                    name: name.clone(),
                    head: head.id,
                    edge: edge.name.clone(),
                    unique,
                    public: edge.reverse_public && head.public,
                };

                let target_taken = &mut taken[to.index()];
                for field in std::iter::once(name.clone()).chain(reverse_edge.count_name()) {
                    if !target_taken.insert(field.clone()) {
                        return Err(SchemaError::ReverseEdgeCollision {
                            node: self.nodes[to.index()].name.clone(),
                            name: field,
                        });
                    }
                }
                nodes[to.index()].reverse_edges.insert(name, reverse_edge);
            }
        }
        Ok(())
    }

    fn resolve_custom_dependencies(&self, schema: &mut Schema) -> SchemaResult<()> {
        for def in &self.nodes {
            for field in &def.custom_fields {
                let Some(fragment) = &field.depends_on else {
                    continue;
                };
                let invalid = |reason: String| SchemaError::InvalidCustomFieldDependency {
                    node: def.name.clone(),
                    field: field.name.clone(),
                    reason,
                };
                let fragment = parse_fragment(fragment).map_err(|e| invalid(e.to_string()))?;
                let dependencies = schema
                    .node(def.id)
                    .resolve_set(schema, &fragment.selection_set, &Path::root(), false)
                    .map_err(|e| invalid(e.to_string()))?;

                if let Some(custom) = schema.node_mut(def.id).custom_fields.get_mut(&field.name) {
                    custom.dependencies = dependencies;
                }
            }
        }
        Ok(())
    }
}

// ==================== NODE BUILDER ====================

/// Builder for a node declaration.
pub struct NodeBuilder<'a> {
    builder: &'a mut SchemaBuilder,
    name: String,
    plural: Option<String>,
    table: Option<String>,
    public: bool,
    immutable: bool,
    components: Vec<ComponentDef>,
    uniques: Vec<Vec<String>>,
    custom_fields: Vec<CustomFieldDef>,
}

impl<'a> NodeBuilder<'a> {
    pub fn plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn leaf(mut self, leaf: Leaf) -> Self {
        self.components.push(ComponentDef::Leaf(leaf));
        self
    }

    pub fn edge(mut self, edge: EdgeDef) -> Self {
        self.components.push(ComponentDef::Edge(edge));
        self
    }

    /// Declare a unique constraint. The first one is the identifier.
    pub fn unique(mut self, components: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.uniques
            .push(components.into_iter().map(Into::into).collect());
        self
    }

    pub fn custom(mut self, field: CustomFieldDef) -> Self {
        self.custom_fields.push(field);
        self
    }

    /// Finish declaring this node.
    pub fn done(self) -> SchemaResult<NodeId> {
        let name = self.name;

        if !is_valid_node_name(&name) {
            return Err(SchemaError::InvalidNodeName(name));
        }
        if self.builder.node_names.contains_key(&name) {
            return Err(SchemaError::DuplicateNodeName(name));
        }

        let plural = self.plural.unwrap_or_else(|| pluralize(&name));
        if !is_valid_node_name(&plural) || plural == name {
            return Err(SchemaError::InvalidPlural { node: name, plural });
        }

        if self.components.is_empty() {
            return Err(SchemaError::EmptyComponents(name));
        }
        let mut components = IndexMap::new();
        for component in self.components {
            let component_name = component.name().to_string();
            if !is_valid_field_name(&component_name) {
                return Err(SchemaError::InvalidComponentName {
                    node: name,
                    name: component_name,
                });
            }
            if components.contains_key(&component_name) {
                return Err(SchemaError::DuplicateComponent {
                    node: name,
                    name: component_name,
                });
            }
            components.insert(component_name, component);
        }

        let unique_constraints = unique_constraints(&name, &components, self.uniques)?;
        let identifier = &unique_constraints[0];
        if identifier.nullable {
            return Err(SchemaError::NullableIdentifier(name));
        }
        if !identifier.immutable {
            return Err(SchemaError::MutableIdentifier(name));
        }

        let id = NodeId::new(self.builder.nodes.len() as u32);
        let mut def = NodeDef {
            id,
            table: self.table.unwrap_or_else(|| snake_case(&plural)),
            name: name.clone(),
            plural,
            public: self.public,
            immutable: self.immutable,
            components,
            unique_constraints,
            custom_fields: Vec::new(),
        };
        for field in self.custom_fields {
            def.check_custom_field(&field)?;
            def.custom_fields.push(field);
        }

        self.builder.node_names.insert(name, id);
        self.builder.nodes.push(def);
        Ok(id)
    }
}

fn unique_constraints(
    node: &str,
    components: &IndexMap<String, ComponentDef>,
    uniques: Vec<Vec<String>>,
) -> SchemaResult<Vec<UniqueConstraint>> {
    if uniques.is_empty() {
        return Err(SchemaError::MissingIdentifier(node.to_string()));
    }

    let mut constraints: Vec<UniqueConstraint> = Vec::with_capacity(uniques.len());
    for names in uniques {
        if names.is_empty() {
            return Err(SchemaError::EmptyUniqueConstraint(node.to_string()));
        }

        let mut members = Vec::with_capacity(names.len());
        for name in &names {
            let component =
                components
                    .get(name)
                    .ok_or_else(|| SchemaError::UnknownUniqueComponent {
                        node: node.to_string(),
                        component: name.clone(),
                    })?;
            if let ComponentDef::Leaf(leaf) = component {
                if !leaf.supports(LeafOperator::Eq) {
                    return Err(SchemaError::UnfilterableUniqueLeaf {
                        node: node.to_string(),
                        leaf: name.clone(),
                    });
                }
            }
            members.push(component);
        }

        let as_set: HashSet<&String> = names.iter().collect();
        if constraints
            .iter()
            .any(|c| c.components.iter().collect::<HashSet<_>>() == as_set)
        {
            return Err(SchemaError::DuplicateUniqueConstraint {
                node: node.to_string(),
                components: names.join(", "),
            });
        }

        constraints.push(UniqueConstraint {
            nullable: members.iter().all(|c| c.nullable()),
            immutable: members.iter().all(|c| c.immutable()),
            public: members.iter().all(|c| c.public()),
            components: names,
        });
    }
    Ok(constraints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;
    use pretty_assertions::assert_eq;
    use trellis_core::LeafType;

    fn id() -> Leaf {
        Leaf::new("id", LeafType::Id).immutable()
    }

    // ========== TEST: derived names ==========
    #[test]
    fn test_derived_names() {
        // GIVEN the blog schema
        let schema = fixture::blog();

        // WHEN looking at a node declared without overrides
        let category = schema.node_by_name("Category").unwrap();

        // THEN plural and table are derived from the name
        assert_eq!(category.plural(), "Categories");
        assert_eq!(category.table(), "categories");
        assert_eq!(schema.node_by_name("ArticleTag").unwrap().table(), "article_tags");
    }

    // ========== TEST: reverse edges ==========
    #[test]
    fn test_reverse_edges_are_derived() {
        let schema = fixture::blog();
        let article = schema.node_by_name("Article").unwrap();
        let category = schema.node_by_name("Category").unwrap();

        // Explicit names
        let tags = article.reverse_edge("tags").unwrap();
        assert!(!tags.unique);
        assert_eq!(tags.edge, "article");
        assert_eq!(schema.node(tags.head).name(), "ArticleTag");
        assert!(article.reverse_edge("body").unwrap().unique);

        // Default names: plural of the head for to-many reverse edges
        assert!(category.reverse_edge("articles").is_some());
        assert!(category.reverse_edge("categories").is_some());
    }

    // ========== TEST: foreign-key columns ==========
    #[test]
    fn test_reference_columns_flatten_nested_edges() {
        // GIVEN a node referencing ArticleTag through (article, tag)
        let mut builder = fixture::blog_builder().unwrap();
        builder
            .add_node("Highlight")
            .leaf(id())
            .edge(EdgeDef::new("articleTag", "ArticleTag").references(["article", "tag"]))
            .unique(["id"])
            .done()
            .unwrap();

        // WHEN built
        let schema = builder.build().unwrap();

        // THEN the edge has one column per leaf reached through the reference
        let edge = schema
            .node_by_name("Highlight")
            .unwrap()
            .edge("articleTag")
            .unwrap();
        let columns: Vec<(&str, &str)> = edge
            .reference_columns
            .iter()
            .map(|c| (c.column.as_str(), c.referenced_column.as_str()))
            .collect();
        assert_eq!(
            columns,
            vec![
                ("article_tag_article_id", "article_id"),
                ("article_tag_tag_id", "tag_id")
            ]
        );
        assert_eq!(edge.reference_columns[0].path, vec!["article", "id"]);
    }

    // ========== TEST: unique constraint flags ==========
    #[test]
    fn test_unique_constraint_flags() {
        let schema = fixture::blog();
        let user = schema.node_by_name("User").unwrap();

        let identifier = user.identifier();
        assert!(!identifier.nullable);
        assert!(identifier.immutable);

        let email = &user.unique_constraints()[1];
        assert_eq!(email.components, vec!["email"]);
        assert!(!email.immutable);
    }

    // ========== TEST: custom field dependencies ==========
    #[test]
    fn test_custom_field_dependencies_are_parsed() {
        let schema = fixture::blog();
        let category = schema.node_by_name("Category").unwrap();
        let has_parent = category.custom_field("hasParent").unwrap();
        assert_eq!(has_parent.dependencies.len(), 1);
        assert_eq!(has_parent.dependencies[0].name(), "parent");
    }

    // ========== TEST: configuration errors ==========
    #[test]
    fn test_duplicate_node_name() {
        let mut builder = SchemaBuilder::new();
        builder.add_node("Tag").leaf(id()).unique(["id"]).done().unwrap();

        let result = builder.add_node("Tag").leaf(id()).unique(["id"]).done();

        assert!(matches!(result, Err(SchemaError::DuplicateNodeName(n)) if n == "Tag"));
    }

    #[test]
    fn test_invalid_names() {
        let mut builder = SchemaBuilder::new();
        assert!(matches!(
            builder.add_node("tag").leaf(id()).unique(["id"]).done(),
            Err(SchemaError::InvalidNodeName(_))
        ));
        assert!(matches!(
            builder.add_node("Sheep").plural("Sheep").leaf(id()).unique(["id"]).done(),
            Err(SchemaError::InvalidPlural { .. })
        ));
        assert!(matches!(
            builder
                .add_node("Tag")
                .leaf(id())
                .leaf(Leaf::new("created_at", LeafType::DateTime))
                .unique(["id"])
                .done(),
            Err(SchemaError::InvalidComponentName { .. })
        ));
    }

    #[test]
    fn test_identifier_rules() {
        let mut builder = SchemaBuilder::new();
        assert!(matches!(
            builder.add_node("Tag").leaf(id()).done(),
            Err(SchemaError::MissingIdentifier(_))
        ));
        assert!(matches!(
            builder
                .add_node("Tag")
                .leaf(id().nullable())
                .unique(["id"])
                .done(),
            Err(SchemaError::NullableIdentifier(_))
        ));
        assert!(matches!(
            builder
                .add_node("Tag")
                .leaf(Leaf::new("id", LeafType::Id))
                .unique(["id"])
                .done(),
            Err(SchemaError::MutableIdentifier(_))
        ));
        assert!(matches!(
            builder
                .add_node("Tag")
                .leaf(id())
                .leaf(Leaf::new("meta", LeafType::Json))
                .unique(["id"])
                .unique(["meta"])
                .done(),
            Err(SchemaError::UnfilterableUniqueLeaf { .. })
        ));
        assert!(matches!(
            builder
                .add_node("Tag")
                .leaf(id())
                .unique(["id"])
                .unique(["name"])
                .done(),
            Err(SchemaError::UnknownUniqueComponent { .. })
        ));
    }

    #[test]
    fn test_unknown_edge_target() {
        let mut builder = SchemaBuilder::new();
        builder
            .add_node("Article")
            .leaf(id())
            .edge(EdgeDef::new("author", "Writer"))
            .unique(["id"])
            .done()
            .unwrap();

        let result = builder.build();

        assert!(matches!(
            result,
            Err(SchemaError::UnknownEdgeTarget { target, .. }) if target == "Writer"
        ));
    }

    #[test]
    fn test_unknown_reference() {
        let mut builder = SchemaBuilder::new();
        builder.add_node("User").leaf(id()).unique(["id"]).done().unwrap();
        builder
            .add_node("Article")
            .leaf(id())
            .edge(EdgeDef::new("author", "User").references(["email"]))
            .unique(["id"])
            .done()
            .unwrap();

        assert!(matches!(
            builder.build(),
            Err(SchemaError::UnknownReference { .. })
        ));
    }

    #[test]
    fn test_self_referencing_edge() {
        let mut builder = SchemaBuilder::new();
        builder
            .add_node("Category")
            .leaf(id())
            .edge(
                EdgeDef::new("parent", "Category")
                    .nullable()
                    .references(["parent"]),
            )
            .unique(["id"])
            .unique(["parent"])
            .done()
            .unwrap();

        assert!(matches!(
            builder.build(),
            Err(SchemaError::SelfReferencingEdge { .. })
        ));
    }

    #[test]
    fn test_reference_cycle() {
        // GIVEN A.b references B by (a) and B.a references A by (b)
        let mut builder = SchemaBuilder::new();
        builder
            .add_node("Alpha")
            .leaf(id())
            .edge(EdgeDef::new("beta", "Beta").references(["alpha"]).reverse("fromAlpha"))
            .unique(["id"])
            .unique(["beta"])
            .done()
            .unwrap();
        builder
            .add_node("Beta")
            .leaf(id())
            .edge(EdgeDef::new("alpha", "Alpha").references(["beta"]).reverse("fromBeta"))
            .unique(["id"])
            .unique(["alpha"])
            .done()
            .unwrap();

        // WHEN built
        let result = builder.build();

        // THEN the cycle is reported
        assert!(matches!(result, Err(SchemaError::ReferenceCycle { .. })));
    }

    #[test]
    fn test_reverse_edge_collision() {
        // GIVEN two edges to User whose reverse edges share a name
        let mut builder = SchemaBuilder::new();
        builder.add_node("User").leaf(id()).unique(["id"]).done().unwrap();
        builder
            .add_node("Article")
            .leaf(id())
            .edge(EdgeDef::new("author", "User"))
            .edge(EdgeDef::new("editor", "User"))
            .unique(["id"])
            .done()
            .unwrap();

        // WHEN built
        let result = builder.build();

        // THEN the second reverse edge collides
        assert!(matches!(
            result,
            Err(SchemaError::ReverseEdgeCollision { node, name }) if node == "User" && name == "articles"
        ));
    }

    #[test]
    fn test_custom_field_cannot_depend_on_custom_fields() {
        let mut builder = SchemaBuilder::new();
        builder
            .add_node("Tag")
            .leaf(id())
            .unique(["id"])
            .custom(CustomFieldDef::new("a", |_| Value::Null))
            .custom(CustomFieldDef::new("b", |_| Value::Null).depends_on("{ a }"))
            .done()
            .unwrap();

        assert!(matches!(
            builder.build(),
            Err(SchemaError::InvalidCustomFieldDependency { field, .. }) if field == "b"
        ));
    }
}

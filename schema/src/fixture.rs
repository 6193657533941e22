//! Blog schema shared by the unit tests of this and the downstream crates.
//!
//! The nodes are declared in `fixtures/blog.json`; the custom fields carry
//! code and are attached here.

use crate::{CustomFieldDef, FieldValue, Schema, SchemaBuilder, SchemaConfig, SchemaResult};
use trellis_core::Value;

pub const BLOG_CONFIG: &str = include_str!("../fixtures/blog.json");

/// The blog nodes and custom fields, not yet built.
pub fn blog_builder() -> SchemaResult<SchemaBuilder> {
    let config = SchemaConfig::from_json(BLOG_CONFIG)?;
    let mut builder = SchemaBuilder::from_config(&config)?;

    builder.add_custom_field(
        "Category",
        CustomFieldDef::new("hasParent", |category| {
            Value::Bool(matches!(category.get("parent"), Some(FieldValue::Exists(true))))
        })
        .depends_on("{ parent }"),
    )?;
    builder.add_custom_field(
        "Article",
        CustomFieldDef::new("headline", |article| {
            let title = article.leaf("title").and_then(Value::as_str).unwrap_or_default();
            match article.leaf("format").and_then(Value::as_str) {
                Some(format) => Value::String(format!("{} [{}]", title, format)),
                None => Value::String(title.to_string()),
            }
        })
        .depends_on("{ title format }"),
    )?;

    Ok(builder)
}

pub fn blog() -> Schema {
    blog_builder()
        .and_then(SchemaBuilder::build)
        .expect("blog fixture builds")
}

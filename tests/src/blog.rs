//! The blog schema every scenario runs against.

use trellis_schema::{fixture, Schema, SchemaBuilder, SchemaResult};

pub fn blog() -> SchemaResult<Schema> {
    fixture::blog_builder().and_then(SchemaBuilder::build)
}

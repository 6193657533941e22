//! Value conversion utilities.

use serde_json::{json, Value as Json};
use trellis_core::Value;
use trellis_schema::{FieldValue, NodeValue};

/// Client-facing JSON form of a reconstructed value, for comparisons
/// against `json!` literals.
pub trait ToJson {
    fn to_json(&self) -> Json;
}

impl ToJson for Value {
    fn to_json(&self) -> Json {
        Json::from(self)
    }
}

impl ToJson for FieldValue {
    fn to_json(&self) -> Json {
        match self {
            FieldValue::Leaf(value) => value.to_json(),
            FieldValue::Node(Some(node)) => node.to_json(),
            FieldValue::Node(None) => Json::Null,
            FieldValue::Exists(exists) => Json::Bool(*exists),
            FieldValue::Count(count) => Json::from(*count),
            FieldValue::Deferred(deferred) => json!({
                "deferred": deferred.reverse_edge,
                "parent": deferred.parent.to_json(),
            }),
        }
    }
}

impl ToJson for NodeValue {
    fn to_json(&self) -> Json {
        Json::Object(
            self.iter()
                .map(|(key, value)| (key.to_string(), value.to_json()))
                .collect(),
        )
    }
}

impl<T: ToJson> ToJson for [T] {
    fn to_json(&self) -> Json {
        Json::Array(self.iter().map(ToJson::to_json).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trellis_core::{LeafType, Path};

    #[test]
    fn test_leaf_values_use_the_client_codec() {
        for (leaf, raw) in [
            (LeafType::DateTime, json!("2024-03-01T10:30:00.100Z")),
            (LeafType::Date, json!("2024-03-01")),
            (LeafType::Float, json!(1e20)),
            (LeafType::Json, json!({ "theme": "dark" })),
        ] {
            let value = leaf.parse_value(&raw, &Path::root()).unwrap();
            assert_eq!(value.to_json(), leaf.serialize_value(&value));
            assert_eq!(value.to_json(), raw);
        }
    }
}

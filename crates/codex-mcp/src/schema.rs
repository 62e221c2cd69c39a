//! JSON Schema normalization for MCP tool descriptors.
//!
//! schemars emits a draft-2020-12 document with root metadata and
//! `["T", "null"]` type arrays for optional fields. MCP clients get the
//! plain `{type, properties, required}` object instead; optionality is
//! carried by `required` alone.

use rmcp::model::JsonObject;
use schemars::JsonSchema;
use serde_json::Value;

/// Root keys that describe the Rust type rather than the tool input.
const ROOT_METADATA: [&str; 3] = ["$schema", "title", "description"];

/// Schema transformer for MCP client compatibility.
pub struct SchemaTransformer;

impl SchemaTransformer {
    /// Generate the normalized input schema for a parameter type.
    pub fn input_schema<T: JsonSchema>() -> JsonObject {
        match Self::transform(schemars::schema_for!(T).to_value()) {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        }
    }

    /// Strip root metadata, then collapse nullable type arrays.
    pub fn transform(schema: Value) -> Value {
        Self::collapse_nullable_types(Self::strip_root_metadata(schema))
    }

    fn strip_root_metadata(mut schema: Value) -> Value {
        if let Some(obj) = schema.as_object_mut() {
            for key in ROOT_METADATA {
                obj.remove(key);
            }
        }
        schema
    }

    /// Replace `"type": ["X", "null"]` with `"type": "X"` everywhere.
    fn collapse_nullable_types(mut schema: Value) -> Value {
        Self::collapse_in_value(&mut schema);
        schema
    }

    fn collapse_in_value(value: &mut Value) {
        match value {
            Value::Object(obj) => {
                let collapsed = match obj.get("type") {
                    Some(Value::Array(types)) if types.len() == 2 => {
                        let non_null: Vec<&Value> =
                            types.iter().filter(|t| t.as_str() != Some("null")).collect();
                        match non_null.as_slice() {
                            [only] => Some((*only).clone()),
                            _ => None,
                        }
                    }
                    _ => None,
                };
                if let Some(single) = collapsed {
                    obj.insert("type".to_string(), single);
                }
                for nested in obj.values_mut() {
                    Self::collapse_in_value(nested);
                }
            }
            Value::Array(arr) => {
                for item in arr {
                    Self::collapse_in_value(item);
                }
            }
            _ => {}
        }
    }
}

use std::sync::Arc;

use serde_json::Value;

use crate::document::{Field, FieldLocation};
use crate::lookup::{lookup, lookup_str};
use crate::path;
use crate::schema::{Definitions, SchemaNode, SchemaOrRef};

/// Convert one raw parameter (or header-like object) into a [`Field`].
///
/// Missing or malformed entries leave the matching field empty; `required`
/// defaults to `false`.
pub fn extract_field(parameter: &Value, definitions: &Definitions) -> Field {
    let owned = |key: &str| lookup_str(parameter, &path![key]).map(str::to_string);

    Field {
        name: owned("name"),
        location: lookup_str(parameter, &path!["in"]).and_then(FieldLocation::from_token),
        description: owned("description"),
        required: lookup(parameter, &path!["required"])
            .and_then(Value::as_bool)
            .unwrap_or(false),
        schema: lookup(parameter, &path!["schema"])
            .and_then(SchemaOrRef::from_value)
            .and_then(|schema| resolve_schema(schema, definitions)),
        example: lookup(parameter, &path!["example"]).cloned(),
    }
}

/// A `$ref` resolves to the shared registry entry; an inline schema becomes a
/// fresh node.
pub(crate) fn resolve_schema(
    schema: SchemaOrRef,
    definitions: &Definitions,
) -> Option<Arc<SchemaNode>> {
    match schema {
        SchemaOrRef::Ref(key) => {
            let found = definitions.get(&key).cloned();
            if found.is_none() {
                log::debug!("schema reference {key} is not defined");
            }
            found
        }
        SchemaOrRef::Schema(node) => Some(Arc::new(node)),
    }
}

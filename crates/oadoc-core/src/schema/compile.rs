use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::{
    ArrayConstraints, NumberConstraints, ObjectConstraints, SchemaKind, SchemaNode,
    StringConstraints,
};

const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "additionalProperties",
    "required",
    "minProperties",
    "maxProperties",
];
const ARRAY_KEYWORDS: &[&str] = &["items", "additionalItems", "minItems", "maxItems", "uniqueItems"];
const STRING_KEYWORDS: &[&str] = &["minLength", "maxLength", "pattern"];
const NUMBER_KEYWORDS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
];

/// Compile a raw JSON Schema value into a [`SchemaNode`].
///
/// Compilation is total: shapes it does not understand compile to
/// [`SchemaKind::Any`]. `$ref` compiles to a [`SchemaKind::Reference`] holding
/// only the key, so sibling and self references need no ordering.
pub fn compile(raw: &Value) -> SchemaNode {
    match raw {
        Value::Bool(true) => SchemaNode::new(SchemaKind::Any),
        Value::Bool(false) => SchemaNode::new(SchemaKind::Never),
        Value::Object(map) => compile_object(map),
        _ => SchemaNode::new(SchemaKind::Any),
    }
}

fn compile_object(map: &Map<String, Value>) -> SchemaNode {
    if let Some(key) = map.get("$ref").and_then(Value::as_str) {
        return SchemaNode::new(SchemaKind::Reference {
            key: key.to_string(),
        });
    }

    let mut nullable = map.get("nullable").and_then(Value::as_bool).unwrap_or(false);
    let mut constraints = Vec::new();

    if let Some(node) = compile_types(map, &mut nullable) {
        constraints.push(node);
    }
    if let Some(values) = map.get("enum").and_then(Value::as_array) {
        constraints.push(SchemaNode::new(SchemaKind::Enum {
            values: values.clone(),
        }));
    }
    if let Some(value) = map.get("const") {
        constraints.push(SchemaNode::new(SchemaKind::Const {
            value: value.clone(),
        }));
    }
    if let Some(nodes) = compile_list(map, "allOf") {
        constraints.push(SchemaNode::new(SchemaKind::AllOf { nodes }));
    }
    if let Some(nodes) = compile_list(map, "anyOf") {
        constraints.push(SchemaNode::new(SchemaKind::AnyOf { nodes }));
    }
    if let Some(nodes) = compile_list(map, "oneOf") {
        constraints.push(SchemaNode::new(SchemaKind::OneOf { nodes }));
    }
    if let Some(not) = map.get("not") {
        constraints.push(SchemaNode::new(SchemaKind::Not {
            node: Box::new(compile(not)),
        }));
    }
    if let Some(condition) = map.get("if") {
        constraints.push(SchemaNode::new(SchemaKind::IfThenElse {
            condition: Box::new(compile(condition)),
            then: map.get("then").map(|v| Box::new(compile(v))),
            otherwise: map.get("else").map(|v| Box::new(compile(v))),
        }));
    }

    let mut node = match constraints.len() {
        0 => SchemaNode::new(SchemaKind::Any),
        1 => constraints.remove(0),
        _ => SchemaNode::new(SchemaKind::AllOf { nodes: constraints }),
    };

    node.title = string_of(map, "title");
    node.description = string_of(map, "description");
    node.default_value = map.get("default").cloned();
    node.nullable = nullable;
    node
}

/// The type constraint of a schema, or `None` when it places none.
///
/// Without an explicit `type`, the types are inferred from the
/// type-specific keywords present. `"null"` folds into `nullable`.
fn compile_types(map: &Map<String, Value>, nullable: &mut bool) -> Option<SchemaNode> {
    let mut types: Vec<&str> = match map.get("type") {
        Some(Value::String(single)) => vec![single.as_str()],
        Some(Value::Array(many)) => many.iter().filter_map(Value::as_str).collect(),
        _ => inferred_types(map),
    };

    if types.contains(&"null") {
        types.retain(|t| *t != "null");
        if types.is_empty() {
            return Some(SchemaNode::new(SchemaKind::Null));
        }
        *nullable = true;
    }

    let mut nodes: Vec<SchemaNode> = types
        .into_iter()
        .filter_map(|t| compile_type(t, map))
        .map(SchemaNode::new)
        .collect();

    match nodes.len() {
        0 => None,
        1 => nodes.pop(),
        _ => Some(SchemaNode::new(SchemaKind::AnyOf { nodes })),
    }
}

fn inferred_types(map: &Map<String, Value>) -> Vec<&'static str> {
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| map.contains_key(*k));
    let mut types = Vec::new();
    if has_any(OBJECT_KEYWORDS) {
        types.push("object");
    }
    if has_any(ARRAY_KEYWORDS) {
        types.push("array");
    }
    if has_any(STRING_KEYWORDS) {
        types.push("string");
    }
    if has_any(NUMBER_KEYWORDS) {
        types.push("number");
    }
    types
}

fn compile_type(type_name: &str, map: &Map<String, Value>) -> Option<SchemaKind> {
    let kind = match type_name {
        "string" => SchemaKind::String(StringConstraints {
            format: string_of(map, "format"),
            min_length: u64_of(map, "minLength"),
            max_length: u64_of(map, "maxLength"),
            pattern: string_of(map, "pattern"),
        }),
        "integer" => SchemaKind::Integer(number_constraints(map)),
        "number" => SchemaKind::Number(number_constraints(map)),
        "boolean" => SchemaKind::Boolean,
        "array" => SchemaKind::Array(array_constraints(map)),
        "object" => SchemaKind::Object(object_constraints(map)),
        _ => return None,
    };
    Some(kind)
}

fn number_constraints(map: &Map<String, Value>) -> NumberConstraints {
    let mut minimum = f64_of(map, "minimum");
    let mut maximum = f64_of(map, "maximum");

    // OpenAPI 3.0 spells exclusive bounds as booleans qualifying minimum/maximum.
    let exclusive_minimum = match map.get("exclusiveMinimum") {
        Some(Value::Bool(true)) => minimum.take(),
        Some(other) => other.as_f64(),
        None => None,
    };
    let exclusive_maximum = match map.get("exclusiveMaximum") {
        Some(Value::Bool(true)) => maximum.take(),
        Some(other) => other.as_f64(),
        None => None,
    };

    NumberConstraints {
        format: string_of(map, "format"),
        minimum,
        maximum,
        exclusive_minimum,
        exclusive_maximum,
        multiple_of: f64_of(map, "multipleOf"),
    }
}

fn array_constraints(map: &Map<String, Value>) -> ArrayConstraints {
    let (items, prefix_items) = match map.get("items") {
        Some(Value::Array(positional)) => (None, positional.iter().map(compile).collect()),
        Some(single) => (Some(Box::new(compile(single))), Vec::new()),
        None => (None, Vec::new()),
    };

    ArrayConstraints {
        items,
        prefix_items,
        additional_items: map.get("additionalItems").map(|v| Box::new(compile(v))),
        min_items: u64_of(map, "minItems"),
        max_items: u64_of(map, "maxItems"),
        unique_items: map
            .get("uniqueItems")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

fn object_constraints(map: &Map<String, Value>) -> ObjectConstraints {
    ObjectConstraints {
        properties: compile_map(map, "properties"),
        pattern_properties: compile_map(map, "patternProperties"),
        additional_properties: match map.get("additionalProperties") {
            None | Some(Value::Bool(true)) => None,
            Some(other) => Some(Box::new(compile(other))),
        },
        required: map
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        min_properties: u64_of(map, "minProperties"),
        max_properties: u64_of(map, "maxProperties"),
    }
}

fn compile_list(map: &Map<String, Value>, key: &str) -> Option<Vec<SchemaNode>> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(compile).collect())
}

fn compile_map(map: &Map<String, Value>, key: &str) -> IndexMap<String, SchemaNode> {
    match map.get(key) {
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(name, raw)| (name.clone(), compile(raw)))
            .collect(),
        _ => IndexMap::new(),
    }
}

fn string_of(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn u64_of(map: &Map<String, Value>, key: &str) -> Option<u64> {
    map.get(key).and_then(Value::as_u64)
}

fn f64_of(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

pub mod compile;
pub mod definitions;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

pub use compile::compile;
pub use definitions::Definitions;

/// Prefix of every registry key built from `components.schemas`.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// A compiled JSON Schema node.
///
/// Nodes never inline the schemas they reference: a `$ref` compiles to
/// [`SchemaKind::Reference`] and is resolved through [`Definitions`] on use.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SchemaNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,

    #[serde(flatten)]
    pub kind: SchemaKind,
}

impl SchemaNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// The registry key this node points at, if it is a reference.
    pub fn reference(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Reference { key } => Some(key),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaKind {
    /// Accepts any value (`true`, `{}`).
    #[default]
    Any,
    /// Accepts nothing (`false`).
    Never,
    Reference {
        #[serde(rename = "$ref")]
        key: String,
    },
    String(StringConstraints),
    Integer(NumberConstraints),
    Number(NumberConstraints),
    Boolean,
    Null,
    Array(ArrayConstraints),
    Object(ObjectConstraints),
    Enum {
        values: Vec<Value>,
    },
    Const {
        value: Value,
    },
    AllOf {
        nodes: Vec<SchemaNode>,
    },
    AnyOf {
        nodes: Vec<SchemaNode>,
    },
    OneOf {
        nodes: Vec<SchemaNode>,
    },
    Not {
        node: Box<SchemaNode>,
    },
    IfThenElse {
        condition: Box<SchemaNode>,
        #[serde(skip_serializing_if = "Option::is_none")]
        then: Option<Box<SchemaNode>>,
        #[serde(rename = "else", skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<SchemaNode>>,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StringConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NumberConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ArrayConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    /// Positional item schemas (`items: [..]`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prefix_items: Vec<SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_items: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ObjectConstraints {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub pattern_properties: IndexMap<String, SchemaNode>,
    /// `None` allows any additional property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
}

/// A raw schema position discriminated once: either a `$ref` key or an
/// inline schema compiled on the spot.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaOrRef {
    Ref(String),
    Schema(SchemaNode),
}

impl SchemaOrRef {
    /// A mapping holding a string `$ref` is a reference; any other mapping or
    /// a boolean is an inline schema. Other shapes carry no schema.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => match map.get("$ref").and_then(Value::as_str) {
                Some(key) => Some(SchemaOrRef::Ref(key.to_string())),
                None => Some(SchemaOrRef::Schema(compile(value))),
            },
            Value::Bool(_) => Some(SchemaOrRef::Schema(compile(value))),
            _ => None,
        }
    }
}

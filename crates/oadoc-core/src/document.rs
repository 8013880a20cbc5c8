use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::schema::{Definitions, SchemaNode};

/// HTTP method of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Every method, in the order path items are scanned.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Parse a path-item key. Only the lower-case OpenAPI tokens are methods.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.token() == token)
    }

    /// The path-item key for this method (`"get"`).
    pub fn token(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a field's value travels in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldLocation {
    Query,
    Header,
    Path,
    Cookie,
    Body,
}

impl FieldLocation {
    /// Parse a parameter `in` value.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "query" => Some(FieldLocation::Query),
            "header" => Some(FieldLocation::Header),
            "path" => Some(FieldLocation::Path),
            "cookie" => Some(FieldLocation::Cookie),
            "body" => Some(FieldLocation::Body),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldLocation::Query => "query",
            FieldLocation::Header => "header",
            FieldLocation::Path => "path",
            FieldLocation::Cookie => "cookie",
            FieldLocation::Body => "body",
        }
    }
}

/// One input of a link: a parameter or the request body.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Field {
    pub name: Option<String>,
    pub location: Option<FieldLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Arc<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// One documented operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl Link {
    /// The request-body field, if the link takes one.
    pub fn body_field(&self) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.location == Some(FieldLocation::Body))
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.as_deref() == Some(name))
    }
}

/// Links sharing one tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: String,
    pub title: String,
    #[serde(serialize_with = "tagged_links")]
    pub content: Vec<Link>,
}

/// Section links carry the same `type` tag as top-level ones.
fn tagged_links<S: Serializer>(links: &[Link], serializer: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    #[serde(tag = "type", rename_all = "lowercase")]
    enum Tagged<'a> {
        Link(&'a Link),
    }

    serializer.collect_seq(links.iter().map(Tagged::Link))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Link(Link),
    Section(Section),
}

/// The documentation model of one OpenAPI document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    pub content: Vec<ContentItem>,
    /// Named schemas that reference nodes inside fields resolve against.
    #[serde(skip_serializing_if = "Definitions::is_empty")]
    pub definitions: Definitions,
}

impl Document {
    /// Every link: top-level ones first, then each section's in order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.content.iter().flat_map(|item| match item {
            ContentItem::Link(link) => std::slice::from_ref(link).iter(),
            ContentItem::Section(section) => section.content.iter(),
        })
    }

    /// Links that belong to no section.
    pub fn top_level_links(&self) -> impl Iterator<Item = &Link> {
        self.content.iter().filter_map(|item| match item {
            ContentItem::Link(link) => Some(link),
            ContentItem::Section(_) => None,
        })
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.content.iter().filter_map(|item| match item {
            ContentItem::Section(section) => Some(section),
            ContentItem::Link(_) => None,
        })
    }

    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links().find(|link| link.name == name)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections().find(|section| section.name == name)
    }
}

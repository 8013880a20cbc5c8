//! The extraction pipeline: raw OpenAPI value tree in, [`Document`] out.
//!
//! Every stage tolerates missing or mistyped data. Nothing here returns an
//! error; operations that cannot be named are dropped.

pub mod content;
pub mod field;
pub mod link;
pub mod naming;
pub mod urls;

use serde_json::Value;

use crate::config::LoadOptions;
use crate::document::Document;
use crate::lookup::lookup_str;
use crate::path;
use crate::schema::Definitions;

pub use content::extract_content;
pub use field::extract_field;
pub use link::extract_link;
pub use naming::{slugify, titlecase};

/// Extract the documentation model of a decoded OpenAPI document.
pub fn load(data: &Value) -> Document {
    load_with_options(data, &LoadOptions::default())
}

/// Extract with explicit options.
pub fn load_with_options(data: &Value, options: &LoadOptions) -> Document {
    let info = |key: &str| lookup_str(data, &path!["info", key]).map(str::to_string);

    let base_url = options
        .base_url
        .clone()
        .or_else(|| lookup_str(data, &path!["servers", 0, "url"]).map(str::to_string));

    // Phase 1: named schemas
    let definitions = Definitions::from_document(data);

    // Phase 2: links and sections
    let content = extract_content(data, base_url.as_deref(), &definitions);

    Document {
        title: info("title"),
        description: info("description"),
        version: info("version"),
        url: base_url,
        product: info("product"),
        content,
        definitions,
    }
}

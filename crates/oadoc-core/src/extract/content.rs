use indexmap::IndexMap;
use serde_json::Value;

use super::link::extract_link;
use super::naming::{slugify, titlecase};
use crate::document::{ContentItem, HttpMethod, Link, Section};
use crate::lookup::{lookup, lookup_str};
use crate::path;
use crate::schema::Definitions;

/// Walk `paths` and lay out every extractable operation: untagged links in
/// traversal order, then one section per first tag in first-seen order.
pub fn extract_content(
    data: &Value,
    base_url: Option<&str>,
    definitions: &Definitions,
) -> Vec<ContentItem> {
    let mut untagged: Vec<Link> = Vec::new();
    let mut by_tag: IndexMap<String, Vec<Link>> = IndexMap::new();

    let Some(Value::Object(paths)) = lookup(data, &path!["paths"]) else {
        return Vec::new();
    };

    for (path, path_item) in paths {
        let Value::Object(entries) = path_item else {
            continue;
        };

        for (key, operation) in entries {
            let Some(method) = HttpMethod::from_token(key) else {
                continue;
            };
            let Some(link) =
                extract_link(base_url, path, path_item, method, operation, definitions)
            else {
                continue;
            };

            match lookup_str(operation, &path!["tags", 0]) {
                Some(tag) => by_tag.entry(tag.to_string()).or_default().push(link),
                None => untagged.push(link),
            }
        }
    }

    let sections = by_tag.into_iter().map(|(tag, content)| {
        ContentItem::Section(Section {
            name: slugify(&tag),
            title: titlecase(&tag),
            content,
        })
    });

    untagged
        .into_iter()
        .map(ContentItem::Link)
        .chain(sections)
        .collect()
}

use serde_json::Value;

use super::field::{extract_field, resolve_schema};
use super::naming::slugify_opt;
use super::urls::join_url;
use crate::document::{Field, FieldLocation, HttpMethod, Link};
use crate::lookup::{extensions, lookup, lookup_str};
use crate::path;
use crate::schema::{Definitions, SchemaOrRef};

/// The only request-body media type that yields a body field.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Convert one operation of a path item into a [`Link`].
///
/// Returns `None` when the operation has neither a usable `operationId` nor a
/// summary that slugifies to something non-empty.
pub fn extract_link(
    base_url: Option<&str>,
    path: &str,
    path_item: &Value,
    method: HttpMethod,
    operation: &Value,
    definitions: &Definitions,
) -> Option<Link> {
    let title = lookup_str(operation, &path!["summary"]);
    let Some(name) = link_name(operation, title) else {
        log::debug!("skipping {method} {path}: no operationId and no usable summary");
        return None;
    };

    // Path-level servers override the document, operation-level override both.
    let base_url = lookup_str(operation, &path!["servers", 0, "url"])
        .or_else(|| lookup_str(path_item, &path!["servers", 0, "url"]))
        .or(base_url);

    let mut fields: Vec<Field> = parameters(path_item)
        .chain(parameters(operation))
        .map(|parameter| extract_field(parameter, definitions))
        .collect();

    let body = body_field(operation, definitions);
    let encoding = body.as_ref().map(|_| JSON_MEDIA_TYPE.to_string());
    fields.extend(body);

    let url = join_url(base_url, path);
    log::trace!("extracted link {name}: {method} {url}");

    Some(Link {
        name,
        url,
        method,
        title: title.map(str::to_string),
        description: lookup_str(operation, &path!["description"]).map(str::to_string),
        fields,
        encoding,
    })
}

fn link_name(operation: &Value, summary: Option<&str>) -> Option<String> {
    match lookup_str(operation, &path!["operationId"]) {
        Some(id) if !id.trim().is_empty() => Some(id.to_string()),
        _ => slugify_opt(summary).filter(|slug| !slug.is_empty()),
    }
}

fn parameters(owner: &Value) -> impl Iterator<Item = &Value> {
    lookup(owner, &path!["parameters"])
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// The body field from `requestBody.content["application/json"].schema`.
///
/// A referenced schema names the field after the last segment of its key,
/// lower-cased; an inline one is called `body`. `requestBody["x-name"]`
/// overrides both.
fn body_field(operation: &Value, definitions: &Definitions) -> Option<Field> {
    let request_body = lookup(operation, &path!["requestBody"])?;
    let raw_schema = lookup(request_body, &path!["content", JSON_MEDIA_TYPE, "schema"])
        .filter(|raw| is_non_empty_mapping(raw))?;
    let schema_or_ref = SchemaOrRef::from_value(raw_schema)?;

    let derived_name = match &schema_or_ref {
        SchemaOrRef::Ref(key) => key.rsplit('/').next().unwrap_or(key).to_lowercase(),
        SchemaOrRef::Schema(_) => "body".to_string(),
    };
    let name = extensions(request_body)
        .get("x-name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or(derived_name);

    Some(Field {
        name: Some(name),
        location: Some(FieldLocation::Body),
        description: lookup_str(request_body, &path!["description"]).map(str::to_string),
        required: lookup(request_body, &path!["required"])
            .and_then(Value::as_bool)
            .unwrap_or(false),
        schema: resolve_schema(schema_or_ref, definitions),
        example: lookup(request_body, &path!["content", JSON_MEDIA_TYPE, "example"]).cloned(),
    })
}

fn is_non_empty_mapping(value: &Value) -> bool {
    matches!(value, Value::Object(map) if !map.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;

    fn definitions() -> Definitions {
        Definitions::from_document(&json!({
            "components": {"schemas": {"Pet": {"type": "object"}}}
        }))
    }

    fn link(operation: Value) -> Option<Link> {
        extract_link(
            Some("https://a/"),
            "/pets",
            &json!({}),
            HttpMethod::Post,
            &operation,
            &definitions(),
        )
    }

    #[test]
    fn test_operation_id_names_link() {
        let link = link(json!({"operationId": "createPet", "summary": "Create a pet"})).unwrap();
        assert_eq!(link.name, "createPet");
        assert_eq!(link.title.as_deref(), Some("Create a pet"));
        assert_eq!(link.url, "https://a/pets");
        assert_eq!(link.method, HttpMethod::Post);
        assert!(link.encoding.is_none());
    }

    #[test]
    fn test_summary_slug_names_link() {
        let link = link(json!({"summary": "Create a Pet!"})).unwrap();
        assert_eq!(link.name, "create_a_pet");
    }

    #[test]
    fn test_blank_operation_id_falls_back_to_summary() {
        let link = link(json!({"operationId": "  ", "summary": "Create"})).unwrap();
        assert_eq!(link.name, "create");
    }

    #[test]
    fn test_unnamed_operation_is_skipped() {
        assert!(link(json!({})).is_none());
        assert!(link(json!({"summary": "   "})).is_none());
        assert!(link(json!({"summary": "!!!"})).is_none());
    }

    #[test]
    fn test_server_precedence() {
        let path_item = json!({"servers": [{"url": "https://b/"}]});
        let operation = json!({"operationId": "op", "servers": [{"url": "https://c/"}]});
        let defs = Definitions::new();

        let link = extract_link(Some("https://a/"), "/x", &path_item, HttpMethod::Get, &operation, &defs)
            .unwrap();
        assert_eq!(link.url, "https://c/x");

        let link = extract_link(
            Some("https://a/"),
            "/x",
            &path_item,
            HttpMethod::Get,
            &json!({"operationId": "op"}),
            &defs,
        )
        .unwrap();
        assert_eq!(link.url, "https://b/x");

        let link = extract_link(
            Some("https://a/"),
            "/x",
            &json!({"servers": []}),
            HttpMethod::Get,
            &json!({"operationId": "op"}),
            &defs,
        )
        .unwrap();
        assert_eq!(link.url, "https://a/x");
    }

    #[test]
    fn test_parameters_concatenate_path_first() {
        let path_item = json!({"parameters": [
            {"name": "a", "in": "path"},
            {"name": "b", "in": "header"}
        ]});
        let operation = json!({"operationId": "op", "parameters": [
            {"name": "c", "in": "query"},
            {"name": "d", "in": "cookie"}
        ]});
        let link = extract_link(None, "/x", &path_item, HttpMethod::Get, &operation, &Definitions::new())
            .unwrap();
        let names: Vec<_> = link.fields.iter().map(|f| f.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_ref_body() {
        let defs = definitions();
        let operation = json!({
            "operationId": "createPet",
            "requestBody": {
                "required": true,
                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
            }
        });
        let link = extract_link(None, "/pets", &json!({}), HttpMethod::Post, &operation, &defs).unwrap();
        let body = link.body_field().unwrap();
        assert_eq!(body.name.as_deref(), Some("pet"));
        assert!(body.required);
        assert!(Arc::ptr_eq(
            body.schema.as_ref().unwrap(),
            defs.get("#/components/schemas/Pet").unwrap()
        ));
        assert_eq!(link.encoding.as_deref(), Some("application/json"));
    }

    #[test]
    fn test_inline_body_and_x_name() {
        let inline = link(json!({
            "operationId": "upload",
            "requestBody": {"content": {"application/json": {"schema": {"type": "object"}}}}
        }))
        .unwrap();
        assert_eq!(inline.body_field().and_then(|f| f.name.as_deref()), Some("body"));

        let renamed = link(json!({
            "operationId": "upload",
            "requestBody": {
                "x-name": "payload",
                "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
            }
        }))
        .unwrap();
        assert_eq!(renamed.body_field().and_then(|f| f.name.as_deref()), Some("payload"));
    }

    #[test]
    fn test_other_media_types_ignored() {
        let link = link(json!({
            "operationId": "upload",
            "requestBody": {"content": {"multipart/form-data": {"schema": {"type": "object"}}}}
        }))
        .unwrap();
        assert!(link.body_field().is_none());
        assert!(link.encoding.is_none());
    }

    #[test]
    fn test_empty_body_schema_ignored() {
        let link = link(json!({
            "operationId": "upload",
            "requestBody": {"content": {"application/json": {"schema": {}}}}
        }))
        .unwrap();
        assert!(link.fields.is_empty());
        assert!(link.encoding.is_none());
    }

    #[test]
    fn test_body_follows_parameters() {
        let link = link(json!({
            "operationId": "createPet",
            "parameters": [{"name": "dryRun", "in": "query"}],
            "requestBody": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}}
        }))
        .unwrap();
        assert_eq!(link.fields.len(), 2);
        assert_eq!(link.fields[1].location, Some(FieldLocation::Body));
    }
}

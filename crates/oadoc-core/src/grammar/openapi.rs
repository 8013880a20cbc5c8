use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use super::{Grammar, ObjectShape, Shape};

static EXTENSION_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^x-").unwrap());
static PATH_KEY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/").unwrap());
static STATUS_CODE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([1-5][0-9][0-9]|[1-5]XX)$").unwrap());
static SCHEMA_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#/components/schemas/").unwrap());
static REQUEST_BODY_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#/components/requestBodies/").unwrap());
static RESPONSE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#/components/responses/").unwrap());

const PARAMETER_LOCATIONS: &[&str] = &["query", "header", "path", "cookie"];
const PARAMETER_STYLES: &[&str] = &[
    "matrix",
    "label",
    "form",
    "simple",
    "spaceDelimited",
    "pipeDelimited",
    "deepObject",
];
const SECURITY_SCHEME_TYPES: &[&str] = &["apiKey", "http", "oauth2", "openIdConnect"];
const API_KEY_LOCATIONS: &[&str] = &["query", "header", "cookie"];
const METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// An object that accepts `x-*` extensions and rejects any other unknown key.
fn extensible() -> ObjectShape {
    ObjectShape::new()
        .pattern_property(&EXTENSION_KEY, Shape::Any)
        .closed()
}

fn reference(pattern: &Regex) -> Shape {
    ObjectShape::new()
        .property("$ref", Shape::pattern(pattern))
        .required(&["$ref"])
        .closed()
        .build()
}

fn schema_or_ref() -> Shape {
    Shape::Union(vec![reference(&SCHEMA_REF), Shape::JsonSchema])
}

fn response_or_ref() -> Shape {
    Shape::Union(vec![reference(&RESPONSE_REF), Shape::Ref("Response")])
}

pub(super) fn grammar() -> Grammar {
    let root = extensible()
        .property("openapi", Shape::string())
        .property("info", Shape::Ref("Info"))
        .property("servers", Shape::array(Shape::Ref("Server")))
        .property("paths", Shape::Ref("Paths"))
        .property("components", Shape::Ref("Components"))
        .property("security", Shape::array(Shape::Ref("SecurityRequirement")))
        .property("tags", Shape::array(Shape::Ref("Tag")))
        .property("externalDocs", Shape::Ref("ExternalDocumentation"))
        .required(&["openapi", "info", "paths"])
        .build();

    let mut definitions = IndexMap::new();

    definitions.insert(
        "Info",
        extensible()
            .property("title", Shape::blank_string())
            .property("product", Shape::blank_string())
            .property("description", Shape::blank_string())
            .property("termsOfService", Shape::Url)
            .property("contact", Shape::Ref("Contact"))
            .property("license", Shape::Ref("License"))
            .property("version", Shape::blank_string())
            .property("site_favicon", Shape::blank_string())
            .required(&["title", "version"])
            .build(),
    );

    definitions.insert(
        "Contact",
        extensible()
            .property("name", Shape::blank_string())
            .property("url", Shape::Url)
            .property("email", Shape::Email)
            .build(),
    );

    definitions.insert(
        "License",
        extensible()
            .property("name", Shape::string())
            .property("url", Shape::Url)
            .required(&["name"])
            .build(),
    );

    definitions.insert(
        "Server",
        extensible()
            .property("url", Shape::Url)
            .property("description", Shape::blank_string())
            .property("variables", Shape::map_of(Shape::Ref("ServerVariable")))
            .required(&["url"])
            .build(),
    );

    definitions.insert(
        "ServerVariable",
        extensible()
            .property("enum", Shape::array(Shape::string()))
            .property("default", Shape::string())
            .property("description", Shape::blank_string())
            .required(&["default"])
            .build(),
    );

    definitions.insert(
        "Paths",
        extensible()
            .pattern_property(&PATH_KEY, Shape::Ref("Path"))
            .build(),
    );

    let mut path_item = extensible()
        .property("summary", Shape::blank_string())
        .property("description", Shape::blank_string());
    for &method in METHODS {
        path_item = path_item.property(method, Shape::Ref("Operation"));
    }
    definitions.insert(
        "Path",
        path_item
            .property("servers", Shape::array(Shape::Ref("Server")))
            .property("parameters", Shape::array(Shape::Ref("Parameter")))
            .build(),
    );

    definitions.insert(
        "Operation",
        extensible()
            .property("tags", Shape::array(Shape::string()))
            .property("summary", Shape::blank_string())
            .property("description", Shape::blank_string())
            .property("externalDocs", Shape::Ref("ExternalDocumentation"))
            .property("operationId", Shape::string())
            .property("parameters", Shape::array(Shape::Ref("Parameter")))
            .property(
                "requestBody",
                Shape::Union(vec![reference(&REQUEST_BODY_REF), Shape::Ref("RequestBody")]),
            )
            .property("responses", Shape::Ref("Responses"))
            .property("deprecated", Shape::Boolean)
            .property("security", Shape::array(Shape::Ref("SecurityRequirement")))
            .property("servers", Shape::array(Shape::Ref("Server")))
            .build(),
    );

    definitions.insert(
        "ExternalDocumentation",
        extensible()
            .property("description", Shape::blank_string())
            .property("url", Shape::Url)
            .required(&["url"])
            .build(),
    );

    definitions.insert(
        "Parameter",
        extensible()
            .property("name", Shape::string())
            .property("in", Shape::Choice(PARAMETER_LOCATIONS))
            .property("description", Shape::blank_string())
            .property("required", Shape::Boolean)
            .property("deprecated", Shape::Boolean)
            .property("allowEmptyValue", Shape::Boolean)
            .property("style", Shape::Choice(PARAMETER_STYLES))
            .property("schema", schema_or_ref())
            .property("example", Shape::Any)
            .required(&["name", "in"])
            .build(),
    );

    definitions.insert(
        "RequestBody",
        extensible()
            .property("description", Shape::blank_string())
            .property("content", Shape::map_of(Shape::Ref("MediaType")))
            .property("required", Shape::Boolean)
            .build(),
    );

    definitions.insert(
        "Responses",
        extensible()
            .property("default", response_or_ref())
            .pattern_property(&STATUS_CODE_KEY, response_or_ref())
            .build(),
    );

    definitions.insert(
        "Response",
        extensible()
            .property("description", Shape::blank_string())
            .property("content", Shape::map_of(Shape::Ref("MediaType")))
            .property("headers", Shape::map_of(Shape::Ref("Header")))
            .build(),
    );

    definitions.insert(
        "MediaType",
        extensible()
            .property("schema", schema_or_ref())
            .property("example", Shape::Any)
            .build(),
    );

    definitions.insert(
        "Header",
        extensible()
            .property("description", Shape::string())
            .property("required", Shape::Boolean)
            .property("deprecated", Shape::Boolean)
            .property("allowEmptyValue", Shape::Boolean)
            .property("style", Shape::Choice(PARAMETER_STYLES))
            .property("schema", schema_or_ref())
            .property("example", Shape::Any)
            .build(),
    );

    definitions.insert(
        "Components",
        extensible()
            .property("schemas", Shape::map_of(Shape::JsonSchema))
            .property("responses", Shape::map_of(Shape::Ref("Response")))
            .property("parameters", Shape::map_of(Shape::Ref("Parameter")))
            .property("requestBodies", Shape::map_of(Shape::Ref("RequestBody")))
            .property("securitySchemes", Shape::map_of(Shape::Ref("SecurityScheme")))
            .build(),
    );

    definitions.insert(
        "Tag",
        extensible()
            .property("name", Shape::string())
            .property("description", Shape::blank_string())
            .property("externalDocs", Shape::Ref("ExternalDocumentation"))
            .required(&["name"])
            .build(),
    );

    definitions.insert(
        "SecurityRequirement",
        Shape::map_of(Shape::array(Shape::string())),
    );

    definitions.insert(
        "SecurityScheme",
        extensible()
            .property("type", Shape::Choice(SECURITY_SCHEME_TYPES))
            .property("description", Shape::blank_string())
            .property("name", Shape::string())
            .property("in", Shape::Choice(API_KEY_LOCATIONS))
            .property("scheme", Shape::string())
            .property("bearerFormat", Shape::string())
            .property("flows", Shape::Any)
            .property("openIdConnectUrl", Shape::Url)
            .required(&["type"])
            .build(),
    );

    Grammar { root, definitions }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::{Additional, validate};
    use super::*;

    fn minimal() -> serde_json::Value {
        json!({
            "openapi": "3.0.3",
            "info": {"title": "Petstore", "version": "1.0.0"},
            "paths": {}
        })
    }

    #[test]
    fn test_every_definition_is_present() {
        let grammar = grammar();
        for name in [
            "Info",
            "Contact",
            "License",
            "Server",
            "ServerVariable",
            "Paths",
            "Path",
            "Operation",
            "ExternalDocumentation",
            "Parameter",
            "RequestBody",
            "Responses",
            "Response",
            "MediaType",
            "Header",
            "Components",
            "Tag",
            "SecurityRequirement",
            "SecurityScheme",
        ] {
            assert!(grammar.definition(name).is_some(), "missing {name}");
        }
    }

    fn referenced_names(shape: &Shape, names: &mut Vec<&'static str>) {
        match shape {
            Shape::Ref(name) => names.push(*name),
            Shape::Array(items) => referenced_names(items, names),
            Shape::Union(candidates) => {
                for candidate in candidates {
                    referenced_names(candidate, names);
                }
            }
            Shape::Object(object) => {
                for shape in object.properties.values() {
                    referenced_names(shape, names);
                }
                for (_, shape) in &object.pattern_properties {
                    referenced_names(shape, names);
                }
                if let Additional::Shape(shape) = &object.additional {
                    referenced_names(shape, names);
                }
            }
            _ => {}
        }
    }

    #[test]
    fn test_every_reference_resolves() {
        let grammar = grammar();
        let mut names = Vec::new();
        referenced_names(&grammar.root, &mut names);
        for shape in grammar.definitions.values() {
            referenced_names(shape, &mut names);
        }
        assert!(names.len() > grammar.definitions.len());
        for name in names {
            assert!(grammar.definition(name).is_some(), "unresolved Ref({name})");
        }
    }

    #[test]
    fn test_minimal_document_is_valid() {
        assert!(validate(&minimal()).is_valid());
    }

    #[test]
    fn test_required_root_keys() {
        let report = validate(&json!({"info": {"title": "x", "version": "1"}}));
        assert_eq!(report.at("/openapi"), Some("This field is required."));
        assert_eq!(report.at("/paths"), Some("This field is required."));
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_extensions_allowed_unknown_keys_rejected() {
        let mut doc = minimal();
        doc["x-logo"] = json!({"url": "logo.png"});
        doc["info"]["x-audience"] = json!("public");
        doc["info"]["flavour"] = json!("vanilla");
        let report = validate(&doc);
        assert_eq!(report.len(), 1);
        assert_eq!(report.at("/info/flavour"), Some("Invalid property name."));
    }

    #[test]
    fn test_operation_violations_use_escaped_paths() {
        let mut doc = minimal();
        doc["paths"] = json!({
            "/pets/{petId}": {
                "get": {
                    "operationId": "",
                    "deprecated": "no",
                    "parameters": [{"name": "petId", "in": "body"}],
                    "responses": {"200": {"description": "ok"}, "20X": {}}
                }
            },
            "pets": {}
        });
        let report = validate(&doc);
        let op = "/paths/~1pets~1{petId}/get";
        assert_eq!(report.at(&format!("{op}/operationId")), Some("Must not be blank."));
        assert_eq!(report.at(&format!("{op}/deprecated")), Some("Must be a boolean."));
        assert_eq!(report.at(&format!("{op}/parameters/0/in")), Some("Not a valid choice."));
        assert_eq!(report.at(&format!("{op}/responses/20X")), Some("Invalid property name."));
        assert_eq!(report.at("/paths/pets"), Some("Invalid property name."));
        assert_eq!(report.len(), 5);
    }

    #[test]
    fn test_request_body_union() {
        let mut doc = minimal();
        doc["paths"] = json!({"/pets": {
            "post": {"requestBody": {"$ref": "#/components/schemas/Pet"}},
            "put": {"requestBody": {"$ref": "#/components/requestBodies/Pet"}},
            "patch": {"requestBody": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}, "required": "yes"}}
        }});
        let report = validate(&doc);
        assert_eq!(
            report.at("/paths/~1pets/post/requestBody/$ref"),
            Some("Must match the pattern /^#/components/requestBodies//.")
        );
        assert_eq!(
            report.at("/paths/~1pets/patch/requestBody/required"),
            Some("Must be a boolean.")
        );
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_server_urls() {
        let mut doc = minimal();
        doc["servers"] = json!([
            {"url": "https://{env}.example.com/v1", "variables": {"env": {"default": "api"}}},
            {"url": "/relative"},
            {"url": "nowhere"},
            {"description": "no url"}
        ]);
        let report = validate(&doc);
        assert_eq!(report.at("/servers/2/url"), Some("Must be a valid URL."));
        assert_eq!(report.at("/servers/3/url"), Some("This field is required."));
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_security_and_components() {
        let mut doc = minimal();
        doc["security"] = json!([{"api_key": []}, {"oauth": "read"}]);
        doc["components"] = json!({
            "schemas": {"Pet": {"type": "object"}, "Bad": 3},
            "securitySchemes": {"api_key": {"type": "apiKey", "name": "key", "in": "header"}, "odd": {"type": "magic"}}
        });
        let report = validate(&doc);
        assert_eq!(report.at("/security/1/oauth"), Some("Must be an array."));
        assert_eq!(report.at("/components/schemas/Bad"), Some("Must be an object."));
        assert_eq!(
            report.at("/components/securitySchemes/odd/type"),
            Some("Not a valid choice.")
        );
        assert_eq!(report.len(), 3);
    }
}

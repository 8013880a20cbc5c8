use oadoc_core::grammar::{self, Grammar};
use oadoc_core::parse;

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");

#[test]
fn petstore_is_valid() {
    let data = parse::from_yaml(PETSTORE).unwrap();
    let report = grammar::validate(&data);
    assert!(report.is_valid(), "unexpected violations:\n{report}");
}

#[test]
fn validation_does_not_gate_extraction() {
    let yaml = r#"
openapi: "3.0.3"
info:
  version: 1
paths:
  /pets:
    get:
      operationId: listPets
      colour: blue
"#;
    let data = parse::from_yaml(yaml).unwrap();
    let report = Grammar::openapi().validate(&data);
    assert!(!report.is_valid());
    assert_eq!(report.at("/info/title"), Some("This field is required."));
    assert_eq!(report.at("/info/version"), Some("Must be a string."));
    assert_eq!(
        report.at("/paths/~1pets/get/colour"),
        Some("Invalid property name.")
    );

    let doc = oadoc_core::load(&data);
    assert!(doc.link("listPets").is_some());
}

#[test]
fn report_lists_violations_in_document_order() {
    let yaml = r#"
openapi: "3.0.3"
info:
  title: ""
  version: "1"
  contact:
    email: nobody
tags:
  - description: unnamed
paths: {}
"#;
    let data = parse::from_yaml(yaml).unwrap();
    let report = grammar::validate(&data);
    insta::assert_snapshot!(report.to_string().trim_end(), @r"
    /info/contact/email: Must be a valid email.
    /tags/0/name: This field is required.
    ");
}

#[test]
fn non_mapping_document() {
    let report = grammar::validate(&serde_json::json!(["openapi"]));
    assert_eq!(report.len(), 1);
    assert_eq!(report.violations()[0].path, "");
    assert_eq!(report.violations()[0].to_string(), "/: Must be an object.");
}

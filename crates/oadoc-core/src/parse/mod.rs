//! Decoding document text into the generic value tree the pipeline reads.

use serde_json::Value;

use crate::error::ParseError;

/// Parse an OpenAPI document from YAML.
pub fn from_yaml(input: &str) -> Result<Value, ParseError> {
    Ok(serde_yaml_ng::from_str(input)?)
}

/// Parse an OpenAPI document from JSON.
pub fn from_json(input: &str) -> Result<Value, ParseError> {
    Ok(serde_json::from_str(input)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_yaml_and_json_agree() {
        let yaml = "openapi: 3.0.0\ninfo:\n  title: Petstore\n  version: '1'\n";
        let json = r#"{"openapi": "3.0.0", "info": {"title": "Petstore", "version": "1"}}"#;
        assert_eq!(from_yaml(yaml).unwrap(), from_json(json).unwrap());
    }

    #[test]
    fn test_yaml_keeps_key_order() {
        let value = from_yaml("paths:\n  /b: {}\n  /a: {}\n").unwrap();
        let keys: Vec<&String> = value["paths"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["/b", "/a"]);
        assert_eq!(value["paths"]["/b"], json!({}));
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(from_json("{"), Err(ParseError::Json(_))));
        assert!(matches!(from_yaml("a: [1"), Err(ParseError::Yaml(_))));
    }
}

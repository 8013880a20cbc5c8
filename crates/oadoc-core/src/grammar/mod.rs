//! A declarative grammar of OpenAPI document shapes and a validator that
//! reports every violation against it.
//!
//! Validation is optional: extraction reads the raw tree directly and never
//! depends on this pass.

mod openapi;

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

/// Expected shape of one value.
#[derive(Debug, Clone)]
pub enum Shape {
    Any,
    String {
        allow_blank: bool,
        pattern: Option<Regex>,
    },
    /// An absolute URL, an absolute path, or a templated URL (`https://{host}/v1`).
    Url,
    Email,
    Boolean,
    Choice(&'static [&'static str]),
    Array(Box<Shape>),
    Object(ObjectShape),
    /// A named definition of the grammar.
    Ref(&'static str),
    /// Any one of the alternatives.
    Union(Vec<Shape>),
    /// An embedded JSON Schema: a mapping or a boolean.
    JsonSchema,
}

impl Shape {
    pub fn string() -> Self {
        Shape::String {
            allow_blank: false,
            pattern: None,
        }
    }

    pub fn blank_string() -> Self {
        Shape::String {
            allow_blank: true,
            pattern: None,
        }
    }

    pub fn pattern(regex: &Regex) -> Self {
        Shape::String {
            allow_blank: false,
            pattern: Some(regex.clone()),
        }
    }

    pub fn array(items: Shape) -> Self {
        Shape::Array(Box::new(items))
    }

    /// A mapping whose every value has the shape `values` and whose keys are free.
    pub fn map_of(values: Shape) -> Self {
        ObjectShape::new().additional(values).build()
    }
}

/// Keys outside `properties` and `pattern_properties`.
#[derive(Debug, Clone)]
pub enum Additional {
    Allow,
    Forbid,
    Shape(Box<Shape>),
}

#[derive(Debug, Clone)]
pub struct ObjectShape {
    pub properties: IndexMap<&'static str, Shape>,
    pub pattern_properties: Vec<(Regex, Shape)>,
    pub additional: Additional,
    pub required: Vec<&'static str>,
}

impl Default for ObjectShape {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectShape {
    pub fn new() -> Self {
        Self {
            properties: IndexMap::new(),
            pattern_properties: Vec::new(),
            additional: Additional::Allow,
            required: Vec::new(),
        }
    }

    pub fn property(mut self, name: &'static str, shape: Shape) -> Self {
        self.properties.insert(name, shape);
        self
    }

    pub fn pattern_property(mut self, pattern: &Regex, shape: Shape) -> Self {
        self.pattern_properties.push((pattern.clone(), shape));
        self
    }

    pub fn additional(mut self, shape: Shape) -> Self {
        self.additional = Additional::Shape(Box::new(shape));
        self
    }

    /// Reject keys that neither a property nor a pattern names.
    pub fn closed(mut self) -> Self {
        self.additional = Additional::Forbid;
        self
    }

    pub fn required(mut self, names: &[&'static str]) -> Self {
        self.required.extend_from_slice(names);
        self
    }

    pub fn build(self) -> Shape {
        Shape::Object(self)
    }

    fn describes_reference(&self) -> bool {
        self.properties.contains_key("$ref")
    }
}

/// One structural problem, located by JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{path}: {}", self.message)
    }
}

/// Every violation found by one validation pass, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// The message reported at `path`, if any.
    pub fn at(&self, path: &str) -> Option<&str> {
        self.violations
            .iter()
            .find(|v| v.path == path)
            .map(|v| v.message.as_str())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            writeln!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// A root shape plus the named definitions it refers to.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub root: Shape,
    pub definitions: IndexMap<&'static str, Shape>,
}

static OPENAPI: LazyLock<Grammar> = LazyLock::new(openapi::grammar);

impl Grammar {
    /// The OpenAPI 3.0 document grammar.
    pub fn openapi() -> &'static Grammar {
        &OPENAPI
    }

    pub fn definition(&self, name: &str) -> Option<&Shape> {
        self.definitions.get(name)
    }

    pub fn validate(&self, value: &Value) -> ValidationReport {
        let mut validator = Validator {
            grammar: self,
            path: Vec::new(),
            violations: Vec::new(),
        };
        validator.check(&self.root, value);
        ValidationReport {
            violations: validator.violations,
        }
    }
}

/// Validate a decoded document against the OpenAPI grammar.
pub fn validate(document: &Value) -> ValidationReport {
    Grammar::openapi().validate(document)
}

struct Validator<'g> {
    grammar: &'g Grammar,
    path: Vec<String>,
    violations: Vec<Violation>,
}

impl<'g> Validator<'g> {
    fn report(&mut self, message: impl Into<String>) {
        self.violations.push(Violation {
            path: pointer(&self.path),
            message: message.into(),
        });
    }

    fn nested(&mut self, segment: impl Into<String>, shape: &Shape, value: &Value) {
        self.path.push(segment.into());
        self.check(shape, value);
        self.path.pop();
    }

    fn check(&mut self, shape: &Shape, value: &Value) {
        match shape {
            Shape::Any => {}
            Shape::String {
                allow_blank,
                pattern,
            } => match value.as_str() {
                None => self.report("Must be a string."),
                Some(text) if !allow_blank && text.trim().is_empty() => {
                    self.report("Must not be blank.")
                }
                Some(text) => {
                    if let Some(regex) = pattern.as_ref().filter(|re| !re.is_match(text)) {
                        self.report(format!("Must match the pattern /{}/.", regex.as_str()));
                    }
                }
            },
            Shape::Url => match value.as_str() {
                None => self.report("Must be a string."),
                Some(text) if !is_url(text) => self.report("Must be a valid URL."),
                Some(_) => {}
            },
            Shape::Email => match value.as_str() {
                None => self.report("Must be a string."),
                Some(text) if !is_email(text) => self.report("Must be a valid email."),
                Some(_) => {}
            },
            Shape::Boolean => {
                if !value.is_boolean() {
                    self.report("Must be a boolean.");
                }
            }
            Shape::Choice(choices) => {
                if !value.as_str().is_some_and(|text| choices.contains(&text)) {
                    self.report("Not a valid choice.");
                }
            }
            Shape::Array(items) => match value.as_array() {
                None => self.report("Must be an array."),
                Some(elements) => {
                    for (index, element) in elements.iter().enumerate() {
                        self.nested(index.to_string(), items, element);
                    }
                }
            },
            Shape::Object(object) => match value.as_object() {
                None => self.report("Must be an object."),
                Some(map) => self.check_object(object, map),
            },
            Shape::Ref(name) => match self.grammar.definition(name) {
                Some(target) => self.check(target, value),
                None => log::debug!("grammar has no definition named {name}"),
            },
            Shape::Union(candidates) => self.check_union(candidates, value),
            Shape::JsonSchema => {
                if !value.is_object() && !value.is_boolean() {
                    self.report("Must be an object.");
                }
            }
        }
    }

    fn check_object(&mut self, object: &ObjectShape, map: &Map<String, Value>) {
        for name in &object.required {
            if !map.contains_key(*name) {
                self.path.push((*name).to_string());
                self.report("This field is required.");
                self.path.pop();
            }
        }

        for (key, value) in map {
            if let Some(shape) = object.properties.get(key.as_str()) {
                self.nested(key.clone(), shape, value);
                continue;
            }
            if let Some((_, shape)) = object
                .pattern_properties
                .iter()
                .find(|(pattern, _)| pattern.is_match(key))
            {
                self.nested(key.clone(), shape, value);
                continue;
            }
            match &object.additional {
                Additional::Allow => {}
                Additional::Forbid => {
                    self.path.push(key.clone());
                    self.report("Invalid property name.");
                    self.path.pop();
                }
                Additional::Shape(shape) => self.nested(key.clone(), shape, value),
            }
        }
    }

    /// A value matching any candidate is valid. Otherwise, when exactly one
    /// candidate fits the value's kind (reference object or not, mapping or
    /// scalar), its violations are reported; failing that, a single
    /// union-level violation.
    fn check_union(&mut self, candidates: &[Shape], value: &Value) {
        let mut fitting = Vec::new();

        for candidate in candidates {
            let mut trial = Validator {
                grammar: self.grammar,
                path: self.path.clone(),
                violations: Vec::new(),
            };
            trial.check(candidate, value);
            if trial.violations.is_empty() {
                return;
            }
            if self.fits(candidate, value) {
                fitting.push(trial.violations);
            }
        }

        if fitting.len() == 1 {
            self.violations.extend(fitting.remove(0));
        } else {
            self.report("Did not match any valid type.");
        }
    }

    fn fits(&self, shape: &Shape, value: &Value) -> bool {
        match shape {
            Shape::Any => true,
            Shape::String { .. } | Shape::Url | Shape::Email | Shape::Choice(_) => {
                value.is_string()
            }
            Shape::Boolean => value.is_boolean(),
            Shape::Array(_) => value.is_array(),
            Shape::Object(object) => match value.as_object() {
                Some(map) => object.describes_reference() == map.contains_key("$ref"),
                None => false,
            },
            Shape::Ref(name) => self
                .grammar
                .definition(name)
                .is_some_and(|target| self.fits(target, value)),
            Shape::Union(candidates) => candidates.iter().any(|c| self.fits(c, value)),
            Shape::JsonSchema => value.is_object() || value.is_boolean(),
        }
    }
}

/// Render path segments as a JSON pointer (`/paths/~1pets/get`).
fn pointer(segments: &[String]) -> String {
    segments
        .iter()
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect()
}

static URL_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^{}]*\}").unwrap());

fn is_url(text: &str) -> bool {
    let concrete = URL_TEMPLATE.replace_all(text, "x");
    concrete.starts_with('/') || Url::parse(&concrete).is_ok_and(|url| url.has_host())
}

fn is_email(text: &str) -> bool {
    match text.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !text.chars().any(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn small_grammar() -> Grammar {
        let mut definitions = IndexMap::new();
        definitions.insert(
            "Item",
            ObjectShape::new()
                .property("name", Shape::string())
                .property("kind", Shape::Choice(&["a", "b"]))
                .required(&["name"])
                .closed()
                .build(),
        );
        Grammar {
            root: ObjectShape::new()
                .property("items", Shape::array(Shape::Ref("Item")))
                .property("flag", Shape::Boolean)
                .build(),
            definitions,
        }
    }

    #[test]
    fn test_valid_value() {
        let report = small_grammar().validate(&json!({"items": [{"name": "x", "kind": "a"}], "flag": true}));
        assert!(report.is_valid());
    }

    #[test]
    fn test_nested_violations_are_located() {
        let report = small_grammar().validate(&json!({
            "items": [{"name": "x"}, {"kind": "c", "extra": 1}],
            "flag": "yes"
        }));
        assert_eq!(report.len(), 4);
        assert_eq!(report.at("/items/1/name"), Some("This field is required."));
        assert_eq!(report.at("/items/1/kind"), Some("Not a valid choice."));
        assert_eq!(report.at("/items/1/extra"), Some("Invalid property name."));
        assert_eq!(report.at("/flag"), Some("Must be a boolean."));
    }

    #[test]
    fn test_pointer_escaping() {
        let segments = vec!["paths".to_string(), "/pets/{id}".to_string(), "a~b".to_string()];
        assert_eq!(pointer(&segments), "/paths/~1pets~1{id}/a~0b");
        assert_eq!(pointer(&[]), "");
    }

    #[test]
    fn test_blank_strings() {
        let grammar = Grammar {
            root: ObjectShape::new()
                .property("strict", Shape::string())
                .property("loose", Shape::blank_string())
                .build(),
            definitions: IndexMap::new(),
        };
        let report = grammar.validate(&json!({"strict": " ", "loose": ""}));
        assert_eq!(report.violations().len(), 1);
        assert_eq!(report.at("/strict"), Some("Must not be blank."));
    }

    #[test]
    fn test_urls_and_emails() {
        assert!(is_url("https://api.example.com/v1"));
        assert!(is_url("https://{region}.example.com/{version}"));
        assert!(is_url("/v1"));
        assert!(!is_url("not a url"));
        assert!(is_email("api@example.com"));
        assert!(!is_email("api.example.com"));
        assert!(!is_email("api@localhost"));
    }

    #[test]
    fn test_report_display() {
        let report = small_grammar().validate(&json!([]));
        insta::assert_snapshot!(report.to_string().trim_end(), @"/: Must be an object.");
    }
}

//! Nested lookups into decoded document trees that degrade to a default
//! instead of failing.

use indexmap::IndexMap;
use serde_json::Value;

/// One step of a lookup path: a mapping key or a sequence index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for Segment<'a> {
    fn from(key: &'a str) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment<'_> {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Build a lookup path from mixed keys and indices: `path!["servers", 0, "url"]`.
#[macro_export]
macro_rules! path {
    ($($segment:expr),* $(,)?) => {
        [$($crate::lookup::Segment::from($segment)),*]
    };
}

/// Walk `path` from `value`. Any missing key, out-of-range index, or step into
/// a scalar ends the walk with `None`.
pub fn lookup<'v>(value: &'v Value, path: &[Segment<'_>]) -> Option<&'v Value> {
    let mut current = value;
    for segment in path {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => map.get(*key)?,
            (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Like [`lookup`], returning `default` when the walk fails.
pub fn lookup_or<'v>(value: &'v Value, path: &[Segment<'_>], default: &'v Value) -> &'v Value {
    lookup(value, path).unwrap_or(default)
}

/// Like [`lookup`], keeping the result only when it is a string.
pub fn lookup_str<'v>(value: &'v Value, path: &[Segment<'_>]) -> Option<&'v str> {
    lookup(value, path).and_then(Value::as_str)
}

/// The vendor-extension (`x-*`) entries of a mapping, in source order.
/// Non-mappings have none.
pub fn extensions(value: &Value) -> IndexMap<String, Value> {
    match value {
        Value::Object(map) => map
            .iter()
            .filter(|(key, _)| key.starts_with("x-"))
            .map(|(key, v)| (key.clone(), v.clone()))
            .collect(),
        _ => IndexMap::new(),
    }
}

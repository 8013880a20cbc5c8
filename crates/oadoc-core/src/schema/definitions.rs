use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::{SCHEMA_REF_PREFIX, SchemaNode, compile};
use crate::lookup::lookup;
use crate::path;

/// The named schemas of one document, keyed by `$ref` string
/// (`#/components/schemas/Pet`).
///
/// Entries are shared: every field that references a definition holds the
/// same `Arc` as the registry.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Definitions {
    entries: IndexMap<String, Arc<SchemaNode>>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from `components.schemas`, in source order.
    /// A missing or non-mapping `components.schemas` yields an empty registry.
    pub fn from_document(data: &Value) -> Self {
        let mut definitions = Self::new();
        let Some(Value::Object(schemas)) = lookup(data, &path!["components", "schemas"]) else {
            return definitions;
        };

        for (name, raw) in schemas {
            let key = format!("{SCHEMA_REF_PREFIX}{name}");
            log::trace!("registering schema definition {key}");
            definitions.insert(key, compile(raw));
        }
        definitions
    }

    /// Register `node` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: impl Into<String>, node: SchemaNode) -> Arc<SchemaNode> {
        let node = Arc::new(node);
        self.entries.insert(key.into(), Arc::clone(&node));
        node
    }

    pub fn get(&self, key: &str) -> Option<&Arc<SchemaNode>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<SchemaNode>)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Follow `node` through reference nodes until a non-reference node.
    ///
    /// Returns `None` for a dangling key or for a chain of references that
    /// loops back on itself without reaching a concrete schema.
    pub fn resolve<'a>(&'a self, node: &'a SchemaNode) -> Option<&'a SchemaNode> {
        let mut current = node;
        let mut seen = HashSet::new();

        while let Some(key) = current.reference() {
            if !seen.insert(key) {
                log::debug!("reference cycle through {key}");
                return None;
            }
            match self.get(key) {
                Some(target) => current = target.as_ref(),
                None => {
                    log::debug!("unresolved schema reference {key}");
                    return None;
                }
            }
        }
        Some(current)
    }
}

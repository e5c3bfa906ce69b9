//! Settings tree and filter resolution
//!
//! The tree is plain JSON. Any object carrying a `$filter` key is a
//! branch point: the criterion it names picks the child with the same key,
//! and `$default` is used when nothing matches.

use crate::Result;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key naming the criterion a branch is filtered on
pub const FILTER_KEY: &str = "$filter";
/// Fallback branch when the criterion has no matching child
pub const DEFAULT_KEY: &str = "$default";

/// Criterion values used to pick `$filter` branches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    values: BTreeMap<String, String>,
}

impl Criteria {
    /// Create an empty criteria set
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria carrying only the runtime environment, if one is set
    pub fn for_env(env: Option<&str>) -> Self {
        let criteria = Self::new();
        match env {
            Some(env) => criteria.with("env", env),
            None => criteria,
        }
    }

    /// Add or replace a criterion
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Look up a criterion value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Immutable settings tree bound to the criteria it was loaded with
#[derive(Debug, Clone)]
pub struct Store {
    tree: Value,
    criteria: Criteria,
}

impl Store {
    /// Create a store over a raw tree
    pub fn new(tree: Value, criteria: Criteria) -> Self {
        Self { tree, criteria }
    }

    /// Runtime environment the store was built for
    pub fn env(&self) -> Option<&str> {
        self.criteria.get("env")
    }

    /// Whether the production variants are active
    pub fn is_production(&self) -> bool {
        self.env() == Some(super::loader::PRODUCTION)
    }

    /// Resolve a slash-delimited path such as `/queues/rabbit/url`
    ///
    /// Returns the resolved subtree with every nested `$filter` applied.
    /// Unknown paths and `null` leaves both yield `None`.
    pub fn get(&self, path: &str) -> Option<Value> {
        let mut node = self.select(&self.tree)?;
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            if segment.starts_with('$') {
                return None;
            }
            node = self.select(node.as_object()?.get(segment)?)?;
        }

        let resolved = self.materialize(node)?;
        (!resolved.is_null()).then_some(resolved)
    }

    /// Resolve a path to a string leaf
    pub fn get_str(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Resolve a path and deserialize it into `T`
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        self.get(path)
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    /// Follow `$filter` branches until a plain node is reached
    fn select<'a>(&self, mut node: &'a Value) -> Option<&'a Value> {
        loop {
            let Some(map) = node.as_object() else {
                return Some(node);
            };
            let Some(filter) = map.get(FILTER_KEY) else {
                return Some(node);
            };

            let matched = filter
                .as_str()
                .and_then(|criterion| self.criteria.get(criterion))
                .filter(|value| !value.starts_with('$'))
                .and_then(|value| map.get(value));
            node = matched.or_else(|| map.get(DEFAULT_KEY))?;
        }
    }

    fn materialize(&self, node: &Value) -> Option<Value> {
        match node {
            Value::Object(map) => {
                let resolved: Map<String, Value> = map
                    .iter()
                    .filter(|(key, _)| !key.starts_with('$'))
                    .filter_map(|(key, child)| {
                        let child = self.materialize(self.select(child)?)?;
                        Some((key.clone(), child))
                    })
                    .collect();
                Some(Value::Object(resolved))
            }
            Value::Array(items) => Some(Value::Array(
                items
                    .iter()
                    .filter_map(|item| self.materialize(self.select(item)?))
                    .collect(),
            )),
            leaf => Some(leaf.clone()),
        }
    }
}

//! Inheritance resolution through `extends`.
//!
//! A configuration may name a parent with `extends`. Resolution walks the
//! chain to its root, then merges from the deepest ancestor outward so the
//! most specific document wins scalars and contributes its array elements
//! last.

use std::collections::HashSet;

use serde_json::Value;

use crate::config::errors::ConfigError;
use crate::config::merge::deep_merge;
use crate::config::store::{ConfigStore, StoredDocument};
use crate::core::document::keys;

/// Flattens configurations out of a [`ConfigStore`].
#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver<'a> {
    store: &'a ConfigStore,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        ConfigResolver { store }
    }

    /// Load `name` and all of its ancestors, most specific first.
    pub fn chain(&self, name: &str) -> Result<Vec<StoredDocument>, ConfigError> {
        let mut chain: Vec<StoredDocument> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut next = Some(name.to_string());

        while let Some(current) = next.take() {
            if !visited.insert(current.clone()) {
                let mut names: Vec<String> = chain.iter().map(|d| d.name.clone()).collect();
                names.push(current);
                return Err(ConfigError::InheritanceCycle { chain: names });
            }

            let stored = self.store.load(&current).map_err(|e| match e {
                ConfigError::NotFound { name, dir, .. } => ConfigError::NotFound {
                    name,
                    dir,
                    required_by: chain.last().map(|d| d.name.clone()),
                },
                other => other,
            })?;

            next = match stored.document.get(keys::EXTENDS) {
                None | Some(Value::Null) => None,
                Some(Value::String(parent)) => Some(parent.clone()),
                Some(_) => {
                    return Err(ConfigError::InvalidExtends {
                        name: stored.name,
                        path: stored.path,
                    })
                }
            };

            chain.push(stored);
        }

        Ok(chain)
    }

    /// Resolve `name` into a single flattened document.
    ///
    /// The result has no `extends` key.
    pub fn resolve(&self, name: &str) -> Result<Value, ConfigError> {
        let chain = self.chain(name)?;

        let mut merged = Value::Object(Default::default());
        for stored in chain.iter().rev() {
            merged = deep_merge(&merged, &stored.document);
        }

        if let Value::Object(ref mut map) = merged {
            map.remove(keys::EXTENDS);
        }

        tracing::debug!(
            "resolved `{}` through {} document(s)",
            name,
            chain.len()
        );
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::format::DocumentFormat;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_with(tmp: &TempDir, docs: &[(&str, Value)]) -> ConfigStore {
        let store = ConfigStore::new(tmp.path(), DocumentFormat::Json);
        for (name, doc) in docs {
            store.save(name, doc).unwrap();
        }
        store
    }

    #[test]
    fn test_resolve_without_extends() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(&tmp, &[("solo", json!({ "root": "/src" }))]);

        let doc = ConfigResolver::new(&store).resolve("solo").unwrap();
        assert_eq!(doc, json!({ "root": "/src" }));
    }

    #[test]
    fn test_three_level_chain() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(
            &tmp,
            &[
                (
                    "c",
                    json!({ "root": "/c", "gen": { "args": ["c1", "c2"], "out": "C" }, "env": { "K": "c" } }),
                ),
                (
                    "b",
                    json!({ "extends": "c", "root": "/b", "gen": { "args": ["b1"] } }),
                ),
                (
                    "a",
                    json!({ "extends": "b", "gen": { "args": ["a1"], "out": "A" }, "env": { "K": "a" } }),
                ),
            ],
        );

        let doc = ConfigResolver::new(&store).resolve("a").unwrap();

        assert_eq!(doc["gen"]["args"], json!(["c1", "c2", "b1", "a1"]));
        assert_eq!(doc["gen"]["out"], "A");
        assert_eq!(doc["root"], "/b");
        assert_eq!(doc["env"]["K"], "a");
        assert!(doc.get("extends").is_none());
    }

    #[test]
    fn test_chain_order() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(
            &tmp,
            &[
                ("base", json!({})),
                ("child", json!({ "extends": "base" })),
            ],
        );

        let names: Vec<_> = ConfigResolver::new(&store)
            .chain("child")
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["child", "base"]);
    }

    #[test]
    fn test_missing_ancestor() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(&tmp, &[("child", json!({ "extends": "ghost" }))]);

        let err = ConfigResolver::new(&store).resolve("child").unwrap_err();
        match err {
            ConfigError::NotFound {
                name, required_by, ..
            } => {
                assert_eq!(name, "ghost");
                assert_eq!(required_by.as_deref(), Some("child"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cycle_detected() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(
            &tmp,
            &[
                ("a", json!({ "extends": "b" })),
                ("b", json!({ "extends": "c" })),
                ("c", json!({ "extends": "a" })),
            ],
        );

        let err = ConfigResolver::new(&store).resolve("a").unwrap_err();
        match err {
            ConfigError::InheritanceCycle { chain } => {
                assert_eq!(chain, vec!["a", "b", "c", "a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_extension_is_a_cycle() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(&tmp, &[("loop", json!({ "extends": "loop" }))]);

        assert!(matches!(
            ConfigResolver::new(&store).resolve("loop"),
            Err(ConfigError::InheritanceCycle { .. })
        ));
    }

    #[test]
    fn test_non_string_extends() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(&tmp, &[("bad", json!({ "extends": ["a"] }))]);

        assert!(matches!(
            ConfigResolver::new(&store).resolve("bad"),
            Err(ConfigError::InvalidExtends { .. })
        ));
    }
}

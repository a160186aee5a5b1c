//! Translation resource bundles.
//!
//! Layout: `locale -> namespace -> nested keys`, e.g.
//! ```text
//! { "en": { "translation": { "ui": { "play": "Play" } } } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stagetext_common::Locale;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Errors from loading or merging resource bundles.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported resource file extension: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("bundle for {locale}/{namespace} must be an object")]
    NotAnObject { locale: Locale, namespace: String },
}

/// Translation resources for every loaded locale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resources {
    bundles: BTreeMap<Locale, BTreeMap<String, Value>>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(s: &str) -> Result<Self, ResourceError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ResourceError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Load resources from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&data),
            Some("yaml" | "yml") => Self::from_yaml_str(&data),
            _ => Err(ResourceError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Add a bundle for one locale/namespace, deep-merging into existing
    /// keys. Incoming leaves overwrite existing ones.
    pub fn add_bundle(
        &mut self,
        locale: Locale,
        namespace: impl Into<String>,
        bundle: Value,
    ) -> Result<(), ResourceError> {
        let namespace = namespace.into();
        if !bundle.is_object() {
            return Err(ResourceError::NotAnObject { locale, namespace });
        }
        let slot = self
            .bundles
            .entry(locale)
            .or_default()
            .entry(namespace)
            .or_insert_with(|| Value::Object(Map::new()));
        deep_merge(slot, bundle);
        Ok(())
    }

    /// Merge another resource set into this one.
    pub fn extend(&mut self, other: Resources) {
        for (locale, namespaces) in other.bundles {
            let target = self.bundles.entry(locale).or_default();
            for (ns, bundle) in namespaces {
                match target.get_mut(&ns) {
                    Some(existing) => deep_merge(existing, bundle),
                    None => {
                        target.insert(ns, bundle);
                    }
                }
            }
        }
    }

    /// Locales that have at least one bundle, in sorted order.
    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.bundles.keys()
    }

    pub fn has_locale(&self, locale: &Locale) -> bool {
        self.bundles.contains_key(locale)
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Look up a string leaf.
    ///
    /// With a non-empty `separator` the key is first walked as a nested path,
    /// then tried verbatim as a flat key. Non-string leaves are not returned.
    pub fn lookup(
        &self,
        locale: &Locale,
        namespace: &str,
        key: &str,
        separator: Option<&str>,
    ) -> Option<&str> {
        let root = self.bundles.get(locale)?.get(namespace)?;
        let nested = match separator {
            Some(sep) if !sep.is_empty() => key
                .split(sep)
                .try_fold(root, |node, part| node.get(part)),
            _ => None,
        };
        nested
            .and_then(Value::as_str)
            .or_else(|| root.get(key).and_then(Value::as_str))
    }
}

fn deep_merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(dst), Value::Object(src)) => {
            for (k, v) in src {
                match dst.get_mut(&k) {
                    Some(slot) => deep_merge(slot, v),
                    None => {
                        dst.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

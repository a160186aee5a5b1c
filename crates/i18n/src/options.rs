use crate::resources::{ResourceError, Resources};
use serde::{Deserialize, Deserializer, Serialize};
use stagetext_common::Locale;
use std::path::Path;

/// Options accepted by [`Localization::init`](crate::Localization::init).
///
/// Every field is optional so that option sets can be layered with
/// [`InitOptions::merge`]; unset fields fall back to engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitOptions {
    /// Locale to activate on init.
    pub lng: Option<Locale>,
    /// Locales tried, in order, when a key is missing. Accepts a single tag
    /// or a list when deserialized.
    #[serde(deserialize_with = "one_or_many")]
    pub fallback_lng: Option<Vec<Locale>>,
    pub resources: Option<Resources>,
    /// Namespace used for keys without a `ns:` prefix (default `translation`).
    pub default_ns: Option<String>,
    /// Separator for nested keys (default `.`; empty disables nesting).
    pub key_separator: Option<String>,
    /// Separator between namespace and key (default `:`; empty disables).
    pub ns_separator: Option<String>,
    /// Log the startup notice on init (default `true`).
    pub show_support_notice: Option<bool>,
}

impl InitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(s: &str) -> Result<Self, ResourceError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ResourceError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Load options from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&data),
            Some("yaml" | "yml") => Self::from_yaml_str(&data),
            _ => Err(ResourceError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn with_lng(mut self, lng: Locale) -> Self {
        self.lng = Some(lng);
        self
    }

    pub fn with_fallback(mut self, fallback: impl IntoIterator<Item = Locale>) -> Self {
        self.fallback_lng = Some(fallback.into_iter().collect());
        self
    }

    pub fn with_resources(mut self, resources: Resources) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn with_default_ns(mut self, ns: impl Into<String>) -> Self {
        self.default_ns = Some(ns.into());
        self
    }

    pub fn with_key_separator(mut self, sep: impl Into<String>) -> Self {
        self.key_separator = Some(sep.into());
        self
    }

    pub fn with_ns_separator(mut self, sep: impl Into<String>) -> Self {
        self.ns_separator = Some(sep.into());
        self
    }

    pub fn with_support_notice(mut self, show: bool) -> Self {
        self.show_support_notice = Some(show);
        self
    }

    /// Layer `overrides` on top of `self`: every field set in `overrides`
    /// wins, unset fields keep the value from `self`.
    pub fn merge(self, overrides: InitOptions) -> InitOptions {
        InitOptions {
            lng: overrides.lng.or(self.lng),
            fallback_lng: overrides.fallback_lng.or(self.fallback_lng),
            resources: overrides.resources.or(self.resources),
            default_ns: overrides.default_ns.or(self.default_ns),
            key_separator: overrides.key_separator.or(self.key_separator),
            ns_separator: overrides.ns_separator.or(self.ns_separator),
            show_support_notice: overrides.show_support_notice.or(self.show_support_notice),
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<Locale>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Locale),
        Many(Vec<Locale>),
    }

    Ok(Option::<OneOrMany>::deserialize(deserializer)?.map(|v| match v {
        OneOrMany::One(l) => vec![l],
        OneOrMany::Many(ls) => ls,
    }))
}

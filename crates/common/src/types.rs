use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a node on the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for log lines and debug dumps.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from parsing a locale tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocaleError {
    #[error("locale tag is empty")]
    Empty,
    #[error("invalid character {ch:?} in locale tag {tag:?}")]
    InvalidChar { tag: String, ch: char },
    #[error("empty subtag in locale tag {0:?}")]
    EmptySubtag(String),
}

/// A locale tag such as `en`, `es` or `pt-BR`.
///
/// Tags are ASCII alphanumeric subtags joined by `-` or `_`. The tag is kept
/// exactly as given; comparisons are case-sensitive like resource lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    /// Parse and validate a locale tag.
    pub fn parse(tag: impl Into<String>) -> Result<Self, LocaleError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(LocaleError::Empty);
        }
        if let Some(ch) = tag
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(LocaleError::InvalidChar { tag, ch });
        }
        if tag.split(['-', '_']).any(str::is_empty) {
            return Err(LocaleError::EmptySubtag(tag));
        }
        Ok(Self(tag))
    }

    /// Placeholder locale active before any locale is configured.
    pub fn dev() -> Self {
        Self("dev".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primary language subtag (`pt-BR` -> `pt`).
    pub fn language(&self) -> &str {
        self.0.split(['-', '_']).next().unwrap_or(&self.0)
    }

    /// The language-only locale, if this tag carries a region or script.
    pub fn language_only(&self) -> Option<Locale> {
        let lang = self.language();
        (lang.len() != self.0.len()).then(|| Locale(lang.to_string()))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for Locale {
    type Error = LocaleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

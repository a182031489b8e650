use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// How trailing slashes in patterns and request paths are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlash {
    /// `/users/` and `/users` are the same route. Root `/` is kept.
    Ignore,
    /// The trailing slash is part of the path.
    Strict,
}

impl Default for TrailingSlash {
    fn default() -> Self {
        Self::Ignore
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub trailing_slash: TrailingSlash,
    /// Custom `{name:type}` fragments, `type -> regex`.
    pub types: BTreeMap<String, String>,
    pub debug: bool,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub signature_key: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("routes.cache"),
            signature_key: None,
        }
    }
}

impl RouterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trailing_slash(mut self, mode: TrailingSlash) -> Self {
        self.trailing_slash = mode;
        self
    }

    pub fn with_type(mut self, name: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.types.insert(name.into(), fragment.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Caching is skipped entirely in debug mode.
    pub fn cache_active(&self) -> bool {
        self.cache.enabled && !self.debug
    }
}

impl CacheConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            path: path.into(),
            signature_key: None,
        }
    }

    pub fn with_signature_key(mut self, key: impl Into<String>) -> Self {
        self.signature_key = Some(key.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

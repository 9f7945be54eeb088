//! # Configuration Module
//!
//! Settings that shape the generated schema but are not part of the source
//! document.
//!
//! ## Environment Variables
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `CONNECTOR_GEN_SOURCE_NAME` | `source_name` | `api` |
//! | `CONNECTOR_GEN_BASE_URL` | `base_url` | first document server, else `http://localhost` |
//! | `CONNECTOR_GEN_HEADERS` | `headers` | none (`;`-separated `Name: value` pairs) |
//! | `CONNECTOR_GEN_FEDERATION_VERSION` | `federation_version` | `v2.10` |
//! | `CONNECTOR_GEN_CONNECT_VERSION` | `connect_version` | `v0.1` |
//! | `CONNECTOR_GEN_PAGE_SIZE` | `page_size` | `20` |
//!
//! CLI options override the environment.

use std::env;
use std::fmt;

/// Fallback base URL when neither configuration nor the document has one.
pub const DEFAULT_BASE_URL: &str = "http://localhost";

/// A static request header added to every `@connect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticHeader {
    pub name: String,
    pub value: String,
}

impl StaticHeader {
    /// Parse `Name: value`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (name, value) = raw.split_once(':')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            value: value.trim().to_string(),
        })
    }
}

impl fmt::Display for StaticHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Name of the `@source` every `@connect` refers to
    pub source_name: String,
    /// Overrides the document's first server URL
    pub base_url: Option<String>,
    pub headers: Vec<StaticHeader>,
    /// Version of the federation spec `@link`
    pub federation_version: String,
    /// Version of the connect spec `@link`
    pub connect_version: String,
    /// Operations per page in the interactive picker
    pub page_size: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source_name: "api".to_string(),
            base_url: None,
            headers: Vec::new(),
            federation_version: "v2.10".to_string(),
            connect_version: "v0.1".to_string(),
            page_size: 20,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            source_name: env::var("CONNECTOR_GEN_SOURCE_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.source_name),
            base_url: env::var("CONNECTOR_GEN_BASE_URL").ok().filter(|s| !s.is_empty()),
            headers: env::var("CONNECTOR_GEN_HEADERS")
                .map(|raw| raw.split(';').filter_map(StaticHeader::parse).collect())
                .unwrap_or_default(),
            federation_version: env::var("CONNECTOR_GEN_FEDERATION_VERSION")
                .unwrap_or(defaults.federation_version),
            connect_version: env::var("CONNECTOR_GEN_CONNECT_VERSION")
                .unwrap_or(defaults.connect_version),
            page_size: env::var("CONNECTOR_GEN_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.page_size),
        }
    }

    /// Base URL for `@source`: configured, else the document's, else a
    /// local placeholder.
    pub fn resolve_base_url(&self, document_url: Option<&str>) -> String {
        self.base_url
            .as_deref()
            .or(document_url)
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }
}

// Client configuration
use std::env;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

/// Environment variable consulted by [`ClientConfig::from_env`].
pub const BASE_URL_ENV: &str = "API_BASE_URL";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Reads the base URL from `API_BASE_URL`, falling back to the local
    /// development API when it is unset or blank.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(BASE_URL_ENV) {
            Some(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }
}

//! Configuration management for the Web Highlighter server

use std::env;

use serde::Serialize;
use thiserror::Error;

use crate::dom::BlockPolicy;
use crate::normalize::{UrlNormalizer, DEFAULT_TRACKING_PARAMS};
use crate::render::HighlightConfig;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub highlighter: HighlighterConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// File used by the JSON backend
    pub path: String,
    /// Connection string used by the SQLite backend
    pub database_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Json,
    Sqlite,
}

/// Settings of the anchor/restore core
#[derive(Debug, Clone)]
pub struct HighlighterConfig {
    pub highlight: HighlightConfig,
    pub block_policy: BlockPolicy,
    pub normalizer: UrlNormalizer,
    /// Strip scripts and inline handlers before parsing submitted pages
    pub sanitize: bool,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            highlight: HighlightConfig::default(),
            block_policy: BlockPolicy::default(),
            normalizer: UrlNormalizer::default(),
            sanitize: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig {
                backend: StorageBackend::Json,
                path: "./highlights.json".to_string(),
                database_url: "sqlite:./highlights.db".to_string(),
            },
            highlighter: HighlighterConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "json".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackend::Memory,
            "json" => StorageBackend::Json,
            "sqlite" => StorageBackend::Sqlite,
            other => {
                return Err(ConfigError::InvalidValue {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let mut highlight = defaults.highlighter.highlight.clone();
        if let Ok(class_name) = env::var("HIGHLIGHT_CLASS") {
            highlight.class_name = class_name;
        }
        if let Ok(id_attribute) = env::var("HIGHLIGHT_ID_ATTRIBUTE") {
            highlight.id_attribute = id_attribute;
        }

        let block_policy = match env::var("BLOCK_CHILD_THRESHOLD") {
            Ok(value) => BlockPolicy::new(value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "BLOCK_CHILD_THRESHOLD",
                value,
            })?),
            Err(_) => defaults.highlighter.block_policy,
        };

        let normalizer = match env::var("TRACKING_PARAMS") {
            Ok(list) => UrlNormalizer::new(
                list.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            ),
            Err(_) => UrlNormalizer::new(DEFAULT_TRACKING_PARAMS.iter().map(|p| p.to_string())),
        };

        let sanitize = env::var("SANITIZE_HTML")
            .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(defaults.highlighter.sanitize);

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            storage: StorageConfig {
                backend,
                path: env::var("STORE_PATH").unwrap_or(defaults.storage.path),
                database_url: env::var("DATABASE_URL").unwrap_or(defaults.storage.database_url),
            },
            highlighter: HighlighterConfig {
                highlight,
                block_policy,
                normalizer,
                sanitize,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert!(config.highlighter.sanitize);
        assert_eq!(config.highlighter.block_policy, BlockPolicy::default());
        assert_eq!(config.highlighter.highlight.id_attribute, "data-highlight-id");
    }
}

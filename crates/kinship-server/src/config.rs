//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files including bind address, database path,
//! the public base URL used in share links, and the editor grid layout.

use kinship_domain::GridLayout;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 3000)
    pub bind_port: u16,

    /// SQLite database file (default: "kinship.db")
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Public base URL, prefixed to share links (e.g., "https://kinship.example")
    pub base_url: String,

    /// Owner used when a request carries no `x-owner-id` header
    #[serde(default = "default_owner")]
    pub default_owner: String,

    /// Editor grid placement
    #[serde(default)]
    pub layout: GridLayout,
}

fn default_database_path() -> String {
    "kinship.db".to_string()
}

fn default_owner() -> String {
    "user-1".to_string()
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields that serde cannot enforce
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("base_url".to_string()));
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingField("database_path".to_string()));
        }
        if self.default_owner.trim().is_empty() {
            return Err(ConfigError::MissingField("default_owner".to_string()));
        }
        Ok(())
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 3000,
            database_path: ":memory:".to_string(),
            base_url: "http://localhost:3000".to_string(),
            default_owner: default_owner(),
            layout: GridLayout::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Public URL of a share link
    pub fn share_url(&self, share_id: &str) -> String {
        format!("{}/shared/{}", self.base_url.trim_end_matches('/'), share_id)
    }
}

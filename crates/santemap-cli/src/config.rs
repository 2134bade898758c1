//! YAML configuration for the santemap binary.
//!
//! Every section has defaults so a missing file still yields a working
//! local setup (in-process catalog, sqlite next to the cwd, assistant
//! gateway on localhost).

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_db_path() -> String {
    "santemap.db".to_string()
}

fn default_api_base() -> String {
    "http://127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
        }
    }
}

/// Load the config file, falling back to defaults when it is absent.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("invalid config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/santemap.yaml")).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:3000");
        assert_eq!(config.database.path, "santemap.db");
        assert!(config.assistant.api_key.is_none());
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("santemap.yaml");
        std::fs::write(
            &path,
            "assistant:\n  api_base: https://ai.example.gn\n  api_key: secret\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.assistant.api_base, "https://ai.example.gn");
        assert_eq!(config.assistant.api_key.as_deref(), Some("secret"));
        assert_eq!(config.server.listen_addr, "127.0.0.1:3000");
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("santemap.yaml");
        std::fs::write(&path, "server: [not, a, mapping]").unwrap();
        assert!(load_config(&path).is_err());
    }
}

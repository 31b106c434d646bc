//! Gateway configuration

use anyhow::{Context, Result};
use federation_core::{FederationConfig, Selector};
use federation_server::ServerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "FEDERATION_CONFIG";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// A server joining the federation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceConfig {
    pub name: String,

    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(flatten)]
    pub server: ServerConfig,
}

/// An extension to require at startup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    pub path: String,

    /// Restrict the extension to part of the federation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Selector>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub federation: FederationConfig,

    #[serde(default)]
    pub instances: Vec<InstanceConfig>,

    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub plugins: Vec<PluginConfig>,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            federation: FederationConfig::default(),
            instances: vec![InstanceConfig {
                name: "gateway".to_string(),
                labels: vec!["http".to_string()],
                server: ServerConfig::listening(8080),
            }],
            plugins: vec![
                PluginConfig {
                    path: "builtin/health".to_string(),
                    select: None,
                },
                PluginConfig {
                    path: "builtin/status".to_string(),
                    select: None,
                },
            ],
            log_format: LogFormat::Text,
        }
    }
}

impl GatewayConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse gateway config")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read gateway config {}", path.display()))?;
        Self::from_yaml_str(&yaml)
    }

    /// Load from `FEDERATION_CONFIG`, else the first argument, else defaults
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV)
            .ok()
            .or_else(|| std::env::args().nth(1));

        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

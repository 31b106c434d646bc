//! Federation configuration and the shared host environment

use crate::loader::DescriptorLoader;
use crate::{FederationError, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Host contract version extensions are checked against
pub const HOST_VERSION: &str = env!("CARGO_PKG_VERSION");

fn default_host_version() -> String {
    HOST_VERSION.to_string()
}

/// Federation configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FederationConfig {
    /// Version extension host ranges are matched against
    #[serde(default = "default_host_version")]
    pub host_version: String,

    /// Upper bound on a single extension handshake; unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_timeout_ms: Option<u64>,

    /// Free-form settings exposed to extensions
    #[serde(default)]
    pub app: serde_json::Value,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            host_version: default_host_version(),
            registration_timeout_ms: None,
            app: serde_json::Value::Null,
        }
    }
}

impl FederationConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| FederationError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn registration_timeout(&self) -> Option<Duration> {
        self.registration_timeout_ms.map(Duration::from_millis)
    }
}

/// Environment shared by a federation and every selection derived from it
#[derive(Clone)]
pub(crate) struct HostEnv {
    pub(crate) version: Version,
    pub(crate) registration_timeout: Option<Duration>,
    pub(crate) app: serde_json::Value,
    pub(crate) loader: Option<Arc<dyn DescriptorLoader>>,
}

impl HostEnv {
    pub(crate) fn from_config(config: &FederationConfig) -> Result<Self> {
        Ok(Self {
            version: Version::parse(&config.host_version)?,
            registration_timeout: config.registration_timeout(),
            app: config.app.clone(),
            loader: None,
        })
    }
}

impl Default for HostEnv {
    fn default() -> Self {
        Self {
            version: Version::parse(HOST_VERSION).unwrap_or_else(|_| Version::new(0, 0, 0)),
            registration_timeout: None,
            app: serde_json::Value::Null,
            loader: None,
        }
    }
}

//! Shared cookie/state definitions

use serde::{Deserialize, Serialize};

/// How a state value is encoded on the wire
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateEncoding {
    #[default]
    None,
    Base64,
    Base64Json,
}

/// Options for a named state (cookie) definition
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateOptions {
    #[serde(default)]
    pub encoding: StateEncoding,

    /// Time-to-live in milliseconds; session cookie when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default)]
    pub is_secure: bool,

    #[serde(default)]
    pub is_http_only: bool,
}

impl StateOptions {
    pub fn with_encoding(mut self, encoding: StateEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl = Some(ttl_ms);
        self
    }
}

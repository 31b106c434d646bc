use crate::loader::LoadError;
use federation_api::DefinitionError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FederationError>;

#[derive(Error, Debug)]
pub enum FederationError {
    #[error("Instance already exists: {0}")]
    DuplicateInstance(String),

    #[error("Not a hapi plugin")]
    NotAPlugin,

    #[error("Plugin missing name")]
    MissingName,

    #[error("Plugin missing version")]
    MissingVersion,

    #[error("Plugin missing register() method")]
    MissingRegister,

    #[error("Incompatible hapi plugin version")]
    IncompatibleVersion {
        name: String,
        required: String,
        host: String,
    },

    #[error("Plugin {name} already registered on instance {instance}")]
    AlreadyRegistered { name: String, instance: String },

    #[error("Invalid definition: {0}")]
    InvalidDefinition(#[from] DefinitionError),

    #[error("Failed to load plugin '{path}': {source}")]
    Source {
        path: String,
        #[source]
        source: LoadError,
    },

    #[error("Plugin {name} registration failed: {source}")]
    Handshake {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Plugin {name} did not complete registration within {timeout:?}")]
    RegistrationTimeout { name: String, timeout: Duration },

    #[error("Failed to start instance {name}: {source}")]
    Start {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to read configuration {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid host version: {0}")]
    InvalidHostVersion(#[from] semver::Error),
}

/// Broad classification of a [`FederationError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed descriptor or definition; nothing was done
    Structural,
    /// Host version range mismatch; nothing was installed
    Compatibility,
    /// Name already taken on an instance or in the registry
    Conflict,
    /// Descriptor source could not be loaded
    Source,
    /// The extension's own registration failed or stalled
    Handshake,
    /// An instance failed to start
    Lifecycle,
    /// Configuration could not be read or parsed
    Config,
}

impl FederationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FederationError::NotAPlugin
            | FederationError::MissingName
            | FederationError::MissingVersion
            | FederationError::MissingRegister
            | FederationError::InvalidDefinition(_) => ErrorKind::Structural,
            FederationError::IncompatibleVersion { .. } => ErrorKind::Compatibility,
            FederationError::AlreadyRegistered { .. } | FederationError::DuplicateInstance(_) => {
                ErrorKind::Conflict
            }
            FederationError::Source { .. } => ErrorKind::Source,
            FederationError::Handshake { .. } | FederationError::RegistrationTimeout { .. } => {
                ErrorKind::Handshake
            }
            FederationError::Start { .. } => ErrorKind::Lifecycle,
            FederationError::ConfigRead { .. }
            | FederationError::ConfigParse(_)
            | FederationError::InvalidHostVersion(_) => ErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_messages() {
        assert_eq!(FederationError::NotAPlugin.to_string(), "Not a hapi plugin");
        assert_eq!(FederationError::MissingName.to_string(), "Plugin missing name");
        assert_eq!(FederationError::MissingVersion.to_string(), "Plugin missing version");
        assert_eq!(
            FederationError::MissingRegister.to_string(),
            "Plugin missing register() method"
        );
        let err = FederationError::IncompatibleVersion {
            name: "skip".to_string(),
            required: "42.x.x".to_string(),
            host: "0.1.0".to_string(),
        };
        assert_eq!(err.to_string(), "Incompatible hapi plugin version");
    }

    #[test]
    fn test_source_error_embeds_loader_text() {
        let err = FederationError::Source {
            path: "./pack/none".to_string(),
            source: LoadError::NotFound("./pack/none".to_string()),
        };
        assert!(err.to_string().contains("Cannot find module"));
        assert_eq!(err.kind(), ErrorKind::Source);
    }

    #[test]
    fn test_kinds() {
        let conflict = FederationError::AlreadyRegistered {
            name: "test".to_string(),
            instance: "s1".to_string(),
        };
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        assert_eq!(FederationError::MissingName.kind(), ErrorKind::Structural);
        let handshake = FederationError::Handshake {
            name: "test".to_string(),
            source: anyhow::anyhow!("boom"),
        };
        assert_eq!(handshake.kind(), ErrorKind::Handshake);
        assert!(handshake.to_string().contains("boom"));
    }
}

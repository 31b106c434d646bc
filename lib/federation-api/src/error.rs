use thiserror::Error;

/// A definition that cannot be forwarded to any instance
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Invalid route path: {0:?}")]
    InvalidPath(String),

    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),

    #[error("Empty {0} name")]
    EmptyName(&'static str),
}

/// Failure reported by a shared helper
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Helper failed: {0}")]
pub struct HelperError(pub String);

impl HelperError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

use std::net::SocketAddr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid listen address {0}")]
    InvalidAddress(String),

    #[error("Helper not found: {0}")]
    HelperNotFound(String),

    #[error(transparent)]
    Helper(#[from] federation_api::HelperError),

    #[error("Server already listening on {0}")]
    AlreadyListening(SocketAddr),
}

//! Federation API types shared between the core and instance implementations
//!
//! This library defines the definitions a federation forwards to its instances:
//! - RouteDefinition: method + path + handler entries for an instance route table
//! - StateOptions: shared cookie/state definitions
//! - Helper: shared asynchronous helper functions

pub mod error;
pub mod helper;
pub mod route;
pub mod state;

pub use error::{DefinitionError, HelperError};
pub use helper::{helper, Helper, HelperFuture};
pub use route::{Handler, Method, Reply, Request, RouteDefinition};
pub use state::{StateEncoding, StateOptions};

/// Reject empty or whitespace-only names for helpers and states
pub fn validate_name(kind: &'static str, name: &str) -> Result<(), DefinitionError> {
    if name.trim().is_empty() {
        return Err(DefinitionError::EmptyName(kind));
    }
    Ok(())
}

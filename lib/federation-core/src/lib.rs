//! Service federation and plugin composition
//!
//! This library provides:
//! - Federation registry of named, labeled service instances
//! - Label/name selections that narrow monotonically
//! - Extension validation, semver host gating and the registration handshake
//! - Route, state and helper distribution across a selection
//! - Federation-wide start/stop

pub mod config;
pub mod descriptor;
pub mod error;
pub mod instance;
pub mod ledger;
pub mod loader;
pub mod registry;
pub mod selection;
pub mod selector;
pub mod validator;

mod distribute;
mod lifecycle;
mod protocol;

#[cfg(test)]
mod testing;

pub use config::{FederationConfig, HOST_VERSION};
pub use descriptor::{extension, Extension, ExtensionDescriptor, FnExtension, HostCompatibility, PluginContext};
pub use error::{ErrorKind, FederationError, Result};
pub use instance::{Instance, InstanceEntry, InstanceExt, STANDALONE_ENTRY};
pub use ledger::{InstalledExtension, Ledger};
pub use loader::{CatalogLoader, DescriptorFactory, DescriptorLoader, LoadError};
pub use registry::Federation;
pub use selection::{FederationView, Selection};
pub use selector::Selector;

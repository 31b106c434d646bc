//! Selections: immutable, ordered views over federation instances

use crate::config::HostEnv;
use crate::descriptor::ExtensionDescriptor;
use crate::instance::{Instance, InstanceEntry, STANDALONE_ENTRY};
use crate::selector::Selector;
use crate::validator;
use crate::Result;
use async_trait::async_trait;
use federation_api::{Helper, RouteDefinition, StateOptions};
use semver::Version;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Ordered subset of a federation's instances.
///
/// Cloning is cheap; clones share the same entries and host environment.
#[derive(Clone)]
pub struct Selection {
    entries: Arc<[Arc<InstanceEntry>]>,
    env: Arc<HostEnv>,
}

impl Selection {
    pub(crate) fn new(entries: Vec<Arc<InstanceEntry>>, env: Arc<HostEnv>) -> Self {
        Self {
            entries: entries.into(),
            env,
        }
    }

    /// Selection over a single instance with the default host environment
    pub fn standalone(instance: Arc<dyn Instance>) -> Self {
        let entry = InstanceEntry::new(STANDALONE_ENTRY.to_string(), instance, BTreeSet::new());
        Self::new(vec![Arc::new(entry)], Arc::new(HostEnv::default()))
    }

    /// Narrow this selection; the result is always a subset of `self`
    pub fn select(&self, selector: &Selector) -> Selection {
        let entries = self
            .entries
            .iter()
            .filter(|entry| selector.matches(entry))
            .cloned()
            .collect();
        Self::new(entries, self.env.clone())
    }

    pub fn entries(&self) -> &[Arc<InstanceEntry>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name() == name)
    }

    /// Structural validation of a descriptor, without installing it
    pub fn validate(&self, descriptor: &ExtensionDescriptor) -> Result<()> {
        validator::validate(descriptor)
    }

    /// Version extensions are checked against
    pub fn host_version(&self) -> &Version {
        &self.env.version
    }

    /// Application settings from the federation configuration
    pub fn app(&self) -> &serde_json::Value {
        &self.env.app
    }

    pub(crate) fn env(&self) -> &HostEnv {
        &self.env
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("entries", &self.names())
            .finish_non_exhaustive()
    }
}

/// Operations shared by the root federation and every selection
#[async_trait]
pub trait FederationView: Send + Sync {
    /// The entries this view operates on
    fn selection(&self) -> Selection;

    fn select(&self, selector: &Selector) -> Selection {
        self.selection().select(selector)
    }

    fn add_route(&self, route: RouteDefinition) -> Result<()> {
        self.selection().add_route(route)
    }

    fn add_routes(&self, routes: Vec<RouteDefinition>) -> Result<()> {
        self.selection().add_routes(routes)
    }

    fn add_state(&self, name: &str, options: StateOptions) -> Result<()> {
        self.selection().add_state(name, options)
    }

    fn add_helper(&self, name: &str, helper: Helper) -> Result<()> {
        self.selection().add_helper(name, helper)
    }

    async fn register(&self, descriptor: ExtensionDescriptor) -> Result<()> {
        self.selection().register(descriptor).await
    }

    async fn require(&self, path: &str) -> Result<()> {
        self.selection().require(path).await
    }

    async fn require_directory(&self, dir: &str, exclude: &[&str]) -> Result<()> {
        self.selection().require_directory(dir, exclude).await
    }
}

impl FederationView for Selection {
    fn selection(&self) -> Selection {
        self.clone()
    }
}

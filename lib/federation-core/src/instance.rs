//! Instance handles and registry entries

use crate::ledger::Ledger;
use crate::selection::Selection;
use async_trait::async_trait;
use federation_api::{Helper, RouteDefinition, StateOptions};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Entry name used by single-instance selections created through [`InstanceExt::plugin`]
pub const STANDALONE_ENTRY: &str = "standalone";

/// A running service instance the federation forwards definitions to.
///
/// The federation never touches instance internals; it only calls these
/// methods. The ledger belongs to the instance so duplicate installs are
/// caught no matter which selection the install came through.
#[async_trait]
pub trait Instance: Send + Sync {
    /// Add a route to the instance route table
    fn add_route(&self, route: RouteDefinition);

    fn add_routes(&self, routes: Vec<RouteDefinition>) {
        for route in routes {
            self.add_route(route);
        }
    }

    /// Add a shared state (cookie) definition
    fn add_state(&self, name: &str, options: StateOptions);

    /// Bind a shared helper under `name`
    fn add_helper(&self, name: &str, helper: Helper);

    /// Start the instance
    async fn start(&self) -> anyhow::Result<()>;

    /// Stop the instance
    fn stop(&self);

    /// Installed-extension ledger
    fn ledger(&self) -> &Ledger;
}

/// A named, labeled instance registered in a federation
pub struct InstanceEntry {
    name: String,
    instance: Arc<dyn Instance>,
    labels: BTreeSet<String>,
}

impl InstanceEntry {
    pub fn new(name: String, instance: Arc<dyn Instance>, labels: BTreeSet<String>) -> Self {
        Self {
            name,
            instance,
            labels,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance(&self) -> &Arc<dyn Instance> {
        &self.instance
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

impl fmt::Debug for InstanceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceEntry")
            .field("name", &self.name)
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

/// Single-instance plugin scope
pub trait InstanceExt {
    /// Selection containing only this instance, with the default host environment
    fn plugin(&self) -> Selection;
}

impl<I: Instance + 'static> InstanceExt for Arc<I> {
    fn plugin(&self) -> Selection {
        Selection::standalone(self.clone())
    }
}

impl InstanceExt for Arc<dyn Instance> {
    fn plugin(&self) -> Selection {
        Selection::standalone(self.clone())
    }
}

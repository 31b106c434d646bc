//! Federation registry: the named, labeled instances every selection starts from

use crate::config::{FederationConfig, HostEnv};
use crate::descriptor::ExtensionDescriptor;
use crate::instance::{Instance, InstanceEntry};
use crate::loader::DescriptorLoader;
use crate::selection::{FederationView, Selection};
use crate::{validator, FederationError, Result};
use semver::Version;
use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use tracing::{debug, info};

/// Federation maintains the registry of instances and acts as the root selection
pub struct Federation {
    // Entries in add order
    entries: RwLock<Vec<Arc<InstanceEntry>>>,
    env: Arc<HostEnv>,
}

impl Federation {
    pub fn new(config: FederationConfig) -> Result<Self> {
        let env = HostEnv::from_config(&config)?;
        info!("Federation initialized with host version {}", env.version);
        Ok(Self {
            entries: RwLock::new(Vec::new()),
            env: Arc::new(env),
        })
    }

    /// Use `loader` to resolve `require` and `require_directory` paths
    pub fn with_loader(mut self, loader: Arc<dyn DescriptorLoader>) -> Self {
        Arc::make_mut(&mut self.env).loader = Some(loader);
        self
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, Vec<Arc<InstanceEntry>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an instance under a unique name
    pub fn add_instance<L, S>(
        &self,
        name: impl Into<String>,
        instance: Arc<dyn Instance>,
        labels: L,
    ) -> Result<()>
    where
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let labels: BTreeSet<String> = labels.into_iter().map(Into::into).collect();

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.iter().any(|entry| entry.name() == name) {
            return Err(FederationError::DuplicateInstance(name));
        }

        debug!("Registered instance {} with labels {:?}", name, labels);
        entries.push(Arc::new(InstanceEntry::new(name, instance, labels)));
        Ok(())
    }

    /// Selection over every registered instance
    pub fn root(&self) -> Selection {
        Selection::new(self.read_entries().clone(), self.env.clone())
    }

    pub fn get(&self, name: &str) -> Option<Arc<InstanceEntry>> {
        self.read_entries()
            .iter()
            .find(|entry| entry.name() == name)
            .cloned()
    }

    /// Labels of a registered instance
    pub fn labels_of(&self, name: &str) -> Option<BTreeSet<String>> {
        self.get(name).map(|entry| entry.labels().clone())
    }

    pub fn names(&self) -> Vec<String> {
        self.read_entries()
            .iter()
            .map(|entry| entry.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Structural validation of a descriptor, without installing it
    pub fn validate(&self, descriptor: &ExtensionDescriptor) -> Result<()> {
        validator::validate(descriptor)
    }

    pub fn host_version(&self) -> &Version {
        &self.env.version
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<InstanceEntry>> {
        self.read_entries().clone()
    }
}

impl Default for Federation {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            env: Arc::new(HostEnv::default()),
        }
    }
}

impl FederationView for Federation {
    fn selection(&self) -> Selection {
        self.root()
    }
}

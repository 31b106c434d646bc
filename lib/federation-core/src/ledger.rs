//! Per-instance record of installed extensions

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An extension recorded as installed on an instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InstalledExtension {
    pub version: String,
    pub installed_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
enum Slot {
    /// Held by an in-flight registration
    Pending,
    Installed(InstalledExtension),
}

/// Installed-extension ledger owned by an instance.
///
/// A name is either free, reserved by a registration that has passed the
/// conflict gate but not completed yet, or installed. Reserved and installed
/// names both block another registration of the same name.
#[derive(Debug, Default)]
pub struct Ledger {
    slots: Mutex<BTreeMap<String, Slot>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, BTreeMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True if the name is installed or currently being installed
    pub fn contains(&self, name: &str) -> bool {
        self.slots().contains_key(name)
    }

    /// Installation record for a name, if installed
    pub fn get(&self, name: &str) -> Option<InstalledExtension> {
        match self.slots().get(name) {
            Some(Slot::Installed(installed)) => Some(installed.clone()),
            _ => None,
        }
    }

    /// Installed version for a name
    pub fn version_of(&self, name: &str) -> Option<String> {
        self.get(name).map(|installed| installed.version)
    }

    /// All installed extensions, by name
    pub fn installed(&self) -> BTreeMap<String, InstalledExtension> {
        self.slots()
            .iter()
            .filter_map(|(name, slot)| match slot {
                Slot::Installed(installed) => Some((name.clone(), installed.clone())),
                Slot::Pending => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots()
            .values()
            .filter(|slot| matches!(slot, Slot::Installed(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reserve a free name. Returns false if the name is taken.
    pub(crate) fn try_reserve(&self, name: &str) -> bool {
        let mut slots = self.slots();
        if slots.contains_key(name) {
            return false;
        }
        slots.insert(name.to_string(), Slot::Pending);
        true
    }

    /// Turn a reservation into an installation record
    pub(crate) fn commit(&self, name: &str, version: &str) {
        self.slots().insert(
            name.to_string(),
            Slot::Installed(InstalledExtension {
                version: version.to_string(),
                installed_at: Utc::now(),
            }),
        );
    }

    /// Drop a reservation; installed names are left alone
    pub(crate) fn release(&self, name: &str) {
        let mut slots = self.slots();
        if matches!(slots.get(name), Some(Slot::Pending)) {
            slots.remove(name);
        }
    }
}

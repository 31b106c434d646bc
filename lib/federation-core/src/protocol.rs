//! Registration protocol: validate, gate, handshake, record

use crate::descriptor::{ExtensionDescriptor, PluginContext};
use crate::instance::InstanceEntry;
use crate::ledger::Ledger;
use crate::loader::LoadError;
use crate::selection::Selection;
use crate::{validator, FederationError, Result};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// Names reserved on a set of ledgers by an in-flight registration.
///
/// Dropped without `commit`, every reservation is released.
struct Reservation<'a> {
    name: String,
    ledgers: Vec<&'a Ledger>,
    committed: bool,
}

impl<'a> Reservation<'a> {
    /// Reserve `name` on every entry, or on none of them
    fn acquire(entries: &'a [Arc<InstanceEntry>], name: &str) -> Result<Self> {
        let mut reservation = Reservation {
            name: name.to_string(),
            ledgers: Vec::with_capacity(entries.len()),
            committed: false,
        };

        for entry in entries {
            let ledger = entry.instance().ledger();
            // The same instance may be registered under several names
            if reservation.ledgers.iter().any(|held| std::ptr::eq(*held, ledger)) {
                continue;
            }
            if !ledger.try_reserve(name) {
                return Err(FederationError::AlreadyRegistered {
                    name: name.to_string(),
                    instance: entry.name().to_string(),
                });
            }
            reservation.ledgers.push(ledger);
        }

        Ok(reservation)
    }

    fn commit(mut self, version: &str) {
        for ledger in &self.ledgers {
            ledger.commit(&self.name, version);
        }
        self.committed = true;
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            for ledger in &self.ledgers {
                ledger.release(&self.name);
            }
        }
    }
}

impl Selection {
    /// Install an extension onto every instance of this selection.
    ///
    /// The extension's `register` runs once, scoped to this selection, and
    /// only after validation, the host version check and the conflict gate
    /// have all passed.
    pub async fn register(&self, descriptor: ExtensionDescriptor) -> Result<()> {
        validator::validate(&descriptor)?;
        validator::check_compatibility(&descriptor, &self.env().version).inspect_err(|e| {
            warn!("Rejected plugin {}: {}", descriptor.name, e);
        })?;
        let Some(extension) = descriptor.register.clone() else {
            return Err(FederationError::MissingRegister);
        };

        let reservation = Reservation::acquire(self.entries(), &descriptor.name).inspect_err(|e| {
            warn!("Rejected plugin {}: {}", descriptor.name, e);
        })?;

        let span = info_span!("register", plugin = %descriptor.name, version = %descriptor.version);
        let ctx = PluginContext::new(self.clone(), &descriptor);
        let handshake = extension.register(ctx).instrument(span);

        let outcome = match self.env().registration_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, handshake).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("Plugin {} registration timed out after {:?}", descriptor.name, timeout);
                    return Err(FederationError::RegistrationTimeout {
                        name: descriptor.name,
                        timeout,
                    });
                }
            },
            None => handshake.await,
        };

        match outcome {
            Ok(()) => {
                reservation.commit(&descriptor.version);
                info!(
                    "Registered plugin {}@{} on {} instances",
                    descriptor.name,
                    descriptor.version,
                    self.len()
                );
                Ok(())
            }
            Err(source) => {
                warn!("Plugin {} registration failed: {}", descriptor.name, source);
                Err(FederationError::Handshake {
                    name: descriptor.name,
                    source,
                })
            }
        }
    }

    /// Load one descriptor through the configured loader and register it
    pub async fn require(&self, path: &str) -> Result<()> {
        let loader = self.env().loader.as_ref().ok_or_else(|| FederationError::Source {
            path: path.to_string(),
            source: LoadError::Unavailable,
        })?;

        let descriptor = loader.load(path).await.map_err(|source| FederationError::Source {
            path: path.to_string(),
            source,
        })?;

        debug!("Loaded plugin {} from {}", descriptor.name, path);
        self.register(descriptor).await
    }

    /// Register every descriptor under `dir` except those in `exclude`,
    /// one after another, stopping at the first failure
    pub async fn require_directory(&self, dir: &str, exclude: &[&str]) -> Result<()> {
        let loader = self.env().loader.as_ref().ok_or_else(|| FederationError::Source {
            path: dir.to_string(),
            source: LoadError::Unavailable,
        })?;

        let ids = loader.list(dir).await.map_err(|source| FederationError::Source {
            path: dir.to_string(),
            source,
        })?;

        for id in ids.iter().filter(|id| !exclude.contains(&id.as_str())) {
            let path = format!("{}/{}", dir.trim_end_matches('/'), id);
            self.require(&path).await?;
        }
        Ok(())
    }
}

//! Federation-wide start/stop

use crate::registry::Federation;
use crate::{FederationError, Result};
use futures::future::join_all;
use tracing::{debug, info, warn};

impl Federation {
    /// Start every instance concurrently and wait until all have reported.
    ///
    /// Returns the first failure in registration order; the rest are logged.
    pub async fn start(&self) -> Result<()> {
        let entries = self.snapshot();
        info!("Starting {} instances", entries.len());

        let results = join_all(entries.iter().map(|entry| async move {
            let result = entry.instance().start().await;
            (entry.name(), result)
        }))
        .await;

        let mut first_error = None;
        for (name, result) in results {
            match result {
                Ok(()) => debug!("Instance {} started", name),
                Err(source) => {
                    warn!("Instance {} failed to start: {}", name, source);
                    if first_error.is_none() {
                        first_error = Some(FederationError::Start {
                            name: name.to_string(),
                            source,
                        });
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                info!("All {} instances started", entries.len());
                Ok(())
            }
        }
    }

    /// Stop every instance, one after another
    pub fn stop(&self) {
        for entry in self.snapshot() {
            debug!("Stopping instance {}", entry.name());
            entry.instance().stop();
        }
        info!("Federation stopped");
    }
}

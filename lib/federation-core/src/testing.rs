//! Test doubles

use crate::instance::Instance;
use crate::ledger::Ledger;
use crate::registry::Federation;
use async_trait::async_trait;
use federation_api::{Helper, RouteDefinition, StateOptions};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Instance that records everything forwarded to it
#[derive(Default)]
pub(crate) struct MockInstance {
    routes: Mutex<Vec<RouteDefinition>>,
    states: Mutex<Vec<String>>,
    helpers: Mutex<BTreeMap<String, Helper>>,
    started: AtomicBool,
    stops: AtomicUsize,
    start_delay: Option<Duration>,
    fail_start: bool,
    ledger: Ledger,
}

impl MockInstance {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay);
        self
    }

    pub(crate) fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap()
            .iter()
            .map(|route| route.path.clone())
            .collect()
    }

    pub(crate) fn states(&self) -> Vec<String> {
        self.states.lock().unwrap().clone()
    }

    pub(crate) fn helper(&self, name: &str) -> Option<Helper> {
        self.helpers.lock().unwrap().get(name).cloned()
    }

    pub(crate) fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub(crate) fn stop_calls(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Instance for MockInstance {
    fn add_route(&self, route: RouteDefinition) {
        self.routes.lock().unwrap().push(route);
    }

    fn add_state(&self, name: &str, _options: StateOptions) {
        self.states.lock().unwrap().push(name.to_string());
    }

    fn add_helper(&self, name: &str, helper: Helper) {
        self.helpers.lock().unwrap().insert(name.to_string(), helper);
    }

    async fn start(&self) -> anyhow::Result<()> {
        if let Some(delay) = self.start_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_start {
            anyhow::bail!("port already in use");
        }
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.started.store(false, Ordering::SeqCst);
    }

    fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

/// Four instances labeled `[a,b]`, `[a,c]`, `[a,b,d]`, `[b,x]` as s1..s4
pub(crate) fn labeled_federation() -> (Federation, [Arc<MockInstance>; 4]) {
    let federation = Federation::default();
    let instances: [Arc<MockInstance>; 4] = std::array::from_fn(|_| Arc::new(MockInstance::new()));
    let labels: [&[&str]; 4] = [&["a", "b"], &["a", "c"], &["a", "b", "d"], &["b", "x"]];

    for (idx, (instance, labels)) in instances.iter().zip(labels).enumerate() {
        federation
            .add_instance(format!("s{}", idx + 1), instance.clone(), labels.iter().copied())
            .unwrap();
    }
    (federation, instances)
}

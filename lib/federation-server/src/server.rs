//! Reference service instance

use crate::error::{Result, ServerError};
use crate::http;
use crate::routes::RouteTable;
use async_trait::async_trait;
use federation_api::{Helper, Method, Reply, Request, RouteDefinition, StateOptions};
use federation_core::{Instance, Ledger};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info};

fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Server configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port; `0` picks a free port. No listener when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: None,
        }
    }
}

impl ServerConfig {
    pub fn listening(port: u16) -> Self {
        Self {
            port: Some(port),
            ..Self::default()
        }
    }
}

struct Listening {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

/// In-process server with route, state and helper tables.
///
/// Started with a port configured, it serves its route table over HTTP/1.
pub struct Server {
    config: ServerConfig,
    routes: Arc<RouteTable>,
    states: RwLock<BTreeMap<String, StateOptions>>,
    helpers: RwLock<BTreeMap<String, Helper>>,
    started: AtomicBool,
    listening: Mutex<Option<Listening>>,
    ledger: Ledger,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            routes: Arc::new(RouteTable::new()),
            states: RwLock::new(BTreeMap::new()),
            helpers: RwLock::new(BTreeMap::new()),
            started: AtomicBool::new(false),
            listening: Mutex::new(None),
            ledger: Ledger::new(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Paths routed for a method, in insertion order
    pub fn routes(&self, method: Method) -> Vec<String> {
        self.routes.paths(method)
    }

    pub fn route_table(&self) -> &RouteTable {
        &self.routes
    }

    /// Handle a request in-process, without the HTTP listener
    pub fn inject(&self, request: &Request) -> Reply {
        self.routes.dispatch(request)
    }

    pub fn state(&self, name: &str) -> Option<StateOptions> {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn helper(&self, name: &str) -> Option<Helper> {
        self.helpers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Invoke a bound helper
    pub async fn call_helper(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let helper = self
            .helper(name)
            .ok_or_else(|| ServerError::HelperNotFound(name.to_string()))?;
        Ok(helper(args).await?)
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Bound address while listening
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listening
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|listening| listening.addr)
    }

    async fn listen(&self, port: u16) -> Result<()> {
        if let Some(addr) = self.local_addr() {
            return Err(ServerError::AlreadyListening(addr));
        }

        let addr = format!("{}:{}", self.config.host, port);
        let resolved = tokio::net::lookup_host(addr.as_str())
            .await
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| ServerError::InvalidAddress(addr.clone()))?;
        let listener = TcpListener::bind(resolved)
            .await
            .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;
        let local = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let task = tokio::task::spawn(http::serve(listener, self.routes.clone()));
        *self.listening.lock().unwrap_or_else(PoisonError::into_inner) = Some(Listening {
            addr: local,
            task,
        });
        info!("Server listening on {}", local);
        Ok(())
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

#[async_trait]
impl Instance for Server {
    fn add_route(&self, route: RouteDefinition) {
        self.routes.insert(route);
    }

    fn add_state(&self, name: &str, options: StateOptions) {
        debug!("Added state {}", name);
        self.states
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), options);
    }

    fn add_helper(&self, name: &str, helper: Helper) {
        debug!("Added helper {}", name);
        self.helpers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), helper);
    }

    async fn start(&self) -> anyhow::Result<()> {
        if self.is_started() {
            return Ok(());
        }
        if let Some(port) = self.config.port {
            self.listen(port).await?;
        }
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        if let Some(listening) = self
            .listening
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            listening.task.abort();
            info!("Server on {} stopped listening", listening.addr);
        }
        self.started.store(false, Ordering::SeqCst);
    }

    fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

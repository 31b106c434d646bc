//! Per-server route table

use federation_api::{Method, Reply, Request, RouteDefinition};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

/// Routes keyed by method, in insertion order per method
#[derive(Default)]
pub struct RouteTable {
    routes: RwLock<BTreeMap<Method, Vec<RouteDefinition>>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route; a route with the same method and path is replaced
    pub fn insert(&self, route: RouteDefinition) {
        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        let list = routes.entry(route.method).or_default();
        if let Some(existing) = list.iter_mut().find(|r| r.path == route.path) {
            warn!("Replacing route {} {}", route.method, route.path);
            *existing = route;
        } else {
            debug!("Added route {} {}", route.method, route.path);
            list.push(route);
        }
    }

    pub fn lookup(&self, method: Method, path: &str) -> Option<RouteDefinition> {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        routes
            .get(&method)
            .and_then(|list| list.iter().find(|r| r.path == path))
            .cloned()
    }

    /// Paths registered for a method
    pub fn paths(&self, method: Method) -> Vec<String> {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        routes
            .get(&method)
            .map(|list| list.iter().map(|r| r.path.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the matching handler, or answer 404
    pub fn dispatch(&self, request: &Request) -> Reply {
        match self.lookup(request.method, &request.path) {
            Some(route) => route.handle(request),
            None => Reply::not_found(&request.path),
        }
    }
}

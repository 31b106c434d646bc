//! Forwarding route, state and helper definitions to every instance of a selection

use crate::selection::Selection;
use crate::Result;
use federation_api::{validate_name, Helper, RouteDefinition, StateOptions};
use tracing::debug;

impl Selection {
    pub fn add_route(&self, route: RouteDefinition) -> Result<()> {
        route.validate()?;
        for entry in self.entries() {
            debug!("Adding route {} {} to {}", route.method, route.path, entry.name());
            entry.instance().add_route(route.clone());
        }
        Ok(())
    }

    /// Validate every route, then forward them all to each instance
    pub fn add_routes(&self, routes: Vec<RouteDefinition>) -> Result<()> {
        for route in &routes {
            route.validate()?;
        }
        for entry in self.entries() {
            debug!("Adding {} routes to {}", routes.len(), entry.name());
            entry.instance().add_routes(routes.clone());
        }
        Ok(())
    }

    pub fn add_state(&self, name: &str, options: StateOptions) -> Result<()> {
        validate_name("state", name)?;
        for entry in self.entries() {
            debug!("Adding state {} to {}", name, entry.name());
            entry.instance().add_state(name, options.clone());
        }
        Ok(())
    }

    /// Bind `helper` under `name` on each instance
    pub fn add_helper(&self, name: &str, helper: Helper) -> Result<()> {
        validate_name("helper", name)?;
        for entry in self.entries() {
            debug!("Adding helper {} to {}", name, entry.name());
            entry.instance().add_helper(name, helper.clone());
        }
        Ok(())
    }
}

//! Built-in extensions shipped with the gateway

use federation_api::{Method, Reply, RouteDefinition};
use federation_core::{CatalogLoader, ExtensionDescriptor, PluginContext};
use serde_json::json;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Catalog of built-in extensions, addressed as `builtin/<name>`
pub fn catalog() -> CatalogLoader {
    CatalogLoader::new()
        .with("builtin/health", health)
        .with("builtin/status", status)
}

/// `GET /healthz` on every selected server
pub fn health() -> ExtensionDescriptor {
    ExtensionDescriptor::from_fn("health", VERSION, |ctx: PluginContext| async move {
        ctx.add_route(RouteDefinition::text(Method::Get, "/healthz", "ok"))?;
        Ok(())
    })
}

/// `GET /status` reporting the host version, the selected servers and app settings
pub fn status() -> ExtensionDescriptor {
    ExtensionDescriptor::from_fn("status", VERSION, |ctx: PluginContext| async move {
        let body = json!({
            "host_version": ctx.host_version().to_string(),
            "instances": ctx.names(),
            "app": ctx.app(),
        });
        ctx.add_route(RouteDefinition::get("/status", move |_| Reply::json(&body)))?;
        Ok(())
    })
}

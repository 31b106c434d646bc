use anyhow::Result;
use federation_core::{Federation, FederationView};
use federation_server::Server;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod plugins;

use config::{GatewayConfig, LogFormat, PluginConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = GatewayConfig::load()?;
    init_tracing(config.log_format);

    info!("Starting federation-gateway...");

    let (federation, _servers) = build_federation(&config)?;
    info!("Federation initialized with {} servers", federation.len());

    install_plugins(&federation, &config.plugins).await?;

    federation.start().await?;
    info!("Federation started");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    federation.stop();

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Create one server per configured instance, sharing the built-in catalog
fn build_federation(config: &GatewayConfig) -> Result<(Federation, Vec<Arc<Server>>)> {
    let federation =
        Federation::new(config.federation.clone())?.with_loader(Arc::new(plugins::catalog()));

    let mut servers = Vec::with_capacity(config.instances.len());
    for instance in &config.instances {
        let server = Arc::new(Server::new(instance.server.clone()));
        federation.add_instance(&instance.name, server.clone(), instance.labels.iter().cloned())?;
        servers.push(server);
    }
    Ok((federation, servers))
}

async fn install_plugins(federation: &Federation, plugins: &[PluginConfig]) -> Result<()> {
    for plugin in plugins {
        match &plugin.select {
            Some(selector) => federation.select(selector).require(&plugin.path).await?,
            None => federation.require(&plugin.path).await?,
        }
        info!("Installed {}", plugin.path);
    }
    Ok(())
}

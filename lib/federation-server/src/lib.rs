//! Reference service instance for federations
pub mod error;
pub mod http;
pub mod routes;
pub mod server;

pub use error::{Result, ServerError};
pub use routes::RouteTable;
pub use server::{Server, ServerConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use federation_api::{helper, Method, Reply, Request, RouteDefinition, StateEncoding, StateOptions};
    use federation_core::{
        CatalogLoader, ExtensionDescriptor, Federation, FederationError, FederationView, Instance,
        InstanceExt, Selector,
    };
    use serde_json::json;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn pack(labels: [&[&str]; 4], configs: [ServerConfig; 4]) -> (Federation, Vec<Arc<Server>>) {
        let federation = Federation::default().with_loader(Arc::new(catalog()));
        let servers: Vec<Arc<Server>> = configs.into_iter().map(|c| Arc::new(Server::new(c))).collect();
        for (idx, (server, labels)) in servers.iter().zip(labels).enumerate() {
            federation
                .add_instance(format!("s{}", idx + 1), server.clone(), labels.iter().copied())
                .unwrap();
        }
        (federation, servers)
    }

    fn test_pack() -> (Federation, Vec<Arc<Server>>) {
        pack(
            [&["a", "b"], &["a", "test"], &["a", "b", "d"], &["b", "test"]],
            Default::default(),
        )
    }

    fn catalog() -> CatalogLoader {
        CatalogLoader::new()
            .with("./pack/test", || {
                ExtensionDescriptor::from_fn("test", "1.0.0", |ctx| async move {
                    ctx.select(&Selector::label("test"))
                        .add_route(RouteDefinition::text(Method::Get, "/test", "testing123"))?;
                    Ok(())
                })
                .with_host_range("0.x.x")
            })
            .with("./pack/skip", || {
                ExtensionDescriptor::from_fn("skip", "1.0.0", |_| async { Ok(()) })
                    .with_host_range("42.x.x")
            })
    }

    #[tokio::test]
    async fn test_registers_plugins() {
        let (federation, servers) = pack(
            [&["a", "b"], &["a", "c"], &["a", "b", "d"], &["b", "x"]],
            Default::default(),
        );
        let server3 = servers[2].clone();

        let plugin = ExtensionDescriptor::from_fn("test", "1.0.0", move |ctx| {
            let server3 = server3.clone();
            async move {
                let a = ctx.select(&Selector::label("a"));
                let ab = a.select(&Selector::label("b"));
                let memoryx = ctx.select(&Selector::labels(["x", "cache"]));
                let sodd = ctx.select(&Selector::names(["s2", "s4"]));

                ctx.add_route(RouteDefinition::get("/all", |_| Reply::text("all")))?;
                a.add_route(RouteDefinition::get("/a", |_| Reply::text("a")))?;
                ab.add_routes(vec![RouteDefinition::get("/ab", |_| Reply::text("ab"))])?;
                memoryx.add_route(RouteDefinition::get("/memoryx", |_| Reply::text("memoryx")))?;
                sodd.add_route(RouteDefinition::get("/sodd", |_| Reply::text("sodd")))?;

                memoryx.add_state("sid", StateOptions::default().with_encoding(StateEncoding::Base64))?;
                ctx.add_helper("test", helper(|_| async { Ok(json!("123")) }))?;

                let result = server3.call_helper("test", vec![]).await?;
                anyhow::ensure!(result == json!("123"), "unexpected helper result {result}");
                Ok(())
            }
        })
        .with_host_range("0.x.x");

        federation.register(plugin).await.unwrap();

        assert_eq!(servers[0].routes(Method::Get), vec!["/all", "/a", "/ab"]);
        assert_eq!(servers[1].routes(Method::Get), vec!["/all", "/a", "/sodd"]);
        assert_eq!(servers[2].routes(Method::Get), vec!["/all", "/a", "/ab"]);
        assert_eq!(servers[3].routes(Method::Get), vec!["/all", "/memoryx", "/sodd"]);

        assert_eq!(
            servers[3].state("sid").unwrap().encoding,
            StateEncoding::Base64
        );
        assert!(servers[0].state("sid").is_none());
        assert_eq!(servers[0].ledger().version_of("test"), Some("1.0.0".to_string()));
        assert_eq!(
            servers[3].inject(&Request::new(Method::Get, "/memoryx")).body,
            "memoryx"
        );
    }

    #[tokio::test]
    async fn test_requires_plugin() {
        let (federation, servers) = test_pack();
        federation.require("./pack/test").await.unwrap();

        assert!(servers[0].routes(Method::Get).is_empty());
        assert_eq!(servers[1].routes(Method::Get), vec!["/test"]);
        assert!(servers[2].routes(Method::Get).is_empty());
        assert_eq!(servers[3].routes(Method::Get), vec!["/test"]);
    }

    #[tokio::test]
    async fn test_requires_plugin_via_server_plugin_interface() {
        let plugin = || {
            ExtensionDescriptor::from_fn("test", "1.0.0", |ctx| async move {
                ctx.add_route(RouteDefinition::get("/a", |_| Reply::text("a")))?;
                Ok(())
            })
            .with_host_range("0.x.x")
        };

        let server = Arc::new(Server::default());
        server.plugin().register(plugin()).await.unwrap();
        assert_eq!(server.routes(Method::Get), vec!["/a"]);

        let err = server.plugin().register(plugin()).await.unwrap_err();
        assert!(matches!(err, FederationError::AlreadyRegistered { .. }));
        assert_eq!(server.routes(Method::Get), vec!["/a"]);
    }

    #[tokio::test]
    async fn test_requires_directory() {
        let (federation, servers) = test_pack();
        federation.require_directory("./pack", &["skip"]).await.unwrap();

        assert!(servers[0].routes(Method::Get).is_empty());
        assert_eq!(servers[1].routes(Method::Get), vec!["/test"]);
        assert!(servers[2].routes(Method::Get).is_empty());
        assert_eq!(servers[3].routes(Method::Get), vec!["/test"]);
    }

    #[tokio::test]
    async fn test_requires_directory_without_exclude_hits_bad_version() {
        let (federation, servers) = test_pack();
        let err = federation.require_directory("./pack", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "Incompatible hapi plugin version");
        // "skip" sorts before "test", so nothing was installed
        assert!(servers[1].routes(Method::Get).is_empty());
    }

    #[tokio::test]
    async fn test_fails_to_require_bad_version() {
        let (federation, _) = test_pack();
        let err = federation.require("./pack/skip").await.unwrap_err();
        assert_eq!(err.to_string(), "Incompatible hapi plugin version");
    }

    #[tokio::test]
    async fn test_fails_to_require_missing_module() {
        let (federation, _) = test_pack();
        let err = federation.require("./pack/none").await.unwrap_err();
        assert!(err.to_string().contains("Cannot find module"));
    }

    #[tokio::test]
    async fn test_starts_and_stops() {
        let (federation, servers) = pack(
            [&["a", "b"], &["a", "test"], &["a", "b", "d"], &["b", "test"]],
            std::array::from_fn(|_| ServerConfig::listening(0)),
        );

        federation.start().await.unwrap();
        for server in &servers {
            assert!(server.is_started());
            assert!(server.local_addr().is_some());
        }

        federation.stop();
        for server in &servers {
            assert!(!server.is_started());
            assert!(server.local_addr().is_none());
        }
    }

    #[tokio::test]
    async fn test_serves_distributed_routes_over_http() {
        let (federation, servers) = pack(
            [&["a"], &[], &[], &[]],
            [
                ServerConfig::listening(0),
                ServerConfig::default(),
                ServerConfig::default(),
                ServerConfig::default(),
            ],
        );
        federation
            .select(&Selector::label("a"))
            .add_route(RouteDefinition::text(Method::Get, "/hello", "hello federation"))
            .unwrap();
        federation.start().await.unwrap();

        let addr = servers[0].local_addr().unwrap();
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /hello HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("hello federation"));

        federation.stop();
    }

    #[tokio::test]
    async fn test_invalidates_descriptors() {
        let federation = Federation::default();
        let valid = || ExtensionDescriptor::from_fn("test", "0.0.0", |_| async { Ok(()) });

        let not_plugin = ExtensionDescriptor { host: None, ..valid() };
        assert_eq!(federation.validate(&not_plugin).unwrap_err().to_string(), "Not a hapi plugin");

        let no_name = ExtensionDescriptor { name: String::new(), ..valid() };
        assert_eq!(federation.validate(&no_name).unwrap_err().to_string(), "Plugin missing name");

        let no_version = ExtensionDescriptor { version: String::new(), ..valid() };
        assert_eq!(
            federation.validate(&no_version).unwrap_err().to_string(),
            "Plugin missing version"
        );

        let no_register = ExtensionDescriptor { register: None, ..valid() };
        assert_eq!(
            federation.validate(&no_register).unwrap_err().to_string(),
            "Plugin missing register() method"
        );
    }
}

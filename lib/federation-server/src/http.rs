//! HTTP/1 listener serving a server's route table

use crate::routes::RouteTable;
use federation_api::{Method, Reply, Request};
use http_body_util::Full;
use hyper::{
    body::{Bytes, Incoming},
    header::{HeaderValue, CONTENT_TYPE},
    server::conn::http1,
    service::service_fn,
    Response, StatusCode,
};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, warn};

/// Accept connections until the task is aborted
pub(crate) async fn serve(listener: TcpListener, table: Arc<RouteTable>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                let io = TokioIo::new(stream);
                let table = table.clone();

                tokio::task::spawn(async move {
                    let service = service_fn(move |req| {
                        let table = table.clone();
                        async move { handle_request(req, &table) }
                    });

                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        debug!("Error serving HTTP connection from {}: {}", peer_addr, e);
                    }
                });
            }
            Err(e) => {
                warn!("Error accepting HTTP connection: {}", e);
            }
        }
    }
}

fn handle_request(
    req: hyper::Request<Incoming>,
    table: &RouteTable,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path().to_string();
    debug!("{} {}", req.method(), path);

    let reply = match req.method().as_str().parse::<Method>() {
        Ok(method) => table.dispatch(&Request::new(method, path)),
        Err(_) => Reply::text("Method Not Allowed\n").with_status(405),
    };
    Ok(to_response(reply))
}

fn to_response(reply: Reply) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(reply.body)));
    *response.status_mut() =
        StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(reply.content_type));
    response
}

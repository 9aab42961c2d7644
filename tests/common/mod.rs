//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use edge_headers::config::loader::{host_config, parse_table};
use edge_headers::{Headers, HttpServer};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Config used by most scenarios: one response header and CORS for a
/// single origin.
pub const SCENARIO_CONFIG: &str = r#"
[http.headers.response]
X-Powered-By = "core"

[http.headers.cors]
allowedOrigin = "https://a.test"
maxAge = 86400
"#;

/// Build the fully layered host from TOML text, the way startup does.
pub fn server_from(config: &str) -> HttpServer {
    let table = parse_table(config).unwrap();
    let host = host_config(&table).unwrap();
    let headers = Headers::init(&table).unwrap();
    HttpServer::new(host, headers)
}

pub fn router_from(config: &str) -> Router {
    server_from(config).router()
}

/// Send one request through the router without a socket.
pub async fn send(router: Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    router.oneshot(request).await.unwrap()
}

/// Collect a response body into bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Parse the echo handler's JSON body.
pub async fn echo_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Values the echo handler saw for a request header.
pub fn echoed(echo: &Value, name: &str) -> Vec<String> {
    echo["headers"][name]
        .as_array()
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Start the host on an ephemeral port and return its address.
pub async fn start_server(config: &str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = router_from(config);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

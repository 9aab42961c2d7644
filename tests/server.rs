//! The host served over a real socket.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde_json::Value;

mod common;

const CONFIG: &str = r#"
[http.headers.request]
X-Env = "prod"

[http.headers.response]
X-Powered-By = "core"

[http.headers.cors]
allowedOrigin = "https://a.test"
allowedHeaders = ["Content-Type", "Authorization"]
allowedMethods = "GET, POST"
exposedHeaders = "X-Total-Count"
allowCredentials = true
maxAge = 600
"#;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_get_over_tcp() {
    let addr = common::start_server(CONFIG).await;

    let res = client()
        .get(format!("http://{addr}/items"))
        .header("Origin", "https://a.test")
        .header("X-Env", "client")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers();
    assert_eq!(headers["x-powered-by"], "core");
    assert_eq!(headers["access-control-allow-origin"], "https://a.test");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type, Authorization");
    assert_eq!(headers["access-control-expose-headers"], "X-Total-Count");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert!(headers.get("access-control-allow-methods").is_none());
    assert!(headers.get("access-control-max-age").is_none());

    let echo: Value = res.json().await.unwrap();
    assert_eq!(echo["path"], "/items");
    assert_eq!(common::echoed(&echo, "x-env"), vec!["client", "prod"]);
}

#[tokio::test]
async fn test_preflight_over_tcp() {
    let addr = common::start_server(CONFIG).await;

    let res = client()
        .request(Method::OPTIONS, format!("http://{addr}/items"))
        .header("Origin", "https://a.test")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-methods"], "GET, POST");
    assert_eq!(headers["access-control-max-age"], "600");
    assert_eq!(headers["x-powered-by"], "core");
    assert!(headers.get("access-control-expose-headers").is_none());
    assert_eq!(headers.get_all("vary").iter().count(), 3);

    assert!(res.bytes().await.unwrap().is_empty());
}

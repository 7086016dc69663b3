//! Loopback Splunk stand-in for integration tests.
//!
//! Serves a login endpoint, an apps collection guarded by the session key,
//! a slow endpoint and an echo endpoint. Every request is recorded.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SESSION_KEY: &str = "192fd3e46a31246da7ea7f109e7f95fd";

pub const APPS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:s="http://dev.splunk.com/ns/rest" xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">
  <title>localapps</title>
  <id>https://localhost:8089/services/apps/local</id>
  <updated>2014-01-28T16:06:11-08:00</updated>
  <opensearch:totalResults>2</opensearch:totalResults>
  <entry>
    <title>search</title>
    <id>https://localhost:8089/servicesNS/nobody/system/apps/local/search</id>
    <updated>2014-01-28T16:06:11-08:00</updated>
    <content type="text/xml">
      <s:dict>
        <s:key name="label">Search &amp; Reporting</s:key>
      </s:dict>
    </content>
  </entry>
  <entry>
    <title>launcher</title>
    <id>https://localhost:8089/servicesNS/nobody/system/apps/local/launcher</id>
    <updated>2014-01-28T16:06:11-08:00</updated>
    <content type="text/xml">
      <s:dict>
        <s:key name="label">Home</s:key>
      </s:dict>
    </content>
  </entry>
</feed>"#;

/// A request as received by the server.
#[derive(Debug, Clone)]
pub struct Received {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Default)]
pub struct ServerState {
    pub received: Mutex<Vec<Received>>,
}

impl ServerState {
    pub fn last(&self) -> Received {
        self.received
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request received")
    }
}

async fn handle(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let received = Received {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(String::from),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    state.received.lock().unwrap().push(received.clone());

    match received.path.as_str() {
        "/services/auth/login" => {
            if received.body.contains("password=changeme") {
                (
                    StatusCode::OK,
                    format!("<response><sessionKey>{}</sessionKey></response>", SESSION_KEY),
                )
            } else {
                (
                    StatusCode::UNAUTHORIZED,
                    r#"<response><messages><msg type="WARN">Login failed</msg></messages></response>"#
                        .to_string(),
                )
            }
        }
        "/services/apps/local" => {
            let expected = format!("Splunk {}", SESSION_KEY);
            if received.authorization.as_deref() == Some(expected.as_str()) {
                (StatusCode::OK, APPS_FEED.to_string())
            } else {
                (
                    StatusCode::UNAUTHORIZED,
                    r#"<response><messages><msg type="WARN">call not properly authenticated</msg></messages></response>"#
                        .to_string(),
                )
            }
        }
        "/services/slow" => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            (StatusCode::OK, String::new())
        }
        _ => (StatusCode::OK, String::new()),
    }
}

/// Start a server that answers every connection with response headers and
/// the first bytes of a feed, then stalls without finishing the body.
pub async fn start_stalled_server() -> u16 {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\n<feed>")
                    .await;
                let _ = socket.flush().await;
                tokio::time::sleep(Duration::from_secs(30)).await;
            });
        }
    });

    port
}

/// Start the server on an ephemeral port.
pub async fn start_server() -> (u16, Arc<ServerState>) {
    let state = Arc::new(ServerState::default());
    let app = Router::new().fallback(handle).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (port, state)
}

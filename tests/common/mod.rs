//! In-process mock of the transparency and authentication services

#![allow(dead_code)]

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gridfetch::config::{Config, TransportConfig};

/// One request as the mock saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub raw_body: String,
    pub json: Value,
    pub at: Instant,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub type Responder = Box<dyn Fn(&Recorded, usize) -> (StatusCode, String) + Send + Sync>;

pub struct MockService {
    hits: AtomicUsize,
    requests: Mutex<Vec<Recorded>>,
    responder: Responder,
    delay: Option<Duration>,
}

impl MockService {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(
    State(mock): State<Arc<MockService>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let hit = mock.hits.fetch_add(1, Ordering::SeqCst) + 1;
    let raw_body = String::from_utf8_lossy(&body).into_owned();
    let recorded = Recorded {
        method,
        path: uri.path().to_string(),
        headers,
        json: serde_json::from_str(&raw_body).unwrap_or(Value::Null),
        raw_body,
        at: Instant::now(),
    };

    let response = (mock.responder)(&recorded, hit);
    mock.requests.lock().unwrap().push(recorded);

    if let Some(delay) = mock.delay {
        tokio::time::sleep(delay).await;
    }
    response
}

/// Start the mock on an ephemeral port; returns its root URL.
///
/// `responder` gets each request and its 1-based hit number.
pub async fn spawn<F>(responder: F) -> (String, Arc<MockService>)
where
    F: Fn(&Recorded, usize) -> (StatusCode, String) + Send + Sync + 'static,
{
    spawn_with_delay(responder, None).await
}

pub async fn spawn_with_delay<F>(responder: F, delay: Option<Duration>) -> (String, Arc<MockService>)
where
    F: Fn(&Recorded, usize) -> (StatusCode, String) + Send + Sync + 'static,
{
    let mock = Arc::new(MockService {
        hits: AtomicUsize::new(0),
        requests: Mutex::new(Vec::new()),
        responder: Box::new(responder),
        delay,
    });

    let app = Router::new().fallback(handle).with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), mock)
}

pub fn ok(body: &str) -> (StatusCode, String) {
    (StatusCode::OK, body.to_string())
}

pub fn status(code: u16) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap();
    (status, format!("{{\"error\": \"{}\"}}", status))
}

/// Transport settings with millisecond backoff
pub fn fast_transport() -> TransportConfig {
    TransportConfig {
        max_retries: 3,
        backoff_base_ms: 1,
        timeout_secs: 5,
        connect_timeout_secs: 2,
        ..TransportConfig::default()
    }
}

/// Config pointing at the mock with all local state under `dir`
pub fn test_config(root: &str, dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.service.base_url = format!("{}/electricity-service", root);
    config.service.auth_url = format!("{}/cas/v1/tickets", root);
    config.transport = fast_transport();
    config.paths.data_dir = dir.join("data");
    config.paths.ticket_file = dir.join("data").join("tgt.json");
    config.paths.targets_file = dir.join("data").join("selected_powerplants.json");
    config.paths.output_dir = dir.join("data").join("selected_powerplants_data");
    config.telemetry.log_dir = None;
    config
}

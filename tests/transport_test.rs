mod common;

use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use gridfetch::auth::Ticket;
use gridfetch::catalog::{ApiRequest, Catalog, DateRange, RequestParams};
use gridfetch::config::TransportConfig;
use gridfetch::observability::Metrics;
use gridfetch::transport::{HttpTransport, Transport, TransportError};

use common::{fast_transport, ok, spawn, spawn_with_delay, status};

fn mcp_request() -> ApiRequest {
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
    )
    .unwrap();
    Catalog::v1()
        .get("mcp")
        .unwrap()
        .build(&RequestParams::for_range(range))
        .unwrap()
}

fn http_transport(root: &str, config: &TransportConfig, metrics: Arc<Metrics>) -> HttpTransport {
    HttpTransport::new(&format!("{}/electricity-service", root), "en", config, metrics).unwrap()
}

#[tokio::test]
async fn test_retries_exhausted_on_server_error() {
    let (root, mock) = spawn(|_, _| status(500)).await;
    let metrics = Arc::new(Metrics::new());
    let transport = http_transport(&root, &fast_transport(), metrics.clone());

    let result = transport.send(&mcp_request(), Some(&Ticket::new("TGT-1"))).await;

    assert!(matches!(result, Err(TransportError::HttpStatus { status: 500, .. })));
    assert_eq!(mock.hits(), 4);
    assert_eq!(metrics.snapshot().requests_sent, 4);
    assert_eq!(metrics.snapshot().retries, 3);
    assert_eq!(metrics.snapshot().requests_failed, 1);
}

#[tokio::test]
async fn test_every_retryable_status_is_retried() {
    for code in [429, 500, 502, 503, 504] {
        let (root, mock) = spawn(move |_, _| status(code)).await;
        let transport = http_transport(&root, &fast_transport(), Arc::new(Metrics::new()));

        let result = transport.send(&mcp_request(), None).await;

        assert!(matches!(result, Err(TransportError::HttpStatus { status, .. }) if status == code));
        assert_eq!(mock.hits(), 4, "status {code}");
    }
}

#[tokio::test]
async fn test_recovers_after_rate_limit() {
    let (root, mock) = spawn(|_, hit| {
        if hit <= 2 {
            status(429)
        } else {
            ok(r#"{"items": []}"#)
        }
    })
    .await;
    let metrics = Arc::new(Metrics::new());
    let transport = http_transport(&root, &fast_transport(), metrics.clone());

    let response = transport.send(&mcp_request(), None).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(mock.hits(), 3);
    assert_eq!(metrics.snapshot().retries, 2);
    assert_eq!(metrics.snapshot().requests_failed, 0);
}

#[tokio::test]
async fn test_get_request_retried_without_body() {
    let (root, mock) = spawn(|_, hit| {
        if hit == 1 {
            status(503)
        } else {
            ok(r#"{"items": [{"id": 101, "name": "KEBAN HES"}]}"#)
        }
    })
    .await;
    let request = Catalog::v1()
        .get("powerplant-list")
        .unwrap()
        .build(&RequestParams::none())
        .unwrap();
    let transport = http_transport(&root, &fast_transport(), Arc::new(Metrics::new()));

    let response = transport.send(&request, Some(&Ticket::new("TGT-1"))).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(mock.hits(), 2);
    for recorded in mock.requests() {
        assert_eq!(recorded.method, "GET");
        assert_eq!(recorded.path, "/electricity-service/v1/generation/data/powerplant-list");
        assert!(recorded.raw_body.is_empty());
        assert_eq!(recorded.header("tgt"), Some("TGT-1"));
    }
}

#[tokio::test]
async fn test_client_errors_not_retried() {
    for code in [400, 401, 403, 404] {
        let (root, mock) = spawn(move |_, _| status(code)).await;
        let transport = http_transport(&root, &fast_transport(), Arc::new(Metrics::new()));

        let result = transport.send(&mcp_request(), None).await;

        match result {
            Err(TransportError::HttpStatus { status, body }) => {
                assert_eq!(status, code);
                assert!(body.contains("error"));
            }
            other => panic!("status {code}: unexpected {other:?}"),
        }
        assert_eq!(mock.hits(), 1, "status {code}");
    }
}

#[tokio::test]
async fn test_backoff_grows_between_attempts() {
    let (root, mock) = spawn(|_, _| status(503)).await;
    let config = TransportConfig {
        backoff_base_ms: 20,
        ..fast_transport()
    };
    let transport = http_transport(&root, &config, Arc::new(Metrics::new()));

    let _ = transport.send(&mcp_request(), None).await;

    let requests = mock.requests();
    assert_eq!(requests.len(), 4);
    for (i, pair) in requests.windows(2).enumerate() {
        let gap = pair[1].at.duration_since(pair[0].at);
        let minimum = Duration::from_millis(20 << i);
        assert!(gap >= minimum, "gap {i} was {gap:?}, expected at least {minimum:?}");
    }
}

#[tokio::test]
async fn test_standard_headers_and_ticket() {
    let (root, mock) = spawn(|_, _| ok(r#"{"items": []}"#)).await;
    let transport = http_transport(&root, &fast_transport(), Arc::new(Metrics::new()));

    transport
        .send(&mcp_request(), Some(&Ticket::new("TGT-42-xyz")))
        .await
        .unwrap();

    let request = &mock.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/electricity-service/v1/markets/dam/data/mcp");
    assert_eq!(request.header("tgt"), Some("TGT-42-xyz"));
    assert_eq!(request.header("accept-language"), Some("en"));
    assert_eq!(request.header("accept"), Some("application/json"));
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(
        request.json,
        json!({
            "startDate": "2024-05-01T00:00:00+03:00",
            "endDate": "2024-05-02T23:00:00+03:00",
        })
    );
}

#[tokio::test]
async fn test_no_ticket_header_without_ticket() {
    let (root, mock) = spawn(|_, _| ok("[]")).await;
    let transport = http_transport(&root, &fast_transport(), Arc::new(Metrics::new()));

    transport.send(&mcp_request(), None).await.unwrap();

    assert!(mock.requests()[0].header("tgt").is_none());
}

#[tokio::test]
async fn test_success_body_returned_unchanged() {
    let (root, _mock) = spawn(|_, _| ok("not json, still a 2xx")).await;
    let transport = http_transport(&root, &fast_transport(), Arc::new(Metrics::new()));

    let response = transport.send(&mcp_request(), None).await.unwrap();

    assert_eq!(&response.body[..], b"not json, still a 2xx");
}

#[tokio::test]
async fn test_connection_refused_is_connection_error() {
    // Bind then drop to obtain a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let metrics = Arc::new(Metrics::new());
    let transport = http_transport(&format!("http://{}", addr), &fast_transport(), metrics.clone());

    let result = transport.send(&mcp_request(), None).await;

    assert!(matches!(result, Err(TransportError::Connection(_))));
    assert_eq!(metrics.snapshot().requests_sent, 4);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let (root, mock) = spawn_with_delay(|_, _| ok("[]"), Some(Duration::from_secs(3))).await;
    let config = TransportConfig {
        max_retries: 0,
        timeout_secs: 1,
        ..fast_transport()
    };
    let transport = http_transport(&root, &config, Arc::new(Metrics::new()));

    let result = transport.send(&mcp_request(), None).await;

    assert!(matches!(result, Err(TransportError::Timeout)));
    assert_eq!(mock.hits(), 1);
}

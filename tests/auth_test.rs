mod common;

use axum::http::StatusCode;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use gridfetch::auth::{AuthError, TicketProvider};
use gridfetch::cli::{self, Cli, CliError, Outcome};
use gridfetch::config::Credentials;
use gridfetch::observability::Metrics;
use gridfetch::state;

use clap::Parser;
use common::{fast_transport, ok, spawn, test_config};

/// Accepts only `operator` / `s3cret`
fn auth_responder(request: &common::Recorded, _hit: usize) -> (StatusCode, String) {
    if request.path != "/cas/v1/tickets" {
        return (StatusCode::NOT_FOUND, String::new());
    }
    if request.raw_body.contains("username=operator") && request.raw_body.contains("password=s3cret") {
        (StatusCode::CREATED, r#"{"tgt": "TGT-77-service"}"#.to_string())
    } else {
        (StatusCode::UNAUTHORIZED, "invalid credentials".to_string())
    }
}

fn provider(root: &str, username: &str, password: &str) -> TicketProvider {
    TicketProvider::new(
        &format!("{}/cas/v1/tickets", root),
        Credentials::new(username, password),
        &fast_transport(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_acquire_ticket() {
    let (root, mock) = spawn(auth_responder).await;

    let ticket = provider(&root, "operator", "s3cret").acquire().await.unwrap();

    assert_eq!(ticket.as_str(), "TGT-77-service");
    let request = &mock.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(
        request.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(request.header("accept"), Some("application/json"));
}

#[tokio::test]
async fn test_rejected_credentials_not_retried() {
    let (root, mock) = spawn(auth_responder).await;

    let result = provider(&root, "operator", "wrong").acquire().await;

    match result {
        Err(AuthError::Rejected { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid credentials");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn test_server_error_not_retried() {
    let (root, mock) = spawn(|_, _| (StatusCode::SERVICE_UNAVAILABLE, "down".to_string())).await;

    let result = provider(&root, "operator", "s3cret").acquire().await;

    assert!(matches!(result, Err(AuthError::Rejected { status: 503, .. })));
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn test_rejection_keeps_status_when_body_truncated() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let root = format!("http://{}", listener.local_addr().unwrap());

    // Answers 503 promising more body than it sends, then hangs up
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !String::from_utf8_lossy(&request).contains("password=") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 100\r\n\r\npartial")
            .await
            .unwrap();
        socket.flush().await.unwrap();
    });

    let result = provider(&root, "operator", "s3cret").acquire().await;

    match result {
        Err(AuthError::Rejected { status, body }) => {
            assert_eq!(status, 503);
            assert!(body.is_empty());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_ticket_response() {
    let (root, _mock) = spawn(|_, _| ok("TGT-plain-text")).await;

    let result = provider(&root, "operator", "s3cret").acquire().await;

    assert!(matches!(result, Err(AuthError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_ticket_command_persists_ticket() {
    let (root, _mock) = spawn(auth_responder).await;
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(&root, temp_dir.path());
    config.credentials = Credentials::new("operator", "s3cret");

    let cli = Cli::try_parse_from(["gridfetch", "ticket"]).unwrap();
    let outcome = cli::run(cli, &config, Arc::new(Metrics::new())).await.unwrap();

    assert_eq!(outcome, Outcome::Completed);
    let ticket = state::load_ticket(&config.paths.ticket_file).await.unwrap();
    assert_eq!(ticket.as_str(), "TGT-77-service");
}

#[tokio::test]
async fn test_ticket_command_without_credentials() {
    let (root, mock) = spawn(auth_responder).await;
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&root, temp_dir.path());

    let cli = Cli::try_parse_from(["gridfetch", "ticket"]).unwrap();
    let result = cli::run(cli, &config, Arc::new(Metrics::new())).await;

    assert!(matches!(result, Err(CliError::Auth(AuthError::MissingCredentials))));
    assert_eq!(mock.hits(), 0);
    assert!(!config.paths.ticket_file.exists());
}

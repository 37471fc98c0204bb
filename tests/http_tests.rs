// Tests for the HTTP control surface
//
// The router is exercised in-process with tower's `oneshot`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{harness, remote_audio, Script};
use serde_json::Value;
use tower::ServiceExt;
use voice_agent_client::http::{ActionResponse, SearchDisplay};
use voice_agent_client::session::{
    ConnectionState, LogEntry, Origin, SearchResponse, SearchSection, SessionEvent, SessionView,
    TransportState,
};
use voice_agent_client::{create_router, AppState, ControllerHandle};

fn script() -> Script {
    Script {
        tracks: vec![remote_audio("voice")],
        on_connect: vec![
            SessionEvent::TransportStateChanged(TransportState::Ready),
            SessionEvent::Connected,
            SessionEvent::SearchResponse(SearchResponse {
                origins: Some(vec![Origin {
                    site_uri: "https://a".to_string(),
                    site_title: "A".to_string(),
                }]),
                ..Default::default()
            }),
        ],
        ..Default::default()
    }
}

async fn send(handle: &ControllerHandle, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = create_router(AppState::new(handle.clone()))
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_health_check() {
    let h = harness(Script::default());
    let (handle, _task) = h.controller.spawn();

    let (status, body) = send(&handle, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_connect_then_disconnect() {
    let h = harness(script());
    let (handle, _task) = h.controller.spawn();

    let (status, body) = send(&handle, "POST", "/session/connect").await;
    assert_eq!(status, StatusCode::OK);
    let connected: ActionResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(connected.state, ConnectionState::Connected);
    assert_eq!(connected.status, "Connected");
    assert!(!connected.connect_enabled);
    assert!(connected.disconnect_enabled);

    let (_, body) = send(&handle, "GET", "/session/search").await;
    let search: SearchDisplay = serde_json::from_slice(&body).unwrap();
    assert_eq!(search.sections.len(), 1);
    assert!(matches!(&search.sections[0], SearchSection::Sources { sources } if sources.len() == 1));

    let (status, body) = send(&handle, "POST", "/session/disconnect").await;
    assert_eq!(status, StatusCode::OK);
    let idle: ActionResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(idle.state, ConnectionState::Idle);
    assert_eq!(idle.status, "Disconnected");
    assert!(idle.connect_enabled);

    let (_, body) = send(&handle, "GET", "/session/search").await;
    let search: SearchDisplay = serde_json::from_slice(&body).unwrap();
    assert!(search.sections.is_empty(), "Search region cleared on disconnect");
}

#[tokio::test]
async fn test_session_snapshot_and_log() {
    let h = harness(script());
    let (handle, _task) = h.controller.spawn();
    handle.connect().await.unwrap();

    let (status, body) = send(&handle, "GET", "/session").await;
    assert_eq!(status, StatusCode::OK);
    let view: SessionView = serde_json::from_slice(&body).unwrap();
    assert_eq!(view.connection, ConnectionState::Connected);
    assert_eq!(view.transport_state, Some(TransportState::Ready));

    let (_, body) = send(&handle, "GET", "/session/log").await;
    let log: Vec<LogEntry> = serde_json::from_slice(&body).unwrap();
    let texts: Vec<_> = log.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Status: Transport: ready", "Status: Connected"]);

    let (_, body) = send(&handle, "GET", "/session").await;
    let raw: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(raw["connection"], "connected");
    assert_eq!(raw["log"][0]["category"], "status");
}

#[tokio::test]
async fn test_connect_failure_reports_error_status() {
    let h = harness(Script {
        device_error: Some("no microphone".to_string()),
        ..Default::default()
    });
    let (handle, _task) = h.controller.spawn();

    let (status, body) = send(&handle, "POST", "/session/connect").await;

    assert_eq!(status, StatusCode::OK);
    let response: ActionResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.state, ConnectionState::Idle);
    assert_eq!(response.status, "Error");
    assert!(response.connect_enabled);
}

#[tokio::test]
async fn test_stopped_controller_is_unavailable() {
    let h = harness(Script::default());
    let (handle, task) = h.controller.spawn();
    task.abort();
    let _ = task.await;

    let (status, _) = send(&handle, "POST", "/session/connect").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

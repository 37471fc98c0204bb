use super::state::AppState;
use crate::error::SessionError;
use crate::session::{ConnectionState, LogEntry, SearchSection, SessionView};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub state: ConnectionState,
    pub status: String,
    pub connect_enabled: bool,
    pub disconnect_enabled: bool,
}

impl ActionResponse {
    fn from_view(state: ConnectionState, view: &SessionView) -> Self {
        Self {
            state,
            status: view.status.clone(),
            connect_enabled: view.connect_enabled,
            disconnect_enabled: view.disconnect_enabled,
        }
    }
}

/// The search result region: empty when nothing is displayed
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchDisplay {
    pub sections: Vec<SearchSection>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn controller_gone(e: SessionError) -> axum::response::Response {
    error!("Session request failed: {}", e);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/connect
/// Start a session; answers once connect has settled
pub async fn connect(State(state): State<AppState>) -> impl IntoResponse {
    info!("Connect requested");

    match state.controller.connect().await {
        Ok(connection) => {
            let view = state.controller.view();
            (
                StatusCode::OK,
                Json(ActionResponse::from_view(connection, &view)),
            )
                .into_response()
        }
        Err(e) => controller_gone(e),
    }
}

/// POST /session/disconnect
/// End the session; always settles in idle
pub async fn disconnect(State(state): State<AppState>) -> impl IntoResponse {
    info!("Disconnect requested");

    match state.controller.disconnect().await {
        Ok(connection) => {
            let view = state.controller.view();
            (
                StatusCode::OK,
                Json(ActionResponse::from_view(connection, &view)),
            )
                .into_response()
        }
        Err(e) => controller_gone(e),
    }
}

/// GET /session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.controller.view())
}

/// GET /session/log
pub async fn get_log(State(state): State<AppState>) -> Json<Vec<LogEntry>> {
    Json(state.controller.view().log)
}

/// GET /session/search
pub async fn get_search_result(State(state): State<AppState>) -> Json<SearchDisplay> {
    let sections = state
        .controller
        .view()
        .search_result
        .map(|r| r.sections())
        .unwrap_or_default();

    Json(SearchDisplay { sections })
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

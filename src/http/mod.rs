//! HTTP control surface for a UI shell
//!
//! This module exposes the controller's actions and displays:
//! - POST /session/connect - Start a session
//! - POST /session/disconnect - End the session
//! - GET /session - Full view snapshot
//! - GET /session/log - Conversation log
//! - GET /session/search - Current search result sections
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{ActionResponse, ErrorResponse, SearchDisplay};
pub use routes::create_router;
pub use state::AppState;

use crate::config::HttpConfig;
use crate::session::ControllerHandle;
use anyhow::{Context, Result};
use tracing::info;

/// Serve the control surface until the listener fails
pub async fn serve(cfg: &HttpConfig, controller: ControllerHandle) -> Result<()> {
    let addr = format!("{}:{}", cfg.bind, cfg.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Session control API listening on {}", addr);

    axum::serve(listener, create_router(AppState::new(controller)))
        .await
        .context("HTTP server failed")?;

    Ok(())
}

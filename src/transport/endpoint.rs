use crate::error::SessionError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Credentials returned by the connect endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportCredentials {
    pub room_url: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Client for the HTTP connect endpoint
///
/// Transports that join a room call this during `connect` to exchange the
/// configured URL for room credentials.
#[derive(Debug, Clone)]
pub struct ConnectEndpoint {
    client: reqwest::Client,
    url: String,
}

impl ConnectEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST to the endpoint and decode the credentials
    pub async fn fetch_credentials(&self) -> Result<TransportCredentials, SessionError> {
        info!("Requesting transport credentials from {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .with_context(|| format!("Connect endpoint {} unreachable", self.url))
            .map_err(SessionError::Connect)?;

        let credentials = response
            .error_for_status()
            .context("Connect endpoint rejected the request")
            .map_err(SessionError::Connect)?
            .json::<TransportCredentials>()
            .await
            .context("Malformed credentials from connect endpoint")
            .map_err(SessionError::Connect)?;

        info!("Received credentials for room {}", credentials.room_url);

        Ok(credentials)
    }
}

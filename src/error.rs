//! Error types for the session controller.

use thiserror::Error;

/// Result type alias using [`SessionError`]
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised while driving a voice session
///
/// The controller classifies collaborator failures by the lifecycle step that
/// produced them. None of them is fatal to the process.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Microphone unavailable or permission denied
    #[error("device initialization failed: {0:#}")]
    Device(#[source] anyhow::Error),

    /// Session establishment failed (endpoint unreachable, credential exchange)
    #[error("session establishment failed: {0:#}")]
    Connect(#[source] anyhow::Error),

    /// Raised during cleanup; always secondary
    #[error("teardown failed: {0:#}")]
    Teardown(#[source] anyhow::Error),

    /// Malformed or unexpected payload from the transport or agent
    #[error("malformed message: {0}")]
    Message(String),

    /// Advisory `error` notification from the transport
    #[error("runtime notification: {0}")]
    Runtime(String),

    /// The controller task is no longer running
    #[error("session controller is not running")]
    ControllerGone,
}

impl SessionError {
    /// Whether the error may leave the session in a non-idle state
    ///
    /// Only connect-time failures move the state machine to `Error`; the rest
    /// are reported and otherwise ignored.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, SessionError::Device(_) | SessionError::Connect(_))
    }
}

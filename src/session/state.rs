use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Disconnecting,
    Error,
}

impl ConnectionState {
    /// Connect action is offered only from `Idle`
    pub fn can_connect(self) -> bool {
        self == ConnectionState::Idle
    }

    pub fn can_disconnect(self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Connected | ConnectionState::Error
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnecting => "disconnecting",
            ConnectionState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Connectivity phase reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportState {
    Disconnected,
    Initializing,
    Initialized,
    Authenticating,
    Connecting,
    Connected,
    Ready,
    Error,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportState::Disconnected => "disconnected",
            TransportState::Initializing => "initializing",
            TransportState::Initialized => "initialized",
            TransportState::Authenticating => "authenticating",
            TransportState::Connecting => "connecting",
            TransportState::Connected => "connected",
            TransportState::Ready => "ready",
            TransportState::Error => "error",
        };
        f.write_str(s)
    }
}

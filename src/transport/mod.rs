//! Seams to the real-time transport
//!
//! The peer connection, signaling and codec layers live outside this crate.
//! A transport implementation plugs in through [`TransportFactory`], which is
//! handed a [`SessionEvents`] sender when a session is constructed and reports
//! everything it observes through it.

pub mod endpoint;
pub mod messages;

pub use endpoint::{ConnectEndpoint, TransportCredentials};
pub use messages::ServerMessage;

use crate::config::ControllerConfig;
use crate::session::{SessionEnvelope, SessionEvent};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Media kind of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// Reference to a participant in the room
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// True for the participant running this client
    pub local: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Participant {
    pub fn local() -> Self {
        Self {
            local: true,
            name: None,
        }
    }

    pub fn remote(name: impl Into<String>) -> Self {
        Self {
            local: false,
            name: Some(name.into()),
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, self.local) {
            (Some(name), _) => f.write_str(name),
            (None, true) => f.write_str("local"),
            (None, false) => f.write_str("remote"),
        }
    }
}

/// Handle to a live media stream owned by the transport
///
/// The controller only references tracks; it never stops or frees them itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub kind: TrackKind,
    /// Participant that produced the track
    pub participant: Participant,
}

impl Track {
    pub fn new(id: impl Into<String>, kind: TrackKind, participant: Participant) -> Self {
        Self {
            id: id.into(),
            kind,
            participant,
        }
    }

    /// Only remote audio is ever played back
    pub fn is_remote_audio(&self) -> bool {
        self.kind == TrackKind::Audio && !self.participant.local
    }
}

/// Identity of one session, fresh for every `connect()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Parameters for establishing a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    /// Connect endpoint returning transport credentials
    pub endpoint: String,
    pub enable_mic: bool,
    pub enable_cam: bool,
}

impl From<&ControllerConfig> for ConnectParams {
    fn from(cfg: &ControllerConfig) -> Self {
        Self {
            endpoint: cfg.connect_url.clone(),
            enable_mic: cfg.enable_mic,
            enable_cam: cfg.enable_cam,
        }
    }
}

/// Callback sender handed to a transport at construction
///
/// Every event is tagged with the session it belongs to, so events from a
/// session that has since been torn down are recognised and dropped.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    session_id: SessionId,
    tx: mpsc::UnboundedSender<SessionEnvelope>,
}

impl SessionEvents {
    pub(crate) fn new(session_id: SessionId, tx: mpsc::UnboundedSender<SessionEnvelope>) -> Self {
        Self { session_id, tx }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Queue an event for the controller
    ///
    /// Never blocks. Returns `false` once the controller has gone away.
    pub fn emit(&self, event: SessionEvent) -> bool {
        debug!(session_id = %self.session_id, event = event.name(), "Queueing session event");
        self.tx
            .send(SessionEnvelope {
                session_id: self.session_id,
                event,
            })
            .is_ok()
    }

    /// Decode a raw agent message and queue the resulting event
    ///
    /// Payloads that do not decode are reported as [`SessionEvent::MessageError`].
    pub fn emit_raw(&self, payload: &[u8]) -> bool {
        match ServerMessage::decode(payload) {
            Ok(message) => self.emit(message.into()),
            Err(e) => {
                warn!(session_id = %self.session_id, "Undecodable agent message: {}", e);
                self.emit(SessionEvent::MessageError(serde_json::json!({
                    "error": e.to_string(),
                    "payload": String::from_utf8_lossy(payload),
                })))
            }
        }
    }
}

/// A single live session against the remote agent
///
/// All methods take `&self`: the controller may issue `disconnect` while a
/// `connect` it started is still pending.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Acquire local capture devices (microphone, optionally camera)
    async fn initialize_devices(&self) -> Result<()>;

    /// Establish the session; `Connected` is reported separately as an event
    async fn connect(&self, params: &ConnectParams) -> Result<()>;

    /// Tear the session down and release devices
    async fn disconnect(&self) -> Result<()>;

    /// Tracks currently known to the transport
    fn tracks(&self) -> Vec<Track>;

    /// Transport name for logging
    fn name(&self) -> &str;
}

/// Builds a new [`Transport`] for every session
pub trait TransportFactory: Send + Sync {
    fn create(&self, events: SessionEvents) -> Result<Arc<dyn Transport>>;
}

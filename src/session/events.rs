use super::state::TransportState;
use crate::transport::{Participant, SessionId, Track};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Speech transcript from the user or the bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    /// Interim results carry `false`; bot transcripts usually omit it
    #[serde(rename = "final", default)]
    pub is_final: bool,
}

/// A cited source accompanying a search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub site_uri: String,
    pub site_title: String,
}

/// Grounded search response pushed by the agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub search_result: Option<String>,
    #[serde(default)]
    pub origins: Option<Vec<Origin>>,
    /// Opaque markup fragment, embedded as-is
    #[serde(default)]
    pub rendered_content: Option<String>,
}

/// Everything a transport can report to the controller
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Connected,
    Disconnected,
    TransportStateChanged(TransportState),
    TrackStarted {
        track: Track,
        participant: Participant,
    },
    TrackStopped {
        track: Track,
        participant: Participant,
    },
    BotConnected(Participant),
    BotDisconnected(Participant),
    BotReady(Value),
    UserTranscript(Transcript),
    BotTranscript(Transcript),
    SearchResponse(SearchResponse),
    MessageError(Value),
    Error(Value),
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Connected => "connected",
            SessionEvent::Disconnected => "disconnected",
            SessionEvent::TransportStateChanged(_) => "transportStateChanged",
            SessionEvent::TrackStarted { .. } => "trackStarted",
            SessionEvent::TrackStopped { .. } => "trackStopped",
            SessionEvent::BotConnected(_) => "botConnected",
            SessionEvent::BotDisconnected(_) => "botDisconnected",
            SessionEvent::BotReady(_) => "botReady",
            SessionEvent::UserTranscript(_) => "userTranscript",
            SessionEvent::BotTranscript(_) => "botTranscript",
            SessionEvent::SearchResponse(_) => "searchResponse",
            SessionEvent::MessageError(_) => "messageError",
            SessionEvent::Error(_) => "error",
        }
    }
}

/// An event tagged with the session that produced it
#[derive(Debug, Clone)]
pub struct SessionEnvelope {
    pub session_id: SessionId,
    pub event: SessionEvent,
}

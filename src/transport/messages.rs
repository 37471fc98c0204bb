use crate::error::SessionError;
use crate::session::{SearchResponse, SessionEvent, Transcript};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Agent message as delivered over the transport's data channel
///
/// Wire form is `{"type": "<kebab-case name>", "data": {...}}`; any other
/// top-level fields (labels, ids) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    BotReady(Value),
    UserTranscription(Transcript),
    BotTranscription(Transcript),
    BotLlmSearchResponse(SearchResponse),
    /// Error reply to a message this client sent
    ErrorResponse(Value),
    Error(Value),
}

impl ServerMessage {
    pub fn decode(payload: &[u8]) -> Result<Self, SessionError> {
        serde_json::from_slice(payload).map_err(|e| SessionError::Message(e.to_string()))
    }
}

impl From<ServerMessage> for SessionEvent {
    fn from(message: ServerMessage) -> Self {
        match message {
            ServerMessage::BotReady(data) => SessionEvent::BotReady(data),
            ServerMessage::UserTranscription(t) => SessionEvent::UserTranscript(t),
            ServerMessage::BotTranscription(t) => SessionEvent::BotTranscript(t),
            ServerMessage::BotLlmSearchResponse(r) => SessionEvent::SearchResponse(r),
            ServerMessage::ErrorResponse(e) => SessionEvent::MessageError(e),
            ServerMessage::Error(e) => SessionEvent::Error(e),
        }
    }
}

//! Routing of transport events to their handlers
//!
//! Each [`SessionEvent`] variant maps to exactly one handler. Events are only
//! routed while their session is live; anything from a replaced or
//! tombstoned session is dropped here, before any handler runs.

use super::controller::{SessionController, SessionRef};
use super::events::{SearchResponse, SessionEnvelope, SessionEvent, Transcript};
use super::state::{ConnectionState, TransportState};
use super::view::{SearchResult, SessionEnd};
use crate::error::SessionError;
use crate::transport::{Participant, Track};
use serde_json::Value;
use tracing::{debug, info};

impl SessionController {
    /// Route one event to its handler
    pub fn dispatch(&mut self, envelope: SessionEnvelope) {
        let SessionEnvelope { session_id, event } = envelope;

        let Some(session) = self.live_session(session_id) else {
            debug!(%session_id, event = event.name(), "Dropping event for inactive session");
            return;
        };

        match event {
            SessionEvent::Connected => self.on_connected(&session),
            SessionEvent::Disconnected => self.on_disconnected(&session),
            SessionEvent::TransportStateChanged(state) => {
                self.on_transport_state_changed(&session, state)
            }
            SessionEvent::TrackStarted { track, participant } => {
                self.on_track_started(&track, &participant)
            }
            SessionEvent::TrackStopped { track, participant } => {
                self.on_track_stopped(&track, &participant)
            }
            SessionEvent::BotConnected(participant) => {
                info!("Bot connected: {}", participant);
                self.log(format!("Bot connected: {}", participant));
            }
            SessionEvent::BotDisconnected(participant) => {
                info!("Bot disconnected: {}", participant);
                self.log(format!("Bot disconnected: {}", participant));
            }
            SessionEvent::BotReady(data) => self.on_bot_ready(&session, &data),
            SessionEvent::UserTranscript(transcript) => self.on_user_transcript(&transcript),
            SessionEvent::BotTranscript(transcript) => self.on_bot_transcript(&transcript),
            SessionEvent::SearchResponse(response) => self.on_search_response(response),
            SessionEvent::MessageError(payload) => {
                let err = SessionError::Message(payload.to_string());
                self.trace_error(&err);
                self.log(format!("Error: {}", err));
            }
            SessionEvent::Error(payload) => {
                let err = SessionError::Runtime(payload.to_string());
                self.trace_error(&err);
                self.log(format!("Error: {}", err));
            }
        }

        self.publish();
    }

    fn on_connected(&mut self, session: &SessionRef) {
        info!(session_id = %session.id(), "Transport connected");
        self.set_state(ConnectionState::Connected);
        self.set_status("Connected");
    }

    /// The transport dropped the session without being asked to
    fn on_disconnected(&mut self, session: &SessionRef) {
        info!(session_id = %session.id(), "Session ended externally");
        self.release_session(SessionEnd::Remote);
        self.set_status("Disconnected");
    }

    fn on_transport_state_changed(&mut self, session: &SessionRef, state: TransportState) {
        debug!(session_id = %session.id(), "Transport state: {}", state);
        self.view.transport_state = Some(state);
        self.set_status(format!("Transport: {}", state));

        if state == TransportState::Ready {
            self.reconcile_tracks(session);
        }
    }

    fn on_track_started(&mut self, track: &Track, participant: &Participant) {
        debug!("Track started: {} {:?} from {}", track.id, track.kind, participant);

        if participant.local || !track.is_remote_audio() {
            return;
        }
        self.binder.bind_audio_track(track);
    }

    fn on_track_stopped(&mut self, track: &Track, participant: &Participant) {
        // The sink keeps its source until the next bind or disconnect
        info!("Track stopped: {} {:?} from {}", track.id, track.kind, participant);
        self.log(format!("Track stopped: {:?} from {}", track.kind, participant));
    }

    fn on_bot_ready(&mut self, session: &SessionRef, data: &Value) {
        info!(session_id = %session.id(), "Bot ready: {}", data);
        self.log(format!("Bot ready: {}", data));
        self.reconcile_tracks(session);
    }

    fn on_user_transcript(&mut self, transcript: &Transcript) {
        if !transcript.is_final {
            debug!("Interim user transcript: {}", transcript.text);
            return;
        }
        self.log(format!("User: {}", transcript.text));
    }

    fn on_bot_transcript(&mut self, transcript: &Transcript) {
        self.log(format!("Bot: {}", transcript.text));
    }

    fn on_search_response(&mut self, response: SearchResponse) {
        let result = SearchResult::from(response);
        info!(
            "Search response: {} source(s), text={}, fragment={}",
            result.sources.len(),
            result.result_text.is_some(),
            result.rendered_fragment.is_some()
        );
        self.view.search_result = Some(result);
    }

    /// Bind the remote audio track the transport already knows about
    fn reconcile_tracks(&mut self, session: &SessionRef) {
        let tracks = session.transport().tracks();
        self.binder.reconcile(&tracks);
    }
}

use crate::transport::Track;
use tracing::{debug, info};

/// A playable stream wrapping one or more tracks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStream {
    pub tracks: Vec<Track>,
}

impl MediaStream {
    pub fn single(track: Track) -> Self {
        Self {
            tracks: vec![track],
        }
    }
}

/// Local playback destination for the agent's voice
///
/// Created once by the host and injected into the controller. Implementations
/// own whatever output element or device actually plays the stream.
pub trait AudioSink: Send {
    /// Replace the current source with `stream`
    fn attach(&mut self, stream: MediaStream);

    /// Stop playback and drop the current source
    fn release(&mut self);
}

/// Keeps the single audio sink bound to at most one remote track
pub struct TrackBinder {
    sink: Box<dyn AudioSink>,
    bound: Option<Track>,
}

impl TrackBinder {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self { sink, bound: None }
    }

    pub fn bound_track(&self) -> Option<&Track> {
        self.bound.as_ref()
    }

    /// Bind `track` to the sink, replacing whatever was playing
    ///
    /// Returns `false` without touching the sink when `track` is already bound.
    pub fn bind_audio_track(&mut self, track: &Track) -> bool {
        if self.bound.as_ref().is_some_and(|b| b.id == track.id) {
            debug!("Audio track {} already bound", track.id);
            return false;
        }

        info!("Binding audio track {} from {}", track.id, track.participant);
        self.sink.attach(MediaStream::single(track.clone()));
        self.bound = Some(track.clone());
        true
    }

    /// Bind the first remote audio track among `tracks`, if any
    pub fn reconcile(&mut self, tracks: &[Track]) -> bool {
        match tracks.iter().find(|t| t.is_remote_audio()) {
            Some(track) => self.bind_audio_track(track),
            None => {
                debug!("No remote audio track among {} known tracks", tracks.len());
                false
            }
        }
    }

    /// Stop playback and forget the bound track
    pub fn release(&mut self) -> bool {
        match self.bound.take() {
            Some(track) => {
                info!("Releasing audio track {}", track.id);
                self.sink.release();
                true
            }
            None => false,
        }
    }
}

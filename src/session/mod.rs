//! Voice session control
//!
//! This module provides the `SessionController` that manages:
//! - The connect / disconnect lifecycle of the single session
//! - Binding the remote agent's audio track to the playback sink
//! - Routing transport and agent events to their handlers
//! - The view model shown by the UI shell

mod binder;
mod controller;
mod events;
mod router;
mod state;
mod view;

pub use binder::{AudioSink, MediaStream, TrackBinder};
pub use controller::{ControllerHandle, SessionController, SessionRef};
pub use events::{Origin, SearchResponse, SessionEnvelope, SessionEvent, Transcript};
pub use state::{ConnectionState, TransportState};
pub use view::{LogCategory, LogEntry, SearchResult, SearchSection, SessionEnd, SessionView, Source};

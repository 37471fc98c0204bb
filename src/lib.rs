pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod session;
pub mod transport;

pub use config::{Config, ControllerConfig, HttpConfig, LoggingConfig};
pub use error::{Result, SessionError};
pub use http::{create_router, serve, AppState};
pub use session::{
    AudioSink, ConnectionState, ControllerHandle, LogCategory, LogEntry, MediaStream,
    SearchResponse, SearchResult, SearchSection, SessionController, SessionEnd, SessionEvent,
    SessionView, Transcript, TransportState,
};
pub use transport::{
    ConnectEndpoint, ConnectParams, Participant, ServerMessage, SessionEvents, SessionId, Track,
    TrackKind, Transport, TransportCredentials, TransportFactory,
};

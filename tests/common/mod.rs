// Shared fakes for the integration tests
//
// FakeTransport plays back a scripted set of results and events; RecordingSink
// records every attach/release so binding side effects can be counted.

#![allow(dead_code)]

use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use voice_agent_client::config::{ControllerConfig, LoggingConfig};
use voice_agent_client::session::{AudioSink, MediaStream, SessionController, SessionEvent, SessionView};
use voice_agent_client::transport::{
    ConnectParams, Participant, SessionEvents, Track, TrackKind, Transport, TransportFactory,
};

/// What each FakeTransport does when called
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub device_error: Option<String>,
    pub connect_error: Option<String>,
    pub disconnect_error: Option<String>,
    pub tracks: Vec<Track>,
    /// Emitted from inside `connect`, before it returns
    pub on_connect: Vec<SessionEvent>,
    /// Emitted from inside `disconnect`, before it returns
    pub on_disconnect: Vec<SessionEvent>,
    /// `connect` never completes
    pub hold_connect: bool,
}

pub struct FakeTransport {
    events: SessionEvents,
    script: Script,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeTransport {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn initialize_devices(&self) -> Result<()> {
        self.record("initialize_devices");
        if let Some(msg) = &self.script.device_error {
            anyhow::bail!("{}", msg);
        }
        Ok(())
    }

    async fn connect(&self, params: &ConnectParams) -> Result<()> {
        self.record(format!("connect {}", params.endpoint));
        if let Some(msg) = &self.script.connect_error {
            anyhow::bail!("{}", msg);
        }
        for event in &self.script.on_connect {
            self.events.emit(event.clone());
        }
        if self.script.hold_connect {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.record("disconnect");
        for event in &self.script.on_disconnect {
            self.events.emit(event.clone());
        }
        if let Some(msg) = &self.script.disconnect_error {
            anyhow::bail!("{}", msg);
        }
        Ok(())
    }

    fn tracks(&self) -> Vec<Track> {
        self.script.tracks.clone()
    }

    fn name(&self) -> &str {
        "fake"
    }
}

#[derive(Default)]
pub struct FakeFactory {
    script: Mutex<Script>,
    calls: Arc<Mutex<Vec<String>>>,
    sessions: Mutex<Vec<SessionEvents>>,
}

impl FakeFactory {
    pub fn new(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            ..Default::default()
        }
    }

    /// Script used by transports created from now on
    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Event sender handed to the `index`-th transport
    pub fn events(&self, index: usize) -> SessionEvents {
        self.sessions.lock().unwrap()[index].clone()
    }
}

impl TransportFactory for FakeFactory {
    fn create(&self, events: SessionEvents) -> Result<Arc<dyn Transport>> {
        self.sessions.lock().unwrap().push(events.clone());
        Ok(Arc::new(FakeTransport {
            events,
            script: self.script.lock().unwrap().clone(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOp {
    Attach(Vec<String>),
    Release,
}

#[derive(Clone, Default)]
pub struct RecordingSink {
    ops: Arc<Mutex<Vec<SinkOp>>>,
}

impl RecordingSink {
    pub fn ops(&self) -> Vec<SinkOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn attach_count(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, SinkOp::Attach(_)))
            .count()
    }

    pub fn release_count(&self) -> usize {
        self.ops().iter().filter(|op| **op == SinkOp::Release).count()
    }
}

impl AudioSink for RecordingSink {
    fn attach(&mut self, stream: MediaStream) {
        let ids = stream.tracks.into_iter().map(|t| t.id).collect();
        self.ops.lock().unwrap().push(SinkOp::Attach(ids));
    }

    fn release(&mut self) {
        self.ops.lock().unwrap().push(SinkOp::Release);
    }
}

pub struct Harness {
    pub controller: SessionController,
    pub factory: Arc<FakeFactory>,
    pub sink: RecordingSink,
}

pub fn harness(script: Script) -> Harness {
    voice_agent_client::logging::init(&LoggingConfig {
        filter: "voice_agent_client=debug".to_string(),
        with_target: false,
    });

    let factory = Arc::new(FakeFactory::new(script));
    let sink = RecordingSink::default();
    let controller = SessionController::new(
        ControllerConfig::default(),
        factory.clone(),
        Box::new(sink.clone()),
    );

    Harness {
        controller,
        factory,
        sink,
    }
}

pub fn remote_audio(id: &str) -> Track {
    Track::new(id, TrackKind::Audio, Participant::remote("bot"))
}

pub fn remote_video(id: &str) -> Track {
    Track::new(id, TrackKind::Video, Participant::remote("bot"))
}

pub fn local_audio(id: &str) -> Track {
    Track::new(id, TrackKind::Audio, Participant::local())
}

pub fn track_started(track: Track) -> SessionEvent {
    let participant = track.participant.clone();
    SessionEvent::TrackStarted { track, participant }
}

/// Status lines in the order they were shown
pub fn statuses(view: &SessionView) -> Vec<String> {
    view.log
        .iter()
        .filter_map(|e| e.text.strip_prefix("Status: ").map(str::to_string))
        .collect()
}

/// Wait until the published view satisfies `pred`
pub async fn wait_for(
    rx: &mut watch::Receiver<SessionView>,
    pred: impl Fn(&SessionView) -> bool,
) -> SessionView {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let view = rx.borrow_and_update();
                if pred(&view) {
                    return view.clone();
                }
            }
            rx.changed().await.expect("controller dropped");
        }
    })
    .await
    .expect("timed out waiting for view")
}

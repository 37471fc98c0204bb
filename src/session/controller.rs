use super::binder::{AudioSink, TrackBinder};
use super::events::SessionEnvelope;
use super::state::ConnectionState;
use super::view::{LogEntry, SessionEnd, SessionView};
use crate::config::ControllerConfig;
use crate::error::{Result, SessionError};
use crate::transport::{ConnectParams, SessionEvents, SessionId, Track, Transport, TransportFactory};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// The live session as seen by event handlers
#[derive(Clone)]
pub struct SessionRef {
    id: SessionId,
    transport: Arc<dyn Transport>,
}

impl SessionRef {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}

struct ActiveSession {
    handle: SessionRef,
    /// Set when teardown starts; no handler may act on the session afterwards
    tombstoned: bool,
}

pub(crate) enum Command {
    Connect(oneshot::Sender<ConnectionState>),
    Disconnect(oneshot::Sender<ConnectionState>),
}

enum Driven<T> {
    Completed(T),
    /// A disconnect request arrived while the operation was pending
    Interrupted,
    /// The session the operation was started for is gone
    Ended,
}

/// Owns the single voice session and everything bound to it
///
/// All state changes happen on whichever task drives the controller: either
/// the caller awaiting [`connect`](Self::connect) / [`disconnect`](Self::disconnect)
/// directly, or the task started by [`spawn`](Self::spawn). Transport events are
/// queued and dispatched between, and during, those operations.
pub struct SessionController {
    config: ControllerConfig,
    factory: Arc<dyn TransportFactory>,
    session: Option<ActiveSession>,
    pub(super) binder: TrackBinder,
    pub(super) view: SessionView,
    view_tx: watch::Sender<SessionView>,
    events_tx: mpsc::UnboundedSender<SessionEnvelope>,
    events_rx: mpsc::UnboundedReceiver<SessionEnvelope>,
    commands: Option<mpsc::Receiver<Command>>,
    /// Disconnect requests answered once the current teardown finishes
    waiters: Vec<oneshot::Sender<ConnectionState>>,
}

impl SessionController {
    pub fn new(
        config: ControllerConfig,
        factory: Arc<dyn TransportFactory>,
        sink: Box<dyn AudioSink>,
    ) -> Self {
        let view = SessionView::default();
        let (view_tx, _) = watch::channel(view.clone());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            config,
            factory,
            session: None,
            binder: TrackBinder::new(sink),
            view,
            view_tx,
            events_tx,
            events_rx,
            commands: None,
            waiters: Vec::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.view.connection
    }

    pub fn view(&self) -> &SessionView {
        &self.view
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_tx.subscribe()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.handle.id)
    }

    pub fn bound_track(&self) -> Option<&Track> {
        self.binder.bound_track()
    }

    /// Start a new session
    ///
    /// Ignored unless idle. Returns the state once device initialization and
    /// session establishment have completed, or once a failure has been
    /// cleaned up. `Connected` is only entered when the transport reports it.
    pub async fn connect(&mut self) -> ConnectionState {
        if !self.state().can_connect() {
            warn!("Connect ignored while {}", self.state());
            return self.state();
        }

        let session_id = SessionId::new();
        info!(%session_id, "Connecting via {}", self.config.connect_url);

        // The log covers one session; a new connect starts it afresh
        self.view.log.clear();
        self.view.search_result = None;
        self.view.last_end = None;
        self.set_state(ConnectionState::Connecting);

        let events = SessionEvents::new(session_id, self.events_tx.clone());
        let transport = match self.factory.create(events) {
            Ok(transport) => transport,
            Err(e) => return self.fail_connect(SessionError::Connect(e)).await,
        };
        debug!(%session_id, "Created {} transport", transport.name());

        self.session = Some(ActiveSession {
            handle: SessionRef {
                id: session_id,
                transport: Arc::clone(&transport),
            },
            tombstoned: false,
        });
        self.view.session_id = Some(session_id);
        self.publish();

        match self.drive(transport.initialize_devices(), Some(session_id)).await {
            Driven::Completed(Ok(())) => {}
            Driven::Completed(Err(e)) if self.is_live(session_id) => {
                return self.fail_connect(SessionError::Device(e)).await
            }
            Driven::Completed(Err(_)) => return self.ended_while_connecting(session_id),
            Driven::Interrupted => return self.abandon_connect(session_id).await,
            Driven::Ended => return self.ended_while_connecting(session_id),
        }

        if !self.is_live(session_id) {
            return self.ended_while_connecting(session_id);
        }

        let params = ConnectParams::from(&self.config);
        match self.drive(transport.connect(&params), Some(session_id)).await {
            Driven::Completed(Ok(())) => {}
            Driven::Completed(Err(e)) if self.is_live(session_id) => {
                return self.fail_connect(SessionError::Connect(e)).await
            }
            Driven::Completed(Err(_)) => return self.ended_while_connecting(session_id),
            Driven::Interrupted => return self.abandon_connect(session_id).await,
            Driven::Ended => return self.ended_while_connecting(session_id),
        }

        self.process_pending_events();

        if self.is_live(session_id) {
            info!(%session_id, "Session established ({})", self.state());
        }
        self.state()
    }

    /// End the current session
    ///
    /// No-op when idle. Transport teardown failures are logged and swallowed;
    /// the controller always ends in `Idle` with the sink released.
    pub async fn disconnect(&mut self) -> ConnectionState {
        if self.state() == ConnectionState::Idle && self.session.is_none() {
            debug!("Disconnect ignored: no active session");
            self.notify_waiters();
            return self.state();
        }

        info!("Disconnecting");
        self.set_state(ConnectionState::Disconnecting);
        self.teardown(SessionEnd::Local).await;
        self.set_status("Disconnected");
        self.process_pending_events();
        self.publish();

        self.state()
    }

    /// Dispatch every event already queued
    pub fn process_pending_events(&mut self) -> usize {
        let mut dispatched = 0;
        while let Ok(envelope) = self.events_rx.try_recv() {
            self.dispatch(envelope);
            dispatched += 1;
        }
        dispatched
    }

    /// Run the controller on its own task
    pub fn spawn(mut self) -> (ControllerHandle, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::channel(16);
        self.commands = Some(commands_rx);

        let handle = ControllerHandle {
            commands: commands_tx,
            view: self.view_tx.subscribe(),
        };

        (handle, tokio::spawn(self.run()))
    }

    async fn run(mut self) {
        info!("Session controller started");

        loop {
            tokio::select! {
                Some(envelope) = self.events_rx.recv() => self.dispatch(envelope),
                command = next_command(&mut self.commands) => match command {
                    Some(Command::Connect(reply)) => {
                        let state = self.connect().await;
                        let _ = reply.send(state);
                    }
                    Some(Command::Disconnect(reply)) => {
                        let state = self.disconnect().await;
                        let _ = reply.send(state);
                    }
                    None => break,
                },
            }
        }

        // Every handle is gone; nobody can disconnect us any more
        if self.session.is_some() {
            self.disconnect().await;
        }

        info!("Session controller stopped");
    }

    /// Await `fut` while still dispatching queued events and commands
    ///
    /// With `owner` set the wait is abandoned, and `fut` dropped, as soon as a
    /// disconnect is requested or that session is released. Without it the
    /// wait runs to completion and disconnect requests are answered afterwards.
    async fn drive<F: Future>(&mut self, fut: F, owner: Option<SessionId>) -> Driven<F::Output> {
        tokio::pin!(fut);

        loop {
            tokio::select! {
                biased;
                output = &mut fut => return Driven::Completed(output),
                Some(envelope) = self.events_rx.recv() => {
                    self.dispatch(envelope);
                    if owner.is_some_and(|id| !self.is_live(id)) {
                        return Driven::Ended;
                    }
                }
                Some(command) = next_command(&mut self.commands) => match command {
                    Command::Connect(reply) => {
                        debug!("Connect request ignored while {}", self.state());
                        let _ = reply.send(self.state());
                    }
                    Command::Disconnect(reply) => {
                        self.waiters.push(reply);
                        if owner.is_some() {
                            return Driven::Interrupted;
                        }
                    }
                },
            }
        }
    }

    async fn fail_connect(&mut self, err: SessionError) -> ConnectionState {
        self.trace_error(&err);
        self.log(format!("Error connecting: {}", err));
        self.set_state(ConnectionState::Error);
        self.set_status("Error");

        self.teardown(SessionEnd::ConnectFailed).await;
        self.process_pending_events();

        self.state()
    }

    /// A disconnect request overtook the pending connect
    async fn abandon_connect(&mut self, session_id: SessionId) -> ConnectionState {
        info!(%session_id, "Connect abandoned by disconnect request");
        self.disconnect().await
    }

    fn ended_while_connecting(&mut self, session_id: SessionId) -> ConnectionState {
        info!(%session_id, "Session ended before connect completed");
        self.process_pending_events();
        self.state()
    }

    /// Best-effort transport teardown followed by local release
    async fn teardown(&mut self, end: SessionEnd) {
        let Some(session) = self.session.as_mut() else {
            self.release_session(end);
            return;
        };
        session.tombstoned = true;
        let handle = session.handle.clone();

        match self.drive(handle.transport.disconnect(), None).await {
            Driven::Completed(Ok(())) => {
                info!(session_id = %handle.id, "Transport disconnected");
            }
            Driven::Completed(Err(e)) => {
                let err = SessionError::Teardown(e);
                self.trace_error(&err);
                self.log(format!("Error during disconnect: {}", err));
            }
            Driven::Interrupted | Driven::Ended => {}
        }

        self.release_session(end);
    }

    /// Connect failures are errors; everything else is reported as a warning
    pub(super) fn trace_error(&self, err: &SessionError) {
        let session_id = self.session_id();
        if err.is_connect_failure() {
            error!(?session_id, "{}", err);
        } else {
            warn!(?session_id, "{}", err);
        }
    }

    /// Drop the session and everything bound to it, without calling the transport
    pub(super) fn release_session(&mut self, end: SessionEnd) {
        if let Some(session) = self.session.take() {
            debug!(session_id = %session.handle.id, "Session released");
        }

        self.binder.release();
        self.view.search_result = None;
        self.view.session_id = None;
        self.view.transport_state = None;
        self.view.last_end = Some(end);
        self.set_state(ConnectionState::Idle);
        self.notify_waiters();
    }

    fn notify_waiters(&mut self) {
        let state = self.state();
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(state);
        }
    }

    fn is_live(&self, session_id: SessionId) -> bool {
        self.live_session(session_id).is_some()
    }

    /// The session `session_id` if it is current and not being torn down
    pub(super) fn live_session(&self, session_id: SessionId) -> Option<SessionRef> {
        self.session
            .as_ref()
            .filter(|s| s.handle.id == session_id && !s.tombstoned)
            .map(|s| s.handle.clone())
    }

    pub(super) fn set_state(&mut self, state: ConnectionState) {
        if self.view.connection != state {
            debug!("Connection state {} -> {}", self.view.connection, state);
        }
        self.view.connection = state;
        self.view.connect_enabled = state.can_connect();
        self.view.disconnect_enabled = state.can_disconnect();
        self.publish();
    }

    pub(super) fn set_status(&mut self, status: impl Into<String>) {
        let status = status.into();
        self.log(format!("Status: {}", status));
        self.view.status = status;
    }

    /// Append to the session log; published with the next state change or dispatch
    pub(super) fn log(&mut self, text: impl Into<String>) {
        self.view.log.push(LogEntry::new(text));
    }

    pub(super) fn publish(&self) {
        self.view_tx.send_replace(self.view.clone());
    }
}

async fn next_command(commands: &mut Option<mpsc::Receiver<Command>>) -> Option<Command> {
    match commands {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Cloneable front end to a spawned [`SessionController`]
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<SessionView>,
}

impl ControllerHandle {
    pub async fn connect(&self) -> Result<ConnectionState> {
        self.request(Command::Connect).await
    }

    pub async fn disconnect(&self) -> Result<ConnectionState> {
        self.request(Command::Disconnect).await
    }

    /// Latest published view
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.clone()
    }

    async fn request(
        &self,
        command: fn(oneshot::Sender<ConnectionState>) -> Command,
    ) -> Result<ConnectionState> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .map_err(|_| SessionError::ControllerGone)?;
        rx.await.map_err(|_| SessionError::ControllerGone)
    }
}

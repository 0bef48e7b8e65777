//! The pool connection.
//!
//! A [`Session`] is a cheap handle to an actor task that owns the socket. The
//! actor walks the Stratum handshake on its own once `connect` succeeds and
//! reports progress as [`Event`]s in arrival order.

use {
    super::*,
    actor::{SessionActor, SessionMessage},
    codec::FrameCodec,
};

pub use {error::Error, event::Event, state::SessionState};

mod actor;
mod codec;
mod error;
mod event;
mod state;

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct Session {
    config: Arc<SessionConfig>,
    state: watch::Receiver<SessionState>,
    tx: mpsc::Sender<SessionMessage>,
}

impl Session {
    /// Spawns the session actor. Must be called inside a tokio runtime.
    pub fn new(config: SessionConfig) -> (Self, mpsc::Receiver<Event>) {
        let config = Arc::new(config);
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (events_tx, events_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (state_tx, state_rx) = watch::channel(SessionState::Disconnected);

        tokio::spawn(SessionActor::new(config.clone(), rx, events_tx, state_tx).run());

        (
            Self {
                config,
                state: state_rx,
                tx,
            },
            events_rx,
        )
    }

    /// Opens the connection and sends `mining.subscribe`. The rest of the
    /// handshake is reported through events.
    pub async fn connect(&self) -> Result {
        let (respond_to, rx) = oneshot::channel();

        self.tx
            .send(SessionMessage::Connect { respond_to })
            .await
            .map_err(|_| Error::ActorGone)?;

        rx.await.map_err(|_| Error::ActorGone)?
    }

    pub async fn submit(&self, submit: Submit) -> Result {
        let (respond_to, rx) = oneshot::channel();

        self.tx
            .send(SessionMessage::Submit { submit, respond_to })
            .await
            .map_err(|_| Error::ActorGone)?;

        rx.await.map_err(|_| Error::ActorGone)?
    }

    pub async fn disconnect(&self) -> Result {
        let (respond_to, rx) = oneshot::channel();

        self.tx
            .send(SessionMessage::Disconnect { respond_to })
            .await
            .map_err(|_| Error::ActorGone)?;

        rx.await.map_err(|_| Error::ActorGone)
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    pub fn username(&self) -> &str {
        &self.config.username
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

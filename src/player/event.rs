//! Events flowing into the player
//!
//! Engine callbacks, sink lifecycle signals and timer firings all arrive as
//! [`PlayerMessage`]s on one unbounded channel owned by the player. Every
//! message is tagged with the session it was produced for, so anything
//! emitted by a released engine or an old sink binding is dropped on receipt.

use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use super::timer::TaskId;

/// Identity of one playback session (one URL load)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
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

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engine error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Media,
    /// Anything else; fatal ones are unrecoverable
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    pub kind: ErrorKind,
    pub fatal: bool,
    pub details: String,
}

/// Signals from the streaming engine and the playback sink
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    // Streaming engine
    ManifestParsed,
    Error(ErrorEvent),

    // Playback sink
    CanPlay,
    /// The sink failed to decode or fetch a directly assigned source
    MediaFailed(String),
    Waiting,
    Stalled,
    Playing,
    Ended,
    TimeUpdate { current_time: f64, duration: f64 },
}

/// Timers owned by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Watchdog,
    ControlsHide,
    Osd,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerMessage {
    Event {
        session: SessionId,
        event: PlaybackEvent,
    },
    Timer {
        /// `None` for timers that outlive sessions (controls auto-hide)
        session: Option<SessionId>,
        task: TaskId,
        kind: TimerKind,
    },
}

/// Session-bound sender handed to engines and sinks
#[derive(Debug, Clone)]
pub struct EventEmitter {
    session: SessionId,
    tx: UnboundedSender<PlayerMessage>,
}

impl EventEmitter {
    pub(crate) fn new(session: SessionId, tx: UnboundedSender<PlayerMessage>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Deliver an event; silently dropped once the player is gone
    pub fn emit(&self, event: PlaybackEvent) {
        let _ = self.tx.send(PlayerMessage::Event {
            session: self.session,
            event,
        });
    }

    pub fn emit_error(&self, kind: ErrorKind, fatal: bool, details: impl Into<String>) {
        self.emit(PlaybackEvent::Error(ErrorEvent {
            kind,
            fatal,
            details: details.into(),
        }));
    }
}

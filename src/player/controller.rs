//! Session lifecycle and transport controls

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use super::adapter::EngineAdapter;
use super::delivery::Delivery;
use super::engine::{EngineFactory, PlaybackSink};
use super::event::{EventEmitter, PlaybackEvent, PlayerMessage, SessionId, TimerKind};
use super::state::{PlaybackPhase, PlaybackUiState, SeekDirection};
use super::timer::{ScheduledTask, TaskId};
use super::PlayerConfig;
use crate::services::favorites::FavoritesStore;
use crate::services::store::StoreResult;

/// Player error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerError {
    #[error("Media URL is empty")]
    EmptyUrl,
}

/// What to play
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaRequest {
    pub url: String,
    pub poster: Option<String>,
    pub title: Option<String>,
    pub is_live: bool,
    /// Favorites key, e.g. `vod_42`
    pub content_id: Option<String>,
}

impl MediaRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn live(mut self) -> Self {
        self.is_live = true;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }
}

pub type NavigateFn = Box<dyn FnMut() -> Option<MediaRequest> + Send>;
pub type AvailableFn = Box<dyn Fn() -> bool + Send>;
pub type CloseFn = Box<dyn FnMut() + Send>;

/// Caller-supplied navigation context
///
/// `next`/`prev` are only available when the matching callback is set. The
/// callback decides what comes next (and whether lists wrap); the player just
/// loads whatever it returns. `can_next`/`can_prev` narrow availability
/// further, e.g. at the ends of an episode list.
#[derive(Default)]
pub struct Navigation {
    pub on_next: Option<NavigateFn>,
    pub on_prev: Option<NavigateFn>,
    pub can_next: Option<AvailableFn>,
    pub can_prev: Option<AvailableFn>,
    pub on_close: Option<CloseFn>,
}

impl Navigation {
    pub fn has_next(&self) -> bool {
        self.on_next.is_some() && self.can_next.as_ref().map_or(true, |can| can())
    }

    pub fn has_prev(&self) -> bool {
        self.on_prev.is_some() && self.can_prev.as_ref().map_or(true, |can| can())
    }

    pub fn with_on_close(mut self, on_close: impl FnMut() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(on_close));
        self
    }
}

struct Session {
    id: SessionId,
    request: MediaRequest,
    adapter: EngineAdapter,
    watchdog: Option<ScheduledTask>,
    osd: Option<ScheduledTask>,
}

impl Session {
    /// Destroy the pipeline and cancel session timers; idempotent
    fn release(&mut self) {
        self.watchdog = None;
        self.osd = None;
        self.adapter.release();
    }
}

pub struct Player {
    config: PlayerConfig,
    sink: Arc<dyn PlaybackSink>,
    factory: Arc<dyn EngineFactory>,
    favorites: Option<FavoritesStore>,
    navigation: Navigation,
    session: Option<Session>,
    state: PlaybackUiState,
    controls_timer: Option<ScheduledTask>,
    tx: UnboundedSender<PlayerMessage>,
    rx: UnboundedReceiver<PlayerMessage>,
}

impl Player {
    pub fn new(
        config: PlayerConfig,
        sink: Arc<dyn PlaybackSink>,
        factory: Arc<dyn EngineFactory>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            sink,
            factory,
            favorites: None,
            navigation: Navigation::default(),
            session: None,
            state: PlaybackUiState::default(),
            controls_timer: None,
            tx,
            rx,
        }
    }

    pub fn with_favorites(mut self, favorites: FavoritesStore) -> Self {
        self.favorites = Some(favorites);
        self
    }

    pub fn set_navigation(&mut self, navigation: Navigation) {
        self.navigation = navigation;
    }

    pub fn state(&self) -> &PlaybackUiState {
        &self.state
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn request(&self) -> Option<&MediaRequest> {
        self.session.as_ref().map(|s| &s.request)
    }

    pub fn delivery(&self) -> Option<Delivery> {
        self.session.as_ref().map(|s| s.adapter.delivery())
    }

    pub fn has_next(&self) -> bool {
        self.navigation.has_next()
    }

    pub fn has_prev(&self) -> bool {
        self.navigation.has_prev()
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Start a session for `request`
    ///
    /// The previous session is torn down before anything new is built, so at
    /// most one engine is ever alive. Loading the URL that is already playing
    /// keeps the current session.
    pub fn load(&mut self, request: MediaRequest) -> Result<SessionId, PlayerError> {
        if request.url.trim().is_empty() {
            return Err(PlayerError::EmptyUrl);
        }

        if let Some(session) = &self.session {
            if session.request.url == request.url {
                debug!("URL unchanged, keeping session {}", session.id);
                return Ok(session.id);
            }
        }

        self.teardown();
        self.state.begin_session();

        let id = SessionId::new();
        let watchdog = self.arm(TimerKind::Watchdog, Some(id), self.config.watchdog_timeout);
        let events = EventEmitter::new(id, self.tx.clone());
        let adapter = EngineAdapter::start(
            &request.url,
            self.sink.clone(),
            self.factory.as_ref(),
            &self.config.engine,
            events,
        );

        self.state.is_favorite = self.lookup_favorite(request.content_id.as_deref());
        info!(session = %id, live = request.is_live, "Session started");

        self.session = Some(Session {
            id,
            request,
            adapter,
            watchdog: Some(watchdog),
            osd: None,
        });
        Ok(id)
    }

    /// End the session and notify the caller
    pub fn close(&mut self) {
        self.teardown();
        self.state.end_session();
        if let Some(on_close) = self.navigation.on_close.as_mut() {
            on_close();
        }
    }

    fn teardown(&mut self) {
        self.controls_timer = None;
        if let Some(mut session) = self.session.take() {
            session.release();
            info!(session = %session.id, "Session released");
        }
    }

    fn arm(&self, kind: TimerKind, session: Option<SessionId>, delay: Duration) -> ScheduledTask {
        let tx = self.tx.clone();
        ScheduledTask::spawn(delay, move |task| {
            let _ = tx.send(PlayerMessage::Timer {
                session,
                task,
                kind,
            });
        })
    }

    // ========================================================================
    // Message loop
    // ========================================================================

    /// Wait for the next message and apply it
    pub async fn pump(&mut self) {
        // The player holds a sender, so the channel never closes
        if let Some(message) = self.rx.recv().await {
            self.handle_message(message);
        }
    }

    /// Apply every message already queued; returns how many were handled
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    fn handle_message(&mut self, message: PlayerMessage) {
        match message {
            PlayerMessage::Event { session, event } => self.on_event(session, event),
            PlayerMessage::Timer {
                session,
                task,
                kind,
            } => self.on_timer(session, task, kind),
        }
    }

    fn on_event(&mut self, id: SessionId, event: PlaybackEvent) {
        let Some(session) = self.session.as_mut().filter(|s| s.id == id) else {
            debug!("Dropping {:?} from stale session {}", event, id);
            return;
        };

        let transition = session.adapter.handle(&event);
        self.state.apply(transition);

        if !self.state.is_loading && session.watchdog.take().is_some() {
            debug!("Loading cleared, watchdog cancelled");
        }
    }

    fn on_timer(&mut self, session_id: Option<SessionId>, task: TaskId, kind: TimerKind) {
        match kind {
            TimerKind::ControlsHide => {
                if self.controls_timer.as_ref().map(|t| t.id()) == Some(task) {
                    self.controls_timer = None;
                    self.state.controls_visible = false;
                }
            }
            TimerKind::Watchdog | TimerKind::Osd => {
                let Some(session) = self
                    .session
                    .as_mut()
                    .filter(|s| Some(s.id) == session_id)
                else {
                    return;
                };
                let slot = match kind {
                    TimerKind::Watchdog => &mut session.watchdog,
                    _ => &mut session.osd,
                };
                if slot.as_ref().map(|t| t.id()) != Some(task) {
                    return;
                }
                *slot = None;

                if kind == TimerKind::Osd {
                    self.state.osd = None;
                } else if self.state.load_timed_out() {
                    warn!(session = %session.id, "Load timed out: {}", session.request.url);
                }
            }
        }
    }

    // ========================================================================
    // Transport controls
    // ========================================================================

    /// Show controls and restart the auto-hide countdown
    pub fn pointer_moved(&mut self) {
        self.state.controls_visible = true;
        self.controls_timer = Some(self.arm(
            TimerKind::ControlsHide,
            None,
            self.config.controls_hide_delay,
        ));
    }

    pub fn toggle_play_pause(&mut self) {
        self.pointer_moved();
        if self.session.is_none() {
            return;
        }

        if self.state.is_playing {
            self.sink.pause();
            self.state.is_playing = false;
            self.state.phase = PlaybackPhase::Paused;
            return;
        }

        match self.sink.play() {
            Ok(()) => {
                self.state.is_playing = true;
                if !self.state.is_loading {
                    self.state.phase = PlaybackPhase::Playing;
                }
            }
            Err(e) => warn!("Resume rejected: {}", e),
        }
    }

    /// Relative seek in seconds; no-op for live streams
    pub fn seek(&mut self, offset_secs: f64) {
        self.pointer_moved();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.request.is_live {
            return;
        }

        self.sink.seek_by(offset_secs);
        self.state.osd = Some(if offset_secs < 0.0 {
            SeekDirection::Backward
        } else {
            SeekDirection::Forward
        });

        let id = session.id;
        let osd = self.arm(TimerKind::Osd, Some(id), self.config.osd_duration);
        if let Some(session) = self.session.as_mut() {
            session.osd = Some(osd);
        }
    }

    pub fn toggle_mute(&mut self) {
        self.pointer_moved();
        self.state.is_muted = !self.state.is_muted;
        self.sink.set_muted(self.state.is_muted);
    }

    /// Best effort; failures are logged only
    pub fn request_fullscreen(&mut self) {
        self.pointer_moved();
        if let Err(e) = self.sink.request_fullscreen() {
            debug!("Fullscreen unavailable: {}", e);
        }
    }

    /// Load whatever the `on_next` callback returns
    pub fn next(&mut self) -> Result<Option<SessionId>, PlayerError> {
        self.pointer_moved();
        let request = self.navigation.on_next.as_mut().and_then(|next| next());
        request.map(|r| self.load(r)).transpose()
    }

    pub fn prev(&mut self) -> Result<Option<SessionId>, PlayerError> {
        self.pointer_moved();
        let request = self.navigation.on_prev.as_mut().and_then(|prev| prev());
        request.map(|r| self.load(r)).transpose()
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    fn lookup_favorite(&self, content_id: Option<&str>) -> bool {
        let (Some(favorites), Some(content_id)) = (self.favorites.as_ref(), content_id) else {
            return false;
        };
        favorites.is_favorite(content_id).unwrap_or_else(|e| {
            warn!("Failed to read favorites: {}", e);
            false
        })
    }

    /// Flip the current item's favorite flag
    ///
    /// Returns the new membership, or `None` when the session has no content
    /// id or no favorites store is attached.
    pub fn toggle_favorite(&mut self) -> StoreResult<Option<bool>> {
        let content_id = self
            .session
            .as_ref()
            .and_then(|s| s.request.content_id.as_deref());
        let (Some(favorites), Some(content_id)) = (self.favorites.as_ref(), content_id) else {
            return Ok(None);
        };

        let now_favorite = favorites.toggle(content_id)?;
        self.state.is_favorite = now_favorite;
        Ok(Some(now_favorite))
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("session", &self.session_id())
            .field("state", &self.state)
            .finish()
    }
}

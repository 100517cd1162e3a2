//! Playback core
//!
//! A [`Player`] owns at most one playback session at a time. Loading a URL
//! tears down the previous session, picks a delivery path, arms the load
//! watchdog and hands the URL to an [`EngineAdapter`]. Engine callbacks,
//! sink signals and timers come back as messages that the owner drains with
//! [`Player::pump`] or [`Player::drain`].
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut player = Player::new(PlayerConfig::default(), sink, factory)
//!     .with_favorites(FavoritesStore::new(store));
//! player.load(MediaRequest::new(url).live())?;
//! loop {
//!     player.pump().await;
//!     render(player.state());
//! }
//! ```

pub mod adapter;
pub mod controller;
pub mod delivery;
pub mod engine;
pub mod event;
pub mod navigation;
pub mod state;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

// Re-exports for convenience
pub use adapter::{EngineAdapter, Transition};
pub use controller::{MediaRequest, Navigation, Player, PlayerError};
pub use delivery::Delivery;
pub use engine::{EngineConfig, EngineFactory, PlaybackSink, SinkError, StreamingEngine};
pub use event::{ErrorEvent, ErrorKind, EventEmitter, PlaybackEvent, PlayerMessage, SessionId};
pub use navigation::{ChannelCursor, EpisodeCursor, PlaylistCursor};
pub use state::{PlaybackPhase, PlaybackUiState, SeekDirection};

/// Player timing and engine settings
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Upper bound on the loading spinner for a new session
    pub watchdog_timeout: Duration,
    /// Controls hide after this long without interaction
    pub controls_hide_delay: Duration,
    /// How long the seek indicator stays up
    pub osd_duration: Duration,
    pub engine: EngineConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            watchdog_timeout: Duration::from_secs(12),
            controls_hide_delay: Duration::from_secs(4),
            osd_duration: Duration::from_millis(600),
            engine: EngineConfig::default(),
        }
    }
}

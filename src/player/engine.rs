//! Playback platform seams
//!
//! The player never decodes media itself. It drives a [`PlaybackSink`] (the
//! surface that actually renders, e.g. a video element or a native player)
//! and, for segmented streams, a [`StreamingEngine`] built by an
//! [`EngineFactory`]. Both report back through an [`EventEmitter`].

use std::sync::Arc;
use std::time::Duration;

use super::event::EventEmitter;

/// Sink-side failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// Playback with sound refused by platform policy
    #[error("Autoplay blocked")]
    AutoplayBlocked,
    #[error("Operation not supported")]
    Unsupported,
    #[error("Sink error: {0}")]
    Other(String),
}

/// Rendering surface shared by every session of a player
pub trait PlaybackSink: Send + Sync {
    /// Route lifecycle signals (waiting, playing, ended, ...) to a session
    fn bind_events(&self, events: EventEmitter);
    /// Assign a URL for native playback, or clear the current source
    fn set_source(&self, url: Option<&str>);
    fn load(&self);
    fn play(&self) -> Result<(), SinkError>;
    fn pause(&self);
    fn set_muted(&self, muted: bool);
    /// Relative seek in seconds; the sink clamps to the seekable range
    fn seek_by(&self, offset_secs: f64);
    fn request_fullscreen(&self) -> Result<(), SinkError>;
}

/// One adaptive streaming pipeline
pub trait StreamingEngine: Send {
    fn load_source(&mut self, url: &str);
    fn attach_media(&mut self, sink: Arc<dyn PlaybackSink>);
    /// Resume loading after a network failure
    fn start_load(&mut self);
    /// Decoder reset keeping the current buffer
    fn recover_media_error(&mut self);
    fn destroy(&mut self);
}

pub trait EngineFactory: Send + Sync {
    /// Whether segmented playback is available on this platform
    fn is_supported(&self) -> bool;
    fn create(&self, config: &EngineConfig, events: EventEmitter) -> Box<dyn StreamingEngine>;
}

/// Fixed settings every engine is created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Parse manifests and segments off the main thread
    pub enable_worker: bool,
    pub low_latency_mode: bool,
    /// Already-played media kept for instant rewind
    pub back_buffer_length: Duration,
    pub manifest_loading_max_retry: u32,
    pub manifest_loading_retry_delay: Duration,
    /// Send cookies/credentials with segment requests
    pub with_credentials: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_worker: true,
            low_latency_mode: true,
            back_buffer_length: Duration::from_secs(60),
            manifest_loading_max_retry: 4,
            manifest_loading_retry_delay: Duration::from_secs(1),
            with_credentials: false,
        }
    }
}

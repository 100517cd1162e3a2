//! Engine adapter
//!
//! Owns the decode pipeline of one session. It picks the delivery path,
//! applies the error recovery policy to the engine, and reduces raw engine
//! and sink signals to [`Transition`]s the controller folds into UI state.
//! At most one engine exists per adapter and none survives [`EngineAdapter::release`].

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::delivery::Delivery;
use super::engine::{EngineConfig, EngineFactory, PlaybackSink, StreamingEngine};
use super::event::{ErrorKind, EventEmitter, PlaybackEvent};

/// Effect of one event on the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Loading finished and playback was requested
    Ready { playing: bool, muted: bool },
    /// Fatal but recoverable error; one recovery call was issued
    Recovering(ErrorKind),
    /// Pipeline is gone, nothing will be retried
    Failed { counted: bool },
    Buffering,
    Resumed,
    Ended,
    /// Playback position as a percentage of a known duration
    Progress(f64),
    Ignored,
}

pub struct EngineAdapter {
    url: String,
    delivery: Delivery,
    sink: Arc<dyn PlaybackSink>,
    engine: Option<Box<dyn StreamingEngine>>,
    failed: bool,
    released: bool,
}

impl EngineAdapter {
    /// Bind the sink to the session and start loading `url`
    pub fn start(
        url: &str,
        sink: Arc<dyn PlaybackSink>,
        factory: &dyn EngineFactory,
        config: &EngineConfig,
        events: EventEmitter,
    ) -> Self {
        let delivery = Delivery::select(url, factory.is_supported());
        info!(session = %events.session(), %delivery, "Starting playback: {}", url);

        sink.bind_events(events.clone());

        let engine = match delivery {
            Delivery::Segmented => {
                let mut engine = factory.create(config, events);
                engine.load_source(url);
                engine.attach_media(sink.clone());
                Some(engine)
            }
            Delivery::Direct => {
                sink.set_source(Some(url));
                sink.load();
                None
            }
        };

        Self {
            url: url.to_string(),
            delivery,
            sink,
            engine,
            failed: false,
            released: false,
        }
    }

    pub fn delivery(&self) -> Delivery {
        self.delivery
    }

    pub fn handle(&mut self, event: &PlaybackEvent) -> Transition {
        if self.released || self.failed {
            debug!("Ignoring {:?} for finished pipeline", event);
            return Transition::Ignored;
        }

        match event {
            PlaybackEvent::ManifestParsed => {
                if self.engine.is_none() {
                    return Transition::Ignored;
                }
                debug!("Manifest parsed: {}", self.url);
                let (playing, muted) = self.play_with_muted_fallback();
                Transition::Ready { playing, muted }
            }
            PlaybackEvent::Error(err) => {
                let Some(engine) = self.engine.as_mut() else {
                    return Transition::Ignored;
                };
                if !err.fatal {
                    debug!("Non-fatal {:?} error: {}", err.kind, err.details);
                    return Transition::Ignored;
                }
                match err.kind {
                    ErrorKind::Network => {
                        warn!("Fatal network error, resuming load: {}", err.details);
                        engine.start_load();
                        Transition::Recovering(ErrorKind::Network)
                    }
                    ErrorKind::Media => {
                        warn!("Fatal media error, recovering decoder: {}", err.details);
                        engine.recover_media_error();
                        Transition::Recovering(ErrorKind::Media)
                    }
                    ErrorKind::Other => {
                        error!("Unrecoverable playback error: {}", err.details);
                        engine.destroy();
                        self.engine = None;
                        self.failed = true;
                        Transition::Failed { counted: true }
                    }
                }
            }
            PlaybackEvent::CanPlay => {
                if self.delivery.is_segmented() {
                    return Transition::Ignored;
                }
                let playing = match self.sink.play() {
                    Ok(()) => true,
                    Err(e) => {
                        debug!("Direct play request rejected: {}", e);
                        false
                    }
                };
                Transition::Ready {
                    playing,
                    muted: false,
                }
            }
            PlaybackEvent::MediaFailed(details) => {
                // Segmented pipelines report through the engine instead
                if self.delivery.is_segmented() {
                    return Transition::Ignored;
                }
                error!("Direct playback failed: {}", details);
                self.failed = true;
                Transition::Failed { counted: false }
            }
            PlaybackEvent::Waiting | PlaybackEvent::Stalled => Transition::Buffering,
            PlaybackEvent::Playing => Transition::Resumed,
            PlaybackEvent::Ended => Transition::Ended,
            PlaybackEvent::TimeUpdate {
                current_time,
                duration,
            } => {
                if duration.is_finite() && *duration > 0.0 {
                    Transition::Progress((current_time / duration * 100.0).clamp(0.0, 100.0))
                } else {
                    Transition::Ignored
                }
            }
        }
    }

    /// Returns `(playing, muted)`; a refused play is retried once muted
    fn play_with_muted_fallback(&self) -> (bool, bool) {
        match self.sink.play() {
            Ok(()) => (true, false),
            Err(e) => {
                warn!("Play rejected ({}), retrying muted", e);
                self.sink.set_muted(true);
                match self.sink.play() {
                    Ok(()) => (true, true),
                    Err(e) => {
                        warn!("Muted play rejected: {}", e);
                        (false, true)
                    }
                }
            }
        }
    }

    /// Destroy the engine and detach the sink; idempotent
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
        self.sink.set_source(None);
        debug!("Released pipeline for {}", self.url);
    }
}

impl Drop for EngineAdapter {
    fn drop(&mut self) {
        self.release();
    }
}

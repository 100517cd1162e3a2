//! In-memory engine and sink used by the player tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::engine::{EngineConfig, EngineFactory, PlaybackSink, SinkError, StreamingEngine};
use super::event::{EventEmitter, PlaybackEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    SetSource(Option<String>),
    Load,
    Play,
    Pause,
    SetMuted(bool),
    SeekBy(f64),
    Fullscreen,
}

#[derive(Default)]
pub struct FakeSink {
    calls: Mutex<Vec<SinkCall>>,
    events: Mutex<Option<EventEmitter>>,
    play_results: Mutex<VecDeque<Result<(), SinkError>>>,
    pub fullscreen_fails: bool,
}

impl FakeSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn without_fullscreen() -> Arc<Self> {
        Arc::new(Self {
            fullscreen_fails: true,
            ..Self::default()
        })
    }

    /// Queue outcomes for upcoming `play` calls; unqueued calls succeed
    pub fn queue_play_results(&self, results: impl IntoIterator<Item = Result<(), SinkError>>) {
        self.play_results.lock().unwrap().extend(results);
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &SinkCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SinkCall::SeekBy(offset) => Some(offset),
                _ => None,
            })
            .collect()
    }

    /// Emit a signal through the currently bound session
    pub fn emit(&self, event: PlaybackEvent) {
        if let Some(events) = self.events.lock().unwrap().as_ref() {
            events.emit(event);
        }
    }

    fn record(&self, call: SinkCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PlaybackSink for FakeSink {
    fn bind_events(&self, events: EventEmitter) {
        *self.events.lock().unwrap() = Some(events);
    }

    fn set_source(&self, url: Option<&str>) {
        self.record(SinkCall::SetSource(url.map(str::to_string)));
    }

    fn load(&self) {
        self.record(SinkCall::Load);
    }

    fn play(&self) -> Result<(), SinkError> {
        self.record(SinkCall::Play);
        self.play_results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn pause(&self) {
        self.record(SinkCall::Pause);
    }

    fn set_muted(&self, muted: bool) {
        self.record(SinkCall::SetMuted(muted));
    }

    fn seek_by(&self, offset_secs: f64) {
        self.record(SinkCall::SeekBy(offset_secs));
    }

    fn request_fullscreen(&self) -> Result<(), SinkError> {
        self.record(SinkCall::Fullscreen);
        if self.fullscreen_fails {
            Err(SinkError::Unsupported)
        } else {
            Ok(())
        }
    }
}

/// Shared counters across every engine a factory builds
#[derive(Default)]
pub struct EngineProbe {
    pub created: AtomicUsize,
    pub alive: AtomicUsize,
    pub max_alive: AtomicUsize,
    pub start_loads: AtomicUsize,
    pub media_recoveries: AtomicUsize,
    pub destroyed: AtomicUsize,
    pub configs: Mutex<Vec<EngineConfig>>,
    pub sources: Mutex<Vec<String>>,
    emitters: Mutex<Vec<EventEmitter>>,
}

impl EngineProbe {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Emitter of the most recently created engine
    pub fn last_emitter(&self) -> EventEmitter {
        self.emitters
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no engine created")
    }
}

pub struct FakeEngine {
    probe: Arc<EngineProbe>,
    destroyed: bool,
}

impl StreamingEngine for FakeEngine {
    fn load_source(&mut self, url: &str) {
        self.probe.sources.lock().unwrap().push(url.to_string());
    }

    fn attach_media(&mut self, _sink: Arc<dyn PlaybackSink>) {}

    fn start_load(&mut self) {
        self.probe.start_loads.fetch_add(1, Ordering::SeqCst);
    }

    fn recover_media_error(&mut self) {
        self.probe.media_recoveries.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.probe.alive.fetch_sub(1, Ordering::SeqCst);
            self.probe.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct FakeFactory {
    pub probe: Arc<EngineProbe>,
    pub supported: bool,
}

impl FakeFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            probe: Arc::new(EngineProbe::default()),
            supported: true,
        })
    }

    pub fn unsupported() -> Arc<Self> {
        Arc::new(Self {
            probe: Arc::new(EngineProbe::default()),
            supported: false,
        })
    }
}

impl EngineFactory for FakeFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, config: &EngineConfig, events: EventEmitter) -> Box<dyn StreamingEngine> {
        let probe = &self.probe;
        probe.created.fetch_add(1, Ordering::SeqCst);
        let alive = probe.alive.fetch_add(1, Ordering::SeqCst) + 1;
        probe.max_alive.fetch_max(alive, Ordering::SeqCst);
        probe.configs.lock().unwrap().push(config.clone());
        probe.emitters.lock().unwrap().push(events);

        Box::new(FakeEngine {
            probe: probe.clone(),
            destroyed: false,
        })
    }
}

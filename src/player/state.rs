//! Observable playback state

use super::adapter::Transition;

/// Lifecycle of the current session
///
/// `Idle → Loading → Playing → (Recovering | Stalled | Failed)`, with
/// `Paused` and `Ended` for transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Recovering,
    Stalled,
    Failed,
    Ended,
}

/// Direction shown by the seek indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackUiState {
    pub phase: PlaybackPhase,
    pub is_playing: bool,
    pub is_loading: bool,
    pub is_muted: bool,
    pub progress_percent: f64,
    /// Fatal engine errors seen in this session
    pub error_count: u32,
    pub controls_visible: bool,
    /// Seek indicator, cleared shortly after each seek
    pub osd: Option<SeekDirection>,
    pub is_favorite: bool,
}

impl Default for PlaybackUiState {
    fn default() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            is_playing: false,
            is_loading: false,
            is_muted: false,
            progress_percent: 0.0,
            error_count: 0,
            controls_visible: true,
            osd: None,
            is_favorite: false,
        }
    }
}

impl PlaybackUiState {
    /// State at the start of a new session; mute survives URL changes
    pub(crate) fn begin_session(&mut self) {
        self.phase = PlaybackPhase::Loading;
        self.is_playing = false;
        self.is_loading = true;
        self.progress_percent = 0.0;
        self.error_count = 0;
        self.controls_visible = true;
        self.osd = None;
        self.is_favorite = false;
    }

    pub(crate) fn end_session(&mut self) {
        self.phase = PlaybackPhase::Idle;
        self.is_playing = false;
        self.is_loading = false;
        self.osd = None;
    }

    pub(crate) fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Ready { playing, muted } => {
                self.is_loading = false;
                self.is_playing = playing;
                if muted {
                    self.is_muted = true;
                }
                self.phase = if playing {
                    PlaybackPhase::Playing
                } else {
                    PlaybackPhase::Paused
                };
            }
            Transition::Recovering(_) => {
                self.error_count += 1;
                self.phase = PlaybackPhase::Recovering;
            }
            Transition::Failed { counted } => {
                if counted {
                    self.error_count += 1;
                }
                self.is_loading = false;
                self.is_playing = false;
                self.phase = PlaybackPhase::Failed;
            }
            Transition::Buffering => {
                self.is_loading = true;
                self.phase = PlaybackPhase::Stalled;
            }
            Transition::Resumed => {
                self.is_loading = false;
                self.is_playing = true;
                self.phase = PlaybackPhase::Playing;
            }
            Transition::Ended => {
                self.is_playing = false;
                self.phase = PlaybackPhase::Ended;
            }
            Transition::Progress(percent) => self.progress_percent = percent,
            Transition::Ignored => {}
        }
    }

    /// Watchdog expiry; returns whether a spinner was actually cleared
    pub(crate) fn load_timed_out(&mut self) -> bool {
        if !self.is_loading {
            return false;
        }
        self.is_loading = false;
        if self.phase == PlaybackPhase::Loading {
            self.phase = PlaybackPhase::Stalled;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::event::ErrorKind;

    fn loading() -> PlaybackUiState {
        let mut state = PlaybackUiState::default();
        state.begin_session();
        state
    }

    #[test]
    fn test_begin_session_resets_counters_but_not_mute() {
        let mut state = PlaybackUiState {
            is_muted: true,
            error_count: 3,
            progress_percent: 40.0,
            ..PlaybackUiState::default()
        };
        state.begin_session();

        assert!(state.is_loading);
        assert!(state.is_muted);
        assert_eq!(state.error_count, 0);
        assert_eq!(state.progress_percent, 0.0);
        assert_eq!(state.phase, PlaybackPhase::Loading);
    }

    #[test]
    fn test_recovery_counts_without_clearing_loading() {
        let mut state = loading();
        state.apply(Transition::Recovering(ErrorKind::Network));
        state.apply(Transition::Recovering(ErrorKind::Media));

        assert_eq!(state.error_count, 2);
        assert!(state.is_loading);
        assert_eq!(state.phase, PlaybackPhase::Recovering);
    }

    #[test]
    fn test_buffering_then_resume() {
        let mut state = loading();
        state.apply(Transition::Ready {
            playing: true,
            muted: false,
        });
        state.apply(Transition::Buffering);
        assert!(state.is_loading);
        assert_eq!(state.phase, PlaybackPhase::Stalled);

        state.apply(Transition::Resumed);
        assert!(!state.is_loading);
        assert_eq!(state.phase, PlaybackPhase::Playing);
    }

    #[test]
    fn test_timeout_only_clears_an_active_spinner() {
        let mut state = loading();
        assert!(state.load_timed_out());
        assert!(!state.is_loading);
        assert_eq!(state.phase, PlaybackPhase::Stalled);
        assert!(!state.load_timed_out());
    }
}

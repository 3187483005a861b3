//! Playback session state.
//!
//! The playlist and transport live outside the visualizer core, but the core
//! needs one bit from them every frame: is audio live? `SessionState` is the
//! serializable record of that outer state, updated only through the pure
//! [`SessionState::apply`] transition.

use serde::{Deserialize, Serialize};

/// Default transport volume.
pub const DEFAULT_VOLUME: f32 = 0.7;

/// One entry of the playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEntry {
    pub id: String,
    pub name: String,
}

impl TrackEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Transport readings for the current track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportState {
    pub is_playing: bool,
    /// Playhead in seconds.
    pub current_time: f64,
    /// Track length in seconds, 0 until metadata is known.
    pub duration: f64,
    pub volume: f32,
}

impl Default for TransportState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: DEFAULT_VOLUME,
        }
    }
}

/// Everything the outer UI knows about playback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub tracks: Vec<TrackEntry>,
    /// Index into `tracks`, `None` before anything was selected.
    pub current: Option<usize>,
    pub transport: TransportState,
    /// Set once the audio pipeline has been created (first upload).
    pub initialized: bool,
}

/// Inputs to the session state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    TracksAdded { tracks: Vec<TrackEntry> },
    TogglePlay,
    Next,
    Previous,
    Select { index: usize },
    Seek { time: f64 },
    SetVolume { volume: f32 },
    TimeUpdate { time: f64 },
    MetadataLoaded { duration: f64 },
    /// The current track played to its end.
    Ended,
    /// The platform refused to start playback.
    PlaybackFailed,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_track(&self) -> Option<&TrackEntry> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    /// Whether the spectrum source should be treated as live this frame.
    pub fn is_live(&self) -> bool {
        self.transport.is_playing && self.current_track().is_some()
    }

    /// Compute the state after `event`. `self` is left untouched.
    pub fn apply(&self, event: SessionEvent) -> SessionState {
        let mut next = self.clone();
        match event {
            SessionEvent::TracksAdded { tracks } => {
                if tracks.is_empty() {
                    return next;
                }
                next.initialized = true;
                let first_new = next.tracks.len();
                next.tracks.extend(tracks);
                if next.current.is_none() {
                    next.start_track(first_new);
                }
            }
            SessionEvent::TogglePlay => {
                if next.transport.is_playing {
                    next.transport.is_playing = false;
                } else if next.current_track().is_some() {
                    next.transport.is_playing = true;
                } else if !next.tracks.is_empty() {
                    next.start_track(0);
                }
            }
            SessionEvent::Next | SessionEvent::Ended => {
                let len = next.tracks.len();
                if len > 0 {
                    let index = next.current.map_or(0, |i| (i + 1) % len);
                    next.start_track(index);
                }
            }
            SessionEvent::Previous => {
                let len = next.tracks.len();
                if len > 0 {
                    let index = next.current.map_or(len - 1, |i| (i + len - 1) % len);
                    next.start_track(index);
                }
            }
            SessionEvent::Select { index } => {
                if index < next.tracks.len() {
                    next.start_track(index);
                }
            }
            SessionEvent::Seek { time } => {
                if next.current_track().is_some() {
                    next.transport.current_time = clamp_time(time, next.transport.duration);
                }
            }
            SessionEvent::SetVolume { volume } => {
                if volume.is_finite() {
                    next.transport.volume = volume.clamp(0.0, 1.0);
                }
            }
            SessionEvent::TimeUpdate { time } => {
                next.transport.current_time = clamp_time(time, next.transport.duration);
            }
            SessionEvent::MetadataLoaded { duration } => {
                if duration.is_finite() && duration >= 0.0 {
                    next.transport.duration = duration;
                }
            }
            SessionEvent::PlaybackFailed => {
                next.transport.is_playing = false;
            }
        }
        next
    }

    fn start_track(&mut self, index: usize) {
        self.current = Some(index);
        self.transport.is_playing = true;
        self.transport.current_time = 0.0;
        self.transport.duration = 0.0;
    }
}

/// Clamp a playhead into the known track length; unknown length (0) only
/// clamps at zero.
fn clamp_time(time: f64, duration: f64) -> f64 {
    if !time.is_finite() {
        return 0.0;
    }
    if duration > 0.0 {
        time.clamp(0.0, duration)
    } else {
        time.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks(n: usize) -> Vec<TrackEntry> {
        (0..n)
            .map(|i| TrackEntry::new(format!("id{}", i), format!("track {}", i)))
            .collect()
    }

    #[test]
    fn test_default_session_is_not_live() {
        let state = SessionState::new();
        assert!(!state.is_live());
        assert_eq!(state.transport.volume, DEFAULT_VOLUME);
        assert!(!state.initialized);
    }

    #[test]
    fn test_apply_is_pure() {
        let state = SessionState::new();
        let next = state.apply(SessionEvent::TracksAdded { tracks: tracks(2) });
        assert!(state.tracks.is_empty());
        assert_eq!(next.tracks.len(), 2);
    }

    #[test]
    fn test_clamp_time() {
        assert_eq!(clamp_time(-1.0, 10.0), 0.0);
        assert_eq!(clamp_time(12.0, 10.0), 10.0);
        assert_eq!(clamp_time(12.0, 0.0), 12.0);
        assert_eq!(clamp_time(f64::NAN, 10.0), 0.0);
    }

    #[test]
    fn test_json_round_trip() {
        let state = SessionState::new()
            .apply(SessionEvent::TracksAdded { tracks: tracks(1) })
            .apply(SessionEvent::MetadataLoaded { duration: 90.0 });
        let json = serde_json::to_string(&state).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);

        let event: SessionEvent = serde_json::from_str(r#"{"type":"seek","time":3.5}"#).unwrap();
        assert_eq!(event, SessionEvent::Seek { time: 3.5 });
    }
}

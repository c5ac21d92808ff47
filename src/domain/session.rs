use serde::Serialize;

use crate::domain::Station;

pub const DEFAULT_VOLUME: f32 = 0.5;

/// Clamps into `[0, 1]`; NaN becomes silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    /// No stations loaded.
    Idle,
    /// Stations loaded, nothing playing.
    Ready,
    Playing,
}

/// The single shared playback record. Views receive clones of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSession {
    pub stations: Vec<Station>,
    pub current_index: usize,
    pub volume: f32,
    pub is_playing: bool,
    /// True only while the initial directory fetch is outstanding.
    pub loading: bool,
    /// True while a start attempt has not resolved yet.
    pub connecting: bool,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

impl PlaybackSession {
    pub fn new(volume: f32) -> Self {
        Self {
            stations: Vec::new(),
            current_index: 0,
            volume: clamp_volume(volume),
            is_playing: false,
            loading: false,
            connecting: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        if self.stations.is_empty() {
            PlaybackState::Idle
        } else if self.is_playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Ready
        }
    }

    pub fn current_station(&self) -> Option<&Station> {
        self.stations.get(self.current_index)
    }

    /// Keeps `current_index` inside `[0, len)`, or 0 when empty.
    pub fn clamp_index(&mut self) {
        if self.stations.is_empty() {
            self.current_index = 0;
            self.is_playing = false;
        } else if self.current_index >= self.stations.len() {
            self.current_index = self.stations.len() - 1;
        }
    }
}

//! The playback state machine.
//!
//! [`PlaybackController`] is the single owner of the [`PlaybackSession`] and
//! of the shared audio output. Views read the session through a `watch`
//! channel and never touch the output directly.
//!
//! Every start attempt gets an id and a cancellation token. Beginning a new
//! attempt (or stopping) cancels the pending one, and a completion is only
//! applied while its id is still the latest and the current station still
//! points at the url it tried to start.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::{FeedcastError, Result};
use crate::config::RadioConfig;
use crate::domain::{clamp_volume, PlaybackSession, RawStation, Station};
use crate::radio::{AudioOutput, StationDirectory};

struct Attempt {
    id: u64,
    cancel: CancellationToken,
}

pub struct PlaybackController {
    directory: Arc<dyn StationDirectory>,
    audio: Arc<dyn AudioOutput>,
    batch_size: usize,
    dedupe: bool,
    session: watch::Sender<PlaybackSession>,
    attempt: StdMutex<Attempt>,
    /// Held while talking to the audio output so sources and starts never interleave.
    audio_lock: Mutex<()>,
    /// Directory offset of the next batch. Held across fetches to serialize them.
    next_offset: Mutex<usize>,
}

impl PlaybackController {
    pub fn new(
        directory: Arc<dyn StationDirectory>,
        audio: Arc<dyn AudioOutput>,
        config: &RadioConfig,
    ) -> Self {
        Self::with_options(
            directory,
            audio,
            config.batch_size,
            config.dedupe,
            config.initial_volume,
        )
    }

    pub fn with_options(
        directory: Arc<dyn StationDirectory>,
        audio: Arc<dyn AudioOutput>,
        batch_size: usize,
        dedupe: bool,
        volume: f32,
    ) -> Self {
        let (session, _) = watch::channel(PlaybackSession::new(volume));
        Self {
            directory,
            audio,
            batch_size: batch_size.max(1),
            dedupe,
            session,
            attempt: StdMutex::new(Attempt {
                id: 0,
                cancel: CancellationToken::new(),
            }),
            audio_lock: Mutex::new(()),
            next_offset: Mutex::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSession> {
        self.session.subscribe()
    }

    pub fn session(&self) -> PlaybackSession {
        self.session.borrow().clone()
    }

    /// Initial directory load. Failures are logged and leave the list empty;
    /// calling it again retries only while the list is still empty.
    /// Returns the number of stations available afterwards.
    pub async fn initialize(&self) -> usize {
        if self.session.borrow().stations.is_empty() {
            self.session.send_modify(|s| s.loading = true);
            if let Err(e) = self.load_stations().await {
                warn!("Failed to load stations: {}", e);
            }
            self.session.send_modify(|s| s.loading = false);
        } else {
            debug!("initialize() skipped: stations already loaded");
        }

        let volume = self.session.borrow().volume;
        self.audio.set_volume(volume).await;
        self.session.borrow().stations.len()
    }

    /// Read the directory's first batch. The first load fills the list; a
    /// later one only appends first-batch stations not listed yet, so
    /// existing entries keep their positions and playback is untouched.
    /// Returns how many stations were added.
    pub async fn load_stations(&self) -> Result<usize> {
        let mut offset = self.next_offset.lock().await;
        let raw = self.directory.fetch_stations(0, self.batch_size).await?;
        *offset = (*offset).max(raw.len());

        let known = self.known_urls();
        let mut stations = self.collect(raw, HashSet::new());
        stations.retain(|s| !known.contains(&s.url));

        let added = stations.len();
        self.session.send_modify(|s| {
            if s.stations.is_empty() {
                s.current_index = 0;
            }
            s.stations.extend(stations);
        });
        info!("Loaded {} stations", added);
        Ok(added)
    }

    /// Append the next directory batch. The current station and play state
    /// are untouched. Returns how many stations were added.
    pub async fn fetch_more_stations(&self) -> usize {
        let mut offset = self.next_offset.lock().await;
        let raw = match self.directory.fetch_stations(*offset, self.batch_size).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to fetch more stations: {}", e);
                return 0;
            }
        };
        *offset += raw.len();

        let known = self.known_urls();
        let fresh = self.collect(raw, known);
        let added = fresh.len();
        self.session.send_modify(|s| {
            if s.stations.is_empty() {
                s.current_index = 0;
            }
            s.stations.extend(fresh);
        });
        info!("Added {} stations", added);
        added
    }

    /// Start the current station. A failed start is logged, leaves
    /// `is_playing` false and is returned. A start overtaken by a newer
    /// command resolves to [`FeedcastError::Cancelled`] without touching the session.
    pub async fn play(&self) -> Result<()> {
        let url = match self.session.borrow().current_station() {
            Some(station) => station.url.clone(),
            None => {
                debug!("play() ignored: no stations loaded");
                return Ok(());
            }
        };

        let (attempt, cancel) = self.begin_attempt();
        self.session.send_modify(|s| {
            s.is_playing = false;
            s.connecting = true;
        });

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(FeedcastError::Cancelled),
            result = self.start(&url) => result,
        };
        self.settle(attempt, &url, result)
    }

    async fn start(&self, url: &str) -> Result<()> {
        let _guard = self.audio_lock.lock().await;
        self.audio.set_source(url).await;
        self.audio.play().await
    }

    fn settle(&self, attempt: u64, url: &str, result: Result<()>) -> Result<()> {
        let mut current = false;
        self.session.send_if_modified(|s| {
            current = self.is_current(attempt)
                && s.current_station().map(|st| st.url.as_str()) == Some(url);
            if current {
                s.connecting = false;
                s.is_playing = result.is_ok();
            }
            current
        });

        if !current {
            debug!("Discarding start #{} for {}", attempt, url);
            return Err(FeedcastError::Cancelled);
        }
        match &result {
            Ok(()) => info!("Playing {}", url),
            Err(e) => warn!("Playback failed for {}: {}", url, e),
        }
        result
    }

    /// Fall back to `Ready` when the output stopped on its own after a
    /// successful start. Returns whether the session is still playing.
    pub async fn sync_output(&self) -> bool {
        let attempt = {
            let s = self.session.borrow();
            if !s.is_playing || s.connecting {
                return s.is_playing;
            }
            self.attempt.lock().unwrap_or_else(|e| e.into_inner()).id
        };

        if self.audio.is_active().await {
            return true;
        }

        let mut dropped = false;
        self.session.send_if_modified(|s| {
            dropped = self.is_current(attempt) && s.is_playing;
            if dropped {
                s.is_playing = false;
            }
            dropped
        });
        if dropped {
            warn!("Stream ended unexpectedly");
        }
        self.session.borrow().is_playing
    }

    /// Pause output and keep the source so `play` resumes it.
    pub async fn stop(&self) {
        self.begin_attempt();
        {
            let _guard = self.audio_lock.lock().await;
            self.audio.pause().await;
        }
        self.session.send_modify(|s| {
            s.is_playing = false;
            s.connecting = false;
        });
        debug!("Playback stopped");
    }

    /// Select station `index` and start it, whatever the current play state.
    pub async fn change_station(&self, index: usize) -> Result<()> {
        let len = self.session.borrow().stations.len();
        if len == 0 {
            debug!("change_station({}) ignored: no stations loaded", index);
            return Ok(());
        }
        if index >= len {
            warn!("Station index {} out of range ({} stations)", index, len);
            return Err(FeedcastError::StationOutOfRange { index, len });
        }

        self.session.send_modify(|s| s.current_index = index);
        self.play().await
    }

    pub async fn select_station(&self, index: usize) -> Result<()> {
        self.change_station(index).await
    }

    pub async fn next_station(&self) -> Result<()> {
        let (index, len) = {
            let s = self.session.borrow();
            (s.current_index, s.stations.len())
        };
        if len == 0 {
            return Ok(());
        }
        self.change_station((index + 1) % len).await
    }

    pub async fn previous_station(&self) -> Result<()> {
        let (index, len) = {
            let s = self.session.borrow();
            (s.current_index, s.stations.len())
        };
        if len == 0 {
            return Ok(());
        }
        self.change_station((index + len - 1) % len).await
    }

    /// Clamp into `[0, 1]`, store it and reapply to the output.
    pub async fn set_volume(&self, volume: f32) {
        let volume = clamp_volume(volume);
        self.session.send_if_modified(|s| {
            if s.volume == volume {
                false
            } else {
                s.volume = volume;
                true
            }
        });
        self.audio.set_volume(volume).await;
    }

    /// End the session: cancel any pending start and silence the output.
    pub async fn shutdown(&self) {
        self.stop().await;
        info!("Playback session closed");
    }

    fn begin_attempt(&self) -> (u64, CancellationToken) {
        let mut attempt = self.attempt.lock().unwrap_or_else(|e| e.into_inner());
        attempt.cancel.cancel();
        attempt.id += 1;
        attempt.cancel = CancellationToken::new();
        (attempt.id, attempt.cancel.clone())
    }

    fn is_current(&self, id: u64) -> bool {
        self.attempt.lock().unwrap_or_else(|e| e.into_inner()).id == id
    }

    fn known_urls(&self) -> HashSet<String> {
        self.session
            .borrow()
            .stations
            .iter()
            .map(|s| s.url.clone())
            .collect()
    }

    fn collect(&self, raw: Vec<RawStation>, mut seen: HashSet<String>) -> Vec<Station> {
        let total = raw.len();
        let stations: Vec<Station> = raw
            .into_iter()
            .filter_map(RawStation::into_station)
            .filter(|s| !self.dedupe || seen.insert(s.url.clone()))
            .collect();
        if stations.len() < total {
            debug!("Dropped {} of {} station records", total - stations.len(), total);
        }
        stations
    }
}

//! Audio output backed by an external `mpv` process.
//!
//! Each `play` spawns a fresh `mpv --no-video` for the loaded source. The
//! stream counts as started once the process survives a short grace period.
//! Volume changes reach a running player through its JSON IPC socket.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::app::{FeedcastError, Result};
use crate::config::RadioConfig;
use crate::domain::{clamp_volume, DEFAULT_VOLUME};
use crate::radio::AudioOutput;

struct PlayerState {
    source: Option<String>,
    child: Option<Child>,
    volume: f32,
    /// Bumped on every spawn and pause so a startup check can tell it was overtaken.
    generation: u64,
}

pub struct MpvOutput {
    binary: String,
    grace: Duration,
    socket_path: PathBuf,
    state: Mutex<PlayerState>,
}

impl MpvOutput {
    pub fn new(binary: &str, grace: Duration) -> Self {
        Self {
            binary: binary.to_string(),
            grace,
            socket_path: std::env::temp_dir()
                .join(format!("feedcast-mpv-{}.sock", std::process::id())),
            state: Mutex::new(PlayerState {
                source: None,
                child: None,
                volume: DEFAULT_VOLUME,
                generation: 0,
            }),
        }
    }

    pub fn from_config(config: &RadioConfig) -> Self {
        Self::new(&config.player, Duration::from_millis(config.startup_grace_ms))
    }

    fn spawn(&self, source: &str, volume: f32) -> Result<Child> {
        Command::new(&self.binary)
            .arg("--no-video")
            .arg("--really-quiet")
            .arg(format!("--volume={}", volume_percent(volume)))
            .arg(format!("--input-ipc-server={}", self.socket_path.display()))
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                FeedcastError::MediaPlayback(format!("failed to start {}: {}", self.binary, e))
            })
    }

    #[cfg(unix)]
    async fn send_volume(&self, volume: f32) -> std::io::Result<()> {
        use serde_json::json;
        use tokio::io::AsyncWriteExt;
        use tokio::net::UnixStream;

        let mut stream = UnixStream::connect(&self.socket_path).await?;
        let mut line = json!({ "command": ["set_property", "volume", volume_percent(volume)] })
            .to_string();
        line.push('\n');
        stream.write_all(line.as_bytes()).await?;
        stream.flush().await
    }

    #[cfg(not(unix))]
    async fn send_volume(&self, _volume: f32) -> std::io::Result<()> {
        // Applied on the next start.
        Ok(())
    }
}

#[async_trait]
impl AudioOutput for MpvOutput {
    async fn set_source(&self, url: &str) {
        self.state.lock().await.source = Some(url.to_string());
    }

    async fn source(&self) -> Option<String> {
        self.state.lock().await.source.clone()
    }

    async fn play(&self) -> Result<()> {
        let generation = {
            let mut state = self.state.lock().await;
            let source = state
                .source
                .clone()
                .ok_or_else(|| FeedcastError::MediaPlayback("no source loaded".into()))?;

            if let Some(mut old) = state.child.take() {
                let _ = old.kill().await;
            }
            let _ = tokio::fs::remove_file(&self.socket_path).await;

            info!("mpv: starting {}", source);
            state.child = Some(self.spawn(&source, state.volume)?);
            state.generation += 1;
            state.generation
        };

        tokio::time::sleep(self.grace).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("mpv: start #{} overtaken", generation);
            return Err(FeedcastError::Cancelled);
        }

        let exited = match state.child.as_mut() {
            Some(child) => child.try_wait()?,
            None => return Err(FeedcastError::MediaPlayback("player stopped".into())),
        };
        match exited {
            None => Ok(()),
            Some(status) => {
                state.child = None;
                Err(FeedcastError::MediaPlayback(format!(
                    "player exited during startup ({})",
                    status
                )))
            }
        }
    }

    async fn pause(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        if let Some(mut child) = state.child.take() {
            debug!("mpv: stopping player");
            let _ = child.kill().await;
        }
    }

    async fn is_active(&self) -> bool {
        let mut state = self.state.lock().await;
        let running = match state.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => return false,
        };
        if !running {
            debug!("mpv: player exited");
            state.child = None;
        }
        running
    }

    async fn set_volume(&self, volume: f32) {
        let running = {
            let mut state = self.state.lock().await;
            state.volume = clamp_volume(volume);
            state.child.is_some()
        };
        if running {
            if let Err(e) = self.send_volume(volume).await {
                warn!("mpv: failed to apply volume: {}", e);
            }
        }
    }
}

fn volume_percent(volume: f32) -> i64 {
    (volume * 100.0).clamp(0.0, 100.0).round() as i64
}

use async_trait::async_trait;

use crate::app::Result;

/// The single audio output shared by every view.
///
/// `play` resolves once the stream has actually started, or fails with a
/// media playback error. `pause` keeps the loaded source so a later `play`
/// resumes it. A stream that ends on its own shows up through `is_active`.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    async fn set_source(&self, url: &str);

    async fn source(&self) -> Option<String>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self);

    /// Whether a started stream is still running.
    async fn is_active(&self) -> bool;

    async fn set_volume(&self, volume: f32);
}

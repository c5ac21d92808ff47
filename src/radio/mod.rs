//! Internet radio: station directory, audio output and the playback
//! controller that owns the shared session.

pub mod audio;
pub mod controller;
pub mod directory;
pub mod mpv;

pub use audio::AudioOutput;
pub use controller::PlaybackController;
pub use directory::{RadioBrowserClient, StationDirectory};
pub use mpv::MpvOutput;

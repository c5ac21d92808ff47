//! Configuration management for feedcast.
//!
//! Configuration is read from `~/.config/feedcast/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod presets;

pub use presets::FeedPreset;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::DEFAULT_VOLUME;
use crate::fetcher::DEFAULT_USER_AGENT;
use crate::normalizer::StripPolicy;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub radio: RadioConfig,
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Feed opened when no url or preset is given
    pub default_url: String,
    /// Items per page
    pub page_size: usize,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Fetch feeds through a relay endpoint (`<relay_url>?url=<feed>`)
    pub relay_url: Option<String>,
    pub strip_images: StripPolicy,
    pub presets: Vec<FeedPreset>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_url: presets::DEFAULT_FEED_URL.to_string(),
            page_size: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
            relay_url: None,
            strip_images: StripPolicy::default(),
            presets: presets::default_presets(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// Base URL of a radio-browser API mirror
    pub directory_url: String,
    /// Stations requested per directory fetch
    pub batch_size: usize,
    pub initial_volume: f32,
    /// Drop stations whose url was already loaded (first seen wins)
    pub dedupe: bool,
    /// Player binary used for audio output
    pub player: String,
    /// How long a freshly started stream must survive to count as playing
    pub startup_grace_ms: u64,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            directory_url: "https://de1.api.radio-browser.info".to_string(),
            batch_size: 50,
            initial_volume: DEFAULT_VOLUME,
            dedupe: true,
            player: "mpv".to_string(),
            startup_grace_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub bind: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path: `~/.config/feedcast/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("feedcast").join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.page_size == 0 {
            return Err(ConfigError::Invalid("feed.page_size must be at least 1".into()));
        }
        if self.radio.batch_size == 0 {
            return Err(ConfigError::Invalid("radio.batch_size must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.radio.initial_volume) {
            return Err(ConfigError::Invalid(
                "radio.initial_volume must be between 0.0 and 1.0".into(),
            ));
        }
        Ok(())
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# feedcast configuration

[feed]
# Feed shown when neither --url nor --preset is given
default_url = "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml"

# Items per page
page_size = 5

# Some feed servers reject default client identifiers
user_agent = "Mozilla/5.0"
timeout_secs = 10

# Fetch feeds through a relay (see `feedcast relay`)
# relay_url = "http://127.0.0.1:3000/api/rss"

# When to remove the first <img> from a description:
# "when-promoted" - only if it became the item image
# "always"        - even when the feed declares its own media
strip_images = "when-promoted"

[[feed.presets]]
label = "NY Times - Home Page"
url = "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml"

[[feed.presets]]
label = "BBC News"
url = "http://feeds.bbci.co.uk/news/rss.xml"

[[feed.presets]]
label = "CNN"
url = "http://rss.cnn.com/rss/edition.rss"

[radio]
# radio-browser mirror
directory_url = "https://de1.api.radio-browser.info"

# Stations per fetch; "more" appends another batch
batch_size = 50

initial_volume = 0.5

# Skip stations whose stream url is already in the list
dedupe = true

# Audio player binary (mpv)
player = "mpv"
startup_grace_ms = 1500

[relay]
bind = "127.0.0.1:3000"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.feed.page_size, 5);
        assert_eq!(config.feed.strip_images, StripPolicy::WhenPromoted);
        assert_eq!(config.feed.presets.len(), 3);
        assert_eq!(config.radio.batch_size, 50);
        assert!(config.radio.dedupe);
        assert_eq!(config.relay.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[feed]
page_size = 10
strip_images = "always"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.feed.page_size, 10);
        assert_eq!(config.feed.strip_images, StripPolicy::Always);
        // Defaults
        assert_eq!(config.feed.user_agent, "Mozilla/5.0");
        assert_eq!(config.feed.presets.len(), presets::default_presets().len());
        assert_eq!(config.radio.player, "mpv");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.feed.default_url, presets::DEFAULT_FEED_URL);
        assert_eq!(config.radio.initial_volume, DEFAULT_VOLUME);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[radio]\nbatch_size = 20\ndedupe = false\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.radio.batch_size, 20);
        assert!(!config.radio.dedupe);
    }

    #[test]
    fn test_load_from_rejects_zero_page_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[feed]\npage_size = 0\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[feed\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load_from(&dir.path().join("absent.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}

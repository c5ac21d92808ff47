use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::radio::{AudioOutput, MpvOutput, PlaybackController, RadioBrowserClient, StationDirectory};
use crate::reader::FeedReader;

pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub reader: Arc<FeedReader>,
    pub playback: Arc<PlaybackController>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::from_config(&config.feed)?);
        let directory: Arc<dyn StationDirectory> =
            Arc::new(RadioBrowserClient::from_config(&config.radio)?);
        let audio: Arc<dyn AudioOutput> = Arc::new(MpvOutput::from_config(&config.radio));

        Ok(Self::with_components(config, fetcher, directory, audio))
    }

    pub fn with_components(
        config: Config,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        directory: Arc<dyn StationDirectory>,
        audio: Arc<dyn AudioOutput>,
    ) -> Self {
        let normalizer = Normalizer::with_strip_policy(config.feed.strip_images);
        let reader = Arc::new(FeedReader::new(
            fetcher.clone(),
            normalizer,
            config.feed.page_size,
        ));
        let playback = Arc::new(PlaybackController::new(directory, audio, &config.radio));

        Self {
            config,
            fetcher,
            reader,
            playback,
        }
    }
}

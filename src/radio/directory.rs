use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::app::{FeedcastError, Result};
use crate::config::RadioConfig;
use crate::domain::RawStation;
use crate::fetcher::DEFAULT_USER_AGENT;

/// A source of station records, fetched in batches.
#[async_trait]
pub trait StationDirectory: Send + Sync {
    async fn fetch_stations(&self, offset: usize, limit: usize) -> Result<Vec<RawStation>>;
}

/// Client for the public radio-browser JSON API.
pub struct RadioBrowserClient {
    client: Client,
    base_url: Url,
}

impl RadioBrowserClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn from_config(config: &RadioConfig) -> Result<Self> {
        Self::new(&config.directory_url)
    }

    pub fn stations_url(&self, offset: usize, limit: usize) -> Result<Url> {
        let mut url = self.base_url.join("/json/stations")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        Ok(url)
    }
}

#[async_trait]
impl StationDirectory for RadioBrowserClient {
    async fn fetch_stations(&self, offset: usize, limit: usize) -> Result<Vec<RawStation>> {
        let url = self.stations_url(offset, limit)?;
        debug!("Fetching stations from {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedcastError::network(
                status.canonical_reason().unwrap_or("Unknown status"),
            ));
        }

        let body = response.text().await?;
        let stations: Vec<RawStation> = serde_json::from_str(&body)?;
        info!("Fetched {} station records (offset {})", stations.len(), offset);
        Ok(stations)
    }
}

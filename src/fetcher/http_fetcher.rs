use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::app::{FeedcastError, Result};
use crate::config::FeedConfig;
use crate::fetcher::{Fetcher, DEFAULT_USER_AGENT};

pub struct HttpFetcher {
    client: Client,
    relay: Option<Url>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_options(DEFAULT_USER_AGENT, Duration::from_secs(10), None)
    }

    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        let relay = config
            .relay_url
            .as_deref()
            .map(Url::parse)
            .transpose()?;
        Ok(Self::with_options(
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
            relay,
        ))
    }

    pub fn with_options(user_agent: &str, timeout: Duration, relay: Option<Url>) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .build()
            .expect("Failed to build HTTP client");

        Self { client, relay }
    }

    /// The URL actually requested for `url`: either `url` itself or the relay
    /// endpoint carrying it as the `url` query parameter.
    pub fn request_url(&self, url: &str) -> Result<Url> {
        match &self.relay {
            Some(relay) => {
                let mut target = relay.clone();
                target.query_pairs_mut().append_pair("url", url);
                Ok(target)
            }
            None => Ok(Url::parse(url)?),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let target = self.request_url(url)?;
        tracing::debug!("GET {}", target);

        let response = self.client.get(target).send().await?;
        let status = response.status();

        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(String::from)
                .unwrap_or_else(|| status.as_str().to_string());
            return Err(FeedcastError::network(status_text));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_direct() {
        let fetcher = HttpFetcher::new();
        let url = fetcher.request_url("https://example.com/feed.xml").unwrap();
        assert_eq!(url.as_str(), "https://example.com/feed.xml");
    }

    #[test]
    fn test_request_url_through_relay_encodes_target() {
        let relay = Url::parse("http://127.0.0.1:3000/api/rss").unwrap();
        let fetcher =
            HttpFetcher::with_options(DEFAULT_USER_AGENT, Duration::from_secs(5), Some(relay));
        let url = fetcher
            .request_url("https://example.com/feed.xml?a=1&b=2")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:3000/api/rss?url=https%3A%2F%2Fexample.com%2Ffeed.xml%3Fa%3D1%26b%3D2"
        );
    }

    #[test]
    fn test_request_url_rejects_garbage() {
        let fetcher = HttpFetcher::new();
        assert!(matches!(
            fetcher.request_url("not a url"),
            Err(FeedcastError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_network_error() {
        let fetcher = HttpFetcher::with_options(
            DEFAULT_USER_AGENT,
            Duration::from_millis(500),
            None,
        );
        let err = fetcher.fetch("http://127.0.0.1:1/feed.xml").await.unwrap_err();
        assert!(err.is_network());
    }
}

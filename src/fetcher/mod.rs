pub mod http_fetcher;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

/// Fixed client identifier; some feed servers reject default library agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

#[async_trait]
pub trait Fetcher {
    /// GET `url` and return the full response body as text.
    ///
    /// Non-2xx responses fail with [`FeedcastError::Network`](crate::app::FeedcastError::Network).
    async fn fetch(&self, url: &str) -> Result<String>;
}

//! The feed pipeline's store.
//!
//! [`FeedReader`] owns the selected feed url and page number and publishes a
//! read-only [`FeedView`] through a `watch` channel. Every command triggers a
//! full fetch → parse → normalize → slice. Each load carries a sequence number
//! and a cancellation token; starting a new load cancels the previous one and
//! any result that is no longer the latest is discarded.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::{FeedcastError, Result};
use crate::domain::FeedPage;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::pagination;
use crate::parser::FeedParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    Network,
    Parse,
    Other,
}

impl From<&FeedcastError> for FailureKind {
    fn from(err: &FeedcastError) -> Self {
        match err {
            e if e.is_network() => FailureKind::Network,
            FeedcastError::FeedParse(_) => FailureKind::Parse,
            _ => FailureKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed(FailureKind),
}

/// What views render. Errors only show up as [`LoadStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedView {
    pub url: Option<String>,
    pub status: LoadStatus,
    pub page: FeedPage,
}

impl Default for FeedView {
    fn default() -> Self {
        Self {
            url: None,
            status: LoadStatus::Idle,
            page: FeedPage::empty(),
        }
    }
}

struct ReaderState {
    url: Option<String>,
    page: usize,
    /// Page count from the last successful load.
    total_pages: Option<usize>,
    seq: u64,
    cancel: CancellationToken,
}

pub struct FeedReader {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    parser: FeedParser,
    normalizer: Normalizer,
    page_size: usize,
    state: Mutex<ReaderState>,
    view: watch::Sender<FeedView>,
}

impl FeedReader {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        normalizer: Normalizer,
        page_size: usize,
    ) -> Self {
        let (view, _) = watch::channel(FeedView::default());
        Self {
            fetcher,
            parser: FeedParser::new(),
            normalizer,
            page_size: page_size.max(1),
            state: Mutex::new(ReaderState {
                url: None,
                page: 1,
                total_pages: None,
                seq: 0,
                cancel: CancellationToken::new(),
            }),
            view,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> FeedView {
        self.view.borrow().clone()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Switch to `url` and load its first page.
    pub async fn select_feed(&self, url: &str) -> FeedView {
        self.load(url.trim().to_string(), 1).await
    }

    /// Load page `page_number` of the current feed, clamped to the page count
    /// of the last successful load.
    pub async fn set_page(&self, page_number: usize) -> FeedView {
        let (url, page) = {
            let state = self.lock();
            let page = match state.total_pages {
                Some(total) => pagination::clamp_page(page_number, total),
                None => page_number.max(1),
            };
            (state.url.clone(), page)
        };

        match url {
            Some(url) => self.load(url, page).await,
            None => {
                debug!("set_page({}) ignored: no feed selected", page_number);
                self.view()
            }
        }
    }

    pub async fn next_page(&self) -> FeedView {
        let page = self.lock().page;
        self.set_page(page.saturating_add(1)).await
    }

    pub async fn previous_page(&self) -> FeedView {
        let page = self.lock().page;
        self.set_page(page.saturating_sub(1)).await
    }

    /// Re-fetch the current page. No automatic retries happen elsewhere.
    pub async fn refresh(&self) -> FeedView {
        let page = self.lock().page;
        self.set_page(page).await
    }

    async fn load(&self, url: String, page: usize) -> FeedView {
        let (seq, cancel) = {
            let mut state = self.lock();
            state.cancel.cancel();
            state.cancel = CancellationToken::new();
            state.seq += 1;
            if state.url.as_deref() != Some(url.as_str()) {
                state.total_pages = None;
            }
            state.url = Some(url.clone());
            state.page = page;
            (state.seq, state.cancel.clone())
        };

        self.view.send_modify(|view| {
            view.url = Some(url.clone());
            view.status = LoadStatus::Loading;
        });

        let result = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Load #{} of {} superseded", seq, url);
                return self.view();
            }
            result = self.fetch_page(&url, page) => result,
        };

        let mut state = self.lock();
        if state.seq != seq {
            debug!("Discarding stale result #{} for {}", seq, url);
            return self.view();
        }

        let view = match result {
            Ok(feed_page) => {
                info!(
                    "Loaded {} (page {}/{}, {} items)",
                    url, feed_page.page_number, feed_page.total_pages, feed_page.total_items
                );
                state.page = feed_page.page_number;
                state.total_pages = Some(feed_page.total_pages);
                FeedView {
                    url: Some(url),
                    status: LoadStatus::Ready,
                    page: feed_page,
                }
            }
            Err(e) => {
                warn!("Failed to load {}: {}", url, e);
                state.total_pages = None;
                FeedView {
                    url: Some(url),
                    status: LoadStatus::Failed(FailureKind::from(&e)),
                    page: FeedPage {
                        page_number: page,
                        ..FeedPage::empty()
                    },
                }
            }
        };

        // Published under the state lock so a newer load cannot interleave.
        self.view.send_replace(view.clone());
        drop(state);
        view
    }

    async fn fetch_page(&self, url: &str, requested: usize) -> Result<FeedPage> {
        let body = self.fetcher.fetch(url).await?;
        let parsed = self.parser.parse(&body)?;
        let items = self.normalizer.normalize_all(parsed.items);

        let total_items = items.len();
        let total_pages = pagination::total_pages(total_items, self.page_size);
        let page_number = pagination::clamp_page(requested, total_pages);

        Ok(FeedPage {
            items: pagination::page(&items, page_number, self.page_size).to_vec(),
            page_number,
            total_pages,
            total_items,
            channel_title: parsed.title,
            channel_image_url: parsed.channel_image_url,
        })
    }

    fn lock(&self) -> MutexGuard<'_, ReaderState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

//! # Feedcast
//!
//! A paginated RSS/Atom reader and an internet radio player.
//!
//! ## Architecture
//!
//! Two independent pipelines, each with a single owned store that views
//! observe through `watch` channels:
//!
//! ```text
//! Fetcher → FeedParser → Normalizer → Paginator → FeedView
//! StationDirectory → PlaybackController → PlaybackSession
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Show the configured presets
//! feedcast feeds
//!
//! # Read page 2 of a preset
//! feedcast read --preset 2 --page 2
//!
//! # Play internet radio
//! feedcast radio --station 1
//!
//! # Serve the feed relay
//! feedcast relay --bind 127.0.0.1:3000
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the fetcher,
/// the feed reader and the playback controller.
pub mod app;

/// Command-line interface using clap.
///
/// - `feeds` - List feed presets
/// - `read [--url|--preset] [--page] [--open]` - Show a page of a feed
/// - `stations [--more]` - List directory stations
/// - `radio [--station]` - Interactive player
/// - `relay [--bind]` - Serve the feed relay
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/feedcast/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`FeedItem`](domain::FeedItem): display-ready feed entry
/// - [`FeedPage`](domain::FeedPage): one page plus paging metadata
/// - [`Station`](domain::Station): playable radio station
/// - [`PlaybackSession`](domain::PlaybackSession): shared playback record
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for feed fetching
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Item normalization: field fallbacks, image priority, date parsing.
pub mod normalizer;

/// Pure page slicing helpers.
pub mod pagination;

/// Tolerant RSS 2.0 / RSS 1.0 / Atom parsing into raw items.
pub mod parser;

/// Internet radio: directory client, audio output, playback controller.
pub mod radio;

/// The feed store: selected feed, page and published view.
pub mod reader;

/// `GET /api/rss?url=` relay endpoint built on axum.
pub mod relay;

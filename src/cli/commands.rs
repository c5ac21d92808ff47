use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::{AppContext, FeedcastError, Result};
use crate::config::presets::find_preset;
use crate::domain::{FeedItem, PlaybackSession, PlaybackState};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::reader::{FeedView, LoadStatus};
use crate::relay;

const SNIPPET_LEN: usize = 160;

pub fn list_feeds(ctx: &AppContext) -> Result<()> {
    let presets = &ctx.config.feed.presets;
    if presets.is_empty() {
        println!("No presets");
        return Ok(());
    }

    for (i, preset) in presets.iter().enumerate() {
        println!("{:>2}. {}\n    {}", i + 1, preset.label, preset.url);
    }
    Ok(())
}

/// Feed url from `--url`, `--preset` or the configured default.
pub fn resolve_feed_url(
    ctx: &AppContext,
    url: Option<&str>,
    preset: Option<&str>,
) -> Result<String> {
    if let Some(url) = url {
        return Ok(url.to_string());
    }
    match preset {
        Some(key) => find_preset(&ctx.config.feed.presets, key)
            .map(|p| p.url.clone())
            .ok_or_else(|| FeedcastError::Config(format!("Unknown preset: {}", key))),
        None => Ok(ctx.config.feed.default_url.clone()),
    }
}

pub async fn read_feed(
    ctx: &AppContext,
    url: Option<&str>,
    preset: Option<&str>,
    page: usize,
    open: Option<usize>,
) -> Result<()> {
    let url = resolve_feed_url(ctx, url, preset)?;

    let mut view = ctx.reader.select_feed(&url).await;
    if page != 1 && view.status == LoadStatus::Ready {
        view = ctx.reader.set_page(page).await;
    }
    print_view(&view);

    if let Some(n) = open {
        let item = n
            .checked_sub(1)
            .and_then(|i| view.page.items.get(i))
            .ok_or_else(|| FeedcastError::Other(format!("No item {} on this page", n)))?;
        println!("Opening {}", item.link);
        open::that(&item.link)?;
    }
    Ok(())
}

fn print_view(view: &FeedView) {
    match view.status {
        LoadStatus::Failed(kind) => {
            println!("Could not load feed ({:?} error)", kind);
            return;
        }
        LoadStatus::Idle | LoadStatus::Loading => {
            println!("Loading...");
            return;
        }
        LoadStatus::Ready => {}
    }

    let page = &view.page;
    if let Some(title) = &page.channel_title {
        println!("{}", title);
    }
    if let Some(image) = &page.channel_image_url {
        println!("  logo: {}", image);
    }
    if page.items.is_empty() {
        println!("No items");
        return;
    }

    println!(
        "Page {} of {} ({} items)\n",
        page.page_number, page.total_pages, page.total_items
    );
    for (i, item) in page.items.iter().enumerate() {
        print_item(i + 1, item);
    }

    let mut nav = Vec::new();
    if page.has_previous() {
        nav.push(format!("--page {}", page.page_number - 1));
    }
    if page.has_next() {
        nav.push(format!("--page {}", page.page_number + 1));
    }
    if !nav.is_empty() {
        println!("More: {}", nav.join(" | "));
    }
}

fn print_item(n: usize, item: &FeedItem) {
    println!("{}. {}", n, item.title);
    println!("   {} · {}", item.display_date(), item.creator);
    println!("   {}", item.link);
    if let Some(image) = &item.image_url {
        println!("   image: {}", image);
    }
    let snippet = snippet(item.display_description(), SNIPPET_LEN);
    if !snippet.is_empty() {
        println!("   {}", snippet);
    }
    println!();
}

/// Plain-text preview: tags dropped, whitespace collapsed, cut at `max` chars.
fn snippet(html: &str, max: usize) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.chars().count() <= max {
        return text;
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

pub async fn list_stations(ctx: &AppContext, more: usize) -> Result<()> {
    let count = ctx.playback.initialize().await;
    if count == 0 {
        println!("No stations available");
        return Ok(());
    }
    for _ in 0..more {
        if ctx.playback.fetch_more_stations().await == 0 {
            break;
        }
    }

    print_stations(&ctx.playback.session());
    Ok(())
}

fn print_stations(session: &PlaybackSession) {
    for (i, station) in session.stations.iter().enumerate() {
        let marker = if i == session.current_index && session.is_playing {
            "▶"
        } else {
            " "
        };
        println!("{} {:>3}. {} [{}]", marker, i + 1, station.name, station.country);
    }
}

fn print_status(session: &PlaybackSession) {
    let Some(station) = session.current_station() else {
        println!("No stations loaded");
        return;
    };
    let state = match session.state() {
        PlaybackState::Playing => "playing",
        _ if session.connecting => "connecting",
        _ => "stopped",
    };
    println!(
        "[{}/{}] {} ({}) - {} - volume {}%",
        session.current_index + 1,
        session.stations.len(),
        station.name,
        station.country,
        state,
        (session.volume * 100.0).round() as u32
    );
}

#[derive(Debug, Clone, PartialEq)]
pub enum RadioCommand {
    Play,
    Stop,
    Next,
    Previous,
    Select(usize),
    Volume(f32),
    More,
    List,
    Status,
    Help,
    Quit,
}

impl RadioCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let word = parts.next()?.to_ascii_lowercase();
        let arg = parts.next();

        let command = match word.as_str() {
            "play" => Self::Play,
            "stop" | "pause" => Self::Stop,
            "next" | "n" => Self::Next,
            "prev" | "previous" | "p" => Self::Previous,
            "more" => Self::More,
            "list" | "ls" => Self::List,
            "status" | "s" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            "vol" | "volume" => {
                let percent: f32 = arg?.parse().ok()?;
                Self::Volume(percent / 100.0)
            }
            n => Self::Select(n.parse::<usize>().ok()?.checked_sub(1)?),
        };
        Some(command)
    }
}

const RADIO_HELP: &str = "commands: play, stop, next, prev, <n> (select station), \
vol <0-100>, more, list, status, quit";

pub async fn run_radio(ctx: &AppContext, station: Option<usize>) -> Result<()> {
    let count = ctx.playback.initialize().await;
    if count == 0 {
        println!("No stations available");
        return Ok(());
    }
    println!("{} stations loaded. {}", count, RADIO_HELP);

    if let Some(n) = station {
        report(ctx.playback.change_station(n.saturating_sub(1)).await);
    }
    print_status(&ctx.playback.session());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = RadioCommand::parse(&line) else {
            if !line.trim().is_empty() {
                println!("{}", RADIO_HELP);
            }
            continue;
        };

        match command {
            RadioCommand::Play => report(ctx.playback.play().await),
            RadioCommand::Stop => ctx.playback.stop().await,
            RadioCommand::Next => report(ctx.playback.next_station().await),
            RadioCommand::Previous => report(ctx.playback.previous_station().await),
            RadioCommand::Select(index) => report(ctx.playback.select_station(index).await),
            RadioCommand::Volume(volume) => ctx.playback.set_volume(volume).await,
            RadioCommand::More => {
                let added = ctx.playback.fetch_more_stations().await;
                println!("Added {} stations", added);
            }
            RadioCommand::List => print_stations(&ctx.playback.session()),
            RadioCommand::Status => {}
            RadioCommand::Help => println!("{}", RADIO_HELP),
            RadioCommand::Quit => break,
        }
        ctx.playback.sync_output().await;
        print_status(&ctx.playback.session());
    }

    ctx.playback.shutdown().await;
    Ok(())
}

fn report(result: Result<()>) {
    match result {
        Ok(()) | Err(FeedcastError::Cancelled) => {}
        Err(e) => eprintln!("  ! {}", e),
    }
}

pub async fn run_relay(ctx: &AppContext, bind: Option<&str>) -> Result<()> {
    let bind = bind.unwrap_or(&ctx.config.relay.bind);
    let addr: SocketAddr = bind
        .parse()
        .map_err(|_| FeedcastError::Config(format!("Invalid bind address: {}", bind)))?;

    // Upstream requests go straight to the feed, never through another relay.
    let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::with_options(
        &ctx.config.feed.user_agent,
        Duration::from_secs(ctx.config.feed.timeout_secs),
        None,
    ));
    relay::serve(addr, fetcher).await
}

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "feedcast")]
#[command(about = "A paginated feed reader and internet radio player", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/feedcast/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the configured feed presets
    Feeds,
    /// Show one page of a feed
    Read {
        /// Feed URL (defaults to feed.default_url)
        #[arg(short, long, conflicts_with = "preset")]
        url: Option<String>,

        /// Preset number or label (see `feedcast feeds`)
        #[arg(short, long)]
        preset: Option<String>,

        /// Page number, clamped to the available pages
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Open item N of the page in the browser
        #[arg(long)]
        open: Option<usize>,
    },
    /// List stations from the radio directory
    Stations {
        /// Append this many extra batches
        #[arg(long, default_value_t = 0)]
        more: usize,
    },
    /// Interactive radio player
    Radio {
        /// Start playing station N right away
        #[arg(short, long)]
        station: Option<usize>,
    },
    /// Serve the feed relay endpoint
    Relay {
        /// Address to bind (defaults to relay.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

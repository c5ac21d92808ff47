use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedcast::app::AppContext;
use feedcast::cli::{commands, Cli, Commands};
use feedcast::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Feeds => {
            commands::list_feeds(&ctx)?;
        }
        Commands::Read {
            url,
            preset,
            page,
            open,
        } => {
            commands::read_feed(&ctx, url.as_deref(), preset.as_deref(), page, open).await?;
        }
        Commands::Stations { more } => {
            commands::list_stations(&ctx, more).await?;
        }
        Commands::Radio { station } => {
            commands::run_radio(&ctx, station).await?;
        }
        Commands::Relay { bind } => {
            commands::run_relay(&ctx, bind.as_deref()).await?;
        }
    }

    Ok(())
}

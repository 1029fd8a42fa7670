use std::sync::Arc;

use audiograb::{
    catalog::{SpotifyCatalog, YtDlpCatalog},
    config::Config,
    converter::Converter,
    downloader::{SpotdlFetcher, YtDlpFetcher},
    server::{self, AppState},
};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{filter::Builder as TracingFilterBuilder, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Err(e) if e.not_found() => {}
        Ok(_) => {}
        Err(e) => {
            panic!("Failed to load .env file: {}", e);
        }
    }

    init_log();

    let config = Config::from_env()?;
    let downloads_dir = config.ensure_downloads_dir()?;

    info!(?downloads_dir, "Starting audiograb...");

    let mut converter = Converter::new(
        &downloads_dir,
        Arc::new(YtDlpCatalog::new(&config.ytdlp_bin)),
        Arc::new(YtDlpFetcher::new(&config.ytdlp_bin)),
    );

    match &config.spotify {
        Some(credentials) => {
            converter = converter.with_spotify(
                Arc::new(SpotifyCatalog::new(credentials.clone())),
                Arc::new(SpotdlFetcher::new(&config.spotdl_bin, credentials.clone())),
            );
            info!("Spotify downloads enabled");
        }
        None => warn!("Spotify API credentials not set, Spotify links will be refused"),
    }

    let state = AppState {
        converter: Arc::new(converter),
        debug: config.debug,
        static_dir: config.static_dir(),
    };

    server::serve(config.bind_addr(), state).await
}

fn init_log() {
    tracing_subscriber::fmt()
        .with_ansi(true)
        .with_env_filter(
            TracingFilterBuilder::default()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .finish()
        .init();
}

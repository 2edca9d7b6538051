use anyhow::Result;
use log::info;
use std::sync::Arc;

use livegrid::config;
use livegrid::services::updates::{setup_live_updates, LiveUpdater};
use livegrid::store::StreamStore;
use livegrid::youtube::YouTubeClient;

#[tokio::main]
async fn main() -> Result<()> {
    config::load_environment();
    config::init_logger();

    let store = Arc::new(StreamStore::load(config::STREAMS_FILE.as_path())?);
    let source = Arc::new(YouTubeClient::new(config::YOUTUBE_API_KEY.clone()));
    let updater = Arc::new(LiveUpdater::new(store, source));

    let _scheduler = setup_live_updates(updater).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down.");
    Ok(())
}

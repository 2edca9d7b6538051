use env_logger::Builder;
use lazy_static::lazy_static;
use log::{info, LevelFilter};
use std::env;
use std::path::PathBuf;

lazy_static! {
    /// Optional so that the daemon can start without a key; refresh cycles
    /// then fail per-stream with a configuration error until one is set.
    pub static ref YOUTUBE_API_KEY: Option<String> = env::var("YOUTUBE_API_KEY").ok();
    pub static ref STATUS_CHECK_SCHEDULE: String =
        env::var("STATUS_CHECK_SCHEDULE").unwrap_or_else(|_| "0 * * * * *".to_string());
    pub static ref FALLBACK_REFRESH_SCHEDULE: String =
        env::var("FALLBACK_REFRESH_SCHEDULE").unwrap_or_else(|_| "0 */10 * * * *".to_string());
    pub static ref STREAMS_FILE: PathBuf = env::var("STREAMS_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_streams_file());
}

fn default_streams_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("livegrid")
        .join("streams.json")
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting livegrid...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::FileSystemStore;
use crate::services::StatsService;
use tracing::{info, Level};

mod config;
mod domain;
mod error;
mod infrastructure;
mod services;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new()?;

    let level = config.args.log_level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let output_dir = config.ensure_output_dir()?;
    let service = StatsService::new(config, FileSystemStore::new(output_dir));
    service.process().await?;

    info!("Scraping completed successfully!");
    Ok(())
}

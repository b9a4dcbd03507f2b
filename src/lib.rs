pub mod cli;
pub mod core;
pub mod providers;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::providers::YahooFxProvider;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Fetch,
    Analyze,
    Run,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxbrief starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let chart_cache = Arc::new(Cache::new());
    let provider = YahooFxProvider::new(config.providers.yahoo_base_url(), chart_cache);

    match command {
        AppCommand::Fetch => {
            cli::fetch::run(&config, &provider).await?;
        }
        AppCommand::Analyze => {
            cli::analyze::run(&config, &provider).await?;
        }
        AppCommand::Run => {
            cli::fetch::run(&config, &provider).await?;
            cli::analyze::run(&config, &provider).await?;
        }
    }
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;

use wallet_bot::api::BinanceClient;
use wallet_bot::bot::CommandInterpreter;
use wallet_bot::cli::Cli;
use wallet_bot::config::Config;
use wallet_bot::ledger::Ledger;
use wallet_bot::metrics;
use wallet_bot::storage::{FileSnapshotStore, SnapshotStore};
use wallet_bot::telegram::TelegramBot;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    wallet_bot::logging::init(cli.log_file.as_deref(), cli.debug)?;

    info!("Starting wallet bot...");

    // Load configuration
    let config_path = cli.config.unwrap_or_else(|| PathBuf::from("config/config.toml"));
    let config = match Config::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration from {:?}: {}", config_path, e);
            return Err(anyhow::anyhow!("Configuration loading failed: {}", e));
        }
    };
    info!("Configuration loaded successfully.");

    metrics::init()?;

    // The bot must not serve commands on top of a ledger it could not read.
    let store = Arc::new(FileSnapshotStore::new(&config.storage.db_file));
    let ledger = match store.load().await {
        Ok(Some(bytes)) => Ledger::from_snapshot(&bytes).map_err(|e| {
            error!("Can't parse snapshot {:?}: {}", store.path(), e);
            anyhow::anyhow!("Snapshot is unreadable: {}", e)
        })?,
        Ok(None) => Ledger::new(),
        Err(e) => {
            error!("Can't read snapshot {:?}: {}", store.path(), e);
            return Err(anyhow::anyhow!("Snapshot loading failed: {}", e));
        }
    };
    let ledger = Arc::new(ledger);
    info!("Ledger loaded with {} wallets.", ledger.user_count().await);

    let oracle = Arc::new(BinanceClient::new(&config.prices)?);
    let interpreter = Arc::new(CommandInterpreter::new(
        ledger,
        store,
        oracle,
        config.prices.local_currency.clone(),
    ));

    TelegramBot::new(config.telegram.bot_token.clone(), interpreter)
        .start()
        .await;

    info!("Telegram loop stopped.");
    match metrics::render() {
        Ok(report) => info!("Final metrics:\n{}", report),
        Err(e) => error!("Failed to render metrics: {}", e),
    }
    Ok(())
}

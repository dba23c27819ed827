use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use wallet_bot::api::PriceOracle;
use wallet_bot::bot::CommandInterpreter;
use wallet_bot::ledger::Ledger;
use wallet_bot::storage::{FileSnapshotStore, SnapshotStore};
use wallet_bot::{Error, Result};

// Prices keyed by currency; anything else is an invalid symbol
pub struct StaticOracle {
    pub prices: HashMap<String, f64>,
    pub rate: f64,
}

impl StaticOracle {
    pub fn new(rate: f64, prices: &[(&str, f64)]) -> Self {
        Self {
            prices: prices.iter().map(|(c, p)| (c.to_string(), *p)).collect(),
            rate,
        }
    }
}

#[async_trait]
impl PriceOracle for StaticOracle {
    async fn usd_price(&self, currency: &str) -> Result<f64> {
        self.prices
            .get(currency)
            .copied()
            .ok_or_else(|| Error::InvalidSymbol(format!("{}USDT", currency)))
    }

    async fn local_rate(&self) -> Result<f64> {
        Ok(self.rate)
    }
}

// Boots an interpreter the way main does: load the snapshot file if present
pub async fn boot(store: Arc<FileSnapshotStore>, oracle: Arc<dyn PriceOracle>) -> Result<CommandInterpreter> {
    let ledger = match store.load().await? {
        Some(bytes) => Ledger::from_snapshot(&bytes)?,
        None => Ledger::new(),
    };
    Ok(CommandInterpreter::new(Arc::new(ledger), store, oracle, "RUB"))
}

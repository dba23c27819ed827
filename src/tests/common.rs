use crate::api::PriceOracle;
use crate::error::{Error, Result};
use crate::storage::SnapshotStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

// In-memory snapshot store that records every save
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<Vec<u8>>>,
}

impl MemoryStore {
    pub fn saves(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Vec<u8>> {
        self.saved.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.last())
    }

    async fn save(&self, snapshot: &[u8]) -> Result<()> {
        self.saved.lock().unwrap().push(snapshot.to_vec());
        Ok(())
    }
}

// Store whose writes always fail, e.g. a full disk
#[derive(Debug)]
pub struct FailingStore;

#[async_trait]
impl SnapshotStore for FailingStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn save(&self, _snapshot: &[u8]) -> Result<()> {
        Err(Error::IoError(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
    }
}

// Fixed prices; unknown currencies fail like an invalid symbol would
#[derive(Debug, Clone)]
pub struct FakeOracle {
    prices: HashMap<String, f64>,
    rate: Option<f64>,
}

impl FakeOracle {
    pub fn new(rate: f64) -> Self {
        Self { prices: HashMap::new(), rate: Some(rate) }
    }

    pub fn failing_rate() -> Self {
        Self { prices: HashMap::new(), rate: None }
    }

    pub fn with_price(mut self, currency: &str, price: f64) -> Self {
        self.prices.insert(currency.to_string(), price);
        self
    }
}

#[async_trait]
impl PriceOracle for FakeOracle {
    async fn usd_price(&self, currency: &str) -> Result<f64> {
        self.prices
            .get(currency)
            .copied()
            .ok_or_else(|| Error::InvalidSymbol(format!("{}USDT", currency)))
    }

    async fn local_rate(&self) -> Result<f64> {
        self.rate.ok_or_else(|| Error::NetworkError("connection reset".to_string()))
    }
}

use crate::error::Result;
use async_trait::async_trait;

pub mod binance;
pub mod types;

pub use binance::BinanceClient;

/// Source of prices for wallet valuation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// USD price of one unit of `currency`.
    async fn usd_price(&self, currency: &str) -> Result<f64>;

    /// Units of the local currency per one USD.
    async fn local_rate(&self) -> Result<f64>;
}

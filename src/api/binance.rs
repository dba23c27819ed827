use crate::api::types::TickerPrice;
use crate::api::PriceOracle;
use crate::config::PriceConfig;
use crate::error::{Error, Result};
use crate::metrics::PRICE_LOOKUP_LATENCY;
use crate::utils::Cache;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

const TICKER_ENDPOINT: &str = "api/v3/ticker/price";

/// Price oracle backed by the Binance public ticker endpoint.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    quote_asset: String,
    local_pair: String,
    cache: Cache<f64>,
}

impl BinanceClient {
    pub fn new(config: &PriceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            quote_asset: config.quote_asset.clone(),
            local_pair: config.local_pair.clone(),
            cache: Cache::new(Duration::from_secs(config.cache_ttl_secs)),
        })
    }

    /// Trading pair used to price `currency`, e.g. `btc` -> `BTCUSDT`.
    pub fn pair_for(&self, currency: &str) -> String {
        format!("{}{}", currency.to_uppercase(), self.quote_asset)
    }

    pub async fn ticker_price(&self, pair: &str) -> Result<f64> {
        if let Some(price) = self.cache.get(pair).await {
            debug!("Using cached price for {}: {}", pair, price);
            return Ok(price);
        }

        let url = format!("{}/{}", self.base_url, TICKER_ENDPOINT);
        let timer = PRICE_LOOKUP_LATENCY.start_timer();
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", pair)])
            .send()
            .await
            .map_err(|e| Error::NetworkError(format!("Ticker request for {} failed: {}", pair, e)))?;

        // Unknown symbols come back as HTTP 400 with a JSON error body, so the
        // body is decoded whatever the status.
        let status = response.status();
        let ticker: TickerPrice = response
            .json()
            .await
            .map_err(|e| Error::ApiInvalidFormat(format!("Ticker response for {} ({}): {}", pair, status, e)))?;
        timer.observe_duration();

        let price = ticker.into_price(pair).map_err(|e| {
            warn!("Price lookup for {} failed with status {}: {}", pair, status, e);
            e
        })?;
        self.cache.set(pair.to_string(), price).await;
        Ok(price)
    }
}

#[async_trait]
impl PriceOracle for BinanceClient {
    async fn usd_price(&self, currency: &str) -> Result<f64> {
        if currency.eq_ignore_ascii_case(&self.quote_asset) {
            return Ok(1.0);
        }
        let pair = self.pair_for(currency);
        self.ticker_price(&pair).await
    }

    async fn local_rate(&self) -> Result<f64> {
        self.ticker_price(&self.local_pair).await
    }
}

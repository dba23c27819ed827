use serde::{Deserialize, Serialize};
use crate::error::{Result, Error};

/// Body of `GET /api/v3/ticker/price`.
///
/// A valid pair yields `{"symbol": "BTCUSDT", "price": "30000.00"}`; an
/// unknown one yields `{"code": -1121, "msg": "Invalid symbol."}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickerPrice {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
}

impl TickerPrice {
    pub fn into_price(self, pair: &str) -> Result<f64> {
        if self.code != 0 {
            return Err(Error::InvalidSymbol(format!(
                "{} (code {}: {})",
                pair,
                self.code,
                self.msg.unwrap_or_default()
            )));
        }

        let raw = self
            .price
            .ok_or_else(|| Error::ApiInvalidData(format!("Missing price for {}", pair)))?;
        let price: f64 = raw
            .parse()
            .map_err(|_| Error::ApiInvalidFormat(format!("Price {:?} for {} is not a number", raw, pair)))?;

        if !price.is_finite() || price < 0.0 {
            return Err(Error::ApiInvalidData(format!("Invalid price for {}: {}", pair, price)));
        }
        Ok(price)
    }
}

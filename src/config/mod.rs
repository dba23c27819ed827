use serde::{Deserialize, Serialize};
use std::path::Path;
use std::fs;
use anyhow::Result;
use crate::validation::validate_bot_token;

const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
const DB_FILE_ENV: &str = "WALLET_DB_FILE";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub storage: StorageConfig,
    pub prices: PriceConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_file: "db.json".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PriceConfig {
    pub base_url: String,
    /// USD-pegged asset that forms price pairs, `BTC` + `USDT`.
    pub quote_asset: String,
    /// Pair whose price is the USD -> local currency rate.
    pub local_pair: String,
    /// Label of the local currency in reports.
    pub local_currency: String,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            quote_asset: "USDT".to_string(),
            local_pair: "USDTRUB".to_string(),
            local_currency: "RUB".to_string(),
            cache_ttl_secs: 30,
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Reads the TOML file, applies environment overrides and validates.
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&config_str)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(BOT_TOKEN_ENV) {
            self.telegram.bot_token = token;
        }
        if let Ok(db_file) = std::env::var(DB_FILE_ENV) {
            self.storage.db_file = db_file;
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bot_token(&self.telegram.bot_token)?;
        if self.storage.db_file.trim().is_empty() {
            anyhow::bail!("storage.db_file cannot be empty");
        }
        if self.prices.base_url.trim().is_empty() {
            anyhow::bail!("prices.base_url cannot be empty");
        }
        if self.prices.quote_asset.is_empty() || self.prices.local_pair.is_empty() {
            anyhow::bail!("prices.quote_asset and prices.local_pair must be set");
        }
        if self.prices.local_currency.is_empty() {
            anyhow::bail!("prices.local_currency cannot be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_minimal_config_uses_defaults() -> Result<()> {
        let config: Config = toml::from_str("[telegram]\nbot_token = \"123:abc\"\n")?;
        config.validate()?;
        assert_eq!(config.storage.db_file, "db.json");
        assert_eq!(config.prices.quote_asset, "USDT");
        assert_eq!(config.prices.local_pair, "USDTRUB");
        assert_eq!(config.prices.cache_ttl_secs, 30);
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let temp_dir = tempdir()?;
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.telegram.bot_token = "123:abc".to_string();
        config.storage.db_file = "/var/lib/wallet/db.json".to_string();
        config.prices.local_currency = "EUR".to_string();
        config.prices.local_pair = "EURUSDT".to_string();
        config.save(&path)?;

        let loaded = Config::load(&path)?;
        assert_eq!(loaded.prices.local_currency, "EUR");
        assert_eq!(loaded.prices.local_pair, "EURUSDT");
        Ok(())
    }

    #[test]
    fn test_validation_rejects_missing_token() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.telegram.bot_token = "123:abc".to_string();
        config.storage.db_file = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::load(Path::new("/nonexistent/config.toml")).is_err());
    }
}

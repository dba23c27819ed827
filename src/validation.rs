use crate::error::{Result, Error};

pub fn validate_bot_token(token: &str) -> Result<()> {
    if token.trim().is_empty() {
        return Err(Error::ConfigError("Telegram bot token cannot be empty".to_string()));
    }
    if !token.contains(':') {
        return Err(Error::ConfigError("Telegram bot token must look like <id>:<secret>".to_string()));
    }
    Ok(())
}

pub fn validate_currency(currency: &str) -> Result<()> {
    if currency.is_empty() {
        return Err(Error::ValidationError("Currency cannot be empty".to_string()));
    }
    Ok(())
}

/// Parses a user supplied amount. `inf` and `NaN` parse as floats but are
/// not amounts.
pub fn parse_amount(raw: &str) -> Result<f64> {
    let amount: f64 = raw
        .parse()
        .map_err(|e| Error::ValidationError(format!("Invalid amount {:?}: {}", raw, e)))?;
    if !amount.is_finite() {
        return Err(Error::ValidationError(format!("Amount {:?} is not finite", raw)));
    }
    Ok(amount)
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::RwLock;
use crate::error::Result;

/// Telegram chat id of the wallet owner.
pub type UserId = i64;

/// Rejected mutations. `Display` is the text shown to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Currency cannot be empty")]
    EmptyCurrency,
    #[error("Could not read the amount")]
    InvalidAmount,
    #[error("Currency cannot be negative")]
    NonPositiveAmount,
    #[error("Currency cannot be negative")]
    NegativeBalance { balance: f64 },
    #[error("Balance is lower than the amount to subtract, please change the amount")]
    InsufficientBalance { balance: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wallet {
    balances: BTreeMap<String, f64>,
}

impl Wallet {
    /// Balance of `currency`, zero when the wallet does not hold it.
    pub fn balance(&self, currency: &str) -> f64 {
        self.balances.get(currency).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, currency: &str) -> bool {
        self.balances.contains_key(currency)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.balances.iter().map(|(currency, amount)| (currency.as_str(), *amount))
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

/// All wallets of all users.
///
/// Every mutation runs its read-modify-write under one write guard, so
/// concurrent commands from different chats never interleave on a balance.
#[derive(Debug, Default)]
pub struct Ledger {
    wallets: RwLock<BTreeMap<UserId, Wallet>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from bytes produced by [`Ledger::snapshot`].
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self> {
        let wallets: BTreeMap<UserId, Wallet> = serde_json::from_slice(bytes)?;
        Ok(Self {
            wallets: RwLock::new(wallets),
        })
    }

    /// Serializes the whole ledger as a JSON object keyed by user id.
    pub async fn snapshot(&self) -> Result<Vec<u8>> {
        let wallets = self.wallets.read().await;
        Ok(serde_json::to_vec_pretty(&*wallets)?)
    }

    /// Replaces the in-memory state with a snapshot. On error the current
    /// state is kept.
    pub async fn restore(&self, bytes: &[u8]) -> Result<()> {
        let restored: BTreeMap<UserId, Wallet> = serde_json::from_slice(bytes)?;
        *self.wallets.write().await = restored;
        Ok(())
    }

    pub async fn get_wallet(&self, user: UserId) -> Wallet {
        let mut wallets = self.wallets.write().await;
        wallets.entry(user).or_default().clone()
    }

    /// Read-only view of a user's wallet; unknown users get an empty one
    /// without being added to the ledger.
    pub async fn wallet(&self, user: UserId) -> Wallet {
        self.wallets.read().await.get(&user).cloned().unwrap_or_default()
    }

    pub async fn add(&self, user: UserId, currency: &str, amount: f64) -> std::result::Result<f64, LedgerError> {
        validate_input(currency, amount)?;

        let mut wallets = self.wallets.write().await;
        let current = wallets.get(&user).map(|w| w.balance(currency)).unwrap_or(0.0);
        let balance = current + amount;
        // JSON has no infinity; an overflowed balance would make the snapshot unloadable.
        if !balance.is_finite() {
            return Err(LedgerError::InvalidAmount);
        }
        if balance < 0.0 {
            return Err(LedgerError::NegativeBalance { balance: current });
        }
        wallets
            .entry(user)
            .or_default()
            .balances
            .insert(currency.to_string(), balance);
        Ok(balance)
    }

    /// Succeeds only when `0 < amount < balance`; a balance can not be taken
    /// to exactly zero this way.
    pub async fn subtract(&self, user: UserId, currency: &str, amount: f64) -> std::result::Result<f64, LedgerError> {
        validate_input(currency, amount)?;
        if amount <= 0.0 {
            return Err(LedgerError::NonPositiveAmount);
        }

        let mut wallets = self.wallets.write().await;
        let current = wallets.get(&user).map(|w| w.balance(currency)).unwrap_or(0.0);
        if current <= amount {
            return Err(LedgerError::InsufficientBalance { balance: current });
        }

        let balance = current - amount;
        wallets
            .entry(user)
            .or_default()
            .balances
            .insert(currency.to_string(), balance);
        Ok(balance)
    }

    /// Returns whether the currency was held.
    pub async fn delete(&self, user: UserId, currency: &str) -> bool {
        let mut wallets = self.wallets.write().await;
        wallets
            .get_mut(&user)
            .map(|wallet| wallet.balances.remove(currency).is_some())
            .unwrap_or(false)
    }

    pub async fn user_count(&self) -> usize {
        self.wallets.read().await.len()
    }
}

fn validate_input(currency: &str, amount: f64) -> std::result::Result<(), LedgerError> {
    if currency.is_empty() {
        return Err(LedgerError::EmptyCurrency);
    }
    if !amount.is_finite() {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(())
}

use crate::api::PriceOracle;
use crate::commands::{Command, UNKNOWN_COMMAND_REPLY};
use crate::error::{Error, Result};
use crate::ledger::{Ledger, LedgerError, UserId};
use crate::metrics::{COMMANDS, PRICE_LOOKUP_ERRORS, SNAPSHOT_WRITES};
use crate::storage::SnapshotStore;
use futures::future::join_all;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

const DELETED_REPLY: &str = "Currency deleted";

/// Text to send back to the chat.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    /// Whether the command changed the ledger and a snapshot was written.
    pub persisted: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), persisted: false }
    }

    fn persisted(text: impl Into<String>) -> Self {
        Self { text: text.into(), persisted: true }
    }
}

/// Executes chat commands against the ledger.
///
/// Mutations are written through to the snapshot store before the reply is
/// produced. Invalid input and price feed failures become replies; only a
/// failed snapshot write is returned as an error.
pub struct CommandInterpreter {
    ledger: Arc<Ledger>,
    store: Arc<dyn SnapshotStore>,
    oracle: Arc<dyn PriceOracle>,
    local_currency: String,
    persist_lock: Mutex<()>,
}

impl CommandInterpreter {
    pub fn new(
        ledger: Arc<Ledger>,
        store: Arc<dyn SnapshotStore>,
        oracle: Arc<dyn PriceOracle>,
        local_currency: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            store,
            oracle,
            local_currency: local_currency.into(),
            persist_lock: Mutex::new(()),
        }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub async fn handle(&self, user: UserId, text: &str) -> Result<Reply> {
        let command = match Command::parse(text) {
            Ok(command) => command,
            Err(e) => {
                warn!("Rejected input from {}: {:?}", user, e);
                COMMANDS.with_label_values(&["invalid"]).inc();
                return Ok(Reply::text(e.to_string()));
            }
        };
        COMMANDS.with_label_values(&[command.name()]).inc();

        let mutating = command.is_mutating();
        let reply = match command {
            Command::Add { currency, amount } => {
                let result = self.ledger.add(user, &currency, amount).await;
                self.apply(user, &currency, result).await?
            }
            Command::Subtract { currency, amount } => {
                let result = self.ledger.subtract(user, &currency, amount).await;
                self.apply(user, &currency, result).await?
            }
            Command::Delete { currency } => {
                let removed = self.ledger.delete(user, &currency).await;
                info!("User {} deleted {} (held: {})", user, currency, removed);
                self.persist().await?;
                Reply::persisted(DELETED_REPLY)
            }
            Command::Show => Reply::text(self.report(user).await),
            Command::Unknown => Reply::text(UNKNOWN_COMMAND_REPLY),
        };

        if mutating && !reply.persisted {
            info!("Command from {} left the ledger unchanged", user);
        }
        Ok(reply)
    }

    async fn apply(
        &self,
        user: UserId,
        currency: &str,
        result: std::result::Result<f64, LedgerError>,
    ) -> Result<Reply> {
        match result {
            Ok(balance) => {
                info!("User {} balance of {} is now {}", user, currency, balance);
                self.persist().await?;
                Ok(Reply::persisted(balance_message(currency, balance)))
            }
            Err(e) => {
                warn!("Rejected mutation of {} for {}: {:?}", currency, user, e);
                Ok(Reply::text(e.to_string()))
            }
        }
    }

    /// Writes the full ledger. The snapshot is taken under the lock so the
    /// last write always contains every completed mutation.
    async fn persist(&self) -> Result<()> {
        let _guard = self.persist_lock.lock().await;
        let snapshot = self
            .ledger
            .snapshot()
            .await
            .map_err(|e| Error::PersistenceError(format!("Failed to serialize ledger: {}", e)))?;
        self.store
            .save(&snapshot)
            .await
            .map_err(|e| Error::PersistenceError(format!("Failed to write snapshot: {}", e)))?;
        SNAPSHOT_WRITES.inc();
        Ok(())
    }

    /// Values the wallet in USD and the local currency. Failed lookups are
    /// flagged in the report and count as zero.
    async fn report(&self, user: UserId) -> String {
        let wallet = self.ledger.wallet(user).await;
        let mut lines = vec![String::from("Balance:")];

        let (rate, prices) = if wallet.is_empty() {
            (Ok(0.0), Vec::new())
        } else {
            let lookups = wallet.iter().map(|(currency, _)| self.oracle.usd_price(currency));
            tokio::join!(self.oracle.local_rate(), join_all(lookups))
        };

        let rate = rate.unwrap_or_else(|e| {
            warn!("Could not determine the {} rate: {}", self.local_currency, e);
            PRICE_LOOKUP_ERRORS.inc();
            lines.push(format!("Could not determine the {} rate", self.local_currency));
            0.0
        });

        let mut usd_total = 0.0;
        for ((currency, amount), price) in wallet.iter().zip(prices) {
            match price {
                Ok(price) => {
                    let usd = amount * price;
                    usd_total += usd;
                    lines.push(format!(
                        "{}: {:.2} [{:.2} USD] [{:.2} {}]",
                        currency,
                        amount,
                        usd,
                        usd * rate,
                        self.local_currency
                    ));
                }
                Err(e) => {
                    warn!("Could not determine price of {}: {}", currency, e);
                    PRICE_LOOKUP_ERRORS.inc();
                    lines.push(format!("{}: {:.2} [could not determine price]", currency, amount));
                }
            }
        }

        lines.push(format!("Total USD: {:.2}", usd_total));
        lines.push(format!("Total {}: {:.2}", self.local_currency, usd_total * rate));
        lines.join("\n")
    }
}

fn balance_message(currency: &str, balance: f64) -> String {
    format!("Balance: {} {:.6}", currency, balance)
}

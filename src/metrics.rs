use prometheus::{Encoder, Histogram, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use lazy_static::lazy_static;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref COMMANDS: IntCounterVec = IntCounterVec::new(
        Opts::new("wallet_commands_total", "Total number of handled chat commands"),
        &["command"]
    ).expect("valid metric definition");

    pub static ref PRICE_LOOKUP_ERRORS: IntCounter = IntCounter::new(
        "wallet_price_lookup_errors_total",
        "Total number of failed price lookups"
    ).expect("valid metric definition");

    pub static ref SNAPSHOT_WRITES: IntCounter = IntCounter::new(
        "wallet_snapshot_writes_total",
        "Total number of ledger snapshots written"
    ).expect("valid metric definition");

    pub static ref PRICE_LOOKUP_LATENCY: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "wallet_price_lookup_seconds",
            "Price feed request latency in seconds"
        ).buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0])
    ).expect("valid metric definition");
}

pub fn init() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(COMMANDS.clone()))?;
    REGISTRY.register(Box::new(PRICE_LOOKUP_ERRORS.clone()))?;
    REGISTRY.register(Box::new(SNAPSHOT_WRITES.clone()))?;
    REGISTRY.register(Box::new(PRICE_LOOKUP_LATENCY.clone()))?;
    Ok(())
}

/// Text exposition of everything registered in [`REGISTRY`].
pub fn render() -> Result<String, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

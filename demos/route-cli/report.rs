//! CSV report of routed trades.

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use stream_router::errors::Result;
use stream_router::Trade;

/// One CSV row per trade.
#[derive(Debug, Clone, Serialize)]
pub struct TradeRecord {
    pub timestamp: DateTime<Utc>,
    pub trade_type: String,
    pub input: String,
    pub output: String,
    pub input_with_gas: String,
    pub output_with_gas: String,
    pub gas_estimate: u64,
    pub gas_cost_in_quote: String,
    pub routes: usize,
    /// Routes as `percent% SYM>SYM>SYM`, separated by `|`
    pub paths: String,
}

impl TradeRecord {
    pub fn new(trade: &Trade) -> Self {
        let paths = trade
            .routes
            .iter()
            .map(|route| {
                let symbols: Vec<&str> = route.path.iter().map(|currency| currency.symbol()).collect();
                format!("{:.2}% {}", route.percent(), symbols.join(">"))
            })
            .collect::<Vec<_>>()
            .join("|");

        Self {
            timestamp: Utc::now(),
            trade_type: trade.trade_type.to_string(),
            input: trade.input_amount.to_string(),
            output: trade.output_amount.to_string(),
            input_with_gas: trade.input_amount_with_gas_adjusted.to_string(),
            output_with_gas: trade.output_amount_with_gas_adjusted.to_string(),
            gas_estimate: trade.gas_estimate,
            gas_cost_in_quote: trade.gas_cost_in_quote.to_string(),
            routes: trade.routes.len(),
            paths,
        }
    }
}

/// Append `record` to the CSV file at `path`, writing a header for a new file.
pub fn append(path: &Path, record: &TradeRecord) -> Result<()> {
    let write_header = std::fs::metadata(path).map(|meta| meta.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(file);
    writer
        .serialize(record)
        .map_err(|e| anyhow::anyhow!("Failed to write trade record: {}", e))?;
    writer.flush()?;

    tracing::info!(path = %path.display(), "Trade appended to CSV report");
    Ok(())
}

//! Trade history CSV log
//!
//! Append-only record of every executed strategy run. The file is created
//! with a header row on first use; each run appends exactly one row and
//! never reads back. Column order is fixed and positional; consumers must
//! not reorder. There is no locking: at most one strategy process runs at
//! a time.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fs::OpenOptions;
use std::path::Path;

/// Default history file, relative to the working directory
pub const DEFAULT_HISTORY_FILE: &str = "history.csv";

/// Fixed column order of the history file
pub const HISTORY_HEADER: &[&str] = &[
    "datetime_utc",
    "action",
    "symbol",
    "base_currency",
    "base_amount",
    "btc_qty",
    "avg_price",
    "fee",
    "dip_price",
    "dip_qty",
    "base_before",
    "base_after",
    "btc_before",
    "btc_after",
];

/// One executed strategy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRecord {
    pub datetime_utc: DateTime<Utc>,
    pub action: String,
    pub symbol: String,
    pub base_currency: String,
    pub base_amount: Decimal,
    pub btc_qty: Decimal,
    /// Average fill price; empty column when nothing filled
    pub avg_price: Option<Decimal>,
    pub fee: Decimal,
    /// Dip limit order price; empty for plain DCA runs
    pub dip_price: Option<Decimal>,
    /// Dip limit order quantity; empty for plain DCA runs
    pub dip_qty: Option<Decimal>,
    pub base_before: Decimal,
    pub base_after: Decimal,
    pub btc_before: Decimal,
    pub btc_after: Decimal,
}

impl TradeRecord {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.datetime_utc.to_rfc3339(),
            self.action.clone(),
            self.symbol.clone(),
            self.base_currency.clone(),
            self.base_amount.to_string(),
            self.btc_qty.to_string(),
            opt_to_string(self.avg_price),
            self.fee.to_string(),
            opt_to_string(self.dip_price),
            opt_to_string(self.dip_qty),
            self.base_before.to_string(),
            self.base_after.to_string(),
            self.btc_before.to_string(),
            self.btc_after.to_string(),
        ]
    }
}

fn opt_to_string(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_decimal(record: &csv::StringRecord, idx: usize, name: &str) -> Result<Decimal> {
    record
        .get(idx)
        .with_context(|| format!("Missing {} column", name))?
        .parse()
        .with_context(|| format!("Failed to parse {}", name))
}

fn parse_opt_decimal(record: &csv::StringRecord, idx: usize, name: &str) -> Result<Option<Decimal>> {
    match record.get(idx) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .with_context(|| format!("Failed to parse {}", name)),
    }
}

/// Append one trade to the history file, creating it with a header row
/// when absent.
pub fn append_trade(path: impl AsRef<Path>, record: &TradeRecord) -> Result<()> {
    let path = path.as_ref();
    let is_new = !path.exists();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open history file {:?}", path))?;

    let mut writer = csv::Writer::from_writer(file);

    if is_new {
        writer
            .write_record(HISTORY_HEADER)
            .context("Failed to write history header")?;
    }

    writer
        .write_record(&record.to_row())
        .context("Failed to write history row")?;
    writer.flush().context("Failed to flush history file")?;

    Ok(())
}

/// Load all recorded trades, in insertion order
pub fn load_history(path: impl AsRef<Path>) -> Result<Vec<TradeRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open history file {:?}", path))?;

    let mut records = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let datetime_utc = record
            .get(0)
            .context("Missing datetime_utc column")?
            .parse::<DateTime<Utc>>()
            .context("Failed to parse datetime_utc")?;

        records.push(TradeRecord {
            datetime_utc,
            action: record.get(1).context("Missing action column")?.to_string(),
            symbol: record.get(2).context("Missing symbol column")?.to_string(),
            base_currency: record
                .get(3)
                .context("Missing base_currency column")?
                .to_string(),
            base_amount: parse_decimal(&record, 4, "base_amount")?,
            btc_qty: parse_decimal(&record, 5, "btc_qty")?,
            avg_price: parse_opt_decimal(&record, 6, "avg_price")?,
            fee: parse_decimal(&record, 7, "fee")?,
            dip_price: parse_opt_decimal(&record, 8, "dip_price")?,
            dip_qty: parse_opt_decimal(&record, 9, "dip_qty")?,
            base_before: parse_decimal(&record, 10, "base_before")?,
            base_after: parse_decimal(&record, 11, "base_after")?,
            btc_before: parse_decimal(&record, 12, "btc_before")?,
            btc_after: parse_decimal(&record, 13, "btc_after")?,
        });
    }

    Ok(records)
}

/// Running totals over the whole history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryTotals {
    pub total_spent: Decimal,
    pub total_qty: Decimal,
    pub total_fees: Decimal,
}

impl HistoryTotals {
    pub fn from_records(records: &[TradeRecord]) -> Self {
        let mut totals = HistoryTotals::default();
        for record in records {
            totals.total_spent += record.base_amount;
            totals.total_qty += record.btc_qty;
            totals.total_fees += record.fee;
        }
        totals
    }

    /// Overall average buy price; `None` before the first fill
    pub fn average_price(&self) -> Option<Decimal> {
        if self.total_qty > Decimal::ZERO {
            Some(self.total_spent / self.total_qty)
        } else {
            None
        }
    }
}

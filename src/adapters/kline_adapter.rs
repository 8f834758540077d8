//! Saved exchange kline responses as a price source.
//!
//! Each file holds the raw klines body: an array of arrays where the first
//! six entries are `open_time` (ms since epoch), then open, high, low, close
//! and volume as decimal strings. Trailing fields are ignored.

use crate::adapters::csv_adapter::{list_with_suffix, within_dates};
use crate::domain::error::TraderError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

pub struct KlineFileAdapter {
    base_path: PathBuf,
}

impl KlineFileAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn json_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.json", symbol.to_uppercase(), interval))
    }
}

fn decimal(row: &[Value], index: usize, name: &str) -> Result<f64, TraderError> {
    let value = row.get(index).ok_or_else(|| TraderError::Data {
        reason: format!("kline missing {} field", name),
    })?;
    let parsed = match value {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).ok_or_else(|| TraderError::Data {
        reason: format!("invalid {} value: {}", name, value),
    })
}

pub fn decode_klines(body: &str) -> Result<Vec<PricePoint>, TraderError> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body).map_err(|e| TraderError::Data {
        reason: format!("failed to parse klines: {}", e),
    })?;

    let mut points = rows
        .iter()
        .map(|row| {
            let open_time = row
                .first()
                .and_then(Value::as_i64)
                .ok_or_else(|| TraderError::Data {
                    reason: "kline missing open_time".into(),
                })?;
            let timestamp =
                DateTime::from_timestamp_millis(open_time).ok_or_else(|| TraderError::Data {
                    reason: format!("open_time {} out of range", open_time),
                })?;
            Ok(PricePoint {
                timestamp,
                open: decimal(row, 1, "open")?,
                high: decimal(row, 2, "high")?,
                low: decimal(row, 3, "low")?,
                close: decimal(row, 4, "close")?,
                volume: decimal(row, 5, "volume")?,
            })
        })
        .collect::<Result<Vec<_>, TraderError>>()?;

    points.sort_by_key(|p| p.timestamp);
    Ok(points)
}

impl DataPort for KlineFileAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        interval: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TraderError> {
        let path = self.json_path(symbol, interval);
        let body = fs::read_to_string(&path).map_err(|e| TraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let points = decode_klines(&body)?
            .into_iter()
            .filter(|p| within_dates(p, start_date, end_date))
            .collect();
        PriceSeries::new(points)
    }

    fn list_symbols(&self, interval: &str) -> Result<Vec<String>, TraderError> {
        list_with_suffix(&self.base_path, &format!("_{}.json", interval))
    }
}

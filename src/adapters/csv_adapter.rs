//! CSV file price adapter and ledger export.

use crate::domain::error::TraderError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::domain::trade::TradeLedger;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol.to_uppercase(), interval))
    }
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC), or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// Parse a finite price or volume; `NaN` and infinities are rejected.
fn parse_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, TraderError> {
    let raw = record
        .get(index)
        .ok_or_else(|| TraderError::Data {
            reason: format!("missing {} column", name),
        })?
        .trim();
    let value: f64 = raw.parse().map_err(|e| TraderError::Data {
        reason: format!("invalid {} value: {}", name, e),
    })?;
    if !value.is_finite() {
        return Err(TraderError::Data {
            reason: format!("invalid {} value: {} is not finite", name, raw),
        });
    }
    Ok(value)
}

/// Read `timestamp,open,high,low,close,volume` rows from `reader`.
pub fn read_prices<R: std::io::Read>(reader: R) -> Result<Vec<PricePoint>, TraderError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut points = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| TraderError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;

        let raw_ts = record.get(0).ok_or_else(|| TraderError::Data {
            reason: "missing timestamp column".into(),
        })?;
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| TraderError::Data {
            reason: format!("invalid timestamp: {}", raw_ts),
        })?;

        points.push(PricePoint {
            timestamp,
            open: parse_field(&record, 1, "open")?,
            high: parse_field(&record, 2, "high")?,
            low: parse_field(&record, 3, "low")?,
            close: parse_field(&record, 4, "close")?,
            volume: parse_field(&record, 5, "volume")?,
        });
    }

    points.sort_by_key(|p| p.timestamp);
    Ok(points)
}

pub(crate) fn within_dates(point: &PricePoint, start_date: NaiveDate, end_date: NaiveDate) -> bool {
    let date = point.timestamp.date_naive();
    date >= start_date && date <= end_date
}

pub(crate) fn list_with_suffix(base_path: &Path, suffix: &str) -> Result<Vec<String>, TraderError> {
    let entries = fs::read_dir(base_path).map_err(|e| TraderError::Data {
        reason: format!("failed to read directory {}: {}", base_path.display(), e),
    })?;

    let mut symbols = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TraderError::Data {
            reason: format!("directory entry error: {}", e),
        })?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if let Some(symbol) = name_str.strip_suffix(suffix) {
            symbols.push(symbol.to_string());
        }
    }

    symbols.sort();
    Ok(symbols)
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        interval: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TraderError> {
        let path = self.csv_path(symbol, interval);
        let file = fs::File::open(&path).map_err(|e| TraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let points = read_prices(file)?
            .into_iter()
            .filter(|p| within_dates(p, start_date, end_date))
            .collect();
        PriceSeries::new(points)
    }

    fn list_symbols(&self, interval: &str) -> Result<Vec<String>, TraderError> {
        list_with_suffix(&self.base_path, &format!("_{}.csv", interval))
    }
}

/// Write one CSV row per trade, with a header.
pub fn write_ledger_csv<W: std::io::Write>(ledger: &TradeLedger, writer: W) -> Result<(), TraderError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for trade in ledger.iter() {
        wtr.serialize(trade).map_err(|e| TraderError::Report {
            reason: format!("CSV write error: {}", e),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

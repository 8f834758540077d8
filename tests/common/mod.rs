#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use crypto_trader::domain::error::TraderError;
pub use crypto_trader::domain::price::{PricePoint, PriceSeries};
use crypto_trader::ports::data_port::DataPort;
use std::collections::HashMap;
use std::io::Write;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_points(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        _interval: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TraderError::Data {
                reason: reason.clone(),
            });
        }
        let points = self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|p| {
                let d = p.timestamp.date_naive();
                d >= start_date && d <= end_date
            })
            .collect();
        PriceSeries::new(points)
    }

    fn list_symbols(&self, _interval: &str) -> Result<Vec<String>, TraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn day(i: usize) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i as i64)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_point(i: usize, close: f64) -> PricePoint {
    PricePoint {
        timestamp: day(i),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000.0,
    }
}

pub fn make_points(closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_point(i, c))
        .collect()
}

pub fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(make_points(closes)).unwrap()
}

pub fn constant_closes(n: usize, value: f64) -> Vec<f64> {
    vec![value; n]
}

/// Straight line from 100 at index 0 to 120 at index 50, then down to 90 at
/// index 100. The short average already leads when warm-up ends, so 5/20
/// windows never see a long crossover here, only the short one at index 57.
pub fn linear_rise_then_fall_closes() -> Vec<f64> {
    (0..=100)
        .map(|i| {
            let i = i as f64;
            if i <= 50.0 {
                100.0 + 0.4 * i
            } else {
                120.0 - 0.6 * (i - 50.0)
            }
        })
        .collect()
}

/// Like `linear_rise_then_fall_closes` but dips 104 to 100 first, so the
/// averages start below and a long crossover exists. With 5/20 windows the
/// long cross lands on index 29 and the short cross on 59.
pub fn rise_then_fall_closes() -> Vec<f64> {
    (0..=100)
        .map(|i| {
            let i = i as f64;
            if i <= 25.0 {
                104.0 - 4.0 * i / 25.0
            } else if i <= 50.0 {
                100.0 + 20.0 * (i - 25.0) / 25.0
            } else {
                120.0 - 30.0 * (i - 50.0) / 50.0
            }
        })
        .collect()
}

/// Twenty closes at 100 followed by 101..=110.
pub fn flat_then_rise_closes() -> Vec<f64> {
    let mut closes = constant_closes(20, 100.0);
    closes.extend((1..=10).map(|i| 100.0 + i as f64));
    closes
}

/// `timestamp,open,high,low,close,volume` text for `points`.
pub fn price_csv(points: &[PricePoint]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for p in points {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            p.timestamp.format("%Y-%m-%d"),
            p.open,
            p.high,
            p.low,
            p.close,
            p.volume
        ));
    }
    out
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

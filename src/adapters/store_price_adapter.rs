//! Reads price series previously imported into a record store.

use crate::domain::error::TraderError;
use crate::domain::price::{PricePoint, PriceSeries};
use crate::ports::data_port::DataPort;
use crate::ports::storage_port::{StoragePort, get_records, price_key};
use chrono::NaiveDate;

pub struct StorePriceAdapter {
    store: Box<dyn StoragePort>,
}

impl StorePriceAdapter {
    pub fn new(store: Box<dyn StoragePort>) -> Self {
        Self { store }
    }
}

impl DataPort for StorePriceAdapter {
    /// Series are keyed by their exact import range, so `interval` is not
    /// part of the lookup.
    fn fetch_prices(
        &self,
        symbol: &str,
        _interval: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TraderError> {
        let key = price_key(symbol, start_date, end_date);
        let mut points: Vec<PricePoint> =
            get_records(self.store.as_ref(), &key)?.ok_or_else(|| TraderError::Data {
                reason: format!("no stored prices under {}", key),
            })?;
        points.sort_by_key(|p| p.timestamp);
        PriceSeries::new(points)
    }

    fn list_symbols(&self, _interval: &str) -> Result<Vec<String>, TraderError> {
        Err(TraderError::Data {
            reason: "the record store cannot list symbols".into(),
        })
    }
}

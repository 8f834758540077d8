//! Price ingestion port trait.

use crate::domain::error::TraderError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Prices for `symbol` at `interval` whose timestamps fall on a date in
    /// `[start_date, end_date]`, sorted ascending.
    fn fetch_prices(
        &self,
        symbol: &str,
        interval: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TraderError>;

    fn list_symbols(&self, interval: &str) -> Result<Vec<String>, TraderError>;
}

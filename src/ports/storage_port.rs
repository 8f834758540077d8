//! Record persistence port trait.
//!
//! Stores are keyed text blobs. Series and ledgers travel through them as
//! JSON arrays of records, one object per row.

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::error::TraderError;

pub trait StoragePort {
    fn put(&self, key: &str, body: &str) -> Result<(), TraderError>;

    /// `Ok(None)` when nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, TraderError>;
}

pub fn put_records<T: Serialize>(
    store: &dyn StoragePort,
    key: &str,
    records: &[T],
) -> Result<(), TraderError> {
    let body = serde_json::to_string(records)?;
    store.put(key, &body)
}

pub fn get_records<T: DeserializeOwned>(
    store: &dyn StoragePort,
    key: &str,
) -> Result<Option<Vec<T>>, TraderError> {
    match store.get(key)? {
        Some(body) => Ok(Some(serde_json::from_str(&body)?)),
        None => Ok(None),
    }
}

/// `data/{SYMBOL}_{YYYY_MM_DD}_{YYYY_MM_DD}`
pub fn price_key(symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> String {
    format!(
        "data/{}_{}_{}",
        symbol.to_uppercase(),
        start_date.format("%Y_%m_%d"),
        end_date.format("%Y_%m_%d")
    )
}

//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod file_store;
pub mod kline_adapter;
#[cfg(feature = "sqlite")]
pub mod sqlite_store;
pub mod store_price_adapter;
pub mod svg_report;

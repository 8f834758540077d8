//! Core domain types and logic.

pub mod price;
pub mod signal;
pub mod indicator;
pub mod crossover;
pub mod close_above;
pub mod trade;
pub mod backtest;
pub mod summary;
pub mod strategy;
pub mod sweep;
pub mod config_validation;
pub mod error;

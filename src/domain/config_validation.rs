//! Configuration validation.
//!
//! Every section a run reads is checked up front so a bad INI file fails
//! before any prices are loaded. The `parse_*` functions return the typed
//! values the CLI builds its pipeline from.

use crate::domain::backtest::DEFAULT_CAPITAL;
use crate::domain::error::TraderError;
use crate::domain::strategy::{CLOSE_ABOVE_SMA, SMA_CROSSOVER, StrategyConfig};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATA_SOURCES: [&str; 3] = ["csv", "klines", "store"];
pub const STORE_BACKENDS: [&str; 2] = ["file", "sqlite"];

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TraderError {
    TraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, TraderError> {
    config
        .get_string(section, key)
        .ok_or_else(|| TraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

fn parse_window(config: &dyn ConfigPort, key: &str) -> Result<usize, TraderError> {
    let raw = required(config, "strategy", key)?;
    let window: usize = raw
        .parse()
        .map_err(|_| invalid("strategy", key, format!("{} is not a whole number", raw)))?;
    if window == 0 {
        return Err(invalid("strategy", key, format!("{} must be positive", key)));
    }
    Ok(window)
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, TraderError> {
    let raw = required(config, "data", key)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| invalid("data", key, format!("invalid {} format, expected YYYY-MM-DD", key)))
}

/// Lowercased `[data] source`, `csv` when absent.
pub fn data_source(config: &dyn ConfigPort) -> String {
    config
        .get_string("data", "source")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "csv".to_string())
}

/// Lowercased `[store] backend`, `file` when absent.
pub fn store_backend(config: &dyn ConfigPort) -> String {
    config
        .get_string("store", "backend")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "file".to_string())
}

/// Inclusive `[data] start_date..=end_date`.
pub fn parse_date_range(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), TraderError> {
    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    if start_date > end_date {
        return Err(invalid(
            "data",
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok((start_date, end_date))
}

pub fn parse_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, TraderError> {
    let name = config
        .get_string("strategy", "name")
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| SMA_CROSSOVER.to_string());

    match name.as_str() {
        SMA_CROSSOVER => {
            let short_window = parse_window(config, "short_window")?;
            let long_window = parse_window(config, "long_window")?;
            if short_window >= long_window {
                return Err(invalid(
                    "strategy",
                    "short_window",
                    format!(
                        "short_window ({}) must be less than long_window ({})",
                        short_window, long_window
                    ),
                ));
            }
            Ok(StrategyConfig::SmaCrossover {
                short_window,
                long_window,
            })
        }
        CLOSE_ABOVE_SMA => Ok(StrategyConfig::CloseAboveSma {
            window: parse_window(config, "window")?,
        }),
        other => Err(invalid(
            "strategy",
            "name",
            format!(
                "unknown strategy '{}', expected {} or {}",
                other, SMA_CROSSOVER, CLOSE_ABOVE_SMA
            ),
        )),
    }
}

/// `[backtest] capital`, or [`DEFAULT_CAPITAL`] when absent.
pub fn parse_capital(config: &dyn ConfigPort) -> Result<f64, TraderError> {
    let Some(raw) = config.get_string("backtest", "capital") else {
        return Ok(DEFAULT_CAPITAL);
    };
    let capital: f64 = raw
        .parse()
        .map_err(|_| invalid("backtest", "capital", format!("{} is not a number", raw)))?;
    if !capital.is_finite() || capital <= 0.0 {
        return Err(invalid("backtest", "capital", "capital must be positive"));
    }
    Ok(capital)
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let source = data_source(config);
    if !DATA_SOURCES.contains(&source.as_str()) {
        return Err(invalid(
            "data",
            "source",
            format!("unknown source '{}', expected one of {:?}", source, DATA_SOURCES),
        ));
    }
    if source != "store" {
        required(config, "data", "path")?;
        required(config, "data", "interval")?;
    }
    required(config, "data", "symbol")?;
    parse_date_range(config)?;
    Ok(())
}

pub fn validate_store_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let backend = store_backend(config);
    if !STORE_BACKENDS.contains(&backend.as_str()) {
        return Err(invalid(
            "store",
            "backend",
            format!("unknown backend '{}', expected one of {:?}", backend, STORE_BACKENDS),
        ));
    }
    if backend == "sqlite" && !cfg!(feature = "sqlite") {
        return Err(invalid(
            "store",
            "backend",
            "sqlite support was not compiled in",
        ));
    }
    required(config, "store", "path")?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    parse_strategy_config(config).map(|_| ())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    parse_capital(config).map(|_| ())
}

/// A store is needed to read prices from it or to persist the ledger.
pub fn store_required(config: &dyn ConfigPort) -> bool {
    data_source(config) == "store" || config.get_string("report", "ledger_key").is_some()
}

/// Every section a backtest run touches.
pub fn validate_run_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    validate_data_config(config)?;
    if store_required(config) {
        validate_store_config(config)?;
    }
    validate_strategy_config(config)?;
    validate_backtest_config(config)?;
    Ok(())
}

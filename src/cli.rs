//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::{CsvAdapter, write_ledger_csv};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::file_store::FileStore;
use crate::adapters::kline_adapter::KlineFileAdapter;
use crate::adapters::store_price_adapter::StorePriceAdapter;
use crate::adapters::svg_report::SvgReportAdapter;
use crate::domain::backtest::run_strategy;
use crate::domain::config_validation::{
    DATA_SOURCES, data_source, parse_capital, parse_date_range, parse_strategy_config, store_backend,
    validate_data_config, validate_run_config, validate_store_config,
};
use crate::domain::error::TraderError;
use crate::domain::price::PriceSeries;
use crate::domain::signal::{Signal, SignalGenerator};
use crate::domain::strategy::StrategyConfig;
use crate::domain::summary::LedgerSummary;
use crate::domain::sweep::{ParamGrid, SweepResult, sweep};
use crate::domain::trade::TradeLedger;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::storage_port::{StoragePort, price_key, put_records};

#[derive(Parser, Debug)]
#[command(name = "crypto_trader", about = "Moving-average crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override [backtest] capital
        #[arg(long)]
        capital: Option<f64>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the signals the configured strategy generates
    Signals {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Backtest every short/long window combination
    Sweep {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, value_delimiter = ',')]
        short: Vec<usize>,
        #[arg(long, value_delimiter = ',')]
        long: Vec<usize>,
    },
    /// Load prices from the data source into the record store
    Import {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available from the data source
    Symbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            capital,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, capital)
            } else {
                run_backtest(&config, capital)
            }
        }
        Command::Signals { config } => run_signals(&config),
        Command::Sweep {
            config,
            short,
            long,
        } => run_sweep(&config, short, long),
        Command::Import { config } => run_import(&config),
        Command::Symbols { config } => run_symbols(&config),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TraderError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Which series to load, resolved from `[data]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRequest {
    pub symbol: String,
    pub interval: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub fn build_price_request(config: &dyn ConfigPort) -> Result<PriceRequest, TraderError> {
    let symbol = config
        .get_string("data", "symbol")
        .ok_or_else(|| TraderError::ConfigMissing {
            section: "data".into(),
            key: "symbol".into(),
        })?;
    let interval = config
        .get_string("data", "interval")
        .unwrap_or_else(|| "1d".to_string());
    let (start_date, end_date) = parse_date_range(config)?;
    Ok(PriceRequest {
        symbol: symbol.to_uppercase(),
        interval,
        start_date,
        end_date,
    })
}

/// Command-line capital wins over `[backtest] capital`.
pub fn build_capital(config: &dyn ConfigPort, capital: Option<f64>) -> Result<f64, TraderError> {
    match capital {
        Some(c) if c.is_finite() && c > 0.0 => Ok(c),
        Some(c) => Err(TraderError::invalid(
            "capital",
            format!("{c} must be a positive amount"),
        )),
        None => parse_capital(config),
    }
}

pub fn build_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, TraderError> {
    parse_strategy_config(config)
}

pub fn build_store(config: &dyn ConfigPort) -> Result<Box<dyn StoragePort>, TraderError> {
    validate_store_config(config)?;
    match store_backend(config).as_str() {
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Box::new(
            crate::adapters::sqlite_store::SqliteStore::from_config(config)?,
        )),
        _ => {
            let root = config
                .get_string("store", "path")
                .ok_or_else(|| TraderError::ConfigMissing {
                    section: "store".into(),
                    key: "path".into(),
                })?;
            Ok(Box::new(FileStore::new(PathBuf::from(root))))
        }
    }
}

pub fn build_data_port(config: &dyn ConfigPort) -> Result<Box<dyn DataPort>, TraderError> {
    let source = data_source(config);
    if source == "store" {
        return Ok(Box::new(StorePriceAdapter::new(build_store(config)?)));
    }

    let path = || {
        config
            .get_string("data", "path")
            .map(PathBuf::from)
            .ok_or_else(|| TraderError::ConfigMissing {
                section: "data".into(),
                key: "path".into(),
            })
    };
    match source.as_str() {
        "csv" => Ok(Box::new(CsvAdapter::new(path()?))),
        "klines" => Ok(Box::new(KlineFileAdapter::new(path()?))),
        other => Err(TraderError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown source '{}', expected one of {:?}", other, DATA_SOURCES),
        }),
    }
}

pub fn load_prices(
    data_port: &dyn DataPort,
    request: &PriceRequest,
) -> Result<PriceSeries, TraderError> {
    let prices = data_port.fetch_prices(
        &request.symbol,
        &request.interval,
        request.start_date,
        request.end_date,
    )?;
    info!(
        symbol = %request.symbol,
        interval = %request.interval,
        points = prices.len(),
        "loaded prices"
    );
    Ok(prices)
}

/// Result of a single configured backtest.
#[derive(Debug, Clone)]
pub struct BacktestRun {
    pub strategy: String,
    pub prices: PriceSeries,
    pub ledger: TradeLedger,
    pub summary: LedgerSummary,
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    config: &dyn ConfigPort,
    capital: Option<f64>,
) -> Result<BacktestRun, TraderError> {
    let request = build_price_request(config)?;
    let strategy_config = build_strategy_config(config)?;
    let capital = build_capital(config, capital)?;

    let prices = load_prices(data_port, &request)?;
    let generator = strategy_config.build()?;
    info!(strategy = %generator.name(), capital, "running backtest");

    let ledger = run_strategy(&prices, generator.as_ref(), capital)?;
    let summary = LedgerSummary::compute(&ledger);
    Ok(BacktestRun {
        strategy: generator.name(),
        prices,
        ledger,
        summary,
    })
}

/// Write the optional `[report]` outputs. Returns the destinations written.
pub fn write_outputs(config: &dyn ConfigPort, run: &BacktestRun) -> Result<Vec<String>, TraderError> {
    let mut written = Vec::new();

    if let Some(path) = config.get_string("report", "ledger_csv") {
        let file = fs::File::create(&path).map_err(|e| TraderError::Report {
            reason: format!("failed to create {}: {}", path, e),
        })?;
        write_ledger_csv(&run.ledger, file)?;
        info!(path = %path, trades = run.ledger.len(), "ledger written");
        written.push(path);
    }

    if let Some(path) = config.get_string("report", "chart_svg") {
        SvgReportAdapter.write(&run.prices, &run.ledger, &path)?;
        info!(path = %path, "chart written");
        written.push(path);
    }

    if let Some(key) = config.get_string("report", "ledger_key") {
        let store = build_store(config)?;
        put_records(store.as_ref(), &key, &run.ledger.trades)?;
        info!(key = %key, "ledger stored");
        written.push(key);
    }

    Ok(written)
}

pub fn format_summary(run: &BacktestRun) -> String {
    let s = &run.summary;
    let mut out = String::new();
    out.push_str("=== Backtest Results ===\n");
    out.push_str(&format!("Strategy:         {}\n", run.strategy));
    out.push_str(&format!("Capital:          {:.2}\n", run.ledger.capital));
    out.push_str(&format!("Price Points:     {}\n", run.prices.len()));
    out.push_str(&format!(
        "Total Trades:     {} ({} flat)\n",
        s.total_trades, s.flat_trades
    ));
    out.push_str(&format!(
        "Won/Lost/Even:    {}/{}/{}\n",
        s.trades_won, s.trades_lost, s.trades_breakeven
    ));
    out.push_str(&format!("Win Rate:         {:.1}%\n", s.win_rate * 100.0));
    out.push_str(&format!("Profit Factor:    {:.2}\n", s.profit_factor));
    out.push_str(&format!("Largest Win:      {:.2}\n", s.largest_win));
    out.push_str(&format!("Largest Loss:     {:.2}\n", s.largest_loss));
    out.push_str(&format!("Max Drawdown:     {:.2}\n", s.max_drawdown));
    out.push_str(&format!("Total PnL:        {:.2}\n", s.total_pnl));
    out
}

fn run_backtest(config_path: &Path, capital: Option<f64>) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    validate_run_config(&config)?;

    let data_port = build_data_port(&config)?;
    let run = run_backtest_pipeline(data_port.as_ref(), &config, capital)?;
    if run.ledger.is_empty() {
        warn!(strategy = %run.strategy, "backtest produced no trades");
    }

    print!("{}", format_summary(&run));
    for destination in write_outputs(&config, &run)? {
        println!("Written: {destination}");
    }
    Ok(())
}

/// Validate, load and generate without writing anything.
pub fn run_dry_run(config_path: &Path, capital: Option<f64>) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    validate_run_config(&config)?;
    let capital = build_capital(&config, capital)?;

    let request = build_price_request(&config)?;
    let strategy_config = build_strategy_config(&config)?;
    let data_port = build_data_port(&config)?;
    let prices = load_prices(data_port.as_ref(), &request)?;
    let generator = strategy_config.build()?;
    let signals = generator.generate(&prices)?;

    println!("=== Dry Run ===");
    println!("Symbol:           {} ({})", request.symbol, request.interval);
    println!("Range:            {} to {}", request.start_date, request.end_date);
    println!("Strategy:         {}", generator.name());
    println!("Capital:          {:.2}", capital);
    println!("Price Points:     {}", prices.len());
    println!("Warm-up:          {}", strategy_config.warmup());
    println!("Signals:          {}", signals.len());
    Ok(())
}

pub fn format_signals(signals: &[Signal]) -> String {
    signals
        .iter()
        .map(|s| format!("{}\t{}\t{}\n", s.timestamp.to_rfc3339(), s.position.as_i8(), s.position))
        .collect()
}

fn run_signals(config_path: &Path) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    let request = build_price_request(&config)?;
    let generator = build_strategy_config(&config)?.build()?;

    let prices = load_prices(build_data_port(&config)?.as_ref(), &request)?;
    let signals = generator.generate(&prices)?;
    info!(strategy = %generator.name(), signals = signals.len(), "signals generated");

    print!("{}", format_signals(&signals));
    Ok(())
}

/// Command-line lists win; otherwise `[sweep] short_windows` / `long_windows`.
pub fn build_param_grid(
    config: &dyn ConfigPort,
    short: Vec<usize>,
    long: Vec<usize>,
) -> Result<ParamGrid, TraderError> {
    let resolve = |given: Vec<usize>, key: &str| -> Result<Vec<usize>, TraderError> {
        if !given.is_empty() {
            return Ok(given);
        }
        config
            .get_usize_list("sweep", key)?
            .filter(|list| !list.is_empty())
            .ok_or_else(|| TraderError::ConfigMissing {
                section: "sweep".into(),
                key: key.into(),
            })
    };
    Ok(ParamGrid::new(
        resolve(short, "short_windows")?,
        resolve(long, "long_windows")?,
    ))
}

pub fn format_sweep(results: &[SweepResult]) -> String {
    let mut out = String::from("short\tlong\ttrades\twin_rate\tmax_drawdown\tfinal_pnl\n");
    for r in results {
        out.push_str(&format!(
            "{}\t{}\t{}\t{:.1}%\t{:.2}\t{:.2}\n",
            r.short_window,
            r.long_window,
            r.trades,
            r.summary.win_rate * 100.0,
            r.summary.max_drawdown,
            r.final_pnl
        ));
    }
    out
}

fn run_sweep(config_path: &Path, short: Vec<usize>, long: Vec<usize>) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    let grid = build_param_grid(&config, short, long)?;
    let capital = build_capital(&config, None)?;

    let request = build_price_request(&config)?;
    let prices = load_prices(build_data_port(&config)?.as_ref(), &request)?;
    let results = sweep(&prices, &grid, capital)?;
    if results.is_empty() {
        warn!(points = prices.len(), "no window combination fits the series");
    }

    print!("{}", format_sweep(&results));
    Ok(())
}

fn run_import(config_path: &Path) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    let request = build_price_request(&config)?;

    let prices = load_prices(build_data_port(&config)?.as_ref(), &request)?;
    let key = price_key(&request.symbol, request.start_date, request.end_date);
    let store = build_store(&config)?;
    put_records(store.as_ref(), &key, prices.points())?;

    info!(key = %key, points = prices.len(), "prices imported");
    println!("Imported {} points to {}", prices.len(), key);
    Ok(())
}

fn run_symbols(config_path: &Path) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    let interval = config
        .get_string("data", "interval")
        .unwrap_or_else(|| "1d".to_string());
    let symbols = build_data_port(&config)?.list_symbols(&interval)?;
    for symbol in &symbols {
        println!("{symbol}");
    }
    info!(count = symbols.len(), interval = %interval, "symbols listed");
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), TraderError> {
    let config = load_config(config_path)?;
    validate_run_config(&config)?;
    println!("Configuration is valid.");
    Ok(())
}

//! Backtest loop: signal-to-trade reconstruction and PnL accounting.
//!
//! Prices and signals are merge-joined on timestamp, then folded left to
//! right. A trade opens at every row whose position differs from the previous
//! joined row and is closed, at that row's close, by the next such row. The
//! position still open after the last row is marked to market at the last
//! close. Rows before the first non-flat position never open a trade.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::error::TraderError;
use crate::domain::price::PriceSeries;
use crate::domain::signal::{Position, Signal, SignalGenerator};
use crate::domain::trade::{Trade, TradeLedger, TradeType};

/// Fixed notional per position, in quote currency.
pub const DEFAULT_CAPITAL: f64 = 10_000.0;

/// One row of the inner join between prices and signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub position: Position,
}

/// Inner join on timestamp. Both inputs must be sorted ascending; rows
/// present on only one side are dropped without error.
pub fn join_on_timestamp(prices: &PriceSeries, signals: &[Signal]) -> Vec<JoinedRow> {
    let points = prices.points();
    let mut rows = Vec::with_capacity(signals.len().min(points.len()));
    let (mut p, mut s) = (0, 0);

    while p < points.len() && s < signals.len() {
        let (price, signal) = (&points[p], &signals[s]);
        match price.timestamp.cmp(&signal.timestamp) {
            std::cmp::Ordering::Less => p += 1,
            std::cmp::Ordering::Greater => s += 1,
            std::cmp::Ordering::Equal => {
                rows.push(JoinedRow {
                    timestamp: price.timestamp,
                    close: price.close,
                    position: signal.position,
                });
                p += 1;
                s += 1;
            }
        }
    }

    rows
}

#[derive(Debug, Clone, Copy)]
struct OpenTrade {
    timestamp: DateTime<Utc>,
    position: Position,
    entry_price: f64,
}

/// Accumulator threaded through the fold.
#[derive(Debug)]
struct Scan {
    capital: f64,
    open: Option<OpenTrade>,
    previous: Option<Position>,
    last_row: Option<JoinedRow>,
    running_pnl: f64,
    trades: Vec<Trade>,
}

impl Scan {
    fn new(capital: f64) -> Self {
        Self {
            capital,
            open: None,
            previous: None,
            last_row: None,
            running_pnl: 0.0,
            trades: Vec::new(),
        }
    }

    fn step(mut self, row: &JoinedRow) -> Self {
        let transition = match self.previous {
            None => !row.position.is_flat(),
            Some(prev) => prev != row.position,
        };

        if transition {
            if let Some(open) = self.open.take() {
                self.close(open, row);
            }
            self.open = Some(OpenTrade {
                timestamp: row.timestamp,
                position: row.position,
                entry_price: row.close,
            });
        }

        self.previous = Some(row.position);
        self.last_row = Some(*row);
        self
    }

    fn close(&mut self, open: OpenTrade, exit: &JoinedRow) {
        let trade_size = self.capital * open.position.as_f64();
        let direction = if open.position == Position::Short { -1.0 } else { 1.0 };
        // `+ 0.0` folds the -0.0 of an unmoved short into 0.0.
        let pnl = trade_size.abs() * (exit.close - open.entry_price) * direction + 0.0;
        self.running_pnl += pnl;

        self.trades.push(Trade {
            timestamp: open.timestamp,
            trade_type: TradeType::for_position(open.position),
            position: open.position,
            trade_size,
            entry_price: open.entry_price,
            exit_price: exit.close,
            exit_timestamp: exit.timestamp,
            pnl,
            cumulative_pnl: self.running_pnl,
        });
    }

    fn finish(mut self) -> TradeLedger {
        if let (Some(open), Some(last)) = (self.open.take(), self.last_row) {
            self.close(open, &last);
        }
        TradeLedger {
            capital: self.capital,
            trades: self.trades,
        }
    }
}

fn validate_capital(capital: f64) -> Result<(), TraderError> {
    if !capital.is_finite() || capital <= 0.0 {
        return Err(TraderError::invalid(
            "capital",
            format!("{capital} must be a positive amount"),
        ));
    }
    Ok(())
}

fn validate_signals(signals: &[Signal]) -> Result<(), TraderError> {
    if let Some(pair) = signals
        .windows(2)
        .find(|pair| pair[0].timestamp >= pair[1].timestamp)
    {
        return Err(TraderError::invalid(
            "signals",
            format!(
                "timestamps must be strictly ascending ({} followed by {})",
                pair[0].timestamp, pair[1].timestamp
            ),
        ));
    }
    Ok(())
}

pub fn run_backtest(
    prices: &PriceSeries,
    signals: &[Signal],
    capital: f64,
) -> Result<TradeLedger, TraderError> {
    validate_capital(capital)?;
    if prices.is_empty() {
        return Err(TraderError::invalid("prices", "price series is empty"));
    }
    validate_signals(signals)?;

    let rows = join_on_timestamp(prices, signals);
    if rows.is_empty() {
        warn!(
            prices = prices.len(),
            signals = signals.len(),
            "prices and signals share no timestamps; ledger is empty"
        );
        return Ok(TradeLedger::empty(capital));
    }
    debug!(rows = rows.len(), "joined prices with signals");

    let ledger = rows
        .iter()
        .fold(Scan::new(capital), |scan, row| scan.step(row))
        .finish();

    debug!(
        trades = ledger.len(),
        final_pnl = ledger.final_pnl(),
        "backtest complete"
    );
    Ok(ledger)
}

/// Generate signals with `generator` and backtest them in one call.
pub fn run_strategy(
    prices: &PriceSeries,
    generator: &dyn SignalGenerator,
    capital: f64,
) -> Result<TradeLedger, TraderError> {
    validate_capital(capital)?;
    let signals = generator.generate(prices)?;
    debug!(strategy = %generator.name(), signals = signals.len(), "signals generated");
    run_backtest(prices, &signals, capital)
}

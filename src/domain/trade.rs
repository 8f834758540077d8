//! Priced trades and the ledger a backtest run produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::signal::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    /// `Buy` for a new long position, `Sell` for short or flat.
    pub fn for_position(position: Position) -> Self {
        if position == Position::Long {
            TradeType::Buy
        } else {
            TradeType::Sell
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::Buy => write!(f, "buy"),
            TradeType::Sell => write!(f, "sell"),
        }
    }
}

/// A position held from `timestamp` until `exit_timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub timestamp: DateTime<Utc>,
    pub trade_type: TradeType,
    pub position: Position,
    pub trade_size: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub exit_timestamp: DateTime<Utc>,
    pub pnl: f64,
    pub cumulative_pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradeLedger {
    pub capital: f64,
    pub trades: Vec<Trade>,
}

impl TradeLedger {
    pub fn empty(capital: f64) -> Self {
        Self {
            capital,
            trades: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trade> {
        self.trades.iter()
    }

    /// Cumulative PnL of the last trade; 0 for an empty ledger.
    pub fn final_pnl(&self) -> f64 {
        self.trades.last().map(|t| t.cumulative_pnl).unwrap_or(0.0)
    }
}

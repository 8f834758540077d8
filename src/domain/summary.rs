//! Win/loss statistics over a trade ledger.

use crate::domain::trade::TradeLedger;

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub total_trades: usize,
    pub flat_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    /// Won over non-flat trades.
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub total_pnl: f64,
    /// Largest peak-to-trough fall of cumulative PnL, starting from zero.
    pub max_drawdown: f64,
}

impl LedgerSummary {
    pub fn compute(ledger: &TradeLedger) -> Self {
        let mut flat_trades = 0usize;
        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;

        for trade in ledger.iter() {
            if trade.position.is_flat() {
                flat_trades += 1;
                continue;
            }
            let pnl = trade.pnl;
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }
        }

        let directional = trades_won + trades_lost + trades_breakeven;
        let win_rate = if directional > 0 {
            trades_won as f64 / directional as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };
        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        LedgerSummary {
            total_trades: ledger.len(),
            flat_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            total_pnl: ledger.final_pnl(),
            max_drawdown: max_drawdown(ledger),
        }
    }
}

fn max_drawdown(ledger: &TradeLedger) -> f64 {
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;
    for trade in ledger.iter() {
        peak = peak.max(trade.cumulative_pnl);
        max_dd = max_dd.max(peak - trade.cumulative_pnl);
    }
    max_dd
}

//! Crossover parameter sweep.
//!
//! Every (short, long) combination is an independent backtest over the same
//! immutable price series, so the grid runs in parallel across combinations
//! while each run stays sequential.

use rayon::prelude::*;
use tracing::info;

use crate::domain::backtest::run_strategy;
use crate::domain::crossover::SmaCrossover;
use crate::domain::error::TraderError;
use crate::domain::price::PriceSeries;
use crate::domain::summary::LedgerSummary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamGrid {
    pub short_windows: Vec<usize>,
    pub long_windows: Vec<usize>,
}

impl ParamGrid {
    pub fn new(short_windows: Vec<usize>, long_windows: Vec<usize>) -> Self {
        Self {
            short_windows,
            long_windows,
        }
    }

    /// Number of raw combinations, before invalid pairs are skipped.
    pub fn size(&self) -> usize {
        self.short_windows.len() * self.long_windows.len()
    }

    /// Valid (short, long) pairs whose long window fits in `available` prices.
    pub fn combinations(&self, available: usize) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for &short in &self.short_windows {
            for &long in &self.long_windows {
                if short == 0 || short >= long || long > available {
                    continue;
                }
                pairs.push((short, long));
            }
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub short_window: usize,
    pub long_window: usize,
    pub trades: usize,
    pub final_pnl: f64,
    pub summary: LedgerSummary,
}

/// Results sorted by final PnL, best first; ties broken by window sizes.
pub fn sweep(
    prices: &PriceSeries,
    grid: &ParamGrid,
    capital: f64,
) -> Result<Vec<SweepResult>, TraderError> {
    let combinations = grid.combinations(prices.len());
    info!(
        combinations = combinations.len(),
        skipped = grid.size() - combinations.len(),
        "starting parameter sweep"
    );

    let mut results = combinations
        .par_iter()
        .map(|&(short, long)| -> Result<SweepResult, TraderError> {
            let strategy = SmaCrossover::new(short, long)?;
            let ledger = run_strategy(prices, &strategy, capital)?;
            Ok(SweepResult {
                short_window: short,
                long_window: long,
                trades: ledger.len(),
                final_pnl: ledger.final_pnl(),
                summary: LedgerSummary::compute(&ledger),
            })
        })
        .collect::<Result<Vec<_>, TraderError>>()?;

    results.sort_by(|a, b| {
        b.final_pnl
            .total_cmp(&a.final_pnl)
            .then(a.short_window.cmp(&b.short_window))
            .then(a.long_window.cmp(&b.long_window))
    });

    Ok(results)
}

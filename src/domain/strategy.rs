//! Strategy selection: which signal generator a run uses and with what parameters.

use crate::domain::close_above::CloseAboveSma;
use crate::domain::crossover::SmaCrossover;
use crate::domain::error::TraderError;
use crate::domain::signal::SignalGenerator;

pub const SMA_CROSSOVER: &str = "sma_crossover";
pub const CLOSE_ABOVE_SMA: &str = "close_above_sma";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyConfig {
    SmaCrossover { short_window: usize, long_window: usize },
    CloseAboveSma { window: usize },
}

impl StrategyConfig {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyConfig::SmaCrossover { .. } => SMA_CROSSOVER,
            StrategyConfig::CloseAboveSma { .. } => CLOSE_ABOVE_SMA,
        }
    }

    /// Longest trailing window the strategy needs before it can emit anything.
    pub fn warmup(&self) -> usize {
        match self {
            StrategyConfig::SmaCrossover { long_window, .. } => *long_window,
            StrategyConfig::CloseAboveSma { window } => window.saturating_sub(1),
        }
    }

    pub fn build(&self) -> Result<Box<dyn SignalGenerator + Send + Sync>, TraderError> {
        match *self {
            StrategyConfig::SmaCrossover {
                short_window,
                long_window,
            } => Ok(Box::new(SmaCrossover::new(short_window, long_window)?)),
            StrategyConfig::CloseAboveSma { window } => Ok(Box::new(CloseAboveSma::new(window)?)),
        }
    }
}

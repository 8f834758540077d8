//! Moving-average crossover strategy.
//!
//! The raw direction at index i is +1 when SMA(short) > SMA(long) and -1
//! otherwise, so equal averages count as short. Only the indices where that
//! direction flips produce a signal; rows that merely continue the current
//! direction are "no new signal" and are left out of the output. Indices below
//! `long_window` are never considered.

use crate::domain::error::TraderError;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::price::PriceSeries;
use crate::domain::signal::{Position, Signal, SignalGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaCrossover {
    short_window: usize,
    long_window: usize,
}

impl SmaCrossover {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, TraderError> {
        if short_window == 0 {
            return Err(TraderError::invalid("short_window", "must be positive"));
        }
        if short_window >= long_window {
            return Err(TraderError::invalid(
                "short_window",
                format!("{short_window} must be less than long_window {long_window}"),
            ));
        }
        Ok(Self {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    /// Raw direction per index; `None` while the long average is undefined.
    pub fn directions(&self, prices: &PriceSeries) -> Vec<Option<i8>> {
        let short = calculate_sma(prices.points(), self.short_window);
        let long = calculate_sma(prices.points(), self.long_window);

        (0..prices.len())
            .map(|i| {
                let long_avg = long.get(i)?;
                let short_avg = short.get(i)?;
                Some(if short_avg > long_avg { 1 } else { -1 })
            })
            .collect()
    }
}

impl SignalGenerator for SmaCrossover {
    fn name(&self) -> String {
        format!("sma_crossover({},{})", self.short_window, self.long_window)
    }

    fn generate(&self, prices: &PriceSeries) -> Result<Vec<Signal>, TraderError> {
        if prices.is_empty() {
            return Err(TraderError::invalid("prices", "price series is empty"));
        }
        if self.long_window > prices.len() {
            return Err(TraderError::invalid(
                "long_window",
                format!(
                    "{} exceeds the {} available prices",
                    self.long_window,
                    prices.len()
                ),
            ));
        }

        let directions = self.directions(prices);
        let points = prices.points();

        let signals = (self.long_window..prices.len())
            .filter_map(|i| match (directions[i - 1], directions[i]) {
                (Some(prev), Some(curr)) if prev != curr => Some(Signal {
                    timestamp: points[i].timestamp,
                    position: Position::from_delta(curr - prev),
                }),
                _ => None,
            })
            .collect();

        Ok(signals)
    }
}

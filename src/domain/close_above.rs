//! Trend filter: hold long while the close is above its moving average.
//!
//! Unlike the crossover strategy this emits a position for every index once
//! the average is defined, so the backtest sees a continuously held series.

use crate::domain::error::TraderError;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::price::PriceSeries;
use crate::domain::signal::{Position, Signal, SignalGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseAboveSma {
    window: usize,
}

impl CloseAboveSma {
    pub fn new(window: usize) -> Result<Self, TraderError> {
        if window == 0 {
            return Err(TraderError::invalid("window", "must be positive"));
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl SignalGenerator for CloseAboveSma {
    fn name(&self) -> String {
        format!("close_above_sma({})", self.window)
    }

    fn generate(&self, prices: &PriceSeries) -> Result<Vec<Signal>, TraderError> {
        if prices.is_empty() {
            return Err(TraderError::invalid("prices", "price series is empty"));
        }
        if self.window > prices.len() {
            return Err(TraderError::invalid(
                "window",
                format!("{} exceeds the {} available prices", self.window, prices.len()),
            ));
        }

        let sma = calculate_sma(prices.points(), self.window);

        Ok(prices
            .points()
            .iter()
            .zip(&sma.values)
            .filter_map(|(point, avg)| {
                let avg = avg.defined()?;
                let position = if point.close > avg {
                    Position::Long
                } else {
                    Position::Flat
                };
                Some(Signal {
                    timestamp: point.timestamp,
                    position,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PricePoint;
    use chrono::{Duration, TimeZone, Utc};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        PriceSeries::new(
            closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PricePoint {
                    timestamp: start + Duration::hours(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 0.0,
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn warmup_rows_are_excluded() {
        let prices = series(&[1.0, 2.0, 3.0, 4.0]);
        let signals = CloseAboveSma::new(3).unwrap().generate(&prices).unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].timestamp, prices.points()[2].timestamp);
    }

    #[test]
    fn long_above_flat_otherwise() {
        let prices = series(&[10.0, 10.0, 12.0, 8.0, 10.0]);
        let signals = CloseAboveSma::new(2).unwrap().generate(&prices).unwrap();
        let positions: Vec<Position> = signals.iter().map(|s| s.position).collect();
        // averages: 10, 11, 10, 9
        assert_eq!(
            positions,
            vec![Position::Flat, Position::Long, Position::Flat, Position::Long]
        );
    }

    #[test]
    fn rejects_zero_window() {
        assert!(CloseAboveSma::new(0).is_err());
    }

    #[test]
    fn rejects_window_beyond_series() {
        let prices = series(&[1.0]);
        assert!(CloseAboveSma::new(2).unwrap().generate(&prices).is_err());
    }
}

//! Simple Moving Average of closing prices.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) points are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price::PricePoint;

pub fn calculate_sma(points: &[PricePoint], period: usize) -> IndicatorSeries {
    let warmup = period.saturating_sub(1);

    let values = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let valid = period > 0 && i >= warmup;
            let value = if valid {
                let window = &points[i + 1 - period..=i];
                window.iter().map(|p| p.close).sum::<f64>() / period as f64
            } else {
                0.0
            };
            IndicatorPoint {
                timestamp: point.timestamp,
                valid,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

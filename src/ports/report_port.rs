//! Report generation port trait.

use crate::domain::error::TraderError;
use crate::domain::price::PriceSeries;
use crate::domain::trade::TradeLedger;

/// Port for rendering a backtest for humans. Implementations only read.
pub trait ReportPort {
    fn write(
        &self,
        prices: &PriceSeries,
        ledger: &TradeLedger,
        output_path: &str,
    ) -> Result<(), TraderError>;
}

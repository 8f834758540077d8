//! Position signals and the strategy plug-in trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::TraderError;
use crate::domain::price::PriceSeries;

/// Desired holding direction: -1 short, 0 flat, +1 long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Position {
    Short,
    Flat,
    Long,
}

impl Position {
    pub fn as_i8(self) -> i8 {
        match self {
            Position::Short => -1,
            Position::Flat => 0,
            Position::Long => 1,
        }
    }

    pub fn from_i8(value: i8) -> Result<Self, TraderError> {
        match value {
            -1 => Ok(Position::Short),
            0 => Ok(Position::Flat),
            1 => Ok(Position::Long),
            other => Err(TraderError::invalid(
                "position",
                format!("{other} is not one of -1, 0, 1"),
            )),
        }
    }

    /// sign(delta) collapsed to a position.
    pub fn from_delta(delta: i8) -> Self {
        match delta.signum() {
            -1 => Position::Short,
            0 => Position::Flat,
            _ => Position::Long,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.as_i8())
    }

    pub fn is_flat(self) -> bool {
        self == Position::Flat
    }
}

impl TryFrom<i8> for Position {
    type Error = TraderError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Position::from_i8(value)
    }
}

impl From<Position> for i8 {
    fn from(position: Position) -> Self {
        position.as_i8()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Short => write!(f, "short"),
            Position::Flat => write!(f, "flat"),
            Position::Long => write!(f, "long"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: DateTime<Utc>,
    pub position: Position,
}

/// A strategy that turns a price series into position signals.
///
/// Implementations are pure: the same series always yields the same signals,
/// in ascending timestamp order.
pub trait SignalGenerator {
    fn name(&self) -> String;

    fn generate(&self, prices: &PriceSeries) -> Result<Vec<Signal>, TraderError>;
}

impl<G: SignalGenerator + ?Sized> SignalGenerator for Box<G> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn generate(&self, prices: &PriceSeries) -> Result<Vec<Signal>, TraderError> {
        (**self).generate(prices)
    }
}

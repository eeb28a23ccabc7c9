//! Technical indicator implementations.
//!
//! - `IndicatorPoint`: a single point in an indicator time series
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a time series of indicator values, one point per bar

pub mod long_short_ratio;
pub mod rsi;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn invalid(date: NaiveDate) -> Self {
        IndicatorPoint {
            date,
            valid: false,
            value: 0.0,
        }
    }

    pub fn valid(date: NaiveDate, value: f64) -> Self {
        IndicatorPoint {
            date,
            valid: true,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Rsi(usize),
    LongShortRatio(usize),
}

impl IndicatorType {
    /// Number of leading bars that can never carry a valid value.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Rsi(period) => *period,
            IndicatorType::LongShortRatio(period) => period.saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// The value at bar `index`, if that bar is past warmup.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::LongShortRatio(period) => write!(f, "LSR({})", period),
        }
    }
}

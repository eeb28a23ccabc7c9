//! RSI / long-short-ratio strategy and its Flat/Long state machine.

use std::fmt;

use crate::domain::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub rsi_period: usize,
    pub lsr_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub lsr_high: f64,
    pub lsr_low: f64,
    /// Fraction below entry that closes the position, e.g. 0.05.
    pub stop_loss: f64,
    /// Fraction above entry that closes the position, e.g. 0.10.
    pub take_profit: f64,
    /// Share of available cash committed on entry.
    pub position_fraction: f64,
    /// Also exit when RSI is overbought and the ratio is below `lsr_low`.
    pub signal_exit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyState {
    Flat,
    Long { entry_price: f64 },
}

impl StrategyState {
    pub fn from_position(position: Option<&Position>) -> Self {
        match position {
            Some(pos) => StrategyState::Long {
                entry_price: pos.entry_price,
            },
            None => StrategyState::Flat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    Signal,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::TakeProfit => write!(f, "take-profit"),
            ExitReason::StopLoss => write!(f, "stop-loss"),
            ExitReason::Signal => write!(f, "signal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell(ExitReason),
    Hold,
}

/// Indicator readings for one bar. `None` until the indicator's window fills.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Signals {
    pub rsi: Option<f64>,
    pub lsr: Option<f64>,
}

/// Relative slack for exit thresholds, so `entry * (1 + pct)` rounding up
/// past a price like 110.0 still counts as a hit.
const THRESHOLD_TOLERANCE: f64 = 1e-12;

fn reaches_or_exceeds(value: f64, threshold: f64) -> bool {
    value >= threshold - threshold.abs() * THRESHOLD_TOLERANCE
}

impl StrategyParams {
    /// Decide what to do on a bar closing at `close`.
    ///
    /// Flat enters only on oversold RSI with a ratio above `lsr_high`. Long
    /// checks take-profit before stop-loss; a Long state never buys.
    pub fn decide(&self, state: StrategyState, close: f64, signals: Signals) -> Action {
        match state {
            StrategyState::Flat => match (signals.rsi, signals.lsr) {
                (Some(rsi), Some(lsr)) if rsi < self.rsi_oversold && lsr > self.lsr_high => {
                    Action::Buy
                }
                _ => Action::Hold,
            },
            StrategyState::Long { entry_price } => {
                if reaches_or_exceeds(close, entry_price * (1.0 + self.take_profit)) {
                    Action::Sell(ExitReason::TakeProfit)
                } else if reaches_or_exceeds(-close, -(entry_price * (1.0 - self.stop_loss))) {
                    Action::Sell(ExitReason::StopLoss)
                } else if self.signal_exit && self.is_exit_signal(signals) {
                    Action::Sell(ExitReason::Signal)
                } else {
                    Action::Hold
                }
            }
        }
    }

    fn is_exit_signal(&self, signals: Signals) -> bool {
        matches!(
            (signals.rsi, signals.lsr),
            (Some(rsi), Some(lsr)) if rsi > self.rsi_overbought && lsr < self.lsr_low
        )
    }

    /// Units to buy: `position_fraction * cash / close`.
    pub fn order_size(&self, cash: f64, close: f64) -> f64 {
        self.position_fraction * cash / close
    }

    /// Bars needed before both indicators can be valid.
    pub fn warmup_bars(&self) -> usize {
        self.rsi_period.max(self.lsr_period.saturating_sub(1))
    }
}

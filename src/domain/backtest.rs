//! Backtest engine and event loop.
//!
//! The loop owns the whole simulation: for each bar it reads both
//! indicators, asks the strategy for an action, applies that action to the
//! ledger and records end-of-bar equity.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::domain::error::CoinlensError;
use crate::domain::execution::{self, ExecutionConfig, OrderReport, OrderSide, OrderStatus};
use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator::long_short_ratio::calculate_long_short_ratio;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::ledger::Ledger;
use crate::domain::ohlcv::PriceBar;
use crate::domain::strategy::{Action, Signals, StrategyParams, StrategyState};

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub commission_pct: f64,
    pub risk_free_rate: f64,
}

impl BacktestConfig {
    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            commission_pct: self.commission_pct,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub ledger: Ledger,
    pub rsi: IndicatorSeries,
    pub lsr: IndicatorSeries,
    pub orders: Vec<OrderReport>,
}

/// Reject series the strategy can never act on.
pub fn check_bars(symbol: &str, bars: &[PriceBar], params: &StrategyParams) -> Result<(), CoinlensError> {
    if bars.is_empty() {
        return Err(CoinlensError::NoData {
            symbol: symbol.to_string(),
        });
    }
    let minimum = params.warmup_bars() + 1;
    if bars.len() < minimum {
        return Err(CoinlensError::InsufficientData {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum,
        });
    }
    Ok(())
}

pub fn run_backtest(
    bars: &[PriceBar],
    params: &StrategyParams,
    config: &BacktestConfig,
) -> Result<BacktestResult, CoinlensError> {
    check_bars(&config.symbol, bars, params)?;

    let rsi = calculate_rsi(bars, params.rsi_period);
    let lsr = calculate_long_short_ratio(bars, params.lsr_period);
    let exec_config = config.execution_config();

    let mut ledger = Ledger::new(config.initial_capital);
    let mut orders = Vec::new();

    for (i, bar) in bars.iter().enumerate() {
        let signals = Signals {
            rsi: rsi.value_at(i),
            lsr: lsr.value_at(i),
        };
        let state = StrategyState::from_position(ledger.position.as_ref());

        let report = match params.decide(state, bar.close, signals) {
            Action::Buy => Some(execution::enter_long(
                &mut ledger,
                &config.symbol,
                bar.close,
                bar.date,
                i,
                params,
                &exec_config,
            )),
            Action::Sell(reason) => {
                info!(date = %bar.date, %reason, "exit triggered");
                Some(execution::exit_long(&mut ledger, bar.close, bar.date, i, &exec_config))
            }
            Action::Hold => None,
        };

        if let Some(report) = report {
            log_order(&report);
            orders.push(report);
        }

        let mark = if bar.close.is_finite() && bar.close > 0.0 {
            bar.close
        } else {
            ledger.position.as_ref().map(|p| p.entry_price).unwrap_or(0.0)
        };
        let equity = ledger.total_equity(mark);
        ledger.record_equity(bar.date, equity);
    }

    Ok(BacktestResult {
        ledger,
        rsi,
        lsr,
        orders,
    })
}

fn log_order(report: &OrderReport) {
    match (report.status, report.side) {
        (OrderStatus::Completed, OrderSide::Buy) => {
            info!(date = %report.date, size = report.size, "BUY EXECUTED, {:.2}", report.price)
        }
        (OrderStatus::Completed, OrderSide::Sell) => {
            info!(date = %report.date, size = report.size, "SELL EXECUTED, {:.2}", report.price)
        }
        (status, side) => warn!(
            date = %report.date,
            ?side,
            %status,
            "Order Canceled/Margin/Rejected"
        ),
    }
}

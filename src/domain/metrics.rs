//! Performance metrics and trade statistics.

use std::collections::BTreeMap;

use chrono::Datelike;

use super::ledger::{EquityPoint, Ledger};
use super::position::ClosedTrade;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Return over one calendar period. `month` is `None` for yearly periods.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodReturn {
    pub year: i32,
    pub month: Option<u32>,
    pub return_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradeStats {
    pub closed: usize,
    pub open: usize,
    pub won: usize,
    pub lost: usize,
    pub breakeven: usize,
    pub win_rate: f64,
    pub longest_win_streak: usize,
    pub longest_loss_streak: usize,
    pub gross_pnl: f64,
    pub net_pnl: f64,
    pub avg_net_pnl: f64,
    pub total_won: f64,
    pub largest_win: f64,
    pub total_lost: f64,
    pub largest_loss: f64,
    pub avg_bars_held: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub starting_value: f64,
    pub final_value: f64,
    pub total_return: f64,
    pub annual_returns: Vec<PeriodReturn>,
    pub monthly_returns: Vec<PeriodReturn>,
    pub avg_annual_return: f64,
    pub avg_monthly_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    pub trades: TradeStats,
}

impl Metrics {
    pub fn compute(ledger: &Ledger, risk_free_rate: f64) -> Self {
        let equity_curve = &ledger.equity_curve;
        let initial_capital = ledger.initial_capital;
        let final_value = ledger.final_equity();

        let total_return = if initial_capital > 0.0 {
            (final_value - initial_capital) / initial_capital
        } else {
            0.0
        };

        let annual_returns = compute_period_returns(equity_curve, initial_capital, |d| (d.year(), None));
        let monthly_returns =
            compute_period_returns(equity_curve, initial_capital, |d| (d.year(), Some(d.month())));

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);
        let sharpe_ratio = compute_sharpe(equity_curve, risk_free_rate / TRADING_DAYS_PER_YEAR);

        let mut trades = compute_trade_stats(&ledger.closed_trades);
        trades.open = usize::from(ledger.has_position());

        Metrics {
            starting_value: initial_capital,
            final_value,
            total_return,
            avg_annual_return: mean_return(&annual_returns),
            avg_monthly_return: mean_return(&monthly_returns),
            annual_returns,
            monthly_returns,
            sharpe_ratio,
            max_drawdown,
            max_drawdown_duration,
            trades,
        }
    }
}

fn mean_return(returns: &[PeriodReturn]) -> f64 {
    if returns.is_empty() {
        0.0
    } else {
        returns.iter().map(|r| r.return_pct).sum::<f64>() / returns.len() as f64
    }
}

/// Group the equity curve into calendar periods and measure each period's
/// closing equity against the previous period's close (the first period is
/// measured against the initial capital).
pub fn compute_period_returns<F>(
    equity_curve: &[EquityPoint],
    initial_capital: f64,
    period_of: F,
) -> Vec<PeriodReturn>
where
    F: Fn(chrono::NaiveDate) -> (i32, Option<u32>),
{
    let mut period_end: BTreeMap<(i32, Option<u32>), f64> = BTreeMap::new();
    for point in equity_curve {
        period_end.insert(period_of(point.date), point.equity);
    }

    let mut prev = initial_capital;
    period_end
        .into_iter()
        .map(|((year, month), end)| {
            let return_pct = if prev > 0.0 { (end - prev) / prev } else { 0.0 };
            prev = end;
            PeriodReturn {
                year,
                month,
                return_pct,
            }
        })
        .collect()
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, usize) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0usize;
    let mut current_dd_duration = 0usize;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            max_dd = max_dd.max(dd);
            current_dd_duration += 1;
            max_dd_duration = max_dd_duration.max(current_dd_duration);
        }
    }

    (max_dd, max_dd_duration)
}

fn compute_sharpe(equity_curve: &[EquityPoint], daily_rf: f64) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 { (curr - prev) / prev } else { 0.0 }
        })
        .collect();

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        ((mean - daily_rf) / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

fn compute_trade_stats(trades: &[ClosedTrade]) -> TradeStats {
    let mut stats = TradeStats {
        closed: trades.len(),
        ..TradeStats::default()
    };
    let mut win_streak = 0usize;
    let mut loss_streak = 0usize;
    let mut total_bars = 0usize;

    for trade in trades {
        stats.gross_pnl += trade.gross_pnl;
        stats.net_pnl += trade.pnl;
        total_bars += trade.bars_held;

        if trade.pnl > 0.0 {
            stats.won += 1;
            stats.total_won += trade.pnl;
            stats.largest_win = stats.largest_win.max(trade.pnl);
            win_streak += 1;
            loss_streak = 0;
        } else if trade.pnl < 0.0 {
            stats.lost += 1;
            stats.total_lost += trade.pnl.abs();
            stats.largest_loss = stats.largest_loss.max(trade.pnl.abs());
            loss_streak += 1;
            win_streak = 0;
        } else {
            stats.breakeven += 1;
            win_streak = 0;
            loss_streak = 0;
        }
        stats.longest_win_streak = stats.longest_win_streak.max(win_streak);
        stats.longest_loss_streak = stats.longest_loss_streak.max(loss_streak);
    }

    if stats.closed > 0 {
        stats.win_rate = stats.won as f64 / stats.closed as f64;
        stats.avg_net_pnl = stats.net_pnl / stats.closed as f64;
        stats.avg_bars_held = total_bars as f64 / stats.closed as f64;
    }

    stats
}

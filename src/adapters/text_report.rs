//! Plain-text backtest report printed to stdout.

use crate::domain::ledger::Ledger;
use crate::domain::metrics::{Metrics, PeriodReturn, TradeStats};

fn fmt_pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn render_period_returns(out: &mut String, title: &str, returns: &[PeriodReturn]) {
    if returns.is_empty() {
        return;
    }
    out.push_str(title);
    out.push_str(":\n");
    for r in returns {
        let period = match r.month {
            Some(month) => format!("{}-{:02}", r.year, month),
            None => r.year.to_string(),
        };
        out.push_str(&format!("  {}: {}\n", period, fmt_pct(r.return_pct)));
    }
}

pub fn render_transactions(ledger: &Ledger) -> String {
    let mut out = String::new();
    for tx in &ledger.transactions {
        out.push_str(&format!(
            "Transaction on {}: {:.8} at price {:.2}\n",
            tx.date, tx.size, tx.price
        ));
    }
    out.push_str(&format!("Total transactions: {}\n", ledger.transactions.len()));
    out
}

pub fn render_trade_breakdown(trades: &TradeStats) -> String {
    let mut out = String::from("Trade breakdown:\n");
    let rows: [(&str, String); 14] = [
        ("total closed", trades.closed.to_string()),
        ("total open", trades.open.to_string()),
        ("won", trades.won.to_string()),
        ("lost", trades.lost.to_string()),
        ("breakeven", trades.breakeven.to_string()),
        ("win rate", fmt_pct(trades.win_rate)),
        ("longest win streak", trades.longest_win_streak.to_string()),
        ("longest loss streak", trades.longest_loss_streak.to_string()),
        ("gross pnl", format!("{:.2}", trades.gross_pnl)),
        ("net pnl", format!("{:.2}", trades.net_pnl)),
        ("average net pnl", format!("{:.2}", trades.avg_net_pnl)),
        (
            "won total / largest",
            format!("{:.2} / {:.2}", trades.total_won, trades.largest_win),
        ),
        (
            "lost total / largest",
            format!("{:.2} / {:.2}", trades.total_lost, trades.largest_loss),
        ),
        ("average bars held", format!("{:.1}", trades.avg_bars_held)),
    ];
    for (label, value) in rows {
        out.push_str(&format!("  {}: {}\n", label, value));
    }
    out
}

/// The full console report for one run.
pub fn render_report(symbol: &str, metrics: &Metrics, ledger: &Ledger) -> String {
    let mut out = format!("Backtest: {}\n", symbol);
    out.push_str(&format!("Starting Portfolio Value: {:.2}\n", metrics.starting_value));
    out.push_str(&format!("Final Portfolio Value: {:.2}\n", metrics.final_value));
    out.push_str(&format!("Total Return: {}\n", fmt_pct(metrics.total_return)));
    out.push_str(&format!(
        "Annual Average Return: {}\n",
        fmt_pct(metrics.avg_annual_return)
    ));
    out.push_str(&format!(
        "Monthly Average Return: {}\n",
        fmt_pct(metrics.avg_monthly_return)
    ));
    render_period_returns(&mut out, "Annual Returns", &metrics.annual_returns);
    out.push_str(&format!("Sharpe Ratio: {:.4}\n", metrics.sharpe_ratio));
    out.push_str(&format!(
        "Max Drawdown: {} over {} bars\n",
        fmt_pct(metrics.max_drawdown),
        metrics.max_drawdown_duration
    ));
    if ledger.failed_orders > 0 {
        out.push_str(&format!("Failed orders: {}\n", ledger.failed_orders));
    }
    out.push('\n');
    out.push_str(&render_transactions(ledger));
    out.push('\n');
    out.push_str(&render_trade_breakdown(&metrics.trades));
    out
}

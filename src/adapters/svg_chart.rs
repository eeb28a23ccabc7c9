//! Standalone SVG chart rendering.
//!
//! Two charts: the sent/received stacked bar chart for an address query and
//! the candlestick chart with trade markers for a backtest.

use std::fmt::Write;

use crate::domain::ledger::Transaction;
use crate::domain::ohlcv::PriceBar;

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 40.0;

const SENT_COLOR: &str = "#1f77b4";
const RECEIVED_COLOR: &str = "#ff7f0e";
const UP_COLOR: &str = "#16a34a";
const DOWN_COLOR: &str = "#dc2626";

/// One category of the stacked bar chart: sent at the bottom, received on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackedBar {
    pub label: String,
    pub sent: usize,
    pub received: usize,
}

impl StackedBar {
    pub fn total(&self) -> usize {
        self.sent + self.received
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn open_svg(svg: &mut String, width: f64, height: f64) {
    let _ = writeln!(
        svg,
        r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#,
        w = width,
        h = height
    );
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
}

fn axes(svg: &mut String, width: f64, height: f64) {
    let _ = writeln!(
        svg,
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>",
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        height - MARGIN_BOTTOM
    );
    let _ = writeln!(
        svg,
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>",
        MARGIN_LEFT,
        height - MARGIN_BOTTOM,
        width - MARGIN_RIGHT,
        height - MARGIN_BOTTOM
    );
}

fn text(svg: &mut String, x: f64, y: f64, anchor: &str, size: u32, content: &str) {
    let _ = writeln!(
        svg,
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"{}\" font-size=\"{}\" fill=\"#333\">{}</text>",
        x,
        y,
        anchor,
        size,
        escape(content)
    );
}

/// Stacked bar chart titled "Sent and Received Transactions".
pub fn render_stacked_bar_svg(bars: &[StackedBar]) -> String {
    let width = 480.0;
    let height = 480.0;
    let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = height - MARGIN_TOP - MARGIN_BOTTOM;
    let max_total = bars.iter().map(StackedBar::total).max().unwrap_or(0).max(1) as f64;
    let y_scale = |count: usize| count as f64 / max_total * plot_height;
    let slot = plot_width / bars.len().max(1) as f64;
    let bar_width = slot * 0.6;
    let baseline = height - MARGIN_BOTTOM;

    let mut svg = String::new();
    open_svg(&mut svg, width, height);
    text(&mut svg, width / 2.0, 20.0, "middle", 14, "Sent and Received Transactions");
    axes(&mut svg, width, height);
    text(&mut svg, MARGIN_LEFT - 8.0, MARGIN_TOP + 4.0, "end", 10, &format!("{}", max_total as usize));
    text(&mut svg, MARGIN_LEFT - 8.0, baseline, "end", 10, "0");
    text(&mut svg, width / 2.0, height - 5.0, "middle", 11, "Blockchain");
    let _ = writeln!(
        svg,
        "  <text x=\"15\" y=\"{:.1}\" transform=\"rotate(-90 15 {:.1})\" text-anchor=\"middle\" font-size=\"11\" fill=\"#333\">Number of Transactions</text>",
        height / 2.0,
        height / 2.0
    );

    for (i, bar) in bars.iter().enumerate() {
        let x = MARGIN_LEFT + i as f64 * slot + (slot - bar_width) / 2.0;
        let sent_h = y_scale(bar.sent);
        let received_h = y_scale(bar.received);
        let _ = writeln!(
            svg,
            "  <rect class=\"sent\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>",
            x,
            baseline - sent_h,
            bar_width,
            sent_h,
            SENT_COLOR
        );
        let _ = writeln!(
            svg,
            "  <rect class=\"received\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>",
            x,
            baseline - sent_h - received_h,
            bar_width,
            received_h,
            RECEIVED_COLOR
        );
        text(&mut svg, x + bar_width / 2.0, baseline + 15.0, "middle", 11, &bar.label);
    }

    let legend_x = width - MARGIN_RIGHT - 150.0;
    for (row, (label, color)) in [("Sent Transactions", SENT_COLOR), ("Received Transactions", RECEIVED_COLOR)]
        .iter()
        .enumerate()
    {
        let y = MARGIN_TOP + row as f64 * 16.0;
        let _ = writeln!(
            svg,
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"10\" height=\"10\" fill=\"{}\"/>",
            legend_x, y, color
        );
        text(&mut svg, legend_x + 14.0, y + 9.0, "start", 10, label);
    }

    svg.push_str("</svg>\n");
    svg
}

/// Candlestick chart of `bars` with a marker per executed transaction:
/// a triangle below the low for buys and above the high for sells.
pub fn render_candlestick_svg(title: &str, bars: &[PriceBar], transactions: &[Transaction]) -> String {
    let mut svg = String::new();
    open_svg(&mut svg, CHART_WIDTH, CHART_HEIGHT);
    text(&mut svg, CHART_WIDTH / 2.0, 20.0, "middle", 14, title);

    if bars.is_empty() {
        text(&mut svg, CHART_WIDTH / 2.0, CHART_HEIGHT / 2.0, "middle", 12, "No price data available.");
        svg.push_str("</svg>\n");
        return svg;
    }

    let min_price = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let max_price = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    // A flat series still needs a non-zero span to scale against.
    let range = (max_price - min_price).max(max_price.abs() * 0.01).max(1e-9);
    let pad = range * 0.05;
    let (lo, hi) = (min_price - pad, max_price + pad);

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let slot = plot_width / bars.len() as f64;
    let body_width = (slot * 0.7).max(1.0);

    let x_center = |i: usize| MARGIN_LEFT + (i as f64 + 0.5) * slot;
    let y_scale = |v: f64| MARGIN_TOP + plot_height - ((v - lo) / (hi - lo)) * plot_height;

    axes(&mut svg, CHART_WIDTH, CHART_HEIGHT);
    text(&mut svg, MARGIN_LEFT - 5.0, y_scale(max_price) + 4.0, "end", 10, &format!("{:.2}", max_price));
    text(&mut svg, MARGIN_LEFT - 5.0, y_scale(min_price), "end", 10, &format!("{:.2}", min_price));
    let first = bars[0].date.to_string();
    let last = bars[bars.len() - 1].date.to_string();
    text(&mut svg, MARGIN_LEFT, CHART_HEIGHT - 10.0, "start", 10, &first);
    text(&mut svg, CHART_WIDTH - MARGIN_RIGHT, CHART_HEIGHT - 10.0, "end", 10, &last);

    for (i, bar) in bars.iter().enumerate() {
        let color = if bar.close >= bar.open { UP_COLOR } else { DOWN_COLOR };
        let x = x_center(i);
        let _ = writeln!(
            svg,
            "  <line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"1\"/>",
            y_scale(bar.high),
            y_scale(bar.low),
            color
        );
        let top = y_scale(bar.open.max(bar.close));
        let height = (y_scale(bar.open.min(bar.close)) - top).max(1.0);
        let _ = writeln!(
            svg,
            "  <rect class=\"candle\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>",
            x - body_width / 2.0,
            top,
            body_width,
            height,
            color
        );
    }

    let marker = 6.0;
    for tx in transactions {
        let Some(i) = bars.iter().position(|b| b.date == tx.date) else {
            continue;
        };
        let x = x_center(i);
        let (points, class, color) = if tx.is_buy() {
            let y = y_scale(bars[i].low) + 4.0;
            (
                format!("{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}", x, y, x - marker, y + marker * 1.5, x + marker, y + marker * 1.5),
                "buy",
                UP_COLOR,
            )
        } else {
            let y = y_scale(bars[i].high) - 4.0;
            (
                format!("{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}", x, y, x - marker, y - marker * 1.5, x + marker, y - marker * 1.5),
                "sell",
                DOWN_COLOR,
            )
        };
        let _ = writeln!(
            svg,
            "  <polygon class=\"{}\" points=\"{}\" fill=\"{}\" stroke=\"#000\" stroke-width=\"0.5\"/>",
            class, points, color
        );
    }

    svg.push_str("</svg>\n");
    svg
}

//! Volume-weighted long/short ratio.
//!
//! Over the `period` bars ending at the current bar:
//! - long weight of a bar  = (close - open) / open * volume, when close > open
//! - short weight of a bar = (open - close) / open * volume, when close < open
//! - ratio = sum(long) / sum(short), or 1 when sum(short) == 0
//!
//! Warmup: the first `period - 1` bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn ratio_for_window(window: &[PriceBar]) -> f64 {
    let (longs, shorts) = window
        .iter()
        .filter(|bar| bar.open > 0.0)
        .fold((0.0, 0.0), |(l, s), bar| {
            let weighted = bar.body_return() * bar.volume;
            if bar.is_bullish() {
                (l + weighted, s)
            } else if bar.is_bearish() {
                (l, s - weighted)
            } else {
                (l, s)
            }
        });

    if shorts == 0.0 { 1.0 } else { longs / shorts }
}

pub fn calculate_long_short_ratio(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if period == 0 || i + 1 < period {
                IndicatorPoint::invalid(bar.date)
            } else {
                IndicatorPoint::valid(bar.date, ratio_for_window(&bars[i + 1 - period..=i]))
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::LongShortRatio(period),
        values,
    }
}

//! Fixed-window RSI (Relative Strength Index).
//!
//! Each valid point is computed from scratch over the `period` close-to-close
//! changes ending at that bar:
//! - avg_gain = sum(positive changes) / period
//! - avg_loss = sum(|negative changes|) / period
//! - RSI = 100 - 100 / (1 + avg_gain / avg_loss), or 100 when avg_loss == 0
//!
//! Warmup: the first `period` bars are invalid (a window of `period` changes
//! needs `period + 1` closes).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

/// RSI over a window of consecutive closes. The number of changes, and thus
/// the averaging period, is `closes.len() - 1`.
pub fn rsi_from_closes(closes: &[f64]) -> Option<f64> {
    if closes.len() < 2 {
        return None;
    }
    let period = (closes.len() - 1) as f64;

    let (gains, losses) = closes.windows(2).fold((0.0, 0.0), |(g, l), w| {
        let change = w[1] - w[0];
        if change > 0.0 {
            (g + change, l)
        } else {
            (g, l - change)
        }
    });

    let avg_gain = gains / period;
    let avg_loss = losses / period;

    if avg_loss == 0.0 {
        Some(100.0)
    } else {
        Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
    }
}

pub fn calculate_rsi(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if period == 0 || i < period {
                return IndicatorPoint::invalid(bar.date);
            }
            match rsi_from_closes(&closes[i - period..=i]) {
                Some(rsi) => IndicatorPoint::valid(bar.date, rsi),
                None => IndicatorPoint::invalid(bar.date),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                symbol: "BTC-USD".into(),
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn rsi_empty_bars() {
        let series = calculate_rsi(&[], 4);
        assert!(series.values.is_empty());
    }

    #[test]
    fn rsi_known_window() {
        // changes: +1, -2, +3, +2 → avg gain 1.5, avg loss 0.5, RS 3
        let bars = make_bars(&[10.0, 11.0, 9.0, 12.0, 14.0]);
        let series = calculate_rsi(&bars, 4);
        assert_eq!(series.values.len(), 5);
        assert_relative_eq!(series.values[4].value, 75.0, epsilon = 1e-9);
        assert!(series.values[4].valid);
    }

    #[test]
    fn rsi_warmup_period() {
        let bars = make_bars(&[10.0, 11.0, 9.0, 12.0, 14.0, 13.0]);
        let series = calculate_rsi(&bars, 4);
        for i in 0..4 {
            assert!(!series.values[i].valid, "bar {} should be invalid", i);
        }
        assert!(series.values[4].valid);
        assert!(series.values[5].valid);
    }

    #[test]
    fn rsi_window_slides() {
        // window at bar 5: changes -2, +3, +2, -1 → gains 5/4, losses 3/4
        let bars = make_bars(&[10.0, 11.0, 9.0, 12.0, 14.0, 13.0]);
        let series = calculate_rsi(&bars, 4);
        let expected = 100.0 - 100.0 / (1.0 + 5.0 / 3.0);
        assert_relative_eq!(series.values[5].value, expected, epsilon = 1e-9);
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let series = calculate_rsi(&bars, 4);
        assert_relative_eq!(series.values[4].value, 100.0);
    }

    #[test]
    fn rsi_flat_prices_is_100() {
        let bars = make_bars(&[5.0; 5]);
        let series = calculate_rsi(&bars, 4);
        assert_relative_eq!(series.values[4].value, 100.0);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let bars = make_bars(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        let series = calculate_rsi(&bars, 4);
        assert_relative_eq!(series.values[4].value, 0.0);
    }

    #[test]
    fn rsi_zero_period() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let series = calculate_rsi(&bars, 0);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn rsi_indicator_type() {
        let series = calculate_rsi(&make_bars(&[1.0]), 4);
        assert_eq!(series.indicator_type, IndicatorType::Rsi(4));
    }

    #[test]
    fn rsi_from_closes_needs_two_points() {
        assert_eq!(rsi_from_closes(&[]), None);
        assert_eq!(rsi_from_closes(&[1.0]), None);
    }

    proptest! {
        #[test]
        fn rsi_is_bounded(closes in proptest::collection::vec(1.0f64..1_000_000.0, 5..60)) {
            let bars = make_bars(&closes);
            let series = calculate_rsi(&bars, 4);
            for point in series.values.iter().filter(|p| p.valid) {
                prop_assert!(point.value >= 0.0 && point.value <= 100.0, "RSI {} out of range", point.value);
            }
        }
    }
}

//! Yahoo Finance chart endpoint price data adapter.

use chrono::{DateTime, Duration, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::adapters::http;
use crate::domain::error::CoinlensError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;

pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

pub struct YahooAdapter {
    client: Client,
    base_url: String,
}

fn data_error(reason: impl Into<String>) -> CoinlensError {
    CoinlensError::DataSource {
        reason: reason.into(),
    }
}

fn value_at(series: &[Option<f64>], i: usize) -> Option<f64> {
    series.get(i).copied().flatten()
}

fn epoch_seconds(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

impl YahooAdapter {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, CoinlensError> {
        let client = http::build_client(timeout_secs).map_err(data_error)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Daily chart URL covering `[start_date, end_date]` inclusive.
    pub fn chart_url(base_url: &str, symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            base_url.trim_end_matches('/'),
            symbol,
            epoch_seconds(start_date),
            epoch_seconds(end_date + Duration::days(1)),
        )
    }

    /// Parse a chart body into bars, skipping days with any null field.
    pub fn parse_chart(
        body: &str,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, CoinlensError> {
        let response: ChartResponse = serde_json::from_str(body)
            .map_err(|e| data_error(format!("malformed yahoo response: {}", e)))?;

        if let Some(err) = response.chart.error {
            return Err(data_error(format!(
                "yahoo: {} {}",
                err.code.unwrap_or_default(),
                err.description.unwrap_or_default()
            )));
        }

        let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(Vec::new());
        };
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, ts) in result.timestamp.iter().enumerate() {
            let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
                debug!(ts, "skipping bar with unrepresentable timestamp");
                continue;
            };
            if date < start_date || date > end_date {
                continue;
            }
            let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
                value_at(&quote.open, i),
                value_at(&quote.high, i),
                value_at(&quote.low, i),
                value_at(&quote.close, i),
                value_at(&quote.volume, i),
            ) else {
                debug!(%date, "skipping bar with null fields");
                continue;
            };
            bars.push(PriceBar {
                symbol: symbol.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Ok(bars)
    }
}

impl DataPort for YahooAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, CoinlensError> {
        let url = Self::chart_url(&self.base_url, symbol, start_date, end_date);
        let body = http::get_text(&self.client, "yahoo", &url).map_err(data_error)?;
        let bars = Self::parse_chart(&body, symbol, start_date, end_date)?;
        info!(%symbol, count = bars.len(), "loaded price bars from yahoo");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn chart_url_spans_inclusive_range() {
        let url = YahooAdapter::chart_url(DEFAULT_YAHOO_URL, "BTC-USD", d(2024, 1, 1), d(2024, 1, 2));
        assert_eq!(
            url,
            "https://query1.finance.yahoo.com/v8/finance/chart/BTC-USD?period1=1704067200&period2=1704240000&interval=1d"
        );
    }

    #[test]
    fn parses_bars_and_skips_nulls() {
        let body = r#"{"chart":{"result":[{
            "timestamp":[1704067200,1704153600,1704240000],
            "indicators":{"quote":[{
                "open":[42000.0,null,44000.0],
                "high":[43000.0,44000.0,45000.0],
                "low":[41000.0,42000.0,43000.0],
                "close":[42500.0,43500.0,44500.0],
                "volume":[1000.0,2000.0,3000.0]
            }]}
        }],"error":null}}"#;
        let bars = YahooAdapter::parse_chart(body, "BTC-USD", d(2024, 1, 1), d(2024, 12, 31)).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, d(2024, 1, 1));
        assert_eq!(bars[0].close, 42500.0);
        assert_eq!(bars[1].date, d(2024, 1, 3));
        assert_eq!(bars[1].volume, 3000.0);
    }

    #[test]
    fn filters_to_range() {
        let body = r#"{"chart":{"result":[{
            "timestamp":[1704067200,1704153600],
            "indicators":{"quote":[{"open":[1.0,2.0],"high":[1.0,2.0],"low":[1.0,2.0],"close":[1.0,2.0],"volume":[1.0,2.0]}]}
        }],"error":null}}"#;
        let bars = YahooAdapter::parse_chart(body, "X", d(2024, 1, 2), d(2024, 1, 2)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 2.0);
    }

    #[test]
    fn chart_error_is_data_source_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = YahooAdapter::parse_chart(body, "NOPE", d(2024, 1, 1), d(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, CoinlensError::DataSource { .. }));
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn empty_result_is_empty_series() {
        let body = r#"{"chart":{"result":[],"error":null}}"#;
        let bars = YahooAdapter::parse_chart(body, "X", d(2024, 1, 1), d(2024, 2, 1)).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn malformed_body_is_data_source_error() {
        let err = YahooAdapter::parse_chart("not json", "X", d(2024, 1, 1), d(2024, 2, 1)).unwrap_err();
        assert!(matches!(err, CoinlensError::DataSource { .. }));
    }
}
